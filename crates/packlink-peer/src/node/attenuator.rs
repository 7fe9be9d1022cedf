use packlink_prefs::VolumeChannel;
use packlink_transport::LinkStream;
use tracing::debug;

use super::{LinkReport, NodeCore};
use crate::capability::Capabilities;
use crate::command::{AttenuatorToPack, PackToAttenuator};
use crate::config::SessionConfig;
use crate::dispatch::attenuator::{self, PreferenceKind};
use crate::dispatch::{DispatchContext, Peers};
use crate::error::Result;
use crate::link::{Inbound, Link};
use crate::mirror::MirrorReader;
use crate::role::Role;
use crate::runtime::NodeRuntimeState;
use crate::session::{SessionAction, SyncRole};

/// The attenuator: a remote panel and preference editor for the pack.
pub struct AttenuatorNode {
    pack: Link,
    core: NodeCore,
}

impl AttenuatorNode {
    pub fn new(stream: LinkStream, config: SessionConfig, caps: Capabilities) -> Result<Self> {
        let pack = Link::new(
            Role::Attenuator,
            Role::Pack,
            SyncRole::Requester,
            stream,
            config,
        )?;
        Ok(Self {
            pack,
            core: NodeCore::new(caps),
        })
    }

    pub fn poll(&mut self, now_ms: u64) {
        let actions = self.pack.poll_timers(now_ms);
        self.run_session(now_ms, actions);
        self.flush();

        while let Some(frame) = self.pack.next_frame() {
            match self.pack.receive::<PackToAttenuator>(now_ms, &frame) {
                Some(Inbound::Session(actions)) => self.run_session(now_ms, actions),
                Some(Inbound::Command { command, arg }) => {
                    attenuator::on_pack_command(&mut self.ctx(now_ms), command, arg)
                }
                Some(Inbound::Data { message, data }) => {
                    attenuator::on_pack_data(&mut self.ctx(now_ms), message, data)
                }
                Some(Inbound::Snapshot(snapshot)) => {
                    attenuator::on_pack_snapshot(&mut self.ctx(now_ms), snapshot)
                }
                None => {}
            }
            self.flush();
        }
    }

    pub fn request_preferences(&mut self, now_ms: u64, kind: PreferenceKind) {
        attenuator::request_preferences(&mut self.ctx(now_ms), kind);
        self.flush();
    }

    pub fn push_preferences(&mut self, now_ms: u64, kind: PreferenceKind) {
        attenuator::push_preferences(&mut self.ctx(now_ms), kind);
        self.flush();
    }

    pub fn save_preferences(&mut self, now_ms: u64, kind: PreferenceKind) {
        attenuator::save_preferences(&mut self.ctx(now_ms), kind);
        self.flush();
    }

    pub fn toggle_mute(&mut self, now_ms: u64) {
        attenuator::toggle_mute(&mut self.ctx(now_ms));
        self.flush();
    }

    pub fn set_pack_on(&mut self, now_ms: u64, on: bool) {
        attenuator::set_pack_on(&mut self.ctx(now_ms), on);
        self.flush();
    }

    pub fn step_volume(&mut self, now_ms: u64, channel: VolumeChannel, up: bool) {
        attenuator::step_volume(&mut self.ctx(now_ms), channel, up);
        self.flush();
    }

    pub fn set_spectral_colour(&mut self, now_ms: u64, hue: u8, saturation: u8) {
        attenuator::set_spectral_colour(&mut self.ctx(now_ms), hue, saturation);
        self.flush();
    }

    pub fn mirror(&self) -> MirrorReader {
        self.core.reader.clone()
    }

    pub fn state(&self) -> &NodeRuntimeState {
        &self.core.state
    }

    /// Local copy of preferences, edited before a push.
    pub fn state_mut(&mut self) -> &mut NodeRuntimeState {
        &mut self.core.state
    }

    pub fn pack_link(&self) -> LinkReport {
        LinkReport::of(&self.pack)
    }

    fn ctx(&mut self, now_ms: u64) -> DispatchContext<'_> {
        let peers = Peers {
            pack: self.pack.is_connected(),
            ..Peers::default()
        };
        self.core.ctx(now_ms, peers)
    }

    fn flush(&mut self) {
        self.core.flush(&mut self.pack);
    }

    fn run_session(&mut self, now_ms: u64, actions: Vec<SessionAction>) {
        for action in actions {
            match action {
                SessionAction::SendSyncRequest => {
                    self.core
                        .out
                        .command(Role::Pack, AttenuatorToPack::SyncStart, 0)
                }
                SessionAction::TogglePresence => self.core.toggle_presence(),
                SessionAction::AcknowledgeSync => {
                    attenuator::acknowledge_sync(&mut self.ctx(now_ms))
                }
                SessionAction::SendHeartbeat => {
                    self.core
                        .out
                        .command(Role::Pack, AttenuatorToPack::Handshake, 0)
                }
                SessionAction::Connected => attenuator::pack_link_up(&mut self.ctx(now_ms)),
                SessionAction::LinkLost => {
                    attenuator::pack_link_down(&mut self.ctx(now_ms));
                    self.pack.reset_reader();
                }
                SessionAction::LinkReset => attenuator::pack_link_down(&mut self.ctx(now_ms)),
                SessionAction::SyncAbandoned => debug!("sync abandoned; requesting again"),
                SessionAction::PerformSync => {
                    debug!(?action, "responder action on a requester link")
                }
            }
        }
    }
}

impl std::fmt::Debug for AttenuatorNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttenuatorNode")
            .field("pack", &self.pack)
            .field("state", &self.core.state)
            .finish_non_exhaustive()
    }
}
