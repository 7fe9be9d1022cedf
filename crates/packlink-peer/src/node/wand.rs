use packlink_prefs::StreamMode;
use packlink_transport::LinkStream;
use tracing::debug;

use super::{LinkReport, NodeCore};
use crate::capability::Capabilities;
use crate::command::{PackToWand, WandToPack};
use crate::config::SessionConfig;
use crate::dispatch::{wand, DispatchContext, Peers};
use crate::error::Result;
use crate::link::{Inbound, Link};
use crate::mirror::MirrorReader;
use crate::role::Role;
use crate::runtime::NodeRuntimeState;
use crate::session::{SessionAction, SyncRole};

/// The wand: asks the pack for a sync until it gets one, then mirrors it.
pub struct WandNode {
    pack: Link,
    core: NodeCore,
}

impl WandNode {
    pub fn new(stream: LinkStream, config: SessionConfig, caps: Capabilities) -> Result<Self> {
        let pack = Link::new(Role::Wand, Role::Pack, SyncRole::Requester, stream, config)?;
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
            match self.pack.receive::<PackToWand>(now_ms, &frame) {
                Some(Inbound::Session(actions)) => self.run_session(now_ms, actions),
                Some(Inbound::Command { command, arg }) => {
                    wand::on_pack_command(&mut self.ctx(now_ms), command, arg)
                }
                Some(Inbound::Data { message, data }) => {
                    wand::on_pack_data(&mut self.ctx(now_ms), message, data)
                }
                Some(Inbound::Snapshot(snapshot)) => {
                    wand::on_pack_snapshot(&mut self.ctx(now_ms), snapshot)
                }
                None => {}
            }
            self.flush();
        }
    }

    pub fn power_on(&mut self, now_ms: u64) {
        wand::power_on(&mut self.ctx(now_ms));
        self.flush();
    }

    pub fn power_off(&mut self, now_ms: u64) {
        wand::power_off(&mut self.ctx(now_ms));
        self.flush();
    }

    pub fn set_firing(&mut self, now_ms: u64, firing: bool) {
        wand::set_firing(&mut self.ctx(now_ms), firing);
        self.flush();
    }

    pub fn set_barrel_extended(&mut self, now_ms: u64, extended: bool) {
        wand::set_barrel_extended(&mut self.ctx(now_ms), extended);
        self.flush();
    }

    pub fn set_power_level(&mut self, now_ms: u64, level: u8) {
        wand::set_power_level(&mut self.ctx(now_ms), level);
        self.flush();
    }

    pub fn set_stream_mode(&mut self, now_ms: u64, mode: StreamMode) {
        wand::set_stream_mode(&mut self.ctx(now_ms), mode);
        self.flush();
    }

    pub fn vent(&mut self, now_ms: u64) {
        wand::vent(&mut self.ctx(now_ms));
        self.flush();
    }

    pub fn overheat(&mut self, now_ms: u64) {
        wand::start_overheat(&mut self.ctx(now_ms));
        self.flush();
    }

    pub fn mirror(&self) -> MirrorReader {
        self.core.reader.clone()
    }

    pub fn state(&self) -> &NodeRuntimeState {
        &self.core.state
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
                    self.core.out.command(Role::Pack, WandToPack::SyncNow, 0)
                }
                SessionAction::TogglePresence => self.core.toggle_presence(),
                SessionAction::AcknowledgeSync => wand::acknowledge_sync(&mut self.ctx(now_ms)),
                SessionAction::SendHeartbeat => {
                    self.core.out.command(Role::Pack, WandToPack::Handshake, 0)
                }
                SessionAction::Connected => wand::pack_link_up(&mut self.ctx(now_ms)),
                SessionAction::LinkLost => {
                    wand::pack_link_down(&mut self.ctx(now_ms));
                    self.pack.reset_reader();
                }
                SessionAction::LinkReset => wand::pack_link_down(&mut self.ctx(now_ms)),
                SessionAction::SyncAbandoned => debug!("sync abandoned; requesting again"),
                SessionAction::PerformSync => {
                    debug!(?action, "responder action on a requester link")
                }
            }
        }
    }
}

impl std::fmt::Debug for WandNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WandNode")
            .field("pack", &self.pack)
            .field("state", &self.core.state)
            .finish_non_exhaustive()
    }
}
