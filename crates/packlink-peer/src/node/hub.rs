use packlink_prefs::Volume;
use packlink_transport::LinkStream;
use tracing::debug;

use super::{LinkReport, NodeCore};
use crate::capability::Capabilities;
use crate::command::{AttenuatorToPack, PackToAttenuator, PackToWand, WandToPack};
use crate::config::NodeConfig;
use crate::dispatch::{pack, DispatchContext, Peers};
use crate::error::Result;
use crate::link::{Inbound, Link};
use crate::mirror::MirrorReader;
use crate::role::Role;
use crate::runtime::NodeRuntimeState;
use crate::session::{SessionAction, SyncRole};

/// The pack: answers both peripherals and relays between them.
pub struct Hub {
    wand: Link,
    attenuator: Link,
    core: NodeCore,
}

impl Hub {
    pub fn new(
        wand_stream: LinkStream,
        attenuator_stream: LinkStream,
        config: &NodeConfig,
        caps: Capabilities,
    ) -> Result<Self> {
        let wand = Link::new(
            Role::Pack,
            Role::Wand,
            SyncRole::Responder,
            wand_stream,
            config.wand_link,
        )?;
        let attenuator = Link::new(
            Role::Pack,
            Role::Attenuator,
            SyncRole::Responder,
            attenuator_stream,
            config.attenuator_link,
        )?;
        Ok(Self {
            wand,
            attenuator,
            core: NodeCore::new(caps),
        })
    }

    pub fn poll(&mut self, now_ms: u64) {
        for peer in [Role::Wand, Role::Attenuator] {
            let actions = self.link_mut(peer).poll_timers(now_ms);
            self.run_session(now_ms, peer, actions);
        }
        self.flush();

        while let Some(frame) = self.wand.next_frame() {
            match self.wand.receive::<WandToPack>(now_ms, &frame) {
                Some(Inbound::Session(actions)) => self.run_session(now_ms, Role::Wand, actions),
                Some(Inbound::Command { command, arg }) => {
                    pack::on_wand_command(&mut self.ctx(now_ms), command, arg)
                }
                Some(Inbound::Data { message, data }) => {
                    pack::on_wand_data(&mut self.ctx(now_ms), message, data)
                }
                Some(Inbound::Snapshot(snapshot)) => {
                    pack::on_wand_snapshot(&mut self.ctx(now_ms), snapshot)
                }
                None => {}
            }
            self.flush();
        }

        while let Some(frame) = self.attenuator.next_frame() {
            match self.attenuator.receive::<AttenuatorToPack>(now_ms, &frame) {
                Some(Inbound::Session(actions)) => {
                    self.run_session(now_ms, Role::Attenuator, actions)
                }
                Some(Inbound::Command { command, arg }) => {
                    pack::on_attenuator_command(&mut self.ctx(now_ms), command, arg)
                }
                Some(Inbound::Data { message, data }) => {
                    pack::on_attenuator_data(&mut self.ctx(now_ms), message, data)
                }
                Some(Inbound::Snapshot(snapshot)) => {
                    pack::on_attenuator_snapshot(&mut self.ctx(now_ms), snapshot)
                }
                None => {}
            }
            self.flush();
        }
    }

    pub fn set_pack_on(&mut self, now_ms: u64, on: bool) {
        pack::set_pack_on(&mut self.ctx(now_ms), on);
        self.flush();
    }

    pub fn set_alarm(&mut self, now_ms: u64, on: bool) {
        pack::set_alarm(&mut self.ctx(now_ms), on);
        self.flush();
    }

    pub fn set_volume(&mut self, now_ms: u64, volume: Volume) {
        pack::set_volume(&mut self.ctx(now_ms), volume);
        self.flush();
    }

    pub fn finish_venting(&mut self, now_ms: u64) {
        pack::finish_venting(&mut self.ctx(now_ms));
        self.flush();
    }

    /// Number of music tracks found on the pack's audio storage.
    pub fn set_music_tracks(&mut self, count: u16) {
        let music = &mut self.core.state.live.music;
        music.track_count = count;
        if count == 0 {
            music.current_track = 0;
        } else {
            music.current_track = music.current_track.min(count - 1);
        }
    }

    pub fn mirror(&self) -> MirrorReader {
        self.core.reader.clone()
    }

    pub fn state(&self) -> &NodeRuntimeState {
        &self.core.state
    }

    pub fn wand_link(&self) -> LinkReport {
        LinkReport::of(&self.wand)
    }

    pub fn attenuator_link(&self) -> LinkReport {
        LinkReport::of(&self.attenuator)
    }

    fn peers(&self) -> Peers {
        Peers {
            pack: false,
            wand: self.wand.is_connected(),
            attenuator: self.attenuator.is_connected(),
        }
    }

    fn ctx(&mut self, now_ms: u64) -> DispatchContext<'_> {
        let peers = self.peers();
        self.core.ctx(now_ms, peers)
    }

    fn link_mut(&mut self, peer: Role) -> &mut Link {
        match peer {
            Role::Attenuator => &mut self.attenuator,
            _ => &mut self.wand,
        }
    }

    fn flush(&mut self) {
        self.core.flush(&mut self.wand);
        self.core.flush(&mut self.attenuator);
    }

    fn run_session(&mut self, now_ms: u64, peer: Role, actions: Vec<SessionAction>) {
        for action in actions {
            match (action, peer) {
                (SessionAction::PerformSync, Role::Wand) => pack::sync_wand(&mut self.ctx(now_ms)),
                (SessionAction::PerformSync, _) => pack::sync_attenuator(&mut self.ctx(now_ms)),
                (SessionAction::SendHeartbeat, Role::Wand) => {
                    self.core.out.command(Role::Wand, PackToWand::Handshake, 0)
                }
                (SessionAction::SendHeartbeat, _) => {
                    self.core
                        .out
                        .command(Role::Attenuator, PackToAttenuator::Handshake, 0)
                }
                (SessionAction::Connected, Role::Wand) => {
                    pack::wand_link_up(&mut self.ctx(now_ms))
                }
                (SessionAction::Connected, _) => pack::attenuator_link_up(&mut self.ctx(now_ms)),
                (SessionAction::LinkLost | SessionAction::LinkReset, Role::Wand) => {
                    pack::wand_link_down(&mut self.ctx(now_ms));
                    if action == SessionAction::LinkLost {
                        self.wand.reset_reader();
                    }
                }
                (SessionAction::LinkLost | SessionAction::LinkReset, _) => {
                    pack::attenuator_link_down(&mut self.ctx(now_ms));
                    if action == SessionAction::LinkLost {
                        self.attenuator.reset_reader();
                    }
                }
                (SessionAction::TogglePresence, _) => self.core.toggle_presence(),
                (SessionAction::SyncAbandoned, _) => {
                    debug!(%peer, "sync abandoned; waiting for a new request")
                }
                (SessionAction::SendSyncRequest | SessionAction::AcknowledgeSync, _) => {
                    debug!(%peer, ?action, "requester action on a responder link")
                }
            }
        }
    }
}

impl std::fmt::Debug for Hub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hub")
            .field("wand", &self.wand)
            .field("attenuator", &self.attenuator)
            .field("state", &self.core.state)
            .finish_non_exhaustive()
    }
}
