//! Per-link connection state machine.
//!
//! A [`PeerLink`] tracks one physical peer: whether it is connected, when it
//! was last heard from, and which timers are pending. It never touches I/O;
//! callers feed it the clock and handshake controls and act on the returned
//! [`SessionAction`]s.

use serde::Serialize;
use tracing::{debug, info};

use crate::config::SessionConfig;
use crate::role::Role;
use crate::timer::Deadline;

/// Connection state of one peer link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkState {
    #[default]
    Disconnected,
    Syncing,
    Connected,
}

impl LinkState {
    pub fn name(self) -> &'static str {
        match self {
            LinkState::Disconnected => "disconnected",
            LinkState::Syncing => "syncing",
            LinkState::Connected => "connected",
        }
    }
}

/// Which end of the sync exchange this side plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncRole {
    /// Peripheral end: asks for a sync until it gets one.
    Requester,
    /// Hub end: answers requests with the sync sequence.
    Responder,
}

/// Handshake commands, independent of direction vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    SyncRequest,
    SyncStart,
    SyncEnd,
    Heartbeat,
}

/// What the owner of a link must do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionAction {
    /// Ask the peer for a sync.
    SendSyncRequest,
    /// Flip the "searching" indicator.
    TogglePresence,
    /// Send the full sync sequence to the peer.
    PerformSync,
    /// Confirm a completed sync to the peer.
    AcknowledgeSync,
    /// Send a heartbeat (or echo one).
    SendHeartbeat,
    /// The link just became connected.
    Connected,
    /// A connected link went silent past the keepalive window.
    LinkLost,
    /// A connected link restarted its handshake; prior peer state is stale.
    LinkReset,
    /// A sync never completed.
    SyncAbandoned,
}

/// Gate classes used by dispatchers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageClass {
    Handshake,
    SyncPayload,
    /// Domain commands, data records and preference snapshots.
    Domain,
}

/// Counters for everything a link drops, rejects or survives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LinkStats {
    pub frames: u64,
    pub framing_discards: u64,
    pub sentinel_rejects: u64,
    pub malformed: u64,
    pub premature_drops: u64,
    pub unknown_commands: u64,
    pub syncs_completed: u64,
    pub syncs_abandoned: u64,
    pub timeouts: u64,
    pub resets: u64,
    pub io_errors: u64,
}

/// Session state of one physical peer.
#[derive(Debug, Clone)]
pub struct PeerLink {
    local: Role,
    peer: Role,
    sync_role: SyncRole,
    heartbeat_initiator: bool,
    config: SessionConfig,
    state: LinkState,
    last_activity_ms: Option<u64>,
    retry: Deadline,
    heartbeat: Deadline,
    keepalive: Deadline,
    sync_guard: Deadline,
    stats: LinkStats,
}

impl PeerLink {
    pub fn new(local: Role, peer: Role, sync_role: SyncRole, config: SessionConfig) -> Self {
        Self {
            local,
            peer,
            sync_role,
            heartbeat_initiator: local.initiates_heartbeat(peer),
            config,
            state: LinkState::Disconnected,
            last_activity_ms: None,
            retry: Deadline::idle(),
            heartbeat: Deadline::idle(),
            keepalive: Deadline::idle(),
            sync_guard: Deadline::idle(),
            stats: LinkStats::default(),
        }
    }

    pub fn local(&self) -> Role {
        self.local
    }

    pub fn peer(&self) -> Role {
        self.peer
    }

    pub fn sync_role(&self) -> SyncRole {
        self.sync_role
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == LinkState::Connected
    }

    pub fn is_heartbeat_initiator(&self) -> bool {
        self.heartbeat_initiator
    }

    pub fn last_activity_ms(&self) -> Option<u64> {
        self.last_activity_ms
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn stats(&self) -> &LinkStats {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut LinkStats {
        &mut self.stats
    }

    /// Run timers.
    pub fn poll(&mut self, now_ms: u64) -> Vec<SessionAction> {
        let mut actions = Vec::new();
        match self.state {
            LinkState::Disconnected => {
                if self.sync_role == SyncRole::Requester
                    && (!self.retry.is_armed() || self.retry.expired(now_ms))
                {
                    self.retry.arm(now_ms, self.config.retry_interval_ms);
                    actions.push(SessionAction::SendSyncRequest);
                    actions.push(SessionAction::TogglePresence);
                }
            }
            LinkState::Syncing => {
                if self.sync_guard.expired(now_ms) {
                    self.stats.syncs_abandoned += 1;
                    info!(local = %self.local, peer = %self.peer, "sync abandoned");
                    self.enter_disconnected();
                    actions.push(SessionAction::SyncAbandoned);
                }
            }
            LinkState::Connected => {
                if self.keepalive.expired(now_ms) {
                    self.stats.timeouts += 1;
                    info!(
                        local = %self.local,
                        peer = %self.peer,
                        silent_ms = self.config.keepalive_timeout_ms,
                        "peer link lost"
                    );
                    self.enter_disconnected();
                    actions.push(SessionAction::LinkLost);
                } else if self.heartbeat_initiator && self.heartbeat.expired(now_ms) {
                    self.heartbeat.arm(now_ms, self.config.heartbeat_interval_ms);
                    actions.push(SessionAction::SendHeartbeat);
                }
            }
        }
        actions
    }

    /// Record a valid frame from the peer.
    pub fn note_activity(&mut self, now_ms: u64) {
        self.last_activity_ms = Some(now_ms);
        if self.state == LinkState::Connected {
            self.keepalive.arm(now_ms, self.config.keepalive_timeout_ms);
        }
    }

    /// Feed a handshake command received from the peer.
    pub fn on_control(&mut self, now_ms: u64, control: Control) -> Vec<SessionAction> {
        let mut actions = Vec::new();
        match self.sync_role {
            SyncRole::Responder => self.respond(now_ms, control, &mut actions),
            SyncRole::Requester => self.request(now_ms, control, &mut actions),
        }
        actions
    }

    /// Whether a message of `class` may be acted on in the current state.
    pub fn admits(&self, class: MessageClass) -> bool {
        match class {
            MessageClass::Handshake => true,
            MessageClass::SyncPayload => self.state != LinkState::Disconnected,
            MessageClass::Domain => self.state == LinkState::Connected,
        }
    }

    fn respond(&mut self, now_ms: u64, control: Control, actions: &mut Vec<SessionAction>) {
        match (control, self.state) {
            (Control::SyncRequest, _) => {
                self.enter_syncing(now_ms, actions);
                actions.push(SessionAction::PerformSync);
            }
            (Control::SyncEnd, LinkState::Syncing) => self.enter_connected(now_ms, actions),
            (Control::Heartbeat, LinkState::Connected) => {
                if !self.heartbeat_initiator {
                    actions.push(SessionAction::SendHeartbeat);
                }
            }
            (_, LinkState::Disconnected) => {
                debug!(
                    local = %self.local,
                    peer = %self.peer,
                    ?control,
                    "peer still believes it is connected; resyncing"
                );
                self.enter_syncing(now_ms, actions);
                actions.push(SessionAction::PerformSync);
            }
            _ => {}
        }
    }

    fn request(&mut self, now_ms: u64, control: Control, actions: &mut Vec<SessionAction>) {
        match (control, self.state) {
            (Control::SyncStart, _) => self.enter_syncing(now_ms, actions),
            (Control::SyncEnd, LinkState::Syncing) => {
                self.enter_connected(now_ms, actions);
                actions.push(SessionAction::AcknowledgeSync);
            }
            (Control::SyncEnd | Control::Heartbeat, LinkState::Disconnected) => {
                debug!(
                    local = %self.local,
                    peer = %self.peer,
                    ?control,
                    "hub still believes it is connected; requesting sync"
                );
                self.retry.arm(now_ms, self.config.retry_interval_ms);
                actions.push(SessionAction::SendSyncRequest);
            }
            (Control::Heartbeat, LinkState::Connected) => {
                if !self.heartbeat_initiator {
                    actions.push(SessionAction::SendHeartbeat);
                }
            }
            _ => {}
        }
    }

    fn enter_syncing(&mut self, now_ms: u64, actions: &mut Vec<SessionAction>) {
        if self.state == LinkState::Connected {
            self.stats.resets += 1;
            info!(local = %self.local, peer = %self.peer, "peer link reset");
            actions.push(SessionAction::LinkReset);
        }
        self.state = LinkState::Syncing;
        self.retry.cancel();
        self.heartbeat.cancel();
        self.keepalive.cancel();
        self.sync_guard.arm(now_ms, self.config.keepalive_timeout_ms);
        debug!(local = %self.local, peer = %self.peer, "syncing");
    }

    fn enter_connected(&mut self, now_ms: u64, actions: &mut Vec<SessionAction>) {
        self.state = LinkState::Connected;
        self.sync_guard.cancel();
        self.retry.cancel();
        self.keepalive.arm(now_ms, self.config.keepalive_timeout_ms);
        if self.heartbeat_initiator {
            self.heartbeat.arm(now_ms, self.config.heartbeat_interval_ms);
        }
        self.stats.syncs_completed += 1;
        info!(local = %self.local, peer = %self.peer, "peer link connected");
        actions.push(SessionAction::Connected);
    }

    fn enter_disconnected(&mut self) {
        self.state = LinkState::Disconnected;
        self.heartbeat.cancel();
        self.keepalive.cancel();
        self.sync_guard.cancel();
        // Idle retry fires on the next poll.
        self.retry.cancel();
    }
}
