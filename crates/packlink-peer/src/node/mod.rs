//! Nodes: one per controller, owning its links and all of its state.
//!
//! Every node is driven by [`poll`](Hub::poll) with the current time. A poll
//! runs the session timers, drains and dispatches every complete inbound
//! frame in arrival order, and writes whatever the dispatchers queued. It
//! never blocks and never returns an error; faults end up in [`LinkStats`].

mod attenuator;
mod hub;
mod wand;

pub use attenuator::AttenuatorNode;
pub use hub::Hub;
pub use wand::WandNode;

use serde::Serialize;

use crate::capability::{Capabilities, LightingCue};
use crate::dispatch::{DispatchContext, Outbox, Peers};
use crate::link::Link;
use crate::mirror::{MirrorReader, MirrorWriter, StateMirror};
use crate::role::Role;
use crate::runtime::NodeRuntimeState;
use crate::session::{LinkState, LinkStats};

/// State and counters of one link, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LinkReport {
    pub peer: Role,
    pub state: LinkState,
    pub stats: LinkStats,
}

impl LinkReport {
    fn of(link: &Link) -> Self {
        Self {
            peer: link.peer(),
            state: link.state(),
            stats: link.stats(),
        }
    }
}

/// Everything a node owns besides its links.
struct NodeCore {
    state: NodeRuntimeState,
    mirror: MirrorWriter,
    reader: MirrorReader,
    caps: Capabilities,
    out: Outbox,
    presence: bool,
}

impl NodeCore {
    fn new(mut caps: Capabilities) -> Self {
        let state = NodeRuntimeState::load(&mut *caps.store);
        let (mut mirror, reader) = StateMirror::new();
        mirror.set_power_level(state.live.power_level);
        mirror.set_stream_mode(state.live.stream_mode);
        mirror.set_system_mode(state.live.system_mode);
        mirror.set_system_year(state.live.system_year);
        Self {
            state,
            mirror,
            reader,
            caps,
            out: Outbox::new(),
            presence: false,
        }
    }

    fn ctx(&mut self, now_ms: u64, peers: Peers) -> DispatchContext<'_> {
        DispatchContext::new(
            now_ms,
            &mut self.state,
            &mut self.mirror,
            &mut self.caps,
            &mut self.out,
            peers,
        )
    }

    /// Blink the searching indicator.
    fn toggle_presence(&mut self) {
        self.presence = !self.presence;
        self.caps
            .lighting
            .show(LightingCue::Presence(self.presence));
    }

    /// Write everything queued for the peer on `link`.
    fn flush(&mut self, link: &mut Link) {
        for message in self.out.take_for(link.peer()) {
            link.send(&message);
        }
    }
}
