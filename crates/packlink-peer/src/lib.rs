//! Peer sessions, command dispatch and node orchestration for the pack,
//! wand and attenuator controllers.
//!
//! The pack is the hub. It holds one [`Link`] to the wand and one to the
//! attenuator; the two peripherals never talk to each other. Every link runs
//! the same session state machine ([`PeerLink`]): a peripheral asks for a
//! sync, the hub answers with a full-state snapshot, and from then on a
//! heartbeat keeps the link alive until it goes silent.
//!
//! Layering, bottom up:
//! - [`session`]: connection states, timers and the gate deciding which
//!   messages a link may act on.
//! - [`link`]: one framed stream plus its session; validates everything.
//! - [`dispatch`]: what each role does with an admitted message.
//! - [`node`]: [`Hub`], [`WandNode`] and [`AttenuatorNode`], each polled with
//!   the current time.
//!
//! Hardware stays behind [`Capabilities`] (sound, lights, storage), and the
//! observable state of every node is published through a [`StateMirror`].

pub mod capability;
pub mod clock;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod link;
pub mod mirror;
pub mod node;
pub mod role;
pub mod runtime;
pub mod session;
mod timer;

pub use capability::{
    AudioCue, AudioSink, Capabilities, Cue, CueLog, LightingCue, LightingSink, NullSink,
};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use command::{
    firmware_attenuator_id, AttenuatorToPack, CommandSet, PackToAttenuator, PackToWand, WandToPack,
};
pub use config::{NodeConfig, SessionConfig, DEFAULT_BAUD};
pub use dispatch::attenuator::PreferenceKind;
pub use dispatch::{Outbound, Outbox, Peers};
pub use error::{PeerError, Result};
pub use link::{Inbound, Link};
pub use mirror::{Flag, MirrorReader, MirrorSnapshot, MirrorWriter, StateMirror};
pub use node::{AttenuatorNode, Hub, LinkReport, WandNode};
pub use role::Role;
pub use runtime::NodeRuntimeState;
pub use session::{Control, LinkState, LinkStats, MessageClass, PeerLink, SessionAction, SyncRole};
