//! Inter-controller link protocol for pack, wand and attenuator props.
//!
//! The pack sits in the middle with one serial link to the wand and one to
//! the attenuator. This crate gathers the layers under one name.
//!
//! # Crate Structure
//!
//! - [`transport`]: serial, socket and in-memory byte links
//! - [`frame`]: `[type][len][payload]` framing and fixed-layout records
//! - [`prefs`]: preference and live-state snapshots, plus their stores
//! - [`peer`]: sessions, dispatch and the hub/wand/attenuator nodes

/// Re-export transport types.
pub mod transport {
    pub use packlink_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use packlink_frame::*;
}

/// Re-export preference types.
pub mod prefs {
    pub use packlink_prefs::*;
}

/// Re-export peer types.
pub mod peer {
    pub use packlink_peer::*;
}
