//! Duplex byte links between prop controllers.
//!
//! Every physical peer gets exactly one [`LinkStream`]. Three backends share
//! the same non-blocking `Read + Write` surface:
//! - a serial tty in raw 8N1 mode (the real UART between boards)
//! - a Unix stream socket pair (host emulation across processes)
//! - an in-memory pipe with an unplug switch (tests and simulation)
//!
//! Reads never block: an empty link reports `WouldBlock`. There is no
//! link-down signal; higher layers detect loss by silence alone.

pub mod error;
pub mod memory;
pub mod traits;

#[cfg(unix)]
pub mod serial;

pub use error::{Result, TransportError};
pub use memory::{Direction, MemoryLink};
pub use traits::LinkStream;

#[cfg(unix)]
pub use serial::SerialPort;
