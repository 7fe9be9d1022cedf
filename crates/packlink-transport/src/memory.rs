use std::io::{ErrorKind, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use bytes::{Buf, BytesMut};
use tracing::debug;

use crate::traits::LinkStream;

/// Which way bytes travel on a [`MemoryLink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// From the first end returned by [`MemoryLink::ends`] to the second.
    AToB,
    /// From the second end to the first.
    BToA,
}

struct Shared {
    a_to_b: Mutex<BytesMut>,
    b_to_a: Mutex<BytesMut>,
    plugged: AtomicBool,
}

impl Shared {
    fn queue(&self, direction: Direction) -> MutexGuard<'_, BytesMut> {
        let queue = match direction {
            Direction::AToB => &self.a_to_b,
            Direction::BToA => &self.b_to_a,
        };
        queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// An in-process "cable" joining two [`LinkStream`] ends.
///
/// The cable can be unplugged and replugged to emulate a peer being removed
/// or swapped. While unplugged, writes succeed but the bytes are lost and
/// reads report `WouldBlock`, which is exactly what a UART does when the
/// other board is gone.
#[derive(Clone)]
pub struct MemoryLink {
    shared: Arc<Shared>,
}

impl MemoryLink {
    /// Create a new, plugged-in cable with nothing attached yet.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                a_to_b: Mutex::new(BytesMut::new()),
                b_to_a: Mutex::new(BytesMut::new()),
                plugged: AtomicBool::new(true),
            }),
        }
    }

    /// Convenience: a fresh cable with both ends attached.
    pub fn pair() -> (LinkStream, LinkStream) {
        Self::new().ends()
    }

    /// Attach both ends of this cable.
    ///
    /// Calling this again yields new ends over the same queues, which is how
    /// tests attach a replacement unit to a link the hub still holds.
    pub fn ends(&self) -> (LinkStream, LinkStream) {
        (self.end(Direction::AToB), self.end(Direction::BToA))
    }

    /// Attach only the end that transmits in `tx`.
    pub fn end(&self, tx: Direction) -> LinkStream {
        LinkStream::from_memory(MemoryEndpoint {
            shared: Arc::clone(&self.shared),
            tx,
        })
    }

    /// Pull the cable. Anything in flight is lost.
    pub fn unplug(&self) {
        debug!("memory link unplugged");
        self.shared.plugged.store(false, Ordering::SeqCst);
        self.shared.queue(Direction::AToB).clear();
        self.shared.queue(Direction::BToA).clear();
    }

    /// Plug the cable back in.
    pub fn replug(&self) {
        debug!("memory link replugged");
        self.shared.plugged.store(true, Ordering::SeqCst);
    }

    pub fn is_plugged(&self) -> bool {
        self.shared.plugged.load(Ordering::SeqCst)
    }

    /// Put raw bytes on the wire, as line noise or a hand-built frame would.
    pub fn inject(&self, direction: Direction, bytes: &[u8]) {
        if self.is_plugged() {
            self.shared.queue(direction).extend_from_slice(bytes);
        }
    }

    /// Bytes waiting to be read in one direction.
    pub fn pending(&self, direction: Direction) -> usize {
        self.shared.queue(direction).len()
    }
}

impl Default for MemoryLink {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryLink")
            .field("plugged", &self.is_plugged())
            .field("a_to_b", &self.pending(Direction::AToB))
            .field("b_to_a", &self.pending(Direction::BToA))
            .finish()
    }
}

/// One end of a [`MemoryLink`].
#[derive(Clone)]
pub(crate) struct MemoryEndpoint {
    shared: Arc<Shared>,
    tx: Direction,
}

impl MemoryEndpoint {
    fn rx(&self) -> Direction {
        match self.tx {
            Direction::AToB => Direction::BToA,
            Direction::BToA => Direction::AToB,
        }
    }
}

impl Read for MemoryEndpoint {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if !self.shared.plugged.load(Ordering::SeqCst) {
            return Err(std::io::Error::from(ErrorKind::WouldBlock));
        }
        let mut queue = self.shared.queue(self.rx());
        if queue.is_empty() {
            return Err(std::io::Error::from(ErrorKind::WouldBlock));
        }
        let n = queue.len().min(buf.len());
        buf[..n].copy_from_slice(&queue[..n]);
        queue.advance(n);
        Ok(n)
    }
}

impl Write for MemoryEndpoint {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if self.shared.plugged.load(Ordering::SeqCst) {
            self.shared.queue(self.tx).extend_from_slice(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
