use std::io::{Read, Write};

use crate::error::Result;
use crate::memory::MemoryEndpoint;

/// A connected duplex link to one peer. Implements Read + Write.
///
/// All backends are non-blocking: a read with nothing pending fails with
/// `ErrorKind::WouldBlock` rather than waiting on the peer.
pub struct LinkStream {
    inner: LinkStreamInner,
}

enum LinkStreamInner {
    #[cfg(unix)]
    Serial(std::fs::File),
    #[cfg(unix)]
    Socket(std::os::unix::net::UnixStream),
    Memory(MemoryEndpoint),
}

impl Read for LinkStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            #[cfg(unix)]
            LinkStreamInner::Serial(file) => file.read(buf),
            #[cfg(unix)]
            LinkStreamInner::Socket(stream) => stream.read(buf),
            LinkStreamInner::Memory(end) => end.read(buf),
        }
    }
}

impl Write for LinkStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            #[cfg(unix)]
            LinkStreamInner::Serial(file) => file.write(buf),
            #[cfg(unix)]
            LinkStreamInner::Socket(stream) => stream.write(buf),
            LinkStreamInner::Memory(end) => end.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.inner {
            #[cfg(unix)]
            LinkStreamInner::Serial(file) => file.flush(),
            #[cfg(unix)]
            LinkStreamInner::Socket(stream) => stream.flush(),
            LinkStreamInner::Memory(end) => end.flush(),
        }
    }
}

impl LinkStream {
    #[cfg(unix)]
    pub(crate) fn from_serial(file: std::fs::File) -> Self {
        Self {
            inner: LinkStreamInner::Serial(file),
        }
    }

    pub(crate) fn from_memory(end: MemoryEndpoint) -> Self {
        Self {
            inner: LinkStreamInner::Memory(end),
        }
    }

    /// Create a connected pair of non-blocking Unix stream sockets.
    ///
    /// Used to emulate a UART between two processes on a development host.
    #[cfg(unix)]
    pub fn socket_pair() -> Result<(Self, Self)> {
        let (left, right) = std::os::unix::net::UnixStream::pair()?;
        left.set_nonblocking(true)?;
        right.set_nonblocking(true)?;
        Ok((
            Self {
                inner: LinkStreamInner::Socket(left),
            },
            Self {
                inner: LinkStreamInner::Socket(right),
            },
        ))
    }

    /// Try to clone this stream so reading and writing halves can be owned separately.
    pub fn try_clone(&self) -> Result<Self> {
        match &self.inner {
            #[cfg(unix)]
            LinkStreamInner::Serial(file) => Ok(Self::from_serial(file.try_clone()?)),
            #[cfg(unix)]
            LinkStreamInner::Socket(stream) => Ok(Self {
                inner: LinkStreamInner::Socket(stream.try_clone()?),
            }),
            LinkStreamInner::Memory(end) => Ok(Self::from_memory(end.clone())),
        }
    }

    /// Short name of the backend, for logs.
    pub fn kind(&self) -> &'static str {
        match &self.inner {
            #[cfg(unix)]
            LinkStreamInner::Serial(_) => "serial",
            #[cfg(unix)]
            LinkStreamInner::Socket(_) => "socket",
            LinkStreamInner::Memory(_) => "memory",
        }
    }
}

impl std::fmt::Debug for LinkStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkStream")
            .field("type", &self.kind())
            .finish()
    }
}
