//! Outbound half of a link.
//!
//! Each frame is encoded whole into a backlog, then pushed to the stream as
//! far as it goes without blocking. Bytes the stream refuses stay queued and
//! leave, in order, on the next send or [`FrameWriter::drain`]. A peer that
//! stops reading fills the backlog; from then on new frames are refused with
//! [`FrameError::Backpressure`] and nothing already queued is split.

use std::io::{ErrorKind, Write};

use bytes::{Buf, BytesMut};
use tracing::trace;

use crate::codec::{encode_frame, Frame, FrameConfig, HEADER_SIZE};
use crate::error::{FrameError, Result};
use crate::packet::PacketType;
use crate::record::WireRecord;

/// Counters kept by a [`FrameWriter`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterStats {
    /// Frames accepted into the backlog.
    pub frames: u64,
    /// Frames refused because the backlog was full.
    pub refused: u64,
}

pub struct FrameWriter<T> {
    inner: T,
    backlog: BytesMut,
    config: FrameConfig,
    stats: WriterStats,
}

impl<T: Write> FrameWriter<T> {
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            backlog: BytesMut::with_capacity(config.write_backlog),
            config,
            stats: WriterStats::default(),
        }
    }

    /// Queue a typed record under its own packet type.
    pub fn send_record<R: WireRecord>(&mut self, record: &R) -> Result<()> {
        self.send(R::PACKET_TYPE, &record.to_bytes())
    }

    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.send(frame.packet_type, &frame.payload)
    }

    /// Queue one frame and push out as much of the backlog as the stream takes.
    ///
    /// `Ok(())` means the frame is on the wire or queued whole behind earlier
    /// frames. Never waits on the peer.
    pub fn send(&mut self, packet_type: PacketType, payload: &[u8]) -> Result<()> {
        if payload.len() > self.config.max_payload_size {
            return Err(FrameError::PayloadTooLarge {
                size: payload.len(),
                max: self.config.max_payload_size,
            });
        }

        self.drain()?;
        let queued = self.backlog.len();
        if queued > 0 && queued + HEADER_SIZE + payload.len() > self.config.write_backlog {
            self.stats.refused += 1;
            return Err(FrameError::Backpressure { queued });
        }

        encode_frame(packet_type, payload, &mut self.backlog)?;
        self.stats.frames += 1;
        self.drain()?;
        Ok(())
    }

    /// Write queued bytes until the stream would block.
    ///
    /// Returns the bytes still queued. The stream is flushed once the backlog empties.
    pub fn drain(&mut self) -> Result<usize> {
        if self.backlog.is_empty() {
            return Ok(0);
        }
        while !self.backlog.is_empty() {
            match self.inner.write(&self.backlog) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(written) => self.backlog.advance(written),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => {
                    trace!(queued = self.backlog.len(), "peer not reading; holding backlog");
                    return Ok(self.backlog.len());
                }
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
        match self.inner.flush() {
            Err(err) if !matches!(err.kind(), ErrorKind::Interrupted | ErrorKind::WouldBlock) => {
                Err(FrameError::Io(err))
            }
            _ => Ok(0),
        }
    }

    /// Bytes accepted but not yet taken by the stream.
    pub fn queued(&self) -> usize {
        self.backlog.len()
    }

    pub fn stats(&self) -> WriterStats {
        self.stats
    }
}
