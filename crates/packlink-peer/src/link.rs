//! One physical peer: a framed stream plus its session.
//!
//! [`Link`] validates everything that arrives (sentinels, ids, snapshot
//! sizes), feeds handshake commands to the [`PeerLink`] and hands admitted
//! domain messages back to the node. Nothing here returns an error once the
//! link exists; faults are counted in [`LinkStats`] and logged.

use packlink_frame::{
    decode_command, decode_data, split_link, CommandRecord, DataRecord, Frame, FrameError,
    FrameReader, FrameWriter, PacketType, Sentinels,
};
use packlink_prefs::Snapshot;
use packlink_transport::LinkStream;
use tracing::{debug, info, trace, warn};

use crate::command::CommandSet;
use crate::config::SessionConfig;
use crate::dispatch::Outbound;
use crate::error::Result;
use crate::role::Role;
use crate::session::{LinkState, LinkStats, MessageClass, PeerLink, SessionAction, SyncRole};

/// An admitted message from the peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound<C> {
    /// A handshake command was fed to the session; act on these.
    Session(Vec<SessionAction>),
    Command { command: C, arg: u16 },
    Data { message: C, data: [u8; 3] },
    Snapshot(Snapshot),
}

/// A framed stream to one peer and the session tracking it.
pub struct Link {
    session: PeerLink,
    reader: FrameReader<LinkStream>,
    writer: FrameWriter<LinkStream>,
    local_sentinels: Sentinels,
    peer_sentinels: Sentinels,
    closed: bool,
}

impl Link {
    pub fn new(
        local: Role,
        peer: Role,
        sync_role: SyncRole,
        stream: LinkStream,
        config: SessionConfig,
    ) -> Result<Self> {
        config.validate()?;
        debug!(%local, %peer, stream = stream.kind(), "opening peer link");
        let (reader, writer) = split_link(stream, config.frame_config())?;
        Ok(Self {
            session: PeerLink::new(local, peer, sync_role, config),
            reader,
            writer,
            local_sentinels: local.sentinels(),
            peer_sentinels: peer.sentinels(),
            closed: false,
        })
    }

    pub fn session(&self) -> &PeerLink {
        &self.session
    }

    pub fn state(&self) -> LinkState {
        self.session.state()
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    pub fn peer(&self) -> Role {
        self.session.peer()
    }

    pub fn stats(&self) -> LinkStats {
        *self.session.stats()
    }

    /// Push out anything a slow peer left queued, then run the session timers.
    pub fn poll_timers(&mut self, now_ms: u64) -> Vec<SessionAction> {
        if let Err(err) = self.writer.drain() {
            self.write_failed(&err);
        }
        self.session.poll(now_ms)
    }

    /// Next complete frame, if any. Read errors are counted and end the drain.
    pub fn next_frame(&mut self) -> Option<Frame> {
        let result = self.reader.poll_frame();
        self.session.stats_mut().framing_discards = self.reader.stats().discarded_bytes;
        match result {
            Ok(Some(frame)) => {
                self.session.stats_mut().frames += 1;
                Some(frame)
            }
            Ok(None) => None,
            Err(FrameError::ConnectionClosed) => {
                if !self.closed {
                    self.closed = true;
                    info!(
                        local = %self.session.local(),
                        peer = %self.session.peer(),
                        "link stream closed"
                    );
                }
                None
            }
            Err(err) => {
                self.session.stats_mut().io_errors += 1;
                warn!(
                    local = %self.session.local(),
                    peer = %self.session.peer(),
                    error = %err,
                    "link read failed"
                );
                None
            }
        }
    }

    /// Validate `frame`, run the session gate and decode it for the caller.
    ///
    /// `None` means the frame was rejected or dropped; the reason is counted.
    pub fn receive<C: CommandSet>(&mut self, now_ms: u64, frame: &Frame) -> Option<Inbound<C>> {
        match frame.packet_type {
            PacketType::Command => {
                let record = self.check(decode_command(frame, self.peer_sentinels))?;
                self.session.note_activity(now_ms);
                let command = self.lookup::<C>(record.command_id)?;
                if let Some(control) = command.control() {
                    trace!(peer = %self.session.peer(), command = command.name(), "handshake");
                    return Some(Inbound::Session(self.session.on_control(now_ms, control)));
                }
                self.admit(command.class(), command.name())?;
                Some(Inbound::Command {
                    command,
                    arg: record.arg,
                })
            }
            PacketType::Data => {
                let record = self.check(decode_data(frame, self.peer_sentinels))?;
                self.session.note_activity(now_ms);
                let message = self.lookup::<C>(record.message_id)?;
                self.admit(MessageClass::Domain, message.name())?;
                Some(Inbound::Data {
                    message,
                    data: record.data,
                })
            }
            packet_type => {
                let snapshot = match Snapshot::from_frame(frame) {
                    Ok(Some(snapshot)) => snapshot,
                    Ok(None) => return None,
                    Err(err) => {
                        self.session.stats_mut().malformed += 1;
                        debug!(peer = %self.session.peer(), error = %err, "malformed snapshot");
                        return None;
                    }
                };
                self.session.note_activity(now_ms);
                let class = if packet_type == PacketType::Sync {
                    MessageClass::SyncPayload
                } else {
                    MessageClass::Domain
                };
                self.admit(class, packet_type.name())?;
                Some(Inbound::Snapshot(snapshot))
            }
        }
    }

    /// Send one message. Anything but a handshake is held back while disconnected.
    pub fn send(&mut self, message: &Outbound) {
        if !message.is_handshake() && self.session.state() == LinkState::Disconnected {
            debug!(
                local = %self.session.local(),
                peer = %self.session.peer(),
                ?message,
                "peer not connected; message not sent"
            );
            return;
        }

        let result = match message {
            Outbound::Command { id, arg, .. } => self
                .writer
                .send_record(&CommandRecord::new(self.local_sentinels, *id, *arg)),
            Outbound::Data { id, data, .. } => self
                .writer
                .send_record(&DataRecord::new(self.local_sentinels, *id, *data)),
            Outbound::Snapshot(frame) => self.writer.write_frame(frame),
        };

        match result {
            Ok(()) => trace!(peer = %self.session.peer(), ?message, "sent"),
            Err(err) => self.write_failed(&err),
        }
    }

    /// Bytes accepted for the peer but not yet taken by the stream.
    pub fn queued(&self) -> usize {
        self.writer.queued()
    }

    // A stalled peer costs the frame, never the poll; the keepalive decides whether it is gone.
    fn write_failed(&mut self, err: &FrameError) {
        self.session.stats_mut().io_errors += 1;
        match err {
            FrameError::Backpressure { queued } => debug!(
                local = %self.session.local(),
                peer = %self.session.peer(),
                queued,
                "peer not reading; frame dropped"
            ),
            _ => warn!(
                local = %self.session.local(),
                peer = %self.session.peer(),
                error = %err,
                "link write failed"
            ),
        }
    }

    pub fn send_command<C: CommandSet>(&mut self, command: C, arg: u16) {
        self.send(&Outbound::command(command, arg));
    }

    /// Drop any partial frame from a peer that has gone away.
    pub fn reset_reader(&mut self) {
        self.reader.reset();
        self.session.stats_mut().framing_discards = self.reader.stats().discarded_bytes;
    }

    fn check<R>(&mut self, decoded: packlink_frame::Result<R>) -> Option<R> {
        match decoded {
            Ok(record) => Some(record),
            Err(err) => {
                let stats = self.session.stats_mut();
                match &err {
                    FrameError::SentinelMismatch { .. } | FrameError::NullId => {
                        stats.sentinel_rejects += 1
                    }
                    _ => stats.malformed += 1,
                }
                debug!(peer = %self.session.peer(), error = %err, "record rejected");
                None
            }
        }
    }

    fn lookup<C: CommandSet>(&mut self, id: u8) -> Option<C> {
        let command = C::from_id(id);
        if command.is_none() {
            self.session.stats_mut().unknown_commands += 1;
            debug!(peer = %self.session.peer(), id, "unknown command id");
        }
        command
    }

    fn admit(&mut self, class: MessageClass, name: &str) -> Option<()> {
        if self.session.admits(class) {
            return Some(());
        }
        self.session.stats_mut().premature_drops += 1;
        debug!(
            peer = %self.session.peer(),
            state = self.session.state().name(),
            message = name,
            "dropping message received before sync"
        );
        None
    }
}

impl std::fmt::Debug for Link {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Link")
            .field("session", &self.session)
            .field("buffered", &self.reader.buffered())
            .finish_non_exhaustive()
    }
}
