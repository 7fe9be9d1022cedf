//! Role dispatchers: what each node does with a validated, admitted message.
//!
//! Dispatchers never touch a link. They mutate the node's
//! [`NodeRuntimeState`], publish to the [`MirrorWriter`], call out through
//! [`Capabilities`] and queue replies in an [`Outbox`] addressed by peer role.
//! The owning node flushes the outbox through its links afterwards.

pub mod attenuator;
pub mod pack;
pub mod relay;
pub mod wand;

use packlink_frame::{Frame, WireRecord};

use crate::capability::Capabilities;
use crate::command::CommandSet;
use crate::mirror::MirrorWriter;
use crate::role::Role;
use crate::runtime::NodeRuntimeState;

/// One message waiting to go out on a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Command {
        name: &'static str,
        id: u8,
        arg: u16,
        handshake: bool,
    },
    Data {
        name: &'static str,
        id: u8,
        data: [u8; 3],
    },
    Snapshot(Frame),
}

impl Outbound {
    pub fn command<C: CommandSet>(command: C, arg: u16) -> Self {
        Outbound::Command {
            name: command.name(),
            id: command.id(),
            arg,
            handshake: command.is_handshake(),
        }
    }

    pub fn data<C: CommandSet>(message: C, data: [u8; 3]) -> Self {
        Outbound::Data {
            name: message.name(),
            id: message.id(),
            data,
        }
    }

    pub fn record<R: WireRecord>(record: &R) -> Self {
        Outbound::Snapshot(record.to_frame())
    }

    /// Handshake commands go out even on a disconnected link.
    pub fn is_handshake(&self) -> bool {
        matches!(
            self,
            Outbound::Command {
                handshake: true,
                ..
            }
        )
    }
}

/// Messages queued by a dispatcher, in the order they were produced.
#[derive(Debug, Default)]
pub struct Outbox {
    queue: Vec<(Role, Outbound)>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, to: Role, message: Outbound) {
        self.queue.push((to, message));
    }

    pub fn command<C: CommandSet>(&mut self, to: Role, command: C, arg: u16) {
        self.push(to, Outbound::command(command, arg));
    }

    pub fn data<C: CommandSet>(&mut self, to: Role, message: C, data: [u8; 3]) {
        self.push(to, Outbound::data(message, data));
    }

    pub fn record<R: WireRecord>(&mut self, to: Role, record: &R) {
        self.push(to, Outbound::record(record));
    }

    /// Remove and return everything addressed to `peer`, oldest first.
    pub fn take_for(&mut self, peer: Role) -> Vec<Outbound> {
        let (taken, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.queue)
            .into_iter()
            .partition(|(to, _)| *to == peer);
        self.queue = kept;
        taken.into_iter().map(|(_, message)| message).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Role, Outbound)> {
        self.queue.iter()
    }
}

/// Which peers the node currently has a connected link to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Peers {
    pub pack: bool,
    pub wand: bool,
    pub attenuator: bool,
}

impl Peers {
    pub fn is_connected(self, role: Role) -> bool {
        match role {
            Role::Pack => self.pack,
            Role::Wand => self.wand,
            Role::Attenuator => self.attenuator,
        }
    }
}

/// Everything a dispatcher may touch while handling one message.
pub struct DispatchContext<'a> {
    pub now_ms: u64,
    pub state: &'a mut NodeRuntimeState,
    pub mirror: &'a mut MirrorWriter,
    pub caps: &'a mut Capabilities,
    pub out: &'a mut Outbox,
    pub peers: Peers,
}

impl<'a> DispatchContext<'a> {
    pub fn new(
        now_ms: u64,
        state: &'a mut NodeRuntimeState,
        mirror: &'a mut MirrorWriter,
        caps: &'a mut Capabilities,
        out: &'a mut Outbox,
        peers: Peers,
    ) -> Self {
        Self {
            now_ms,
            state,
            mirror,
            caps,
            out,
            peers,
        }
    }
}
