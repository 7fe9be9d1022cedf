#![allow(dead_code)]

use packlink_frame::{
    decode_command, split_link, CommandRecord, Frame, FrameConfig, FrameReader, FrameWriter,
    WireRecord,
};
use packlink_peer::{
    AttenuatorNode, Capabilities, Clock, CommandSet, CueLog, Hub, LinkState, ManualClock, NodeConfig,
    Role, SessionConfig, WandNode,
};
use packlink_transport::{LinkStream, MemoryLink};

/// Poll step used by the rig, in milliseconds.
pub const STEP_MS: u64 = 10;

/// A hub and both peripherals wired over memory cables, on a manual clock.
pub struct Rig {
    pub clock: ManualClock,
    pub hub: Hub,
    pub wand: WandNode,
    pub attenuator: AttenuatorNode,
    pub wand_cable: MemoryLink,
    pub attenuator_cable: MemoryLink,
    pub hub_cues: CueLog,
    /// Stop polling the wand, as if it were switched off.
    pub wand_powered: bool,
}

impl Rig {
    pub fn new() -> Self {
        let wand_cable = MemoryLink::new();
        let attenuator_cable = MemoryLink::new();
        let (hub_wand, wand_end) = wand_cable.ends();
        let (hub_attenuator, attenuator_end) = attenuator_cable.ends();

        let hub_cues = CueLog::new();
        let hub = Hub::new(
            hub_wand,
            hub_attenuator,
            &NodeConfig::default(),
            Capabilities::recording(&hub_cues),
        )
        .expect("hub should build");
        let wand = WandNode::new(wand_end, SessionConfig::default(), Capabilities::null())
            .expect("wand should build");
        let attenuator = AttenuatorNode::new(
            attenuator_end,
            SessionConfig::default(),
            Capabilities::null(),
        )
        .expect("attenuator should build");

        Self {
            clock: ManualClock::new(0),
            hub,
            wand,
            attenuator,
            wand_cable,
            attenuator_cable,
            hub_cues,
            wand_powered: true,
        }
    }

    pub fn now(&self) -> u64 {
        self.clock.now_ms()
    }

    /// One scheduling round at the current time.
    pub fn poll(&mut self) {
        let now = self.now();
        if self.wand_powered {
            self.wand.poll(now);
        }
        self.hub.poll(now);
        self.attenuator.poll(now);
    }

    /// Advance time in fixed steps, polling everything after each step.
    pub fn run_for(&mut self, ms: u64) {
        let mut elapsed = 0;
        while elapsed < ms {
            self.clock.advance(STEP_MS);
            elapsed += STEP_MS;
            self.poll();
        }
    }

    /// Boot everything and wait until both links are up.
    pub fn connected() -> Self {
        let mut rig = Self::new();
        rig.poll();
        rig.run_for(100);
        assert_eq!(rig.hub.wand_link().state, LinkState::Connected);
        assert_eq!(rig.hub.attenuator_link().state, LinkState::Connected);
        rig
    }

    /// Replace the wand with a fresh unit on the same cable.
    pub fn swap_wand(&mut self) {
        let (_, wand_end) = self.wand_cable.ends();
        self.wand = WandNode::new(wand_end, SessionConfig::default(), Capabilities::null())
            .expect("replacement wand should build");
        self.wand_powered = true;
    }
}

/// A hand-driven end of a cable, for scripting one side of a link.
pub struct RawPeer {
    pub role: Role,
    pub reader: FrameReader<LinkStream>,
    pub writer: FrameWriter<LinkStream>,
}

impl RawPeer {
    pub fn new(role: Role, stream: LinkStream) -> Self {
        let (reader, writer) =
            split_link(stream, FrameConfig::default()).expect("memory link should split");
        Self {
            role,
            reader,
            writer,
        }
    }

    pub fn command<C: CommandSet>(&mut self, command: C, arg: u16) {
        let record = CommandRecord::new(self.role.sentinels(), command.id(), arg);
        self.writer
            .send_record(&record)
            .expect("raw command should send");
    }

    pub fn record<R: WireRecord>(&mut self, record: &R) {
        self.writer
            .send_record(record)
            .expect("raw record should send");
    }

    pub fn frames(&mut self) -> Vec<Frame> {
        let mut frames = Vec::new();
        while let Some(frame) = self.reader.poll_frame().expect("raw read should succeed") {
            frames.push(frame);
        }
        frames
    }

    /// Ids of every command received from `from`, in order.
    pub fn command_ids(&mut self, from: Role) -> Vec<u8> {
        self.frames()
            .iter()
            .filter_map(|frame| decode_command(frame, from.sentinels()).ok())
            .map(|record| record.command_id)
            .collect()
    }
}
