use std::fmt;
use std::path::Path;

use clap::ValueEnum;
use packlink_peer::{
    AttenuatorNode, Capabilities, Clock, CueLog, Hub, LinkReport, ManualClock, MirrorSnapshot,
    NodeConfig, PreferenceKind, Role, WandNode,
};
use packlink_prefs::{JsonFileStore, StreamMode};
use packlink_transport::MemoryLink;
use serde::Serialize;
use tracing::{debug, info};

use crate::cmd::SimulateArgs;
use crate::exit::{peer_error, CliResult, SUCCESS};
use crate::logging::node_span;
use crate::output::{print_simulation, OutputFormat};

/// Simulated time between polls.
const STEP_MS: u64 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// Power everything up and let both links sync.
    Boot,
    /// Wand on, barrel out, a burst of firing, then a vent.
    Firing,
    /// Pull the wand cable mid-fire and wait out the keepalive.
    Unplug,
    /// Edit pack preferences from the attenuator and save them.
    Prefs,
}

impl Scenario {
    pub fn name(self) -> &'static str {
        match self {
            Scenario::Boot => "boot",
            Scenario::Firing => "firing",
            Scenario::Unplug => "unplug",
            Scenario::Prefs => "prefs",
        }
    }

    /// Scripted inputs, by simulated time.
    fn script(self) -> &'static [(u64, Event)] {
        match self {
            Scenario::Boot => &[],
            Scenario::Firing => &[
                (500, Event::WandOn),
                (550, Event::BarrelExtended),
                (600, Event::PowerLevel(4)),
                (650, Event::Stream(StreamMode::Stasis)),
                (700, Event::Trigger(true)),
                (2_700, Event::Trigger(false)),
                (3_000, Event::Vent),
                (4_500, Event::VentDone),
            ],
            Scenario::Unplug => &[
                (500, Event::WandOn),
                (700, Event::Trigger(true)),
                (1_000, Event::UnplugWand),
            ],
            Scenario::Prefs => &[
                (500, Event::Request(PreferenceKind::Pack)),
                (800, Event::EditPackVolume(50)),
                (850, Event::Push(PreferenceKind::Pack)),
                (900, Event::Save(PreferenceKind::Pack)),
                (1_200, Event::Request(PreferenceKind::Wand)),
            ],
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug)]
enum Event {
    WandOn,
    BarrelExtended,
    PowerLevel(u8),
    Stream(StreamMode),
    Trigger(bool),
    Vent,
    VentDone,
    UnplugWand,
    Request(PreferenceKind),
    EditPackVolume(u8),
    Push(PreferenceKind),
    Save(PreferenceKind),
}

/// Final state of one node.
#[derive(Debug, Serialize)]
pub struct NodeReport {
    pub role: Role,
    pub mirror: MirrorSnapshot,
    pub links: Vec<LinkReport>,
    /// Sound and lighting cues the node played.
    pub cues: usize,
}

#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub scenario: Scenario,
    pub elapsed_ms: u64,
    pub nodes: Vec<NodeReport>,
}

pub fn run(args: SimulateArgs, format: OutputFormat, config: &NodeConfig) -> CliResult<i32> {
    let mut sim = Simulation::new(config, args.prefs.as_deref())?;
    info!(
        scenario = %args.scenario,
        duration_ms = args.duration_ms,
        prefs = ?args.prefs,
        "simulating"
    );
    let report = sim.run(args.scenario, args.duration_ms);
    print_simulation(&report, format);
    Ok(SUCCESS)
}

/// Three nodes on memory cables, driven by a manual clock.
struct Simulation {
    clock: ManualClock,
    hub: Hub,
    wand: WandNode,
    attenuator: AttenuatorNode,
    wand_cable: MemoryLink,
    wand_powered: bool,
    cues: [CueLog; 3],
}

impl Simulation {
    /// With `prefs`, the pack and wand load from and save to that JSON file;
    /// otherwise each starts from defaults in memory.
    fn new(config: &NodeConfig, prefs: Option<&Path>) -> CliResult<Self> {
        let wand_cable = MemoryLink::new();
        let attenuator_cable = MemoryLink::new();
        let (hub_wand, wand_end) = wand_cable.ends();
        let (hub_attenuator, attenuator_end) = attenuator_cable.ends();
        let cues = [CueLog::new(), CueLog::new(), CueLog::new()];
        let caps = |log: &CueLog| match prefs {
            Some(path) => {
                Capabilities::recording(log).with_store(Box::new(JsonFileStore::new(path)))
            }
            None => Capabilities::recording(log),
        };

        let hub = Hub::new(hub_wand, hub_attenuator, config, caps(&cues[0]))
            .map_err(|err| peer_error("pack setup failed", err))?;
        let wand = WandNode::new(wand_end, config.wand_link, caps(&cues[1]))
            .map_err(|err| peer_error("wand setup failed", err))?;
        let attenuator = AttenuatorNode::new(
            attenuator_end,
            config.attenuator_link,
            Capabilities::recording(&cues[2]),
        )
        .map_err(|err| peer_error("attenuator setup failed", err))?;

        Ok(Self {
            clock: ManualClock::new(0),
            hub,
            wand,
            attenuator,
            wand_cable,
            wand_powered: true,
            cues,
        })
    }

    fn run(&mut self, scenario: Scenario, duration_ms: u64) -> SimulationReport {
        let mut script = scenario.script().iter().peekable();
        self.poll();
        while self.clock.now_ms() < duration_ms {
            let now = self.clock.advance(STEP_MS);
            while let Some((_, event)) = script.next_if(|(at, _)| *at <= now) {
                self.apply(now, *event);
            }
            self.poll();
        }
        self.report(scenario)
    }

    fn poll(&mut self) {
        let now = self.clock.now_ms();
        if self.wand_powered {
            let _node = node_span(Role::Wand).entered();
            self.wand.poll(now);
        }
        node_span(Role::Pack).in_scope(|| self.hub.poll(now));
        node_span(Role::Attenuator).in_scope(|| self.attenuator.poll(now));
    }

    fn apply(&mut self, now: u64, event: Event) {
        debug!(now_ms = now, ?event, "scripted event");
        match event {
            Event::WandOn => self.wand.power_on(now),
            Event::BarrelExtended => self.wand.set_barrel_extended(now, true),
            Event::PowerLevel(level) => self.wand.set_power_level(now, level),
            Event::Stream(mode) => self.wand.set_stream_mode(now, mode),
            Event::Trigger(firing) => self.wand.set_firing(now, firing),
            Event::Vent => self.wand.vent(now),
            Event::VentDone => self.hub.finish_venting(now),
            Event::UnplugWand => {
                self.wand_powered = false;
                self.wand_cable.unplug();
            }
            Event::Request(kind) => self.attenuator.request_preferences(now, kind),
            Event::EditPackVolume(percent) => {
                self.attenuator.state_mut().pack.default_volume_percent = percent;
            }
            Event::Push(kind) => self.attenuator.push_preferences(now, kind),
            Event::Save(kind) => self.attenuator.save_preferences(now, kind),
        }
    }

    fn report(&self, scenario: Scenario) -> SimulationReport {
        let nodes = vec![
            NodeReport {
                role: Role::Pack,
                mirror: self.hub.mirror().snapshot(),
                links: vec![self.hub.wand_link(), self.hub.attenuator_link()],
                cues: self.cues[0].entries().len(),
            },
            NodeReport {
                role: Role::Wand,
                mirror: self.wand.mirror().snapshot(),
                links: vec![self.wand.pack_link()],
                cues: self.cues[1].entries().len(),
            },
            NodeReport {
                role: Role::Attenuator,
                mirror: self.attenuator.mirror().snapshot(),
                links: vec![self.attenuator.pack_link()],
                cues: self.cues[2].entries().len(),
            },
        ];
        SimulationReport {
            scenario,
            elapsed_ms: self.clock.now_ms(),
            nodes,
        }
    }
}

#[cfg(test)]
mod tests {
    use packlink_peer::LinkState;

    use super::*;

    fn simulate(scenario: Scenario, duration_ms: u64) -> (Simulation, SimulationReport) {
        let mut sim =
            Simulation::new(&NodeConfig::default(), None).expect("simulation should build");
        let report = sim.run(scenario, duration_ms);
        (sim, report)
    }

    #[test]
    fn boot_connects_every_link() {
        let (_, report) = simulate(Scenario::Boot, 1_000);
        assert_eq!(report.elapsed_ms, 1_000);
        for node in &report.nodes {
            for link in &node.links {
                assert_eq!(link.state, LinkState::Connected, "{} link", node.role);
            }
        }
        let pack = &report.nodes[0].mirror;
        assert!(pack.wand_connected && pack.attenuator_connected);
    }

    #[test]
    fn firing_reaches_the_attenuator() {
        let (_, report) = simulate(Scenario::Firing, 1_000);
        let attenuator = &report.nodes[2].mirror;
        assert!(attenuator.wand_on);
        assert!(attenuator.wand_firing);
        assert!(attenuator.barrel_extended);
        assert_eq!(attenuator.stream_mode, StreamMode::Stasis);
    }

    #[test]
    fn unplugged_wand_is_dropped_after_keepalive() {
        let (_, report) = simulate(Scenario::Unplug, 10_000);
        let pack = &report.nodes[0];
        assert!(!pack.mirror.wand_connected);
        assert!(!pack.mirror.wand_firing);
        assert_eq!(pack.links[0].state, LinkState::Disconnected);
        assert_eq!(pack.links[0].stats.timeouts, 1);
        assert_eq!(pack.links[1].state, LinkState::Connected);
    }

    #[test]
    fn edited_preferences_land_on_the_pack() {
        let (sim, _) = simulate(Scenario::Prefs, 2_000);
        assert_eq!(sim.hub.state().pack.default_volume_percent, 50);
        assert_eq!(sim.attenuator.state().wand, sim.wand.state().wand);
    }

    #[test]
    fn saved_preferences_survive_a_restart() {
        let path = std::env::temp_dir()
            .join(format!("packlink-sim-prefs-{}.json", std::process::id()));
        let _ = std::fs::remove_file(&path);
        let config = NodeConfig::default();

        let mut first = Simulation::new(&config, Some(&path)).expect("simulation should build");
        first.run(Scenario::Prefs, 2_000);
        let saved: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).expect("prefs file should exist"))
                .expect("prefs file should be JSON");
        assert_eq!(saved["pack"]["default_system_volume"], 50);

        let second = Simulation::new(&config, Some(&path)).expect("simulation should build");
        let _ = std::fs::remove_file(&path);
        assert_eq!(second.hub.state().pack.default_volume_percent, 50);
        assert_eq!(second.hub.state().live.volume.master, 50);
    }

    #[test]
    fn report_serializes_with_snake_case_names() {
        let (_, report) = simulate(Scenario::Boot, 100);
        let json = serde_json::to_value(&report).expect("report should serialize");
        assert_eq!(json["scenario"], "boot");
        assert_eq!(json["nodes"][1]["role"], "wand");
        assert_eq!(json["nodes"][0]["links"][0]["state"], "connected");
    }
}
