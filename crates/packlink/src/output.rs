use std::io::IsTerminal;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use packlink_frame::{decode_command, decode_data, Frame, PacketType};
use packlink_peer::{LinkReport, MirrorSnapshot};
use packlink_prefs::Snapshot;
use serde::Serialize;

use crate::cmd::simulate::SimulationReport;
use crate::route::Route;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// One decoded frame, as printed by `monitor`.
#[derive(Debug, Serialize)]
pub struct FrameOutput {
    pub route: String,
    pub packet_type: &'static str,
    pub size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arg: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<[u8; 3]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<Snapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: String,
}

impl FrameOutput {
    /// Decode `frame` as sent along `route`. Faults are reported, not raised.
    pub fn describe(route: Route, frame: &Frame) -> Self {
        let mut out = Self {
            route: route.to_string(),
            packet_type: frame.packet_type.name(),
            size: frame.payload.len(),
            name: None,
            id: None,
            arg: None,
            data: None,
            snapshot: None,
            error: None,
            timestamp: now_unix_seconds(),
        };
        let sentinels = route.from.sentinels();
        match frame.packet_type {
            PacketType::Command => match decode_command(frame, sentinels) {
                Ok(record) => {
                    out.id = Some(record.command_id);
                    out.name = route.command_name(record.command_id);
                    out.arg = Some(record.arg);
                }
                Err(err) => out.error = Some(err.to_string()),
            },
            PacketType::Data => match decode_data(frame, sentinels) {
                Ok(record) => {
                    out.id = Some(record.message_id);
                    out.name = route.command_name(record.message_id);
                    out.data = Some(record.data);
                }
                Err(err) => out.error = Some(err.to_string()),
            },
            _ => match Snapshot::from_frame(frame) {
                Ok(snapshot) => out.snapshot = snapshot,
                Err(err) => out.error = Some(err.to_string()),
            },
        }
        out
    }

    fn summary(&self) -> String {
        if let Some(err) = &self.error {
            return format!("error: {err}");
        }
        let name = self.name.unwrap_or("?");
        match (self.id, self.arg, self.data, &self.snapshot) {
            (Some(id), Some(arg), _, _) => format!("{name} ({id}) arg={arg}"),
            (Some(id), _, Some(data), _) => format!("{name} ({id}) data={data:?}"),
            (_, _, _, Some(snapshot)) => {
                serde_json::to_string(snapshot).unwrap_or_else(|_| "{}".to_string())
            }
            _ => String::new(),
        }
    }
}

pub fn print_frame(frame: &FrameOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(frame),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ROUTE", "TYPE", "SIZE", "DETAIL"])
                .add_row(vec![
                    frame.route.clone(),
                    frame.packet_type.to_string(),
                    frame.size.to_string(),
                    frame.summary(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "{} type={} size={} {}",
                frame.route,
                frame.packet_type,
                frame.size,
                frame.summary()
            );
        }
    }
}

pub fn print_simulation(report: &SimulationReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(report),
        OutputFormat::Table => {
            println!("scenario {} after {} ms", report.scenario, report.elapsed_ms);
            println!("{}", mirror_table(report));
            println!("{}", link_table(report));
        }
        OutputFormat::Pretty => {
            println!("scenario={} elapsed_ms={}", report.scenario, report.elapsed_ms);
            for node in &report.nodes {
                println!("{}: {}", node.role, mirror_line(&node.mirror));
                for link in &node.links {
                    println!("  {}", link_line(link));
                }
                println!("  cues={}", node.cues);
            }
        }
    }
}

fn mirror_table(report: &SimulationReport) -> Table {
    let mut table = Table::new();
    let mut header = vec!["FIELD".to_string()];
    header.extend(report.nodes.iter().map(|node| node.role.to_string()));
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);

    let rows: [(&str, fn(&MirrorSnapshot) -> String); 14] = [
        ("pack_connected", |m| m.pack_connected.to_string()),
        ("wand_connected", |m| m.wand_connected.to_string()),
        ("attenuator_connected", |m| m.attenuator_connected.to_string()),
        ("pack_on", |m| m.pack_on.to_string()),
        ("wand_on", |m| m.wand_on.to_string()),
        ("wand_firing", |m| m.wand_firing.to_string()),
        ("barrel_extended", |m| m.barrel_extended.to_string()),
        ("overheating", |m| m.overheating.to_string()),
        ("venting", |m| m.venting.to_string()),
        ("alarm", |m| m.alarm.to_string()),
        ("power_level", |m| m.power_level.to_string()),
        ("stream_mode", |m| format!("{:?}", m.stream_mode)),
        ("system_mode", |m| format!("{:?}", m.system_mode)),
        ("system_year", |m| format!("{:?}", m.system_year)),
    ];
    for (field, value) in rows {
        let mut row = vec![field.to_string()];
        row.extend(report.nodes.iter().map(|node| value(&node.mirror)));
        table.add_row(row);
    }
    table
}

fn link_table(report: &SimulationReport) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "NODE", "PEER", "STATE", "FRAMES", "SYNCS", "TIMEOUTS", "RESETS", "DISCARDS",
            "DROPPED",
        ]);
    for node in &report.nodes {
        for link in &node.links {
            table.add_row(vec![
                node.role.to_string(),
                link.peer.to_string(),
                link.state.name().to_string(),
                link.stats.frames.to_string(),
                link.stats.syncs_completed.to_string(),
                link.stats.timeouts.to_string(),
                link.stats.resets.to_string(),
                link.stats.framing_discards.to_string(),
                link.stats.premature_drops.to_string(),
            ]);
        }
    }
    table
}

fn mirror_line(mirror: &MirrorSnapshot) -> String {
    format!(
        "pack={} wand={} attenuator={} pack_on={} wand_on={} firing={} level={} stream={:?} year={:?}",
        mirror.pack_connected,
        mirror.wand_connected,
        mirror.attenuator_connected,
        mirror.pack_on,
        mirror.wand_on,
        mirror.wand_firing,
        mirror.power_level,
        mirror.stream_mode,
        mirror.system_year
    )
}

fn link_line(link: &LinkReport) -> String {
    format!(
        "link to {} {} frames={} syncs={} timeouts={} resets={}",
        link.peer,
        link.state.name(),
        link.stats.frames,
        link.stats.syncs_completed,
        link.stats.timeouts,
        link.stats.resets
    )
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

#[cfg(test)]
mod tests {
    use packlink_frame::{CommandRecord, WireRecord};
    use packlink_peer::{Role, WandToPack};
    use packlink_prefs::LiveState;

    use super::*;

    #[test]
    fn commands_are_named_for_their_route() {
        let route = Route::new(Role::Wand, None).expect("route");
        let record = CommandRecord::new(Role::Wand.sentinels(), WandToPack::SyncNow.id(), 0);
        let out = FrameOutput::describe(route, &record.to_frame());
        assert_eq!(out.name, Some("W_SYNC_NOW"));
        assert_eq!(out.arg, Some(0));
        assert!(out.error.is_none());
    }

    #[test]
    fn foreign_sentinels_are_reported() {
        let route = Route::new(Role::Wand, None).expect("route");
        let record = CommandRecord::new(Role::Pack.sentinels(), 3, 0);
        let out = FrameOutput::describe(route, &record.to_frame());
        assert!(out.error.is_some());
        assert!(out.name.is_none());
    }

    #[test]
    fn sync_snapshots_are_decoded() {
        let route = Route::new(Role::Pack, Some(Role::Wand)).expect("route");
        let sync = LiveState::default().wand_sync();
        let out = FrameOutput::describe(route, &sync.to_frame());
        assert!(matches!(out.snapshot, Some(Snapshot::WandSync(_))));
        assert!(out.summary().contains("power_level"));
    }
}
