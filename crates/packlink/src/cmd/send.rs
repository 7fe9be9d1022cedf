use std::io::Write;
use std::thread;
use std::time::{Duration, Instant};

use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use packlink_frame::{CommandRecord, FrameWriter, WireRecord, HEADER_SIZE};
use packlink_peer::NodeConfig;
use serde::Serialize;
use tracing::info;

use crate::cmd::{open_device, SendArgs};
use crate::exit::{frame_error, CliError, CliResult, SUCCESS, TIMEOUT};
use crate::output::OutputFormat;
use crate::route::Route;

/// How long the device gets to take the frame.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(1);
const DRAIN_POLL: Duration = Duration::from_millis(5);

#[derive(Debug, Serialize)]
struct SentCommand {
    route: String,
    name: Option<&'static str>,
    id: u8,
    arg: u16,
    bytes: usize,
}

pub fn run(args: SendArgs, format: OutputFormat, config: &NodeConfig) -> CliResult<i32> {
    let route = Route::new(args.from, args.to)?;
    let id = route.parse_command(&args.command)?;
    let baud = args.baud.unwrap_or(config.baud);
    let stream = open_device(&args.device, baud)?;
    let mut writer = FrameWriter::new(stream);

    let sent = send_command(&mut writer, route, id, args.arg, DRAIN_TIMEOUT)?;
    info!(device = %args.device.display(), %route, id, arg = args.arg, "command sent");
    print_sent(&sent, format);
    Ok(SUCCESS)
}

/// Write one command and wait, at most `timeout`, for the device to take all of it.
fn send_command<W: Write>(
    writer: &mut FrameWriter<W>,
    route: Route,
    id: u8,
    arg: u16,
    timeout: Duration,
) -> CliResult<SentCommand> {
    let record = CommandRecord::new(route.from.sentinels(), id, arg);
    writer
        .send_record(&record)
        .map_err(|err| frame_error("send failed", err))?;

    let started = Instant::now();
    while writer.queued() > 0 {
        if started.elapsed() >= timeout {
            return Err(CliError::new(
                TIMEOUT,
                format!(
                    "device did not take the frame within {} ms ({} bytes left)",
                    timeout.as_millis(),
                    writer.queued()
                ),
            ));
        }
        thread::sleep(DRAIN_POLL);
        writer
            .drain()
            .map_err(|err| frame_error("send failed", err))?;
    }
    Ok(SentCommand {
        route: route.to_string(),
        name: route.command_name(id),
        id,
        arg,
        bytes: HEADER_SIZE + CommandRecord::WIRE_SIZE,
    })
}

fn print_sent(sent: &SentCommand, format: OutputFormat) {
    let name = sent.name.unwrap_or("?");
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string(sent).unwrap_or_else(|_| "{}".to_string())
        ),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ROUTE", "COMMAND", "ID", "ARG", "BYTES"])
                .add_row(vec![
                    sent.route.clone(),
                    name.to_string(),
                    sent.id.to_string(),
                    sent.arg.to_string(),
                    sent.bytes.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!(
            "sent {name} ({}) arg={} on {} ({} bytes)",
            sent.id, sent.arg, sent.route, sent.bytes
        ),
    }
}

#[cfg(test)]
mod tests {
    use packlink_frame::{decode_command, split_link, FrameConfig};
    use packlink_peer::{PackToAttenuator, Role};
    use packlink_transport::MemoryLink;

    use super::*;

    #[test]
    fn frame_carries_the_sender_sentinels() {
        let cable = MemoryLink::new();
        let (pack_end, attenuator_end) = cable.ends();
        let mut writer = FrameWriter::new(pack_end);
        let route = Route::new(Role::Pack, Some(Role::Attenuator)).expect("route");
        let id = route
            .parse_command("A_VOLUME_SYNC")
            .expect("command should parse");

        let sent = send_command(&mut writer, route, id, 7, DRAIN_TIMEOUT)
            .expect("send should succeed");
        assert_eq!(sent.name, Some("A_VOLUME_SYNC"));
        assert_eq!(sent.bytes, 8);

        let (mut reader, _) =
            split_link(attenuator_end, FrameConfig::default()).expect("memory link should split");
        let frame = reader
            .poll_frame()
            .expect("read should succeed")
            .expect("a frame should be waiting");
        let record = decode_command(&frame, Role::Pack.sentinels()).expect("record should decode");
        assert_eq!(record.command_id, PackToAttenuator::VolumeSync.id());
        assert_eq!(record.arg, 7);
    }

    #[test]
    fn device_that_never_reads_times_out() {
        let mut writer = FrameWriter::new(NeverReady);
        let route = Route::new(Role::Wand, None).expect("route");
        let err = send_command(&mut writer, route, 5, 0, Duration::from_millis(20))
            .expect_err("a stalled device should time out");
        assert_eq!(err.code, TIMEOUT);
        assert!(err.message.contains("8 bytes left"));
    }

    struct NeverReady;

    impl Write for NeverReady {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(std::io::ErrorKind::WouldBlock))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
