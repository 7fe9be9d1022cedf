use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use packlink_frame::FrameReader;
use packlink_peer::{NodeConfig, Role};
use tracing::info;

use crate::cmd::{open_device, MonitorArgs};
use crate::exit::{frame_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_frame, FrameOutput, OutputFormat};
use crate::route::Route;

/// Sleep between empty reads.
const IDLE_POLL: Duration = Duration::from_millis(5);

pub fn run(args: MonitorArgs, format: OutputFormat, config: &NodeConfig) -> CliResult<i32> {
    let route = Route::new(args.from, args.to)?;
    let baud = args.baud.unwrap_or(config.baud);
    let stream = open_device(&args.device, baud)?;
    let frame_config = match route.to {
        Role::Attenuator => config.attenuator_link.frame_config(),
        _ => config.wand_link.frame_config(),
    };
    let mut reader = FrameReader::with_config(stream, frame_config);

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    info!(device = %args.device.display(), baud, %route, "monitoring");
    let printed = watch(&mut reader, route, args.count, &running, |frame| {
        print_frame(frame, format)
    })?;
    info!(
        printed,
        discarded = reader.stats().discarded_bytes,
        "monitor stopped"
    );
    Ok(SUCCESS)
}

/// Print frames until `running` clears or `count` frames have been seen.
///
/// Garbled bytes are skipped by the reader; only a failing stream ends the watch early.
fn watch<R: Read>(
    reader: &mut FrameReader<R>,
    route: Route,
    count: Option<usize>,
    running: &AtomicBool,
    mut emit: impl FnMut(&FrameOutput),
) -> CliResult<usize> {
    let mut printed = 0usize;
    while running.load(Ordering::SeqCst) {
        if count.is_some_and(|count| printed >= count) {
            break;
        }
        match reader.poll_frame() {
            Ok(Some(frame)) => {
                emit(&FrameOutput::describe(route, &frame));
                printed = printed.saturating_add(1);
            }
            Ok(None) => thread::sleep(IDLE_POLL),
            Err(err) => return Err(frame_error("read failed", err)),
        }
    }
    Ok(printed)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}

#[cfg(test)]
mod tests {
    use packlink_frame::{split_link, CommandRecord, FrameConfig};
    use packlink_peer::WandToPack;
    use packlink_prefs::LiveState;
    use packlink_transport::{Direction, MemoryLink};

    use super::*;
    use crate::exit::FAILURE;

    #[test]
    fn stops_after_count_and_skips_noise() {
        let cable = MemoryLink::new();
        let (wand_end, monitor_end) = cable.ends();
        let (_, mut writer) =
            split_link(wand_end, FrameConfig::default()).expect("memory link should split");
        cable.inject(Direction::AToB, &[0xEE, 0xFF]);
        let sync_now = CommandRecord::new(Role::Wand.sentinels(), WandToPack::SyncNow.id(), 0);
        writer.send_record(&sync_now).expect("send should succeed");
        let on = CommandRecord::new(Role::Wand.sentinels(), WandToPack::On.id(), 0);
        writer.send_record(&on).expect("send should succeed");
        writer.send_record(&on).expect("send should succeed");

        let mut reader = FrameReader::new(monitor_end);
        let route = Route::new(Role::Wand, None).expect("route");
        let running = AtomicBool::new(true);
        let mut names = Vec::new();
        let printed = watch(&mut reader, route, Some(2), &running, |frame| {
            names.push(frame.name)
        })
        .expect("watch should succeed");

        assert_eq!(printed, 2);
        assert_eq!(names, vec![Some("W_SYNC_NOW"), Some("W_ON")]);
        assert!(reader.stats().discarded_bytes >= 1);
    }

    #[test]
    fn snapshots_are_decoded_in_place() {
        let cable = MemoryLink::new();
        let (pack_end, monitor_end) = cable.ends();
        let (_, mut writer) =
            split_link(pack_end, FrameConfig::default()).expect("memory link should split");
        writer
            .send_record(&LiveState::default().wand_sync())
            .expect("send should succeed");

        let mut reader = FrameReader::new(monitor_end);
        let route = Route::new(Role::Pack, Some(Role::Wand)).expect("route");
        let running = AtomicBool::new(true);
        let mut kinds = Vec::new();
        watch(&mut reader, route, Some(1), &running, |frame| {
            kinds.push(frame.packet_type)
        })
        .expect("watch should succeed");
        assert_eq!(kinds, vec!["SYNC"]);
    }

    #[test]
    #[cfg(unix)]
    fn closed_stream_ends_the_watch() {
        let (monitor_end, other) =
            packlink_transport::LinkStream::socket_pair().expect("socket pair should open");
        drop(other);
        let mut reader = FrameReader::new(monitor_end);
        let route = Route::new(Role::Attenuator, None).expect("route");
        let running = AtomicBool::new(true);
        let err = watch(&mut reader, route, None, &running, |_| {})
            .expect_err("closed stream should fail");
        assert_eq!(err.code, FAILURE);
    }
}
