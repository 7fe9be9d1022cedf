use packlink_frame::DEFAULT_MAX_PAYLOAD;
use packlink_peer::{SessionConfig, DEFAULT_BAUD};

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("packlink {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    let session = SessionConfig::default();
    println!("name: packlink");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("PACKLINK_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("serial: {}", cfg!(unix));
    println!("baud: {DEFAULT_BAUD}");
    println!("max_payload: {DEFAULT_MAX_PAYLOAD}");
    println!(
        "timing_ms: retry={} heartbeat={} keepalive={}",
        session.retry_interval_ms, session.heartbeat_interval_ms, session.keepalive_timeout_ms
    );

    Ok(SUCCESS)
}
