mod cmd;
mod exit;
mod logging;
mod output;
mod route;

use std::path::PathBuf;

use clap::Parser;
use packlink_peer::NodeConfig;
use tracing::level_filters::LevelFilter;

use crate::cmd::Command;
use crate::exit::{peer_error, CliResult};
use crate::logging::{init_logging, LogFormat};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "packlink", version, about = "Pack, wand and attenuator link tool")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level for packlink's own events (stderr). PACKLINK_LOG overrides.
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LevelFilter,

    /// Node config file (JSON). Missing keys take defaults.
    #[arg(long, value_name = "FILE", env = "PACKLINK_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

fn load_config(path: Option<&PathBuf>) -> CliResult<NodeConfig> {
    match path {
        Some(path) => NodeConfig::from_json_file(path).map_err(|err| peer_error("config", err)),
        None => Ok(NodeConfig::default()),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result =
        load_config(cli.config.as_ref()).and_then(|config| cmd::run(cli.command, format, &config));

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from([
            "packlink",
            "send",
            "/dev/ttyUSB0",
            "--from",
            "wand",
            "--command",
            "W_SYNC_NOW",
        ])
        .expect("send args should parse");

        let Command::Send(args) = cli.command else {
            panic!("expected send");
        };
        assert_eq!(args.from, packlink_peer::Role::Wand);
        assert_eq!(args.arg, 0);
    }

    #[test]
    fn log_level_accepts_tracing_names() {
        let cli = Cli::try_parse_from(["packlink", "--log-level", "debug", "version"])
            .expect("log level should parse");
        assert_eq!(cli.log_level, LevelFilter::DEBUG);

        let err = Cli::try_parse_from(["packlink", "--log-level", "loud", "version"])
            .expect_err("unknown level should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn rejects_unknown_roles() {
        let err = Cli::try_parse_from([
            "packlink",
            "monitor",
            "/dev/ttyUSB0",
            "--from",
            "trap",
        ])
        .expect_err("unknown role should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn parses_simulate_with_global_format() {
        let cli = Cli::try_parse_from([
            "packlink",
            "simulate",
            "--scenario",
            "unplug",
            "--duration-ms",
            "9000",
            "--format",
            "json",
        ])
        .expect("simulate args should parse");
        assert!(matches!(cli.format, Some(OutputFormat::Json)));
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        assert_eq!(args.scenario, cmd::simulate::Scenario::Unplug);
        assert_eq!(args.duration_ms, 9000);
    }

    #[test]
    fn partial_config_files_take_defaults() {
        let path = std::env::temp_dir().join(format!("packlink-config-{}.json", std::process::id()));
        std::fs::write(&path, br#"{"baud": 19200}"#).expect("config should write");
        let config = load_config(Some(&path)).expect("config should load");
        let _ = std::fs::remove_file(&path);
        assert_eq!(config.baud, 19200);
        assert_eq!(config.wand_link, packlink_peer::SessionConfig::default());
    }

    #[test]
    fn invalid_config_is_a_usage_error() {
        let path =
            std::env::temp_dir().join(format!("packlink-bad-config-{}.json", std::process::id()));
        std::fs::write(&path, br#"{"wand_link": {"heartbeat_interval_ms": 0}}"#)
            .expect("config should write");
        let err = load_config(Some(&path)).expect_err("zero heartbeat should be rejected");
        let _ = std::fs::remove_file(&path);
        assert_eq!(err.code, exit::USAGE);
    }
}
