//! Stderr logging for the CLI.
//!
//! `--log-level` applies to the packlink crates only; dependencies stay at
//! `warn`. `PACKLINK_LOG` takes full `EnvFilter` directives and wins over the
//! flag, e.g. `PACKLINK_LOG=packlink_peer::session=trace`.

use clap::ValueEnum;
use packlink_peer::Role;
use tracing::level_filters::LevelFilter;
use tracing::{info_span, Span};
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "PACKLINK_LOG";

const CRATES: [&str; 5] = [
    "packlink",
    "packlink_peer",
    "packlink_frame",
    "packlink_prefs",
    "packlink_transport",
];

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Directives for `level` on our crates, `warn` elsewhere.
fn directives(level: LevelFilter) -> String {
    let level = level.to_string().to_ascii_lowercase();
    let mut out = String::from("warn");
    for name in CRATES {
        out.push_str(&format!(",{name}={level}"));
    }
    out
}

/// The directives in force: a valid, non-empty `env`, otherwise `level`.
fn active_directives(level: LevelFilter, env: Option<&str>) -> String {
    if let Some(filter) = env.map(str::trim).filter(|filter| !filter.is_empty()) {
        match EnvFilter::try_new(filter) {
            Ok(_) => return filter.to_string(),
            Err(err) => eprintln!("warning: ignoring {LOG_ENV}={filter:?}: {err}"),
        }
    }
    directives(level)
}

pub fn init_logging(format: LogFormat, level: LevelFilter) {
    let env = std::env::var(LOG_ENV).ok();
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::new(active_directives(level, env.as_deref())))
        .with_ansi(false)
        .with_target(true);

    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().with_current_span(true).try_init(),
    };
}

/// Span tagging every event with the node that raised it.
///
/// The simulator runs three nodes in one process; without it their session
/// logs are indistinguishable.
pub fn node_span(role: Role) -> Span {
    info_span!("node", role = role.name())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_applies_to_our_crates_only() {
        let filter = directives(LevelFilter::DEBUG);
        assert!(filter.starts_with("warn,"));
        for name in CRATES {
            assert!(filter.contains(&format!("{name}=debug")), "{filter}");
        }
    }

    #[test]
    fn env_directives_override_the_flag() {
        let filter = active_directives(LevelFilter::ERROR, Some("packlink_peer::session=trace"));
        assert_eq!(filter, "packlink_peer::session=trace");
    }

    #[test]
    fn bad_env_directives_fall_back_to_the_flag() {
        let filter = active_directives(LevelFilter::INFO, Some("packlink_peer=loud"));
        assert!(filter.contains("packlink_peer=info"), "{filter}");

        let filter = active_directives(LevelFilter::INFO, Some("  "));
        assert!(filter.contains("packlink_frame=info"), "{filter}");
    }
}
