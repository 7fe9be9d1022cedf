use std::fmt;
use std::io;

use packlink_frame::FrameError;
use packlink_peer::PeerError;
use packlink_prefs::PrefsError;
use packlink_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(USAGE, message)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound => TRANSPORT_ERROR,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Open { source, .. } | TransportError::Io(source) => {
            io_error(context, source)
        }
        TransportError::UnsupportedBaud(_) => CliError::new(USAGE, format!("{context}: {err}")),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::ConnectionClosed => CliError::new(FAILURE, format!("{context}: {err}")),
        FrameError::Backpressure { .. } => CliError::new(TIMEOUT, format!("{context}: {err}")),
        other if other.is_framing() => CliError::new(DATA_INVALID, format!("{context}: {other}")),
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

pub fn peer_error(context: &str, err: PeerError) -> CliError {
    match err {
        PeerError::Transport(err) => transport_error(context, err),
        PeerError::Frame(err) => frame_error(context, err),
        PeerError::Prefs(err) => prefs_error(context, err),
        PeerError::Config(_) => CliError::new(USAGE, format!("{context}: {err}")),
    }
}

pub fn prefs_error(context: &str, err: PrefsError) -> CliError {
    CliError::new(DATA_INVALID, format!("{context}: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_device_is_a_transport_error() {
        let err = transport_error(
            "open failed",
            TransportError::Open {
                path: "/dev/ttyNOPE".into(),
                source: io::Error::from(io::ErrorKind::NotFound),
            },
        );
        assert_eq!(err.code, TRANSPORT_ERROR);
        assert!(err.message.starts_with("open failed: "));
    }

    #[test]
    fn bad_config_is_a_usage_error() {
        let err = peer_error("config", PeerError::Config("heartbeat".into()));
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn wire_faults_are_invalid_data() {
        let err = frame_error("decode", FrameError::NullId);
        assert_eq!(err.code, DATA_INVALID);
    }

    #[test]
    fn stalled_device_is_a_timeout() {
        let err = frame_error("send failed", FrameError::Backpressure { queued: 256 });
        assert_eq!(err.code, TIMEOUT);
    }
}
