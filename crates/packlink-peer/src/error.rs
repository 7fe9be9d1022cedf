/// Errors that can occur while building or configuring a node.
///
/// Protocol conditions on a running link never surface here; they are
/// counted in [`LinkStats`](crate::LinkStats) instead.
#[derive(Debug, thiserror::Error)]
pub enum PeerError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] packlink_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] packlink_frame::FrameError),

    /// Preference store error.
    #[error("preference error: {0}")]
    Prefs(#[from] packlink_prefs::PrefsError),

    /// Invalid node or session configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PeerError>;
