use std::path::PathBuf;

/// Errors that can occur while opening or driving a link.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the device node.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The device opened but could not be put into raw 8N1 mode.
    #[error("failed to configure {path}: {source}")]
    Configure {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The requested baud rate has no termios equivalent.
    #[error("unsupported baud rate {0}")]
    UnsupportedBaud(u32),

    /// An I/O error occurred on the link stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
