use std::path::PathBuf;

/// Errors from the preference store.
#[derive(Debug, thiserror::Error)]
pub enum PrefsError {
    /// Reading or writing the backing file failed.
    #[error("preference store I/O on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The backing file is not valid preference JSON.
    #[error("preference store json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A snapshot payload did not decode.
    #[error("snapshot decode error: {0}")]
    Frame(#[from] packlink_frame::FrameError),
}

pub type Result<T> = std::result::Result<T, PrefsError>;
