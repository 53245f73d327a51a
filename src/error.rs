use std::path::PathBuf;

/// Result type for trace extraction operations
pub type Result<T> = std::result::Result<T, TraceError>;

/// Error types raised while probing, rendering or writing traces
#[derive(thiserror::Error, Debug)]
pub enum TraceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("ffprobe exited with {status} for {path}")]
    ProbeFailed { path: PathBuf, status: String },

    #[error("Malformed ffprobe output: {0}")]
    MalformedProbeOutput(String),

    #[error("No frames to convert")]
    EmptyRecordSet,

    #[error("Frame {index} has an invalid timestamp: {value}")]
    InvalidTimestamp { index: u64, value: f64 },

    #[error("Output file already exists: {0}")]
    OutputExists(PathBuf),
}
