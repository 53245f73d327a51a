//! Frame metadata extraction through ffprobe

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tracing::{debug, warn};

use crate::error::{Result, TraceError};

/// One decoded video frame as reported by the probing tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Coded picture number
    pub index: u64,
    /// Picture type (`I`, `P`, `B`, ...)
    pub frame_type: char,
    /// Presentation timestamp in seconds
    pub timestamp: f64,
    /// Packet size in bytes
    pub byte_size: u64,
}

/// Frames of one input file, in the tool's emission order
pub type FrameRecordSet = Vec<FrameRecord>;

/// Source of per-frame metadata
#[async_trait]
pub trait FrameProbe: Send + Sync {
    /// Whether the underlying tool can be launched at all
    async fn is_available(&self) -> bool;

    /// Extract the frames of `path`. Every failure yields an empty set.
    async fn extract(&self, path: &Path) -> FrameRecordSet;
}

/// ffprobe executable manager
#[derive(Debug, Clone)]
pub struct Ffprobe {
    executable: PathBuf,
}

impl Default for Ffprobe {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("ffprobe"),
        }
    }
}

impl Ffprobe {
    /// Use `custom` when it points at an existing file, otherwise look `ffprobe` up in `PATH`
    pub fn new(custom: Option<PathBuf>) -> Self {
        match custom {
            Some(path) if path.exists() => Self { executable: path },
            Some(path) => {
                if !path.as_os_str().is_empty() {
                    warn!("ffprobe path {} does not exist, falling back to PATH", path.display());
                }
                Self::default()
            }
            None => Self::default(),
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    fn probe_args(path: &Path) -> [&OsStr; 6] {
        [
            OsStr::new("-select_streams"),
            OsStr::new("v:0"),
            OsStr::new("-print_format"),
            OsStr::new("json=compact=1"),
            OsStr::new("-show_frames"),
            path.as_os_str(),
        ]
    }

    /// Run ffprobe on `path` and decode its frames
    pub async fn try_extract(&self, path: &Path) -> Result<FrameRecordSet> {
        let output = tokio::process::Command::new(&self.executable)
            .args(Self::probe_args(path))
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .await?;

        if !output.status.success() {
            return Err(TraceError::ProbeFailed {
                path: path.to_path_buf(),
                status: output.status.to_string(),
            });
        }

        parse_frames(&output.stdout)
    }
}

#[async_trait]
impl FrameProbe for Ffprobe {
    async fn is_available(&self) -> bool {
        let status = tokio::process::Command::new(&self.executable)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match status {
            Ok(status) => {
                debug!("{} -version exited with {}", self.executable.display(), status);
                status.success()
            }
            Err(e) => {
                debug!("Cannot launch {}: {}", self.executable.display(), e);
                false
            }
        }
    }

    async fn extract(&self, path: &Path) -> FrameRecordSet {
        match self.try_extract(path).await {
            Ok(frames) => frames,
            Err(e) => {
                debug!("Frame extraction failed for {}: {}", path.display(), e);
                Vec::new()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    frames: Vec<ProbeFrame>,
}

#[derive(Debug, Deserialize)]
struct ProbeFrame {
    coded_picture_number: Option<u64>,
    pict_type: Option<String>,
    pts_time: Option<NumberOrString>,
    pkt_size: Option<NumberOrString>,
}

/// ffprobe prints most numeric fields as JSON strings
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(serde_json::Number),
    String(String),
}

impl NumberOrString {
    fn parse<T: std::str::FromStr>(&self) -> Option<T> {
        match self {
            NumberOrString::Number(n) => n.to_string().parse().ok(),
            NumberOrString::String(s) => s.trim().parse().ok(),
        }
    }
}

/// Decode ffprobe's `-show_frames` JSON output
///
/// Frames without a `coded_picture_number` (newer ffprobe releases no longer
/// print it) are numbered by their position in the output. A consumed field
/// that is present but cannot be parsed makes the whole output malformed, so
/// the file counts as an extraction failure rather than a conversion failure.
pub fn parse_frames(stdout: &[u8]) -> Result<FrameRecordSet> {
    let output: ProbeOutput = serde_json::from_slice(stdout)?;

    output
        .frames
        .into_iter()
        .enumerate()
        .map(|(position, frame)| -> Result<FrameRecord> {
            let index = frame.coded_picture_number.unwrap_or(position as u64);
            let frame_type = frame
                .pict_type
                .as_deref()
                .and_then(|t| t.chars().next())
                .ok_or_else(|| malformed(index, "pict_type"))?;
            let timestamp = frame
                .pts_time
                .as_ref()
                .and_then(NumberOrString::parse::<f64>)
                .ok_or_else(|| malformed(index, "pts_time"))?;
            let byte_size = frame
                .pkt_size
                .as_ref()
                .and_then(NumberOrString::parse::<u64>)
                .ok_or_else(|| malformed(index, "pkt_size"))?;

            Ok(FrameRecord {
                index,
                frame_type,
                timestamp,
                byte_size,
            })
        })
        .collect()
}

fn malformed(index: u64, field: &str) -> TraceError {
    TraceError::MalformedProbeOutput(format!("frame {} has no usable {}", index, field))
}
