//! Conversion of frame records into ns-3 `UdpTraceClient` trace files
//!
//! Each line reads `<frame index> <frame type> <frame time (ms, integer)> <frame size>`.

use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{error, info};

use crate::error::{Result, TraceError};
use crate::probe::FrameRecord;

/// Writes trace files under a fixed output directory
#[derive(Debug, Clone)]
pub struct TraceWriter {
    output_dir: PathBuf,
    suffix: String,
}

impl Default for TraceWriter {
    fn default() -> Self {
        Self::new(PathBuf::from("output"), "ns-3-vtrace")
    }
}

impl TraceWriter {
    pub fn new(output_dir: PathBuf, suffix: impl Into<String>) -> Self {
        Self {
            output_dir,
            suffix: suffix.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Output path for an input file name: extension replaced by the trace suffix
    pub fn output_path(&self, source_base_name: &str) -> PathBuf {
        let stem = Path::new(source_base_name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| source_base_name.to_string());
        self.output_dir.join(format!("{}.{}", stem, self.suffix))
    }

    /// Render and persist `records`; failures are logged and reported as `false`
    pub async fn transform(&self, records: &[FrameRecord], source_base_name: &str) -> bool {
        let output_path = self.output_path(source_base_name);

        let rendered = match render(records) {
            Ok(rendered) => rendered,
            Err(e) => {
                error!("While converting data for {}: {}", source_base_name, e);
                return false;
            }
        };

        match self.write_new(&output_path, &rendered).await {
            Ok(()) => {
                info!("Wrote {} frames to {}", records.len(), output_path.display());
                true
            }
            Err(TraceError::OutputExists(path)) => {
                error!(
                    "Could not open output file '{}', ensure it does not exist already",
                    path.display()
                );
                false
            }
            Err(e) => {
                error!("Could not write output file '{}': {}", output_path.display(), e);
                false
            }
        }
    }

    /// Write `contents` to a file that must not exist yet
    ///
    /// The output directory is created on demand. If writing fails after the
    /// file was created, the file is removed again.
    pub async fn write_new(&self, path: &Path, contents: &str) -> Result<()> {
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(TraceError::OutputExists(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };

        let written = async {
            file.write_all(contents.as_bytes()).await?;
            file.flush().await?;
            file.sync_all().await
        }
        .await;

        if let Err(e) = written {
            drop(file);
            let _ = tokio::fs::remove_file(path).await;
            return Err(e.into());
        }

        Ok(())
    }
}

/// Render one trace line, truncating the timestamp to whole milliseconds
pub fn render_line(record: &FrameRecord) -> Result<String> {
    let millis = (record.timestamp * 1000.0).trunc();
    if !millis.is_finite() {
        return Err(TraceError::InvalidTimestamp {
            index: record.index,
            value: record.timestamp,
        });
    }

    Ok(format!(
        "{} {} {} {}",
        record.index, record.frame_type, millis as i64, record.byte_size
    ))
}

/// Render a whole record set; an empty set is an error
pub fn render(records: &[FrameRecord]) -> Result<String> {
    if records.is_empty() {
        return Err(TraceError::EmptyRecordSet);
    }

    let lines = records
        .iter()
        .map(render_line)
        .collect::<Result<Vec<_>>>()?;
    Ok(lines.join("\n"))
}
