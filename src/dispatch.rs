use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::outcome::OutcomeCode;
use crate::probe::FrameProbe;
use crate::sanitize::InputSanitizer;
use crate::trace::TraceWriter;

/// Drives the sanitize → extract → transform pipeline over a batch of files
pub struct Dispatcher<P: FrameProbe + 'static> {
    config: Config,
    probe: Arc<P>,
    sanitizer: InputSanitizer,
    writer: Arc<TraceWriter>,
}

impl<P: FrameProbe + 'static> Dispatcher<P> {
    pub fn new(config: Config, probe: P) -> Self {
        let sanitizer = InputSanitizer::new(config.input_extension.clone());
        let writer = TraceWriter::new(config.output_dir.clone(), config.output_suffix.clone());

        Self {
            config,
            probe: Arc::new(probe),
            sanitizer,
            writer: Arc::new(writer),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the whole batch and return the aggregated outcome
    pub async fn run(&self, raw_paths: Vec<PathBuf>) -> OutcomeCode {
        let start_time = Instant::now();

        if !self.probe.is_available().await {
            error!("ffprobe executable could not be found");
            return OutcomeCode::FFPROBE_NOT_FOUND;
        }

        let mut candidates = raw_paths;
        if self.config.scan_input_dir {
            candidates.extend(self.scan_input_dir());
        }

        if candidates.is_empty() {
            error!("No files were given, use --help for help");
            return OutcomeCode::NO_VALID_FILE;
        }

        let validated = self.sanitizer.run(&candidates).accepted;
        if validated.is_empty() {
            error!("No valid files are left");
            return OutcomeCode::NO_VALID_FILE;
        }

        info!("📹 Processing {} files", validated.len());
        let outcome = self.spread_work(validated).await;

        info!(
            "🎉 Batch finished in {:.2}s with {}",
            start_time.elapsed().as_secs_f64(),
            outcome
        );
        outcome
    }

    /// Files directly inside the scan directory, sorted by name, ignored entries skipped
    pub fn scan_input_dir(&self) -> Vec<PathBuf> {
        let input_dir = &self.config.input_dir;
        if !input_dir.is_dir() {
            warn!("The path {} does not exist", input_dir.display());
            return Vec::new();
        }

        WalkDir::new(input_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Cannot read entry of {}: {}", input_dir.display(), e);
                    None
                }
            })
            .filter(|entry| {
                let name = entry.file_name().to_string_lossy();
                !self.config.ignored_entries.iter().any(|ignored| *ignored == name)
            })
            .map(|entry| entry.into_path())
            .collect()
    }

    /// One task per file; waits for all of them and folds their outcomes
    async fn spread_work(&self, files: Vec<PathBuf>) -> OutcomeCode {
        let limiter = self.config.max_workers.map(|n| Arc::new(Semaphore::new(n)));
        let mut tasks = JoinSet::new();

        for path in files {
            let probe = Arc::clone(&self.probe);
            let writer = Arc::clone(&self.writer);
            let limiter = limiter.clone();

            tasks.spawn(async move {
                let _permit = match limiter {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };
                process_file(probe.as_ref(), writer.as_ref(), &path).await
            });
        }

        let mut outcome = OutcomeCode::SUCCESS;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(code) => outcome |= code,
                Err(e) => {
                    error!("A worker task did not complete: {}", e);
                    outcome |= OutcomeCode::TRANSFORM_ERROR;
                }
            }
        }
        outcome
    }
}

/// Extract then transform a single file
pub async fn process_file<P: FrameProbe + ?Sized>(
    probe: &P,
    writer: &TraceWriter,
    path: &Path,
) -> OutcomeCode {
    info!("Starting work on '{}'", path.display());

    let records = probe.extract(path).await;
    if records.is_empty() {
        error!(
            "FFProbe produced no output for file {}, please ensure this is a valid MPEG-4 file",
            path.display()
        );
        return OutcomeCode::FFPROBE_ERROR;
    }
    debug!("Extracted {} frames from {}", records.len(), path.display());

    let base_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    if !writer.transform(&records, &base_name).await {
        error!("The data transformation failed for file {}", path.display());
        return OutcomeCode::TRANSFORM_ERROR;
    }

    info!("Finished work on '{}'", path.display());
    OutcomeCode::SUCCESS
}
