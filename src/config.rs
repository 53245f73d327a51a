use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the ns-3 trace extractor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Custom ffprobe executable, used when it points at an existing file
    pub ffprobe_path: Option<PathBuf>,

    /// Merge the contents of `input_dir` into the input list
    pub scan_input_dir: bool,

    /// Directory scanned for input videos
    pub input_dir: PathBuf,

    /// Entries of the scan directory that are never treated as input
    pub ignored_entries: Vec<String>,

    /// Required input file extension, compared case-insensitively
    pub input_extension: String,

    /// Directory receiving the trace files
    pub output_dir: PathBuf,

    /// Extension appended to the input file stem
    pub output_suffix: String,

    /// Upper bound on concurrent files (`None` = one task per file)
    pub max_workers: Option<usize>,
}

impl Config {
    /// Load configuration from the first readable config file, else from the environment
    pub fn load() -> Result<Self> {
        let config_paths = [
            "ns3-trace-extractor.toml",
            "config/ns3-trace-extractor.toml",
        ];

        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str(&config_str) {
                    Ok(config) => {
                        tracing::info!("Loaded configuration from: {}", path);
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        Self::from_env()
    }

    /// Load configuration from an explicit TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read config file {}", path.display()))?;
        let config = toml::from_str(&config_str)
            .with_context(|| format!("Cannot parse config file {}", path.display()))?;
        tracing::info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Load configuration from environment variables over the defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(ffprobe) = std::env::var("NS3_TRACE_FFPROBE") {
            config.ffprobe_path = Some(PathBuf::from(ffprobe));
        }

        if let Ok(input_dir) = std::env::var("NS3_TRACE_INPUT_DIR") {
            config.input_dir = PathBuf::from(input_dir);
        }

        if let Ok(output_dir) = std::env::var("NS3_TRACE_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(output_dir);
        }

        if let Ok(workers) = std::env::var("NS3_TRACE_WORKERS") {
            let workers: usize = workers
                .parse()
                .map_err(|e| anyhow!("NS3_TRACE_WORKERS is not a number: {}", e))?;
            config.max_workers = Some(workers);
        }

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_workers == Some(0) {
            return Err(anyhow!("max_workers must be greater than 0"));
        }

        if self.input_extension.is_empty() {
            return Err(anyhow!("input_extension must not be empty"));
        }

        if self.output_suffix.is_empty() || self.output_suffix.contains(std::path::MAIN_SEPARATOR) {
            return Err(anyhow!("output_suffix must be a non-empty file extension"));
        }

        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Trace extractor configuration:\n\
            - ffprobe: {}\n\
            - Input directory: {} (scan {})\n\
            - Output directory: {}\n\
            - Workers: {}",
            self.ffprobe_path
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "ffprobe (PATH)".to_string()),
            self.input_dir.display(),
            if self.scan_input_dir { "enabled" } else { "disabled" },
            self.output_dir.display(),
            self.max_workers
                .map(|n| n.to_string())
                .unwrap_or_else(|| "one per file".to_string()),
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ffprobe_path: None,
            scan_input_dir: true,
            input_dir: PathBuf::from("input"),
            ignored_entries: vec![".gitignore".to_string()],
            input_extension: ".mp4".to_string(),
            output_dir: PathBuf::from("output"),
            output_suffix: "ns-3-vtrace".to_string(),
            max_workers: None,
        }
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_ffprobe_path(mut self, path: PathBuf) -> Self {
        self.config.ffprobe_path = Some(path);
        self
    }

    pub fn with_input_dir(mut self, dir: PathBuf) -> Self {
        self.config.input_dir = dir;
        self
    }

    pub fn scan_input_dir(mut self, enable: bool) -> Self {
        self.config.scan_input_dir = enable;
        self
    }

    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.config.output_dir = dir;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.config.max_workers = Some(workers);
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
