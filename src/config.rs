//! Check configuration
//!
//! Settings come from an optional `logfresh.toml` and are overridden by CLI
//! flags. Option names in the file match the task options:
//!
//! ```toml
//! log_patterns = ["./var/*/*.log"]
//! record_stale_threshold = 1
//! exclude_severities = ["INFO", "DEBUG"]
//! ```

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Config file read from the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "logfresh.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid option `{option}`: {reason}")]
    Invalid {
        option: &'static str,
        reason: &'static str,
    },
}

/// Options as written in the config file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub log_patterns: Option<Vec<String>>,
    pub record_stale_threshold: Option<u32>,
    pub exclude_severities: Option<Vec<String>>,
    pub jobs: Option<usize>,
    pub deadline_secs: Option<u64>,
}

impl FileConfig {
    /// Load the file at `path`, or the default file if present
    pub fn discover(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::load(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Values given on the command line. `None` leaves the file value in place.
#[derive(Debug, Default)]
pub struct Overrides {
    pub log_patterns: Vec<String>,
    pub record_stale_threshold: Option<u32>,
    pub exclude_severities: Vec<String>,
    pub no_exclude: bool,
    pub jobs: Option<usize>,
    pub deadline_secs: Option<u64>,
}

/// Resolved settings for one run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub log_patterns: Vec<String>,
    pub record_stale_threshold: u32,
    pub exclude_severities: Vec<String>,
    pub jobs: usize,
    pub deadline_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_patterns: vec!["./var/*/*.log".to_string()],
            record_stale_threshold: 1,
            exclude_severities: vec!["INFO".to_string(), "DEBUG".to_string()],
            jobs: default_jobs(),
            deadline_secs: None,
        }
    }
}

impl Settings {
    /// Layer defaults, file values and CLI overrides, then validate
    pub fn resolve(file: FileConfig, overrides: Overrides) -> Result<Self, ConfigError> {
        let mut settings = Self::default();

        if let Some(patterns) = file.log_patterns {
            settings.log_patterns = patterns;
        }
        if let Some(threshold) = file.record_stale_threshold {
            settings.record_stale_threshold = threshold;
        }
        if let Some(severities) = file.exclude_severities {
            settings.exclude_severities = severities;
        }
        if let Some(jobs) = file.jobs {
            settings.jobs = jobs;
        }
        settings.deadline_secs = file.deadline_secs;

        if !overrides.log_patterns.is_empty() {
            settings.log_patterns = overrides.log_patterns;
        }
        if let Some(threshold) = overrides.record_stale_threshold {
            settings.record_stale_threshold = threshold;
        }
        if overrides.no_exclude {
            settings.exclude_severities.clear();
        } else if !overrides.exclude_severities.is_empty() {
            settings.exclude_severities = overrides.exclude_severities;
        }
        if let Some(jobs) = overrides.jobs {
            settings.jobs = jobs;
        }
        if overrides.deadline_secs.is_some() {
            settings.deadline_secs = overrides.deadline_secs;
        }

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.log_patterns.is_empty() {
            return Err(ConfigError::Invalid {
                option: "log_patterns",
                reason: "at least one pattern is required",
            });
        }
        if self.jobs == 0 {
            return Err(ConfigError::Invalid {
                option: "jobs",
                reason: "must be at least 1",
            });
        }
        if self.deadline_secs == Some(0) {
            return Err(ConfigError::Invalid {
                option: "deadline_secs",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}

fn default_jobs() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get())
}
