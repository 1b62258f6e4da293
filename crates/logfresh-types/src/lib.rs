//! Shared types for logfresh
//!
//! This crate contains data structures used across multiple logfresh crates.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

// ============================================================================
// Log Types
// ============================================================================

/// A single parsed log record
#[derive(Clone, Debug, PartialEq)]
pub struct LogRecord {
    /// When the record was written
    pub timestamp: DateTime<Utc>,

    /// Severity token exactly as written in the log (e.g. `ERROR`)
    pub severity: String,

    /// Logger channel (e.g. `main` in `main.ERROR`)
    pub channel: Option<String>,

    /// Message text, including any continuation lines
    pub content: String,

    /// Structured context trailer (if it was valid JSON)
    pub context: Option<serde_json::Value>,
}

impl LogRecord {
    /// Create a new record with minimal fields
    pub fn new(
        timestamp: DateTime<Utc>,
        severity: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            severity: severity.into(),
            channel: None,
            content: content.into(),
            context: None,
        }
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }
}

// ============================================================================
// Report Types
// ============================================================================

/// Fresh record count for a single log file
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ScanOutcome {
    pub path: PathBuf,
    pub fresh_count: usize,
}

impl ScanOutcome {
    pub fn new(path: impl Into<PathBuf>, fresh_count: usize) -> Self {
        Self {
            path: path.into(),
            fresh_count,
        }
    }
}

/// Per-file fresh counts in the order the files were scanned.
///
/// Only files with at least one fresh record are stored; a missing path means
/// nothing qualifying was found there.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Report {
    entries: Vec<ScanOutcome>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold an outcome into the report. Zero counts are dropped.
    ///
    /// Returns whether the outcome was kept.
    pub fn record(&mut self, outcome: ScanOutcome) -> bool {
        if outcome.fresh_count == 0 {
            return false;
        }
        self.entries.push(outcome);
        true
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScanOutcome> {
        self.entries.iter()
    }

    /// Fresh count recorded for a path, if any
    pub fn get(&self, path: impl AsRef<Path>) -> Option<usize> {
        let path = path.as_ref();
        self.entries
            .iter()
            .find(|e| e.path == path)
            .map(|e| e.fresh_count)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total fresh records across all files
    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.fresh_count).sum()
    }
}

impl FromIterator<ScanOutcome> for Report {
    fn from_iter<I: IntoIterator<Item = ScanOutcome>>(iter: I) -> Self {
        let mut report = Report::new();
        for outcome in iter {
            report.record(outcome);
        }
        report
    }
}

impl<'a> IntoIterator for &'a Report {
    type Item = &'a ScanOutcome;
    type IntoIter = std::slice::Iter<'a, ScanOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Final result of a check
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum Verdict {
    Passed,
    Failed(String),
}

impl Verdict {
    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Failure message, if the check failed
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Passed => None,
            Self::Failed(message) => Some(message),
        }
    }
}

// ============================================================================
// Execution Context
// ============================================================================

/// Where the check was invoked from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TaskContext {
    /// Git pre-commit hook
    PreCommit,
    /// Git commit-msg hook
    CommitMsg,
    /// Manual or CI run
    #[default]
    Run,
}

impl TaskContext {
    /// Whether the log check applies in this context
    pub fn can_run(&self) -> bool {
        matches!(self, Self::PreCommit | Self::Run)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreCommit => "pre-commit",
            Self::CommitMsg => "commit-msg",
            Self::Run => "run",
        }
    }
}

impl fmt::Display for TaskContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskContext {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pre-commit" => Ok(Self::PreCommit),
            "commit-msg" => Ok(Self::CommitMsg),
            "run" => Ok(Self::Run),
            other => Err(format!(
                "unknown context '{other}' (expected pre-commit, commit-msg or run)"
            )),
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// A record could not be read from a log source
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("record {index} is malformed: {reason}")]
    Malformed { index: usize, reason: String },

    #[error("record {index} is out of bounds for a source of {len} records")]
    OutOfBounds { index: usize, len: usize },
}

/// Faults that abort a run. These are never reported as a failed check.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("cannot read log file {}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a regular file", path.display())]
    NotAFile { path: PathBuf },

    #[error("cannot scan log file {}", path.display())]
    MalformedRecord {
        path: PathBuf,
        #[source]
        source: RecordError,
    },

    #[error("invalid log pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("scan did not finish within {limit:?}")]
    DeadlineExceeded { limit: Duration },

    #[error("scan worker failed: {0}")]
    Worker(String),
}

impl ScanError {
    /// The log file the error refers to, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::SourceUnavailable { path, .. }
            | Self::NotAFile { path }
            | Self::MalformedRecord { path, .. } => Some(path),
            _ => None,
        }
    }
}
