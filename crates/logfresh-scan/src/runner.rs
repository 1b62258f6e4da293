use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::debug;

use logfresh_logs::FileLogSource;
use logfresh_types::{Report, ScanError, ScanOutcome};

use crate::report::aggregate;
use crate::scanner::FreshnessScanner;

/// Runs a scanner over many log files
#[derive(Clone, Debug)]
pub struct ScanRunner {
    scanner: Arc<FreshnessScanner>,

    /// Maximum files scanned at once
    jobs: usize,

    /// Limit for the whole run
    deadline: Option<Duration>,
}

impl ScanRunner {
    pub fn new(scanner: FreshnessScanner) -> Self {
        Self {
            scanner: Arc::new(scanner),
            jobs: 1,
            deadline: None,
        }
    }

    /// Scan up to `jobs` files concurrently (minimum 1)
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Abort the run if it takes longer than `deadline`
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Scan a single file. The file is closed before this returns.
    pub fn scan_file(&self, path: &Path, now: DateTime<Utc>) -> Result<usize, ScanError> {
        scan_path(&self.scanner, path, now)
    }

    /// Scan files one after another on the current thread
    pub fn run_sequential(&self, paths: &[PathBuf], now: DateTime<Utc>) -> Result<Report, ScanError> {
        aggregate(paths, |path| self.scan_file(path, now))
    }

    /// Scan files on the blocking pool.
    ///
    /// The report follows the order of `paths` whatever order scans finish
    /// in. Errors and deadline expiry abort the run without a partial report.
    pub async fn run(&self, paths: Vec<PathBuf>, now: DateTime<Utc>) -> Result<Report, ScanError> {
        debug!(files = paths.len(), jobs = self.jobs, "starting scan");

        match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.run_all(paths, now))
                .await
                .map_err(|_| ScanError::DeadlineExceeded { limit: deadline })?,
            None => self.run_all(paths, now).await,
        }
    }

    async fn run_all(&self, paths: Vec<PathBuf>, now: DateTime<Utc>) -> Result<Report, ScanError> {
        let permits = Arc::new(Semaphore::new(self.jobs));

        let tasks = paths.into_iter().map(|path| {
            let permits = Arc::clone(&permits);
            let scanner = Arc::clone(&self.scanner);

            async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|e| ScanError::Worker(e.to_string()))?;

                tokio::task::spawn_blocking(move || -> Result<ScanOutcome, ScanError> {
                    let fresh_count = scan_path(&scanner, &path, now)?;
                    Ok(ScanOutcome::new(path, fresh_count))
                })
                .await
                .map_err(|e| ScanError::Worker(e.to_string()))?
            }
        });

        // Results arrive in input order
        let mut report = Report::new();
        for outcome in join_all(tasks).await {
            report.record(outcome?);
        }
        Ok(report)
    }
}

fn scan_path(scanner: &FreshnessScanner, path: &Path, now: DateTime<Utc>) -> Result<usize, ScanError> {
    let source = FileLogSource::open(path)?;
    let fresh_count = scanner
        .scan(&source, now)
        .map_err(|source| ScanError::MalformedRecord {
            path: path.to_path_buf(),
            source,
        })?;

    debug!(path = %path.display(), fresh_count, "scanned log file");
    Ok(fresh_count)
}
