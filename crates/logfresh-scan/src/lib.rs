//! Freshness scanning for logfresh
//!
//! This crate walks log files newest-first, counts recent records, and turns
//! the per-file counts into a pass/fail verdict.

mod format;
mod report;
mod runner;
mod scanner;

pub use format::{REPORT_HEADER, format_report};
pub use report::aggregate;
pub use runner::ScanRunner;
pub use scanner::{FreshnessScanner, age_in_days};

// Re-export types used in our public API
pub use logfresh_types::{Report, ScanError, ScanOutcome, Verdict};
