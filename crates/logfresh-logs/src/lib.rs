//! Log sources for logfresh
//!
//! This crate turns glob patterns into log files and log files into
//! index-addressable records.

mod discover;
mod parser;
mod source;

pub use discover::LogDiscovery;
pub use parser::MonologParser;
pub use source::{FileLogSource, LogRecordSource, VecSource};

// Re-export types used in our public API
pub use logfresh_types::{LogRecord, RecordError, ScanError};
