use std::collections::HashSet;
use std::path::PathBuf;

use tracing::{debug, warn};

use logfresh_types::ScanError;

/// Expands log file patterns into the list of files to scan
pub struct LogDiscovery;

impl LogDiscovery {
    /// Resolve glob patterns into an ordered, deduplicated list of files.
    ///
    /// Matches keep pattern order; a path matched by several patterns is kept
    /// at its first position. Directories are skipped.
    pub fn resolve<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<PathBuf>, ScanError> {
        let mut seen = HashSet::new();
        let mut paths = Vec::new();

        for pattern in patterns {
            let pattern = pattern.as_ref();
            let entries = glob::glob(pattern).map_err(|e| ScanError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })?;

            let before = paths.len();
            for entry in entries {
                match entry {
                    Ok(path) => {
                        if path.is_dir() {
                            continue;
                        }
                        if seen.insert(path.clone()) {
                            paths.push(path);
                        }
                    }
                    Err(e) => {
                        warn!(pattern, error = %e, "skipping unreadable path");
                    }
                }
            }
            debug!(pattern, matched = paths.len() - before, "expanded log pattern");
        }

        Ok(paths)
    }
}
