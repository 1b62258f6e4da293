use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::{debug, warn};

use logfresh_logs::LogRecordSource;
use logfresh_types::RecordError;

/// Whole days between two instants, ignoring direction
pub fn age_in_days(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    (now - timestamp).num_days().unsigned_abs()
}

/// Counts recent, non-excluded records in a log.
///
/// The walk starts at the newest record and stops at the first record older
/// than the threshold. Sources must be in append order for that to be sound:
/// an out-of-order source can be undercounted.
#[derive(Clone, Debug)]
pub struct FreshnessScanner {
    /// Records older than this many whole days are stale
    stale_threshold_days: u32,

    /// Severities never counted (exact, case-sensitive)
    excluded_severities: HashSet<String>,
}

impl FreshnessScanner {
    pub fn new(stale_threshold_days: u32) -> Self {
        Self {
            stale_threshold_days,
            excluded_severities: HashSet::new(),
        }
    }

    /// Set severities to skip
    pub fn with_excluded_severities<I, S>(mut self, severities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_severities = severities.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_excluded(&self, severity: &str) -> bool {
        self.excluded_severities.contains(severity)
    }

    /// Whether a record of this age is still inside the window
    pub fn is_fresh(&self, age_days: u64) -> bool {
        age_days <= u64::from(self.stale_threshold_days)
    }

    /// Count fresh records, newest first.
    ///
    /// Excluded severities are skipped without ending the walk. A record that
    /// cannot be read aborts the scan for this source.
    pub fn scan<S>(&self, source: &S, now: DateTime<Utc>) -> Result<usize, RecordError>
    where
        S: LogRecordSource + ?Sized,
    {
        let mut count = 0;
        let mut newer: Option<DateTime<Utc>> = None;

        for index in (0..source.len()).rev() {
            let record = source.record_at(index)?;

            if cfg!(debug_assertions) {
                if let Some(newer) = newer {
                    if record.timestamp > newer {
                        warn!(
                            path = %source.path().display(),
                            index,
                            "log records are out of order; fresh count may be low"
                        );
                    }
                }
                newer = Some(record.timestamp);
            }

            if !self.is_fresh(age_in_days(record.timestamp, now)) {
                debug!(path = %source.path().display(), index, "reached stale record");
                break;
            }

            if self.is_excluded(&record.severity) {
                continue;
            }

            count += 1;
        }

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use logfresh_logs::{FileLogSource, LogRecord, VecSource};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap()
    }

    fn record(days_ago: i64, severity: &str) -> LogRecord {
        LogRecord::new(now() - Duration::days(days_ago), severity, "msg")
    }

    /// Build a source from (days_ago, severity) pairs listed oldest first
    fn source(records: &[(i64, &str)]) -> VecSource {
        VecSource::new(
            "test.log",
            records.iter().map(|(d, s)| record(*d, s)).collect(),
        )
    }

    fn scanner(threshold: u32, excluded: &[&str]) -> FreshnessScanner {
        FreshnessScanner::new(threshold).with_excluded_severities(excluded.iter().copied())
    }

    #[test]
    fn test_age_is_whole_days_absolute() {
        assert_eq!(age_in_days(now(), now()), 0);
        assert_eq!(age_in_days(now() - Duration::hours(23), now()), 0);
        assert_eq!(age_in_days(now() - Duration::hours(25), now()), 1);
        assert_eq!(age_in_days(now() + Duration::hours(49), now()), 2);
    }

    #[test]
    fn test_empty_source() {
        assert_eq!(scanner(1, &[]).scan(&source(&[]), now()).unwrap(), 0);
    }

    #[test]
    fn test_scenario_mixed_severities_today() {
        let src = source(&[(0, "ERROR"), (0, "INFO"), (0, "ERROR")]);
        assert_eq!(scanner(1, &["INFO"]).scan(&src, now()).unwrap(), 2);
    }

    #[test]
    fn test_all_stale() {
        let src = source(&[(10, "ERROR"), (5, "ERROR"), (3, "CRITICAL")]);
        assert_eq!(scanner(1, &[]).scan(&src, now()).unwrap(), 0);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        for t in 0..5u32 {
            let days = i64::from(t);
            let src = source(&[(days, "ERROR"), (days, "WARNING"), (days, "ERROR")]);
            assert_eq!(scanner(t, &[]).scan(&src, now()).unwrap(), 3, "threshold {t}");
        }
    }

    #[test]
    fn test_zero_threshold_only_today() {
        let src = source(&[(1, "ERROR"), (0, "ERROR")]);
        assert_eq!(scanner(0, &[]).scan(&src, now()).unwrap(), 1);
    }

    #[test]
    fn test_stops_at_first_stale_record() {
        // The fresh record at index 0 is out of order and must not be reached.
        let src = source(&[(0, "ERROR"), (4, "ERROR"), (1, "ERROR"), (0, "ERROR")]);
        let truncated = source(&[(4, "ERROR"), (1, "ERROR"), (0, "ERROR")]);

        let s = scanner(1, &[]);
        assert_eq!(s.scan(&src, now()).unwrap(), 2);
        assert_eq!(s.scan(&src, now()).unwrap(), s.scan(&truncated, now()).unwrap());
    }

    #[test]
    fn test_exclusion_does_not_stop_walk() {
        let src = source(&[(1, "ERROR"), (0, "DEBUG"), (0, "INFO")]);
        assert_eq!(scanner(1, &["INFO", "DEBUG"]).scan(&src, now()).unwrap(), 1);
    }

    #[test]
    fn test_only_excluded_severities() {
        let src = source(&[(0, "INFO"), (0, "DEBUG")]);
        assert_eq!(scanner(1, &["INFO", "DEBUG"]).scan(&src, now()).unwrap(), 0);
    }

    #[test]
    fn test_exclusion_is_case_sensitive() {
        let src = source(&[(0, "info"), (0, "INFO")]);
        assert_eq!(scanner(1, &["INFO"]).scan(&src, now()).unwrap(), 1);
    }

    #[test]
    fn test_larger_exclusion_set_never_counts_more() {
        let src = source(&[
            (3, "ERROR"),
            (1, "INFO"),
            (1, "ERROR"),
            (0, "DEBUG"),
            (0, "WARNING"),
            (0, "INFO"),
        ]);

        let sets: [&[&str]; 4] = [&[], &["INFO"], &["INFO", "DEBUG"], &["INFO", "DEBUG", "WARNING"]];
        let counts: Vec<usize> = sets
            .iter()
            .map(|set| scanner(1, set).scan(&src, now()).unwrap())
            .collect();

        assert_eq!(counts, vec![5, 3, 2, 1]);
        assert!(counts.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_out_of_order_source_count_unchanged() {
        // Newest-first walk sees 1 day, then 0 days: the diagnostic fires.
        let unordered = source(&[(0, "ERROR"), (1, "ERROR"), (0, "INFO")]);
        let ordered = source(&[(1, "ERROR"), (0, "ERROR"), (0, "INFO")]);

        let s = scanner(1, &["INFO"]);
        assert_eq!(s.scan(&unordered, now()).unwrap(), 2);
        assert_eq!(s.scan(&unordered, now()).unwrap(), s.scan(&ordered, now()).unwrap());
    }

    #[test]
    fn test_malformed_record_aborts_scan() {
        let contents = "[2024-06-10 08:00:00] main.ERROR: ok [] []\n[2024-99-10 09:00:00] main.ERROR: bad [] []\n";
        let src = FileLogSource::from_contents("bad.log", contents.to_string());

        let err = scanner(1, &[]).scan(&src, now()).unwrap_err();
        assert!(matches!(err, RecordError::Malformed { index: 1, .. }));
    }

    #[test]
    fn test_malformed_record_behind_stale_boundary_is_never_read() {
        let contents = "garbage\n[2024-01-01 00:00:00] main.ERROR: old [] []\n[2024-06-10 09:00:00] main.ERROR: new [] []\n";
        let src = FileLogSource::from_contents("old.log", contents.to_string());

        assert_eq!(scanner(1, &[]).scan(&src, now()).unwrap(), 1);
    }
}
