use std::path::Path;

use logfresh_types::{Report, ScanOutcome};

/// Scan each path in order and collect the non-zero counts.
///
/// Paths are not deduplicated here. The first error ends aggregation.
pub fn aggregate<I, P, F, E>(paths: I, mut scan: F) -> Result<Report, E>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
    F: FnMut(&Path) -> Result<usize, E>,
{
    let mut report = Report::new();
    for path in paths {
        let path = path.as_ref();
        let fresh_count = scan(path)?;
        report.record(ScanOutcome::new(path, fresh_count));
    }
    Ok(report)
}
