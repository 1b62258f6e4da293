use std::fmt::Write;

use logfresh_types::{Report, Verdict};

/// First line of a failure message
pub const REPORT_HEADER: &str = "✘ Logs have recently added records:";

/// Turn a report into a verdict.
///
/// An empty report passes. Otherwise the message lists one file per line in
/// report order, e.g. `• var/log/system.log - 2 records`.
pub fn format_report(report: &Report) -> Verdict {
    if report.is_empty() {
        return Verdict::Passed;
    }

    let mut message = String::from(REPORT_HEADER);
    message.push('\n');

    for entry in report {
        // Writing to a String cannot fail
        let _ = writeln!(
            message,
            "• {} - {} {}",
            entry.path.display(),
            entry.fresh_count,
            record_noun(entry.fresh_count)
        );
    }

    Verdict::Failed(message)
}

fn record_noun(count: usize) -> &'static str {
    if count == 1 { "record" } else { "records" }
}
