use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use logfresh_types::{LogRecord, RecordError};

/// `[<timestamp>] <channel>.<LEVEL>: <message>`
static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[(?P<date>[^\]]+)\]\s+(?P<channel>[\w.\-]+?)\.(?P<level>\w+):\s?(?P<message>.*)$")
        .expect("header pattern is valid")
});

/// Naive timestamp layouts, interpreted as UTC
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Parser for Monolog-style log records
pub struct MonologParser;

impl MonologParser {
    /// Parse one record (header line plus any continuation lines)
    pub fn parse(index: usize, chunk: &str) -> Result<LogRecord, RecordError> {
        let malformed = |reason: String| RecordError::Malformed { index, reason };

        let chunk = chunk.trim_end();
        let (header, continuation) = match chunk.split_once('\n') {
            Some((header, rest)) => (header.trim_end_matches('\r'), Some(rest)),
            None => (chunk, None),
        };

        let caps = HEADER
            .captures(header)
            .ok_or_else(|| malformed(format!("unrecognised header '{}'", preview(header))))?;

        let date = &caps["date"];
        let timestamp = Self::parse_timestamp(date)
            .ok_or_else(|| malformed(format!("unparseable timestamp '{date}'")))?;

        let message = caps.name("message").map_or("", |m| m.as_str());
        let (message, context) = match Self::split_trailers(message) {
            Some((text, context)) => (text, Some(context)),
            None => (message, None),
        };

        let mut content = message.to_string();
        if let Some(rest) = continuation {
            content.push('\n');
            content.push_str(rest);
        }

        let mut record = LogRecord::new(timestamp, &caps["level"], content).with_channel(&caps["channel"]);
        record.context = context;
        Ok(record)
    }

    /// Parse a record timestamp (RFC 3339, or a naive date-time taken as UTC)
    pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|naive| naive.and_utc())
    }

    /// Split the `<context> <extra>` JSON trailers off a message.
    ///
    /// Returns the message text and the context value when both trailers
    /// parse as JSON and consume the rest of the line.
    fn split_trailers(message: &str) -> Option<(&str, Value)> {
        for (pos, _) in message.match_indices(' ') {
            let rest = &message[pos + 1..];
            if !rest.starts_with(['{', '[']) {
                continue;
            }

            let values: Result<Vec<Value>, _> = serde_json::Deserializer::from_str(rest)
                .into_iter::<Value>()
                .collect();

            if let Ok(values) = values {
                if values.len() == 2 {
                    let context = values.into_iter().next()?;
                    return Some((&message[..pos], context));
                }
            }
        }
        None
    }
}

/// First 40 chars of a line, for error messages
fn preview(line: &str) -> &str {
    match line.char_indices().nth(40) {
        Some((idx, _)) => &line[..idx],
        None => line,
    }
}
