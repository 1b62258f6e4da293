use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use logfresh_types::{LogRecord, RecordError, ScanError};

use crate::parser::MonologParser;

/// Index-addressable view over the records of one log.
///
/// Records must be in append order: timestamps are non-decreasing from index
/// `0` to `len() - 1`. Scanning relies on this to stop early; it is not
/// checked here.
pub trait LogRecordSource {
    /// Path the records were read from
    fn path(&self) -> &Path;

    /// Number of records
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Parse and return the record at `index`
    fn record_at(&self, index: usize) -> Result<LogRecord, RecordError>;
}

/// Log file loaded into memory, with records parsed on access
pub struct FileLogSource {
    path: PathBuf,
    contents: String,
    /// Byte range of each record within `contents`
    spans: Vec<Range<usize>>,
}

impl FileLogSource {
    /// Read a log file. The file handle is closed before this returns.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ScanError> {
        let path = path.into();

        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(source) => return Err(ScanError::SourceUnavailable { path, source }),
        };
        if !metadata.is_file() {
            return Err(ScanError::NotAFile { path });
        }

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(source) => return Err(ScanError::SourceUnavailable { path, source }),
        };

        let contents = String::from_utf8_lossy(&bytes).into_owned();
        Ok(Self::from_contents(path, contents))
    }

    /// Build a source from text already in memory. A leading BOM is dropped.
    pub fn from_contents(path: impl Into<PathBuf>, mut contents: String) -> Self {
        if contents.starts_with('\u{FEFF}') {
            contents.drain(..'\u{FEFF}'.len_utf8());
        }
        let spans = split_records(&contents);
        Self {
            path: path.into(),
            contents,
            spans,
        }
    }
}

impl LogRecordSource for FileLogSource {
    fn path(&self) -> &Path {
        &self.path
    }

    fn len(&self) -> usize {
        self.spans.len()
    }

    fn record_at(&self, index: usize) -> Result<LogRecord, RecordError> {
        let span = self.spans.get(index).ok_or(RecordError::OutOfBounds {
            index,
            len: self.spans.len(),
        })?;
        MonologParser::parse(index, &self.contents[span.clone()])
    }
}

impl std::fmt::Debug for FileLogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileLogSource")
            .field("path", &self.path)
            .field("records", &self.spans.len())
            .finish()
    }
}

/// Records already parsed, held in memory
#[derive(Clone, Debug)]
pub struct VecSource {
    path: PathBuf,
    records: Vec<LogRecord>,
}

impl VecSource {
    pub fn new(path: impl Into<PathBuf>, records: Vec<LogRecord>) -> Self {
        Self {
            path: path.into(),
            records,
        }
    }
}

impl LogRecordSource for VecSource {
    fn path(&self) -> &Path {
        &self.path
    }

    fn len(&self) -> usize {
        self.records.len()
    }

    fn record_at(&self, index: usize) -> Result<LogRecord, RecordError> {
        self.records
            .get(index)
            .cloned()
            .ok_or(RecordError::OutOfBounds {
                index,
                len: self.records.len(),
            })
    }
}

/// Whether a line opens a new record (`[YYYY-`)
fn starts_record(line: &str) -> bool {
    let bytes = line.as_bytes();
    bytes.len() >= 6
        && bytes[0] == b'['
        && bytes[1..5].iter().all(u8::is_ascii_digit)
        && bytes[5] == b'-'
}

/// Split file contents into per-record byte ranges.
///
/// Lines that do not open a record belong to the record before them. Text
/// ahead of the first record header becomes a record of its own.
fn split_records(contents: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start: Option<usize> = None;
    let mut offset = 0;

    for line in contents.split_inclusive('\n') {
        if starts_record(line) {
            if let Some(begin) = start {
                spans.push(begin..offset);
            }
            start = Some(offset);
        } else if start.is_none() && !line.trim().is_empty() {
            start = Some(offset);
        }
        offset += line.len();
    }

    if let Some(begin) = start {
        spans.push(begin..offset);
    }

    spans
}
