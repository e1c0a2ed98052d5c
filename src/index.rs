//! Augmented FASTA index (`.sample.datetime.fai`) parsing
//!
//! Each file is tab-delimited with six columns and no header:
//!
//! 1. **NAME**: Read identifier
//! 2. **TIME**: Time the read was generated (text timestamp)
//! 3. **LENGTH**: Read length in bases (> 0)
//! 4. **OFFSET**: Byte offset to first base
//! 5. **LINEBASES**: Number of bases per line
//! 6. **LINEWIDTH**: Number of bytes per line (including newline)
//!
//! ```text
//! read_0001	2021-03-04T10:11:12Z	15230	61	15230	15231
//! read_0002	2021-03-04T10:11:40Z	8812	15354	8812	8813
//! ```
//!
//! The sample name and filter state do not appear in the file; they come from
//! the file name via [`NamingConvention`].

use crate::error::{QcError, Result};
use crate::naming::NamingConvention;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Number of tab-separated columns in every row
pub const INDEX_COLUMNS: usize = 6;

/// Naive timestamp layouts accepted after RFC 3339, interpreted as UTC
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Metadata for one sequenced read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub name: String,
    /// Seconds since the Unix epoch (UTC)
    pub time: f64,
    pub length: u64,
    pub offset: u64,
    pub line_bases: u64,
    pub line_width: u64,
    pub sample: String,
    pub filtered: bool,
}

impl IndexRecord {
    /// Parse a single index row
    ///
    /// Format: NAME\tTIME\tLENGTH\tOFFSET\tLINEBASES\tLINEWIDTH
    pub fn from_line(line: &str, sample: &str, filtered: bool) -> std::result::Result<Self, String> {
        let fields: Vec<&str> = line.split('\t').collect();

        if fields.len() != INDEX_COLUMNS {
            return Err(format!(
                "expected {} tab-separated fields, got {}",
                INDEX_COLUMNS,
                fields.len()
            ));
        }

        let time = parse_timestamp(fields[1])?;
        let length = parse_u64(fields[2], "LENGTH")?;
        if length == 0 {
            return Err("LENGTH must be greater than zero".to_string());
        }

        Ok(IndexRecord {
            name: fields[0].to_string(),
            time,
            length,
            offset: parse_u64(fields[3], "OFFSET")?,
            line_bases: parse_u64(fields[4], "LINEBASES")?,
            line_width: parse_u64(fields[5], "LINEWIDTH")?,
            sample: sample.to_string(),
            filtered,
        })
    }
}

fn parse_u64(field: &str, column: &str) -> std::result::Result<u64, String> {
    field
        .trim()
        .parse::<u64>()
        .map_err(|e| format!("Invalid {} field '{}': {}", column, field, e))
}

/// Convert a text timestamp to seconds since the Unix epoch
///
/// Accepts RFC 3339 (`2021-03-04T10:11:12.5+01:00`) and naive
/// `YYYY-MM-DD[T ]HH:MM:SS[.f]`, the latter taken as UTC.
pub fn parse_timestamp(field: &str) -> std::result::Result<f64, String> {
    let field = field.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(field) {
        return Ok(epoch_seconds(&dt.with_timezone(&Utc)));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(field, format) {
            return Ok(epoch_seconds(&Utc.from_utc_datetime(&naive)));
        }
    }

    Err(format!("Invalid TIME field '{}'", field))
}

fn epoch_seconds(dt: &DateTime<Utc>) -> f64 {
    dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_nanos()) * 1e-9
}

/// Streaming reader over the rows of one index file
///
/// Yields records in file order with constant memory use. Blank lines are
/// skipped; any other malformed row ends iteration with an error.
pub struct IndexReader<R: BufRead> {
    reader: R,
    path: PathBuf,
    sample: String,
    filtered: bool,
    line_number: usize,
    buffer: Vec<u8>,
    failed: bool,
}

impl IndexReader<BufReader<File>> {
    /// Open an index file, deriving its sample name from the file name
    pub fn open<P: AsRef<Path>>(
        path: P,
        filtered: bool,
        naming: &NamingConvention,
    ) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| QcError::not_found(path, e))?;
        // Directories open successfully on Unix and only fail on first read
        let is_file = file
            .metadata()
            .map_err(|e| QcError::not_found(path, e))?
            .is_file();
        if !is_file {
            return Err(QcError::not_found(
                path,
                io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
            ));
        }
        let sample = naming.sample_name(path, filtered)?;
        Ok(Self::new(BufReader::new(file), path, sample, filtered))
    }
}

impl<R: BufRead> IndexReader<R> {
    /// Wrap an existing reader; `path` is only used in error messages
    pub fn new(
        reader: R,
        path: impl Into<PathBuf>,
        sample: impl Into<String>,
        filtered: bool,
    ) -> Self {
        Self {
            reader,
            path: path.into(),
            sample: sample.into(),
            filtered,
            line_number: 0,
            buffer: Vec::new(),
            failed: false,
        }
    }

    pub fn sample(&self) -> &str {
        &self.sample
    }

    pub fn filtered(&self) -> bool {
        self.filtered
    }
}

impl<R: BufRead> Iterator for IndexReader<R> {
    type Item = Result<IndexRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            self.buffer.clear();
            match self.reader.read_until(b'\n', &mut self.buffer) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => {
                    self.failed = true;
                    return Some(Err(QcError::Io(e)));
                }
            }
            self.line_number += 1;

            let line = match std::str::from_utf8(&self.buffer) {
                Ok(text) => text.trim_end_matches(['\n', '\r']),
                Err(_) => {
                    self.failed = true;
                    return Some(Err(QcError::parse(
                        &self.path,
                        self.line_number,
                        "row is not valid UTF-8",
                    )));
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            let result = IndexRecord::from_line(line, &self.sample, self.filtered)
                .map_err(|msg| QcError::parse(&self.path, self.line_number, msg));
            if result.is_err() {
                self.failed = true;
            }
            return Some(result);
        }
    }
}

/// Read every record from one index file
pub fn read_index<P: AsRef<Path>>(
    path: P,
    filtered: bool,
    naming: &NamingConvention,
) -> Result<Vec<IndexRecord>> {
    let path = path.as_ref();
    let reader = IndexReader::open(path, filtered, naming)?;
    let records = reader.collect::<Result<Vec<_>>>()?;
    debug!(
        "Parsed {} records from {} (filtered={})",
        records.len(),
        path.display(),
        filtered
    );
    Ok(records)
}
