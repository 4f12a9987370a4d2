// Row sources: ordered (chunk_id, timestamp, value) streams

use crate::core::compression::{open_decompressed, CompressionType};
use crate::core::constants::*;
use crate::core::error::{Result, SweepError};
use crate::core::format::Row;
use crate::models::config::SweepConfig;
use csv::StringRecord;
use std::collections::VecDeque;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// Produces rows in input order. Rows sharing a chunk id must be contiguous.
pub trait RowSource {
    fn next_row(&mut self) -> Result<Option<Row>>;
}

/// Rows already held in memory.
pub struct MemoryRows {
    rows: std::vec::IntoIter<Row>,
}

impl From<Vec<Row>> for MemoryRows {
    fn from(rows: Vec<Row>) -> Self {
        Self {
            rows: rows.into_iter(),
        }
    }
}

impl RowSource for MemoryRows {
    fn next_row(&mut self) -> Result<Option<Row>> {
        Ok(self.rows.next())
    }
}

/// Lists the input tables of `dir` (`*.csv`, optionally compressed), sorted.
pub fn discover_inputs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_input_table(&path) {
            files.push(path);
        }
    }
    files.sort();
    info!("Files to read: {:?}", files);
    Ok(files)
}

fn is_input_table(path: &Path) -> bool {
    let inner = match CompressionType::from_path(path) {
        CompressionType::None => path.to_path_buf(),
        _ => path.with_extension(""),
    };
    inner
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(INPUT_EXTENSION))
}

struct OpenTable {
    name: String,
    reader: csv::Reader<Box<dyn Read>>,
}

/// Reads a list of delimited tables back to back as one row stream.
///
/// A chunk may continue from one file into the next. Empty lines are skipped
/// by the csv reader and never reach row parsing; a line holding only
/// delimiters or whitespace is still a row and fails as malformed.
pub struct CsvDirectorySource {
    pending: VecDeque<PathBuf>,
    current: Option<OpenTable>,
    record: StringRecord,
    delimiter: u8,
    headers: bool,
}

impl CsvDirectorySource {
    pub fn new(files: Vec<PathBuf>, config: &SweepConfig) -> Result<Self> {
        Ok(Self {
            pending: files.into(),
            current: None,
            record: StringRecord::new(),
            delimiter: config.input_delimiter()?,
            headers: config.input.headers,
        })
    }

    /// Opens every table found in the configured input directory.
    pub fn from_config(config: &SweepConfig) -> Result<Self> {
        let files = discover_inputs(&config.input.directory)?;
        Self::new(files, config)
    }

    fn open_next(&mut self) -> Result<bool> {
        let Some(path) = self.pending.pop_front() else {
            return Ok(false);
        };
        info!("Opening file: {}", path.display());

        let reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(self.headers)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(open_decompressed(&path)?);

        self.current = Some(OpenTable {
            name: path.display().to_string(),
            reader,
        });
        Ok(true)
    }
}

impl RowSource for CsvDirectorySource {
    fn next_row(&mut self) -> Result<Option<Row>> {
        loop {
            if self.current.is_none() && !self.open_next()? {
                return Ok(None);
            }

            if let Some(table) = self.current.as_mut() {
                if table.reader.read_record(&mut self.record)? {
                    let line = self.record.position().map_or(0, |p| p.line());
                    return parse_record(&self.record, &table.name, line).map(Some);
                }
                debug!("Finished file: {}", table.name);
            }
            self.current = None;
        }
    }
}

fn parse_record(record: &StringRecord, source_name: &str, line: u64) -> Result<Row> {
    let malformed = |message: String| SweepError::MalformedInput {
        source_name: source_name.to_string(),
        line,
        message,
    };

    if record.len() < REQUIRED_COLUMNS {
        return Err(malformed(format!(
            "expected {} columns, got {}",
            REQUIRED_COLUMNS,
            record.len()
        )));
    }

    let field = |idx: usize| record.get(idx).unwrap_or_default();
    let parse = |idx: usize, name: &str| -> Result<f64> {
        f64::from_str(field(idx))
            .map_err(|e| malformed(format!("invalid {} {:?}: {}", name, field(idx), e)))
    };

    let chunk_id = i64::from_str(field(COLUMN_CHUNK_ID))
        .map_err(|e| malformed(format!("invalid chunk id {:?}: {}", field(COLUMN_CHUNK_ID), e)))?;

    Ok(Row {
        chunk_id,
        timestamp: parse(COLUMN_TIMESTAMP, "timestamp")?,
        value: parse(COLUMN_VALUE, "value")?,
    })
}
