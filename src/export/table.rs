// Tabular export of kept chunks and their averages

use crate::core::chunk::Chunk;
use crate::core::constants::*;
use crate::core::dataset::Dataset;
use crate::core::error::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Raw,
    Corrected,
}

impl TableKind {
    pub const ALL: [TableKind; 2] = [TableKind::Raw, TableKind::Corrected];

    pub fn suffix(&self) -> &'static str {
        match self {
            TableKind::Raw => RAW_TABLE_SUFFIX,
            TableKind::Corrected => CORRECTED_TABLE_SUFFIX,
        }
    }

    fn values<'a>(&self, chunk: &'a Chunk) -> &'a [f64] {
        match self {
            TableKind::Raw => chunk.values(),
            TableKind::Corrected => chunk.corrected_values(),
        }
    }

    fn results<'a>(&self, chunk: &'a Chunk) -> &'a [f64] {
        match self {
            TableKind::Raw => chunk.function_results(),
            TableKind::Corrected => chunk.function_results_corrected(),
        }
    }

    fn average<'a>(&self, dataset: &'a Dataset) -> &'a [f64] {
        match self {
            TableKind::Raw => dataset.avg_raw(),
            TableKind::Corrected => dataset.avg_corrected(),
        }
    }

    /// Lays the dataset out one column per kept chunk.
    ///
    /// The first column holds the time axis followed by the function labels,
    /// the last column the cross-chunk average.
    pub fn build(&self, dataset: &Dataset) -> Table {
        let labels: Vec<String> = dataset
            .config()
            .function_labels()
            .map(str::to_string)
            .collect();

        let mut columns: Vec<Vec<String>> = Vec::new();

        let mut axis = vec![TABLE_CORNER_LABEL.to_string()];
        axis.extend(dataset.timestamps().iter().map(|t| format_number(*t)));
        axis.extend(labels.iter().cloned());
        columns.push(axis);

        for chunk in dataset.kept_chunks() {
            let mut column = vec![chunk.id().unwrap_or_default().to_string()];
            column.extend(self.values(chunk).iter().map(|v| format_number(*v)));
            column.extend(self.results(chunk).iter().map(|v| format_number(*v)));
            columns.push(column);
        }

        let mut average = vec![TABLE_AVERAGE_LABEL.to_string()];
        average.extend(self.average(dataset).iter().map(|v| format_number(*v)));
        average.extend(labels.iter().map(|_| String::new()));
        columns.push(average);

        Table::from_columns(columns)
    }
}

/// Shortest round-trip form; integral values print without `.0`.
fn format_number(value: f64) -> String {
    format!("{}", value)
}

/// Row-major table of string cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Transposes columns into rows, padding short columns with empty cells.
    pub fn from_columns(columns: Vec<Vec<String>>) -> Self {
        let height = columns.iter().map(Vec::len).max().unwrap_or(0);
        let rows = (0..height)
            .map(|r| {
                columns
                    .iter()
                    .map(|col| col.get(r).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();
        Self { rows }
    }
}

/// Destination for the raw and corrected tables.
pub trait TableSink {
    /// Stores `table`, returning the file it landed in if there is one.
    fn write(&mut self, kind: TableKind, table: &Table) -> Result<Option<PathBuf>>;
}

/// Writes `<prefix>.csv` and `<prefix>_corrected.csv`.
pub struct CsvTableWriter {
    prefix: PathBuf,
}

impl CsvTableWriter {
    pub fn new<P: AsRef<Path>>(prefix: P) -> Self {
        Self {
            prefix: prefix.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, kind: TableKind) -> PathBuf {
        let mut name = self.prefix.clone().into_os_string();
        name.push(kind.suffix());
        PathBuf::from(name)
    }
}

impl TableSink for CsvTableWriter {
    fn write(&mut self, kind: TableKind, table: &Table) -> Result<Option<PathBuf>> {
        let path = self.path_for(kind);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut writer = csv::WriterBuilder::new()
            .delimiter(TABLE_DELIMITER)
            .flexible(true)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_path(&path)?;
        for row in &table.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;

        info!("Table written: {}", path.display());
        Ok(Some(path))
    }
}
