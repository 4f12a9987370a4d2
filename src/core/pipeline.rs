// Drives a full run: rows -> chunks -> dataset -> exporters

use crate::core::accumulator::ChunkAccumulator;
use crate::core::dataset::Dataset;
use crate::core::diagnostics::DropDiagnostic;
use crate::core::error::{Result, SweepError};
use crate::core::reader::{CsvDirectorySource, RowSource};
use crate::export::chart::{ChartKind, ChartSink};
use crate::export::table::{TableKind, TableSink};
use crate::models::config::SweepConfig;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Reads every row from `source` into a dataset of accepted/dropped chunks.
pub fn ingest<S: RowSource + ?Sized>(source: &mut S, config: Arc<SweepConfig>) -> Result<Dataset> {
    let mut dataset = Dataset::new(Arc::clone(&config))?;
    let mut accumulator = ChunkAccumulator::new(config)?;

    while let Some(row) = source.next_row()? {
        if let Some(chunk) = accumulator.push(row) {
            dataset.add_chunk(chunk);
        }
    }
    if let Some(chunk) = accumulator.finish() {
        dataset.add_chunk(chunk);
    }

    Ok(dataset)
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub chunks_read: usize,
    pub chunks_kept: usize,
    pub chunks_dropped: usize,
    pub chunks_malformed: usize,
    pub diagnostics: Vec<DropDiagnostic>,
    /// Files produced by the sinks, in write order.
    pub files_written: Vec<PathBuf>,
}

impl RunSummary {
    pub fn from_dataset(dataset: &Dataset, files_written: Vec<PathBuf>) -> Self {
        let chunks = dataset.chunks();
        Self {
            chunks_read: chunks.len(),
            chunks_kept: dataset.kept_chunks().count(),
            chunks_dropped: chunks.iter().filter(|c| c.is_dropped()).count(),
            chunks_malformed: chunks.iter().filter(|c| c.is_malformed()).count(),
            diagnostics: dataset.diagnostics(),
            files_written,
        }
    }
}

/// Ingests, computes and exports. Charts are skipped when `charts` is `None`.
pub fn process<S: RowSource + ?Sized>(
    source: &mut S,
    config: Arc<SweepConfig>,
    tables: &mut dyn TableSink,
    charts: Option<&mut dyn ChartSink>,
) -> Result<(Dataset, RunSummary)> {
    let mut dataset = ingest(source, config)?;
    if dataset.is_empty() {
        return Err(SweepError::NoChunks);
    }
    dataset.compute_chunks()?;

    let mut files_written = Vec::new();
    for kind in TableKind::ALL {
        files_written.extend(tables.write(kind, &kind.build(&dataset))?);
    }

    if let Some(charts) = charts {
        for kind in ChartKind::ALL {
            files_written.extend(charts.render(kind, &kind.build(&dataset))?);
        }
    }

    let summary = RunSummary::from_dataset(&dataset, files_written);
    info!(
        "chunks saved: {} of {} ({} dropped, {} malformed), {} files written",
        summary.chunks_kept,
        summary.chunks_read,
        summary.chunks_dropped,
        summary.chunks_malformed,
        summary.files_written.len()
    );
    Ok((dataset, summary))
}

/// Runs over the configured input directory.
pub fn run(
    config: Arc<SweepConfig>,
    tables: &mut dyn TableSink,
    charts: Option<&mut dyn ChartSink>,
) -> Result<RunSummary> {
    let mut source = CsvDirectorySource::from_config(&config)?;
    let (_, summary) = process(&mut source, config, tables, charts)?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::format::Row;
    use crate::core::reader::MemoryRows;
    use crate::export::chart::{Chart, JsonChartWriter};
    use crate::export::table::{CsvTableWriter, Table};

    #[derive(Default)]
    struct Recorder {
        tables: Vec<(TableKind, Table)>,
        charts: Vec<(ChartKind, Chart)>,
    }

    impl TableSink for Recorder {
        fn write(&mut self, kind: TableKind, table: &Table) -> Result<Option<PathBuf>> {
            self.tables.push((kind, table.clone()));
            Ok(None)
        }
    }

    impl ChartSink for Recorder {
        fn render(&mut self, kind: ChartKind, chart: &Chart) -> Result<Option<PathBuf>> {
            self.charts.push((kind, chart.clone()));
            Ok(None)
        }
    }

    fn config() -> Arc<SweepConfig> {
        let mut config = SweepConfig::default();
        config.baseline.head_len = 1;
        config.baseline.tail_len = 1;
        Arc::new(config)
    }

    fn rows(raw: &[(i64, f64, f64)]) -> MemoryRows {
        MemoryRows::from(raw.iter().copied().map(Row::from).collect::<Vec<_>>())
    }

    #[test]
    fn test_ingest_boundary_scenario() {
        let mut source = rows(&[(1, 0.0, 1.0), (1, 1.0, 1.2), (2, 0.0, 2.0), (2, 1.0, 2.2)]);
        let dataset = ingest(&mut source, config()).unwrap();

        assert_eq!(dataset.len(), 2);
        let ids: Vec<_> = dataset.chunks().iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec![Some(1), Some(2)]);
        for chunk in dataset.chunks() {
            assert_eq!(chunk.timestamps(), &[0.0, 1.0]);
        }
    }

    #[test]
    fn test_process_feeds_every_sink() {
        let mut source = rows(&[
            (1, 0.0, 0.1),
            (1, 1.0, 0.1),
            (2, 0.0, 0.2),
            (2, 1.0, 0.2),
            (3, 0.0, 0.3),
        ]);
        let mut tables = Recorder::default();
        let mut charts = Recorder::default();

        let (dataset, summary) =
            process(&mut source, config(), &mut tables, Some(&mut charts)).unwrap();

        assert_eq!(summary.chunks_read, 3);
        assert_eq!(summary.chunks_malformed, 1);
        assert_eq!(summary.chunks_kept, 2);
        assert_eq!(summary.diagnostics.len(), 1);
        assert_eq!(summary.diagnostics[0].chunk_id, 3);
        assert_eq!(dataset.avg_raw(), &[0.15, 0.15]);

        assert_eq!(tables.tables.len(), 2);
        assert_eq!(charts.charts.len(), ChartKind::ALL.len());
        assert!(summary.files_written.is_empty());
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let mut source = rows(&[]);
        let mut tables = Recorder::default();
        let result = process(&mut source, config(), &mut tables, None);
        assert!(matches!(result, Err(SweepError::NoChunks)));
        assert!(tables.tables.is_empty());
    }

    #[test]
    fn test_run_writes_files() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        std::fs::write(
            input.path().join("run1.csv"),
            "chunk;time;value\n1;10;1.0\n1;11;0.5\n2;20;2.0\n2;21;1.5\n",
        )
        .unwrap();

        let mut cfg = (*config()).clone();
        cfg.input.directory = input.path().to_path_buf();
        cfg.output.name = output.path().join("result");
        let cfg = Arc::new(cfg);

        let mut tables = CsvTableWriter::new(&cfg.output.name);
        let mut charts = JsonChartWriter::new(&cfg.output.name);
        let summary = run(Arc::clone(&cfg), &mut tables, Some(&mut charts)).unwrap();
        assert_eq!(summary.chunks_kept, 2);

        let raw = std::fs::read_to_string(output.path().join("result.csv")).unwrap();
        let first_line = raw.lines().next().unwrap();
        assert_eq!(first_line, "timestamps\\chunk,1,2,average");
        assert!(output.path().join("result_corrected.csv").exists());
        assert!(output.path().join("result_average.json").exists());
        assert!(output.path().join("result_functions.json").exists());

        assert_eq!(summary.files_written.len(), 7);
        assert_eq!(summary.files_written[0], output.path().join("result.csv"));
        assert_eq!(summary.files_written[1], output.path().join("result_corrected.csv"));
        assert!(summary
            .files_written
            .contains(&output.path().join("result_all_corrected.json")));
        assert!(summary.files_written.iter().all(|p| p.exists()));
    }

    #[test]
    fn test_run_without_charts_lists_tables_only() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        std::fs::write(input.path().join("run1.csv"), "h;h;h\n1;0;1.0\n1;1;0.5\n").unwrap();

        let mut cfg = (*config()).clone();
        cfg.input.directory = input.path().to_path_buf();
        cfg.output.name = output.path().join("result");
        let cfg = Arc::new(cfg);

        let mut tables = CsvTableWriter::new(&cfg.output.name);
        let summary = run(Arc::clone(&cfg), &mut tables, None).unwrap();
        assert_eq!(
            summary.files_written,
            vec![output.path().join("result.csv"), output.path().join("result_corrected.csv")]
        );
        assert!(!output.path().join("result_all.json").exists());
    }

    #[test]
    fn test_chunk_continues_across_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.csv"), "chunk;time;value\n1;10;1.0\n1;11;0.8\n").unwrap();
        std::fs::write(
            dir.path().join("b.csv"),
            "chunk;time;value\n1;12;0.6\n2;20;2.0\n2;21;1.9\n2;22;1.8\n",
        )
        .unwrap();

        let mut cfg = (*config()).clone();
        cfg.input.directory = dir.path().to_path_buf();
        let cfg = Arc::new(cfg);

        let mut source = CsvDirectorySource::from_config(&cfg).unwrap();
        let dataset = ingest(&mut source, cfg).unwrap();

        assert_eq!(dataset.len(), 2);
        let first = &dataset.chunks()[0];
        assert_eq!(first.id(), Some(1));
        assert_eq!(first.len(), 3);
        assert_eq!(first.timestamps(), &[0.0, 1.0, 2.0]);
        assert_eq!(first.values(), &[1.0, 0.8, 0.6]);

        let second = &dataset.chunks()[1];
        assert_eq!(second.id(), Some(2));
        assert_eq!(second.timestamps(), &[0.0, 1.0, 2.0]);
        assert!(dataset.chunks().iter().all(|c| !c.is_dropped()));
    }
}
