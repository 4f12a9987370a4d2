// Chart-series export: the data behind each plot, without styling

use crate::core::chunk::Chunk;
use crate::core::constants::*;
use crate::core::dataset::Dataset;
use crate::core::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// Raw values of every kept chunk plus their average.
    All,
    /// Corrected values of every kept chunk plus their average.
    AllCorrected,
    /// Corrected average against the all-chunks corrected average.
    Average,
    /// Corrected function results per chunk id.
    FunctionsCorrected,
    /// Raw function results per chunk id.
    Functions,
}

impl ChartKind {
    pub const ALL: [ChartKind; 5] = [
        ChartKind::All,
        ChartKind::AllCorrected,
        ChartKind::Average,
        ChartKind::FunctionsCorrected,
        ChartKind::Functions,
    ];

    pub fn suffix(&self) -> &'static str {
        match self {
            ChartKind::All => CHART_ALL_SUFFIX,
            ChartKind::AllCorrected => CHART_ALL_CORRECTED_SUFFIX,
            ChartKind::Average => CHART_AVERAGE_SUFFIX,
            ChartKind::FunctionsCorrected => CHART_FUNCTIONS_CORRECTED_SUFFIX,
            ChartKind::Functions => CHART_FUNCTIONS_SUFFIX,
        }
    }

    pub fn build(&self, dataset: &Dataset) -> Chart {
        let title = &dataset.config().output.plot_title;
        match self {
            ChartKind::All => overlay(dataset, title, Chunk::values, dataset.avg_raw()),
            ChartKind::AllCorrected => overlay(
                dataset,
                title,
                Chunk::corrected_values,
                dataset.avg_corrected(),
            ),
            ChartKind::Average => {
                let x = dataset.timestamps().to_vec();
                Chart::new(title.clone(), "timestamps", "values")
                    .with_series(Series::highlighted("average", x.clone(), dataset.avg_corrected().to_vec()))
                    .with_series(Series::highlighted(
                        "average all",
                        x,
                        dataset.avg_corrected_all().to_vec(),
                    ))
            }
            ChartKind::FunctionsCorrected => {
                per_function(dataset, title.clone(), Chunk::function_results_corrected)
            }
            ChartKind::Functions => per_function(
                dataset,
                format!("{} not corrected !!", title),
                Chunk::function_results,
            ),
        }
    }
}

fn overlay(dataset: &Dataset, title: &str, values: fn(&Chunk) -> &[f64], average: &[f64]) -> Chart {
    let mut chart = Chart::new(title.to_string(), "timestamps", "values");
    for chunk in dataset.kept_chunks() {
        chart.series.push(Series {
            label: None,
            x: chunk.timestamps().to_vec(),
            y: values(chunk).to_vec(),
            highlight: false,
        });
    }
    chart.with_series(Series::highlighted(
        "averages",
        dataset.timestamps().to_vec(),
        average.to_vec(),
    ))
}

fn per_function(dataset: &Dataset, title: String, results: fn(&Chunk) -> &[f64]) -> Chart {
    let ids: Vec<f64> = dataset
        .kept_chunks()
        .map(|c| c.id().unwrap_or_default() as f64)
        .collect();

    let mut chart = Chart::new(title, "chunks", "values");
    for (idx, label) in dataset.config().function_labels().enumerate() {
        let y = dataset
            .kept_chunks()
            .map(|c| results(c).get(idx).copied().unwrap_or(f64::NAN))
            .collect();
        chart.series.push(Series {
            label: Some(label.to_string()),
            x: ids.clone(),
            y,
            highlight: false,
        });
    }
    chart
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub label: Option<String>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub highlight: bool,
}

impl Series {
    fn highlighted(label: &str, x: Vec<f64>, y: Vec<f64>) -> Self {
        Self {
            label: Some(label.to_string()),
            x,
            y,
            highlight: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
    pub generated_at: DateTime<Utc>,
}

impl Chart {
    pub fn new(title: String, x_label: &str, y_label: &str) -> Self {
        Self {
            title,
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            series: Vec::new(),
            generated_at: Utc::now(),
        }
    }

    fn with_series(mut self, series: Series) -> Self {
        self.series.push(series);
        self
    }
}

/// Destination for chart series.
pub trait ChartSink {
    /// Renders `chart`, returning the file it landed in if there is one.
    fn render(&mut self, kind: ChartKind, chart: &Chart) -> Result<Option<PathBuf>>;
}

/// Writes each chart as `<prefix><suffix>.json` for an external plotter.
pub struct JsonChartWriter {
    prefix: PathBuf,
}

impl JsonChartWriter {
    pub fn new<P: AsRef<Path>>(prefix: P) -> Self {
        Self {
            prefix: prefix.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, kind: ChartKind) -> PathBuf {
        let mut name = self.prefix.clone().into_os_string();
        name.push(kind.suffix());
        name.push(".");
        name.push(CHART_EXTENSION);
        PathBuf::from(name)
    }
}

impl ChartSink for JsonChartWriter {
    fn render(&mut self, kind: ChartKind, chart: &Chart) -> Result<Option<PathBuf>> {
        let path = self.path_for(kind);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(writer, chart)?;
        info!("Chart written: {}", path.display());
        Ok(Some(path))
    }
}
