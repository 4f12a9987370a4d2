use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::error::ConfigError;
use crate::core::functions::{FunctionKind, FunctionSpec};

/// Run configuration, built once at startup and shared read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub baseline: BaselineConfig,
    pub range: RangeConfig,
    pub functions: Vec<FunctionSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub directory: PathBuf,
    pub delimiter: char,
    /// Each input file starts with a header row.
    pub headers: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path prefix for every output file.
    pub name: PathBuf,
    pub plot_title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineConfig {
    /// Leading rows averaged into the baseline.
    pub head_len: usize,
    pub tail_len: usize,
    pub drop_on_drift: bool,
    pub drift_threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeConfig {
    pub chunk_min: i64,
    pub chunk_max: i64,
    pub enabled: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("data"),
            delimiter: ';',
            headers: true,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            name: PathBuf::from("output").join("output"),
            plot_title: "noise P=-200m #1 aver:1300pts".to_string(),
        }
    }
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            head_len: 650,
            tail_len: 10,
            drop_on_drift: false,
            drift_threshold: 0.01,
        }
    }
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            chunk_min: 0,
            chunk_max: 300,
            enabled: false,
        }
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        let mut std_dev = FunctionSpec::new("Standard deviation", FunctionKind::StandardDeviation);
        std_dev.filter = Some(0.018);

        let mut mean = FunctionSpec::new("Arithmetic mean", FunctionKind::Mean);
        mean.filter_min = Some(-1.0);
        mean.filter_max = Some(0.0);
        mean.apply_to_corrected = true;

        Self {
            input: InputConfig::default(),
            output: OutputConfig::default(),
            baseline: BaselineConfig::default(),
            range: RangeConfig::default(),
            functions: vec![std_dev, mean],
        }
    }
}

impl SweepConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.baseline.head_len == 0 {
            return Err(ConfigError::ZeroHeadWindow);
        }
        if self.baseline.tail_len == 0 {
            return Err(ConfigError::ZeroTailWindow);
        }
        let threshold = self.baseline.drift_threshold;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(ConfigError::InvalidDriftThreshold(threshold));
        }
        if self.range.chunk_min > self.range.chunk_max {
            return Err(ConfigError::InvalidChunkRange {
                min: self.range.chunk_min,
                max: self.range.chunk_max,
            });
        }
        if self.functions.is_empty() {
            return Err(ConfigError::NoFunctions);
        }
        for function in &self.functions {
            function.validate()?;
        }
        self.input_delimiter()?;
        Ok(())
    }

    /// The input delimiter as the single byte the CSV reader expects.
    pub fn input_delimiter(&self) -> Result<u8, ConfigError> {
        let c = self.input.delimiter;
        if c.is_ascii() {
            Ok(c as u8)
        } else {
            Err(ConfigError::InvalidDelimiter(c))
        }
    }

    pub fn function_labels(&self) -> impl Iterator<Item = &str> {
        self.functions.iter().map(|f| f.label.as_str())
    }
}
