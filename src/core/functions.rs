// Aggregate functions evaluated over a chunk's values, and their filters

use crate::core::error::ConfigError;
use crate::core::stats;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A statistic reducing an ordered sequence of values to one number.
pub trait AggregateFunction: Send + Sync {
    fn evaluate(&self, values: &[f64]) -> f64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Mean;

impl AggregateFunction for Mean {
    fn evaluate(&self, values: &[f64]) -> f64 {
        stats::mean(values)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StandardDeviation;

impl AggregateFunction for StandardDeviation {
    fn evaluate(&self, values: &[f64]) -> f64 {
        stats::std_dev(values)
    }
}

/// Built-in functions selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionKind {
    Mean,
    StandardDeviation,
}

impl AggregateFunction for FunctionKind {
    fn evaluate(&self, values: &[f64]) -> f64 {
        match self {
            FunctionKind::Mean => Mean.evaluate(values),
            FunctionKind::StandardDeviation => StandardDeviation.evaluate(values),
        }
    }
}

/// Which result of a function a filter verdict refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Raw,
    Corrected,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Raw => write!(f, "raw"),
            ValueKind::Corrected => write!(f, "corrected"),
        }
    }
}

/// One configured aggregate function with its acceptance bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub label: String,
    pub kind: FunctionKind,
    /// Symmetric bound: reject if `|result| > filter`.
    #[serde(default)]
    pub filter: Option<f64>,
    #[serde(default)]
    pub filter_min: Option<f64>,
    #[serde(default)]
    pub filter_max: Option<f64>,
    /// Whether the result over raw values can drop a chunk.
    #[serde(default)]
    pub apply_to_raw: bool,
    /// Whether the result over corrected values can drop a chunk.
    #[serde(default)]
    pub apply_to_corrected: bool,
}

impl FunctionSpec {
    pub fn new(label: impl Into<String>, kind: FunctionKind) -> Self {
        Self {
            label: label.into(),
            kind,
            filter: None,
            filter_min: None,
            filter_max: None,
            apply_to_raw: false,
            apply_to_corrected: false,
        }
    }

    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.kind.evaluate(values)
    }

    /// True when `result` violates any configured bound.
    pub fn rejects(&self, result: f64) -> bool {
        if let Some(limit) = self.filter {
            if result.abs() > limit {
                return true;
            }
        }
        if let Some(min) = self.filter_min {
            if result < min {
                return true;
            }
        }
        if let Some(max) = self.filter_max {
            if result > max {
                return true;
            }
        }
        false
    }

    /// True when the filter is switched on for this kind of result.
    pub fn applies_to(&self, kind: ValueKind) -> bool {
        match kind {
            ValueKind::Raw => self.apply_to_raw,
            ValueKind::Corrected => self.apply_to_corrected,
        }
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidFilter {
            label: self.label.clone(),
            reason: reason.to_string(),
        };

        if self.label.trim().is_empty() {
            return Err(invalid("label must not be empty"));
        }
        if let Some(limit) = self.filter {
            if !limit.is_finite() || limit < 0.0 {
                return Err(invalid("filter must be a finite non-negative number"));
            }
        }
        for bound in [self.filter_min, self.filter_max].into_iter().flatten() {
            if !bound.is_finite() {
                return Err(invalid("filter_min/filter_max must be finite"));
            }
        }
        if let (Some(min), Some(max)) = (self.filter_min, self.filter_max) {
            if min > max {
                return Err(invalid("filter_min is greater than filter_max"));
            }
        }
        Ok(())
    }
}
