// A single measurement sweep and its per-chunk statistics

use crate::core::diagnostics::{DropDiagnostic, DropRule};
use crate::core::format::Row;
use crate::core::functions::{FunctionSpec, ValueKind};
use crate::core::stats;
use crate::models::config::BaselineConfig;
use tracing::{debug, info};

/// One contiguous run of rows sharing a chunk id.
///
/// Timestamps are stored relative to the first row. After the chunk is handed
/// to a [`Dataset`](crate::core::dataset::Dataset) only the drop flags and the
/// derived statistics change.
#[derive(Debug, Clone, Default)]
pub struct Chunk {
    id: Option<i64>,
    base_timestamp: Option<f64>,
    timestamps: Vec<f64>,
    values: Vec<f64>,
    corrected_values: Vec<f64>,

    head_average: Option<f64>,
    tail_average: Option<f64>,

    dropped: bool,
    malformed: bool,
    drop_rule: Option<DropRule>,

    function_results: Vec<f64>,
    function_results_corrected: Vec<f64>,
}

impl Chunk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a chunk from parallel timestamp and value slices, all rows carrying `id`.
    pub fn from_values(id: i64, timestamps: &[f64], values: &[f64]) -> Self {
        let mut chunk = Self::new();
        for (ts, v) in timestamps.iter().zip(values) {
            chunk.push(&Row::new(id, *ts, *v));
        }
        chunk
    }

    /// True if `chunk_id` continues this chunk (or the chunk has no id yet).
    pub fn accepts(&self, chunk_id: i64) -> bool {
        self.id.map_or(true, |id| id == chunk_id)
    }

    /// Appends a row. The caller checks [`accepts`](Self::accepts) first.
    pub fn push(&mut self, row: &Row) {
        debug_assert!(self.accepts(row.chunk_id));
        self.id = Some(row.chunk_id);
        let base = *self.base_timestamp.get_or_insert(row.timestamp);
        self.timestamps.push(row.timestamp - base);
        self.values.push(row.value);
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    /// Id for reporting; an empty chunk reports 0.
    fn id_or_zero(&self) -> i64 {
        self.id.unwrap_or_default()
    }

    pub fn base_timestamp(&self) -> Option<f64> {
        self.base_timestamp
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn timestamps(&self) -> &[f64] {
        &self.timestamps
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn corrected_values(&self) -> &[f64] {
        &self.corrected_values
    }

    pub fn head_average(&self) -> Option<f64> {
        self.head_average
    }

    pub fn tail_average(&self) -> Option<f64> {
        self.tail_average
    }

    pub fn is_dropped(&self) -> bool {
        self.dropped
    }

    pub fn is_malformed(&self) -> bool {
        self.malformed
    }

    /// The rule that dropped this chunk first, if any.
    pub fn drop_rule(&self) -> Option<&DropRule> {
        self.drop_rule.as_ref()
    }

    pub fn drop_diagnostic(&self) -> Option<DropDiagnostic> {
        self.drop_rule
            .clone()
            .map(|rule| DropDiagnostic::new(self.id_or_zero(), rule))
    }

    pub fn function_results(&self) -> &[f64] {
        &self.function_results
    }

    pub fn function_results_corrected(&self) -> &[f64] {
        &self.function_results_corrected
    }

    /// Marks the chunk dropped. Returns false if it already was; the first
    /// rule stays the recorded reason.
    pub fn mark_dropped(&mut self, rule: DropRule) -> bool {
        if self.dropped {
            debug!(
                "Chunk no {} already dropped, ignoring {}",
                self.id_or_zero(),
                rule
            );
            return false;
        }
        let diagnostic = DropDiagnostic::new(self.id_or_zero(), rule.clone());
        info!("{}", diagnostic);
        self.dropped = true;
        self.drop_rule = Some(rule);
        true
    }

    /// Flags a row-count mismatch. Malformed chunks are always dropped.
    pub fn mark_malformed(&mut self, expected: usize) {
        self.malformed = true;
        self.mark_dropped(DropRule::LengthMismatch {
            expected,
            actual: self.len(),
        });
    }

    /// Computes head and tail averages and applies the drift rule.
    ///
    /// Windows longer than the chunk average over the rows available.
    pub fn compute_averages(&mut self, config: &BaselineConfig) {
        let head = stats::head_mean(&self.values, config.head_len);
        let tail = stats::tail_mean(&self.values, config.tail_len);
        self.head_average = Some(head);
        self.tail_average = Some(tail);

        let difference = (head - tail).abs();
        if config.drop_on_drift && difference > config.drift_threshold {
            self.mark_dropped(DropRule::Drift {
                difference,
                threshold: config.drift_threshold,
            });
        }
    }

    /// Subtracts the head average from every value, rounded to 5 places.
    pub fn correct_baseline(&mut self, config: &BaselineConfig) {
        let head = match self.head_average {
            Some(head) => head,
            None => {
                self.compute_averages(config);
                self.head_average.unwrap_or(f64::NAN)
            }
        };
        self.corrected_values = self
            .values
            .iter()
            .map(|v| stats::round5(v - head))
            .collect();
    }

    /// Runs baseline correction and every aggregate function.
    ///
    /// Results are stored whether or not the chunk ends up dropped.
    pub fn compute(&mut self, baseline: &BaselineConfig, functions: &[FunctionSpec]) {
        self.correct_baseline(baseline);

        self.function_results.clear();
        self.function_results_corrected.clear();

        for function in functions {
            let raw = function.evaluate(&self.values);
            self.apply_filter(function, ValueKind::Raw, raw);
            self.function_results.push(raw);

            let corrected = function.evaluate(&self.corrected_values);
            self.apply_filter(function, ValueKind::Corrected, corrected);
            self.function_results_corrected.push(corrected);
        }
    }

    fn apply_filter(&mut self, function: &FunctionSpec, target: ValueKind, result: f64) {
        if self.dropped || !function.applies_to(target) || !function.rejects(result) {
            return;
        }
        self.mark_dropped(DropRule::Filter {
            label: function.label.clone(),
            target,
            result,
        });
    }
}
