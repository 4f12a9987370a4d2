// Ordered chunk collection, acceptance filtering and cross-chunk averages

use crate::core::chunk::Chunk;
use crate::core::diagnostics::{DropDiagnostic, DropRule};
use crate::core::error::{Result, SweepError};
use crate::core::stats;
use crate::models::config::SweepConfig;
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, info};

pub struct Dataset {
    config: Arc<SweepConfig>,
    chunks: Vec<Chunk>,
    reference_length: Option<usize>,

    avg_raw: Vec<f64>,
    avg_corrected: Vec<f64>,
    avg_corrected_all: Vec<f64>,
}

impl Dataset {
    pub fn new(config: Arc<SweepConfig>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            chunks: Vec::new(),
            reference_length: None,
            avg_raw: Vec::new(),
            avg_corrected: Vec::new(),
            avg_corrected_all: Vec::new(),
        })
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Runs the acceptance gates on a finished chunk and stores it.
    ///
    /// Gates only ever set `dropped`. The chunk is kept either way so it can
    /// still take part in the all-chunks average.
    pub fn add_chunk(&mut self, mut chunk: Chunk) {
        let len = chunk.len();

        // Length consistency against the first chunk
        match self.reference_length {
            Some(expected) if expected != len => chunk.mark_malformed(expected),
            Some(_) => {}
            None => self.reference_length = Some(len),
        }

        // Chunk id range
        let range = &self.config.range;
        if let Some(id) = chunk.id() {
            if range.enabled && (id < range.chunk_min || id > range.chunk_max) {
                chunk.mark_dropped(DropRule::OutOfRange {
                    min: range.chunk_min,
                    max: range.chunk_max,
                });
            }
        }

        info!("Saving chunk no: {}", chunk.id().unwrap_or_default());
        self.chunks.push(chunk);
    }

    /// Per-chunk statistics for every chunk, then the three column-wise means.
    pub fn compute_chunks(&mut self) -> Result<()> {
        let config = Arc::clone(&self.config);
        self.chunks
            .par_iter_mut()
            .for_each(|chunk| chunk.compute(&config.baseline, &config.functions));

        self.avg_raw = self.column_means(|c| !c.is_dropped(), Chunk::values)?;
        self.avg_corrected = self.column_means(|c| !c.is_dropped(), Chunk::corrected_values)?;
        self.avg_corrected_all =
            self.column_means(|c| !c.is_malformed(), Chunk::corrected_values)?;

        debug!(
            "Computed averages over {} kept and {} well-formed chunks",
            self.kept_chunks().count(),
            self.chunks.iter().filter(|c| !c.is_malformed()).count()
        );
        Ok(())
    }

    fn column_means<F, V>(&self, include: F, values: V) -> Result<Vec<f64>>
    where
        F: Fn(&Chunk) -> bool,
        V: Fn(&Chunk) -> &[f64],
    {
        let included: Vec<&Chunk> = self.chunks.iter().filter(|&c| include(c)).collect();
        stats::column_means(included.iter().map(|&c| values(c))).map_err(|(idx, actual)| {
            SweepError::InconsistentLength {
                chunk_id: included[idx].id().unwrap_or_default(),
                expected: values(included[0]).len(),
                actual,
            }
        })
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Chunks not dropped by any rule.
    pub fn kept_chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.iter().filter(|c| !c.is_dropped())
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn reference_length(&self) -> Option<usize> {
        self.reference_length
    }

    /// Timestamps of the first chunk, used as the shared time axis.
    pub fn timestamps(&self) -> &[f64] {
        self.chunks.first().map(Chunk::timestamps).unwrap_or(&[])
    }

    pub fn avg_raw(&self) -> &[f64] {
        &self.avg_raw
    }

    pub fn avg_corrected(&self) -> &[f64] {
        &self.avg_corrected
    }

    pub fn avg_corrected_all(&self) -> &[f64] {
        &self.avg_corrected_all
    }

    /// One diagnostic per dropped chunk, naming the first rule that fired.
    pub fn diagnostics(&self) -> Vec<DropDiagnostic> {
        self.chunks.iter().filter_map(Chunk::drop_diagnostic).collect()
    }
}
