// Chunk boundary detection over an ordered row stream

use crate::core::chunk::Chunk;
use crate::core::error::Result;
use crate::core::format::Row;
use crate::models::config::SweepConfig;
use std::mem;
use std::sync::Arc;
use tracing::debug;

/// Groups consecutive rows with the same chunk id into [`Chunk`]s.
///
/// Holds exactly one in-progress chunk. A row with a different id closes it:
/// its head/tail averages are computed and it is returned to the caller, and
/// the row starts the next chunk.
pub struct ChunkAccumulator {
    config: Arc<SweepConfig>,
    current: Chunk,
}

impl ChunkAccumulator {
    pub fn new(config: Arc<SweepConfig>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            current: Chunk::new(),
        })
    }

    /// Feeds one row. Returns the completed chunk when `row` starts a new one.
    pub fn push(&mut self, row: Row) -> Option<Chunk> {
        if self.current.accepts(row.chunk_id) {
            self.current.push(&row);
            return None;
        }

        let completed = self.close_current();
        self.current.push(&row);
        Some(completed)
    }

    /// Flushes the last chunk at end of input. `None` if no row was ever seen.
    pub fn finish(mut self) -> Option<Chunk> {
        if self.current.is_empty() {
            return None;
        }
        Some(self.close_current())
    }

    fn close_current(&mut self) -> Chunk {
        let mut chunk = mem::take(&mut self.current);
        chunk.compute_averages(&self.config.baseline);
        debug!(
            "Chunk {:?} closed with {} rows",
            chunk.id(),
            chunk.len()
        );
        chunk
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accumulate(config: SweepConfig, rows: &[(i64, f64, f64)]) -> Vec<Chunk> {
        let mut acc = ChunkAccumulator::new(Arc::new(config)).unwrap();
        let mut chunks: Vec<Chunk> = rows
            .iter()
            .filter_map(|r| acc.push(Row::from(*r)))
            .collect();
        chunks.extend(acc.finish());
        chunks
    }

    #[test]
    fn test_two_chunks() {
        let rows = [(1, 0.0, 1.0), (1, 1.0, 1.2), (2, 0.0, 2.0), (2, 1.0, 2.2)];
        let chunks = accumulate(SweepConfig::default(), &rows);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].id(), Some(1));
        assert_eq!(chunks[1].id(), Some(2));
        for chunk in &chunks {
            assert_eq!(chunk.len(), 2);
            assert_eq!(chunk.timestamps(), &[0.0, 1.0]);
            assert!(chunk.head_average().is_some());
        }
    }

    #[test]
    fn test_ids_need_only_be_contiguous() {
        let rows = [(5, 0.0, 1.0), (3, 0.0, 1.0), (3, 1.0, 1.0), (5, 7.0, 1.0)];
        let chunks = accumulate(SweepConfig::default(), &rows);
        let ids: Vec<_> = chunks.iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec![Some(5), Some(3), Some(5)]);
        assert_eq!(chunks[2].timestamps(), &[0.0]);
    }

    #[test]
    fn test_empty_input() {
        let chunks = accumulate(SweepConfig::default(), &[]);
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_last_chunk_flushed_with_drift_check() {
        let mut config = SweepConfig::default();
        config.baseline.head_len = 1;
        config.baseline.tail_len = 1;
        config.baseline.drop_on_drift = true;

        let chunks = accumulate(config, &[(1, 0.0, 0.0), (1, 1.0, 0.5)]);
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].is_dropped());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = SweepConfig::default();
        config.baseline.head_len = 0;
        assert!(ChunkAccumulator::new(Arc::new(config)).is_err());
    }
}
