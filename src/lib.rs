// Sweep averager
// Library entry point

pub mod core;
pub mod export;
pub mod models;
pub mod utils;

// Re-export main types
pub use crate::core::accumulator::ChunkAccumulator;
pub use crate::core::chunk::Chunk;
pub use crate::core::dataset::Dataset;
pub use crate::core::diagnostics::{DropDiagnostic, DropRule};
pub use crate::core::error::{ConfigError, Result, SweepError};
pub use crate::core::format::Row;
pub use crate::core::functions::{AggregateFunction, FunctionKind, FunctionSpec};
pub use crate::core::pipeline::{ingest, process, run, RunSummary};
pub use crate::core::reader::{CsvDirectorySource, MemoryRows, RowSource};
pub use models::config::SweepConfig;

#[cfg(test)]
mod tests {
    #[test]
    fn test_constants() {
        use crate::core::constants::*;
        assert_eq!(ROUND_DECIMALS, 5);
        assert_eq!(TABLE_CORNER_LABEL, "timestamps\\chunk");
    }
}
