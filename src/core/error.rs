// Error handling for the sweep averager

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SweepError>;

#[derive(Error, Debug)]
pub enum SweepError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Malformed input in {source_name} line {line}: {message}")]
    MalformedInput {
        source_name: String,
        line: u64,
        message: String,
    },

    #[error("Decompression failed: {0}")]
    DecompressionFailed(String),

    #[error("Unsupported compression type: {0}")]
    UnsupportedCompression(String),

    #[error("Chunk {chunk_id} has {actual} rows, expected {expected}")]
    InconsistentLength {
        chunk_id: i64,
        expected: usize,
        actual: usize,
    },

    #[error("No chunks were read")]
    NoChunks,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("head_len must be at least 1")]
    ZeroHeadWindow,

    #[error("tail_len must be at least 1")]
    ZeroTailWindow,

    #[error("drift threshold must be a finite non-negative number, got {0}")]
    InvalidDriftThreshold(f64),

    #[error("chunk range is empty: chunk_min {min} > chunk_max {max}")]
    InvalidChunkRange { min: i64, max: i64 },

    #[error("at least one aggregate function must be configured")]
    NoFunctions,

    #[error("function '{label}': {reason}")]
    InvalidFilter { label: String, reason: String },

    #[error("input delimiter must be a single ASCII character, got {0:?}")]
    InvalidDelimiter(char),
}
