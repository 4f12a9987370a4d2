// Data structures for input rows

use serde::{Deserialize, Serialize};

/// One measurement row: `(chunk_id, timestamp, value)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub chunk_id: i64,
    pub timestamp: f64,
    pub value: f64,
}

impl Row {
    pub fn new(chunk_id: i64, timestamp: f64, value: f64) -> Self {
        Self {
            chunk_id,
            timestamp,
            value,
        }
    }
}

impl From<(i64, f64, f64)> for Row {
    fn from((chunk_id, timestamp, value): (i64, f64, f64)) -> Self {
        Self::new(chunk_id, timestamp, value)
    }
}
