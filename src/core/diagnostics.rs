// Drop outcomes recorded for chunks that fail an acceptance rule

use crate::core::functions::ValueKind;
use serde::Serialize;
use std::fmt;

/// The acceptance rule that dropped a chunk.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum DropRule {
    /// Head and tail averages differ by more than the threshold.
    Drift { difference: f64, threshold: f64 },
    /// Row count differs from the dataset's reference length.
    LengthMismatch { expected: usize, actual: usize },
    /// Chunk id outside `[chunk_min, chunk_max]`.
    OutOfRange { min: i64, max: i64 },
    /// An aggregate function result violated its bounds.
    Filter {
        label: String,
        target: ValueKind,
        result: f64,
    },
}

impl fmt::Display for DropRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropRule::Drift {
                difference,
                threshold,
            } => write!(
                f,
                "diff in average of head and average of tail ({difference} > {threshold})"
            ),
            DropRule::LengthMismatch { expected, actual } => write!(
                f,
                "difference in chunk length. Is {actual}, should be {expected}"
            ),
            DropRule::OutOfRange { min, max } => {
                write!(f, "chunk range filter [{min}, {max}]")
            }
            DropRule::Filter {
                label,
                target,
                result,
            } => write!(f, "filter {label} on {target} values (result {result})"),
        }
    }
}

/// A recorded quality outcome. Not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropDiagnostic {
    pub chunk_id: i64,
    #[serde(flatten)]
    pub rule: DropRule,
}

impl DropDiagnostic {
    pub fn new(chunk_id: i64, rule: DropRule) -> Self {
        Self { chunk_id, rule }
    }
}

impl fmt::Display for DropDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Chunk no {} marked dropped because of {}",
            self.chunk_id, self.rule
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_names_chunk_and_rule() {
        let d = DropDiagnostic::new(
            7,
            DropRule::LengthMismatch {
                expected: 2,
                actual: 3,
            },
        );
        assert_eq!(
            d.to_string(),
            "Chunk no 7 marked dropped because of difference in chunk length. Is 3, should be 2"
        );
    }
}
