use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The two coordinate axes of a scatterplot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// The index (x) axis.
    Index,
    /// The value (y) axis.
    Value,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Index => write!(f, "index"),
            Axis::Value => write!(f, "value"),
        }
    }
}

/// Errors raised while gathering scatterplot points.
///
/// Every variant is reported before any output is built, a gather either
/// returns a complete result or one of these.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GatherError {
    /// An input does not have the required rank, dtype or length.
    #[error("type/shape error: {0}")]
    TypeShape(String),

    /// A selection index list names a position outside `[0, len)`.
    #[error("{axis} selection index {index} is out of range for an array of length {len}")]
    IndexOutOfRange { axis: Axis, index: i64, len: usize },

    /// A dedicated worker pool could not be created.
    #[error("failed to build thread pool: {0}")]
    ThreadPool(String),
}

impl From<rayon::ThreadPoolBuildError> for GatherError {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        GatherError::ThreadPool(e.to_string())
    }
}

pub type GatherResult<T> = Result<T, GatherError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_out_of_range_message() {
        let err = GatherError::IndexOutOfRange { axis: Axis::Value, index: 100, len: 5 };
        assert_eq!(
            err.to_string(),
            "value selection index 100 is out of range for an array of length 5"
        );
    }

    #[test]
    fn test_type_shape_message() {
        let err = GatherError::TypeShape("index_mask has length 3, expected 4".to_string());
        assert!(err.to_string().starts_with("type/shape error"));
    }
}
