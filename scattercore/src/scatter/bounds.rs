use serde::{Deserialize, Serialize};

/// Inclusive acceptance interval for one axis.
///
/// A NaN bound never rejects anything, since every comparison against it is
/// false.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub low: f64,
    pub high: f64,
}

impl Default for AxisRange {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl AxisRange {
    pub fn new(low: f64, high: f64) -> Self {
        AxisRange { low, high }
    }

    /// Accept everything that is not NaN, infinities included.
    pub fn unbounded() -> Self {
        AxisRange { low: f64::NEG_INFINITY, high: f64::INFINITY }
    }

    /// Build a range where a missing side is unbounded.
    pub fn from_options(low: Option<f64>, high: Option<f64>) -> Self {
        AxisRange {
            low: low.unwrap_or(f64::NEG_INFINITY),
            high: high.unwrap_or(f64::INFINITY),
        }
    }

    #[inline]
    pub fn contains(&self, v: f64) -> bool {
        !(v < self.low || v > self.high)
    }
}

/// Range bounds for both axes of a scatterplot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeBounds {
    pub index: AxisRange,
    pub value: AxisRange,
}

impl RangeBounds {
    pub fn new(index_low: f64, index_high: f64, value_low: f64, value_high: f64) -> Self {
        RangeBounds {
            index: AxisRange::new(index_low, index_high),
            value: AxisRange::new(value_low, value_high),
        }
    }

    /// Bounds that accept every finite or infinite coordinate.
    pub fn unbounded() -> Self {
        RangeBounds::default()
    }

    #[inline]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.index.contains(x) && self.value.contains(y)
    }
}
