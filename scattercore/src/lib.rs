// error module
pub mod error;

// scatter module
pub mod scatter {
    pub mod bounds;
    pub mod gather;
    pub mod selection;
    pub mod vec_utils;
}

// Re-export commonly used types
pub use error::{Axis, GatherError, GatherResult};
pub use scatter::bounds::{AxisRange, RangeBounds};
pub use scatter::gather::{
    gather_points, gather_points_diagnosed, gather_points_par, gather_points_with_config,
    AxisData, GatherConfig, GatherDiagnostics, GatheredPoints,
};
