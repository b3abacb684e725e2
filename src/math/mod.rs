//! Numeric utilities: descriptive statistics, regression metrics and robust scaling.

pub mod scaler;
pub mod stats;

pub use scaler::*;
pub use stats::*;
