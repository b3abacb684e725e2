//! Terminal reports for training runs, predictions and market aggregates.
//!
//! Formatting lives here so the modelling code stays free of presentation.

pub mod format;

pub use format::*;
