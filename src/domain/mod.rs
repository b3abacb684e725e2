//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - job profiles and cleaned salary records (`JobProfile`, `SalaryRecord`)
//! - training configuration (`TrainConfig`, `ForestParams`, `EducationRankPolicy`)
//! - prediction and evaluation outputs (`PredictionResult`, `EvaluationMetrics`)
//! - the persisted artifact (`ModelBundle`)

pub mod bundle;
pub mod types;

pub use bundle::*;
pub use types::*;
