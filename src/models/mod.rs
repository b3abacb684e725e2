//! Regression models used as ensemble members.
//!
//! Every model is a pure function of a (scaled) feature row once fit, which is
//! all the predictor and the evaluator need.

pub mod forest;
pub mod tree;

pub use forest::*;
pub use tree::*;

/// A fitted single-output regression model.
pub trait Regressor {
    fn predict_row(&self, features: &[f64]) -> f64;

    /// Width of the feature rows this model was fit on.
    fn n_features(&self) -> usize;
}
