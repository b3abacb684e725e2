//! Confidence prediction: job profile -> point estimate + 95% interval.
//!
//! Pipeline (pure, no side effects):
//! 1. build the 8-feature vector from the profile and the bundle's encoders
//! 2. scale it with the bundle's scaler
//! 3. query every ensemble member
//! 4. reduce to mean and population standard deviation
//! 5. raw interval `mean ± 1.96·std`, then clamp to the salary guardrails
//!
//! The guardrails are business limits, not statistics, and are only applied
//! after the raw interval is computed.

use crate::domain::{ConfidenceLevel, JobProfile, ModelBundle, PredictionResult};
use crate::error::ModelError;
use crate::features::build_feature_vector;
use crate::math::{mean, population_std};
use crate::models::Regressor;

/// Minimum plausible monthly salary (PKR).
pub const SALARY_FLOOR: f64 = 10_000.0;
/// Maximum plausible monthly salary (PKR).
pub const SALARY_CAP: f64 = 500_000.0;
/// Two-sided 95% normal quantile.
pub const Z_95: f64 = 1.96;

/// Mean and spread of the ensemble member outputs for one row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnsembleSpread {
    pub mean: f64,
    pub std: f64,
}

impl EnsembleSpread {
    pub fn from_predictions(predictions: &[f64]) -> Result<Self, ModelError> {
        let (Some(mean), Some(std)) = (mean(predictions), population_std(predictions)) else {
            return Err(ModelError::EmptyEnsemble);
        };
        Ok(Self { mean, std })
    }

    /// Unclamped `mean ± 1.96·std`.
    pub fn raw_interval(&self) -> (f64, f64) {
        (self.mean - Z_95 * self.std, self.mean + Z_95 * self.std)
    }
}

/// Query every member on an already-scaled row.
pub fn member_predictions<M: Regressor>(ensemble: &[M], scaled: &[f64]) -> Result<Vec<f64>, ModelError> {
    if ensemble.is_empty() {
        return Err(ModelError::EmptyEnsemble);
    }
    ensemble
        .iter()
        .map(|m| {
            if m.n_features() != scaled.len() {
                return Err(ModelError::FeatureShape {
                    expected: m.n_features(),
                    actual: scaled.len(),
                });
            }
            Ok(m.predict_row(scaled))
        })
        .collect()
}

/// Reduce member outputs to a guardrail-clamped prediction.
///
/// A mean outside `[SALARY_FLOOR, SALARY_CAP]` is pulled into the band as well,
/// so `lower_bound <= prediction <= upper_bound` always holds.
pub fn confidence_interval(predictions: &[f64]) -> Result<PredictionResult, ModelError> {
    let spread = EnsembleSpread::from_predictions(predictions)?;
    if !(spread.mean.is_finite() && spread.std.is_finite()) {
        return Err(ModelError::NonFinite("ensemble prediction"));
    }

    let (raw_lower, raw_upper) = spread.raw_interval();
    let lower_bound = raw_lower.max(SALARY_FLOOR).min(SALARY_CAP);
    let upper_bound = raw_upper.min(SALARY_CAP).max(SALARY_FLOOR);
    let prediction = spread.mean.clamp(lower_bound, upper_bound);

    Ok(PredictionResult {
        prediction,
        lower_bound,
        upper_bound,
        uncertainty: spread.std,
        confidence: ConfidenceLevel::from_uncertainty(spread.std),
    })
}

/// Predict a salary range for a job profile using a loaded bundle.
///
/// Never mutates the bundle; safe to call concurrently on a shared reference.
pub fn predict(profile: &JobProfile, bundle: &ModelBundle) -> Result<PredictionResult, ModelError> {
    if bundle.ensemble.is_empty() {
        return Err(ModelError::EmptyEnsemble);
    }
    let vector = build_feature_vector(profile, &bundle.registry, bundle.education_rank)?;
    let scaled = bundle.scaler.transform(&vector)?;
    let predictions = member_predictions(&bundle.ensemble, &scaled)?;
    confidence_interval(&predictions)
}
