//! The model bundle: everything needed to reproduce predictions exactly as trained.
//!
//! Ensemble, scaler and encoders are fit together in one training pass and
//! always travel together. The bundle is built once and then shared read-only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{EducationRankPolicy, EvaluationMetrics, ForestParams};
use crate::error::ModelError;
use crate::features::{EncoderRegistry, FEATURE_COUNT, FEATURE_NAMES};
use crate::fit::MIN_ENSEMBLE_SIZE;
use crate::math::RobustScaler;
use crate::models::{RandomForest, Regressor};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBundle {
    pub tool: String,
    pub trained_at: DateTime<Utc>,
    pub ensemble: Vec<RandomForest>,
    pub scaler: RobustScaler,
    pub registry: EncoderRegistry,
    /// Frozen column order the scaler and every member were fit with.
    pub feature_names: Vec<String>,
    pub metrics: EvaluationMetrics,
    pub education_rank: EducationRankPolicy,
    pub forest_params: ForestParams,
    pub base_seed: u64,
    pub n_train: usize,
    pub n_test: usize,
}

pub fn frozen_feature_names() -> Vec<String> {
    FEATURE_NAMES.iter().map(|s| s.to_string()).collect()
}

impl ModelBundle {
    /// Check the ensemble size and that every component agrees with the
    /// frozen feature layout.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.ensemble.is_empty() {
            return Err(ModelError::EmptyEnsemble);
        }
        if self.ensemble.len() < MIN_ENSEMBLE_SIZE {
            // A lone member has no spread, so every interval would collapse to a point.
            return Err(ModelError::InvalidConfig(format!(
                "bundle ensemble has {} member(s), need >= {MIN_ENSEMBLE_SIZE}",
                self.ensemble.len()
            )));
        }
        if self.feature_names.len() != FEATURE_COUNT {
            return Err(ModelError::FeatureShape {
                expected: FEATURE_COUNT,
                actual: self.feature_names.len(),
            });
        }
        if self.feature_names.iter().zip(FEATURE_NAMES).any(|(a, b)| a != b) {
            return Err(ModelError::InvalidConfig(format!(
                "bundle feature order {:?} does not match {:?}",
                self.feature_names, FEATURE_NAMES
            )));
        }
        if self.scaler.width() != FEATURE_COUNT || self.scaler.scale.len() != FEATURE_COUNT {
            return Err(ModelError::FeatureShape {
                expected: FEATURE_COUNT,
                actual: self.scaler.width(),
            });
        }
        if let Some(member) = self.ensemble.iter().find(|m| m.n_features() != FEATURE_COUNT) {
            return Err(ModelError::FeatureShape {
                expected: FEATURE_COUNT,
                actual: member.n_features(),
            });
        }
        Ok(())
    }
}
