//! Read/write model bundle JSON files.
//!
//! The bundle is the portable representation of a trained estimator:
//! - ensemble members (every tree, node by node)
//! - robust scaler and categorical code tables
//! - frozen feature order, held-out metrics and run metadata
//!
//! The schema is defined by `domain::ModelBundle`.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use crate::domain::{EducationRankPolicy, EvaluationMetrics, ForestParams, ModelBundle};
use crate::error::{AppError, ModelError};
use crate::features::EncoderRegistry;
use crate::math::RobustScaler;
use crate::models::RandomForest;

/// Write a bundle JSON file.
///
/// The document goes to a sibling `.tmp` file first and is renamed into place,
/// so an interrupted write never leaves a truncated bundle behind.
pub fn write_bundle(path: &Path, bundle: &ModelBundle) -> Result<(), AppError> {
    bundle.validate()?;

    let tmp = temp_path(path);
    let result = write_json(&tmp, bundle).and_then(|()| {
        fs::rename(&tmp, path).map_err(|e| {
            AppError::new(2, format!("Failed to move bundle into place at '{}': {e}", path.display()))
        })
    });
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result?;

    info!(
        path = %path.display(),
        members = bundle.ensemble.len(),
        "wrote model bundle"
    );
    Ok(())
}

/// Read and validate a bundle JSON file.
pub fn read_bundle(path: &Path) -> Result<ModelBundle, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open bundle '{}': {e}", path.display())))?;
    let raw: RawBundle =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid bundle JSON: {e}")))?;
    Ok(raw.into_bundle()?)
}

fn write_json(path: &Path, bundle: &ModelBundle) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create bundle '{}': {e}", path.display())))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, bundle)
        .map_err(|e| AppError::new(2, format!("Failed to write bundle JSON: {e}")))?;
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush bundle JSON: {e}")))?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Bundle document as found on disk, before completeness checks.
#[derive(Debug, Deserialize)]
struct RawBundle {
    tool: Option<String>,
    trained_at: Option<DateTime<Utc>>,
    ensemble: Option<Vec<RandomForest>>,
    scaler: Option<RobustScaler>,
    registry: Option<EncoderRegistry>,
    feature_names: Option<Vec<String>>,
    metrics: Option<EvaluationMetrics>,
    education_rank: Option<EducationRankPolicy>,
    forest_params: Option<ForestParams>,
    base_seed: Option<u64>,
    n_train: Option<usize>,
    n_test: Option<usize>,
}

impl RawBundle {
    fn into_bundle(self) -> Result<ModelBundle, ModelError> {
        fn require<T>(value: Option<T>, missing: &'static str) -> Result<T, ModelError> {
            value.ok_or(ModelError::IncompleteBundle { missing })
        }

        let bundle = ModelBundle {
            tool: self.tool.unwrap_or_else(|| "compass".to_string()),
            trained_at: require(self.trained_at, "trained_at")?,
            ensemble: require(self.ensemble, "ensemble")?,
            scaler: require(self.scaler, "scaler")?,
            registry: require(self.registry, "registry")?,
            feature_names: require(self.feature_names, "feature_names")?,
            metrics: require(self.metrics, "metrics")?,
            // Bundles written before the policy was recorded used the legacy rule.
            education_rank: self.education_rank.unwrap_or_default(),
            forest_params: require(self.forest_params, "forest_params")?,
            base_seed: require(self.base_seed, "base_seed")?,
            n_train: require(self.n_train, "n_train")?,
            n_test: require(self.n_test, "n_test")?,
        };
        bundle.validate()?;
        Ok(bundle)
    }
}
