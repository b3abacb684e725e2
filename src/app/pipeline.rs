//! Shared training workflow.
//!
//! Keeping this in one place avoids duplicating the core sequence:
//! ingest -> encoders -> feature matrix -> split -> scaler -> ensemble -> evaluation -> bundle
//!
//! The command handlers then only deal with persistence and presentation.

use chrono::Utc;
use tracing::{info, warn};

use crate::domain::{ModelBundle, TrainConfig, frozen_feature_names};
use crate::error::AppError;
use crate::features::{EncoderRegistry, build_training_matrix};
use crate::fit::{HeldOutPrediction, evaluate, take_rows, train_ensemble, train_test_split};
use crate::io::{IngestedData, load_salary_records};
use crate::math::RobustScaler;

/// All computed outputs of a single `compass train` run.
#[derive(Debug, Clone)]
pub struct TrainingRun {
    pub ingest: IngestedData,
    pub bundle: ModelBundle,
    pub held_out: Vec<HeldOutPrediction>,
    /// Rows kept for market aggregates but left out of training.
    pub excluded_rows: usize,
}

/// Load the dataset named by the config and train on it.
pub fn run_training(config: &TrainConfig) -> Result<TrainingRun, AppError> {
    let ingest = load_salary_records(&config.data_path)?;
    info!(
        path = %config.data_path.display(),
        rows_read = ingest.rows_read,
        rows_used = ingest.rows_used,
        row_errors = ingest.row_errors.len(),
        "loaded training data"
    );
    for e in ingest.row_errors.iter().take(5) {
        warn!(line = e.line, "{}", e.message);
    }

    train_on(ingest, config)
}

/// Train an ensemble on already-ingested records.
pub fn train_on(ingest: IngestedData, config: &TrainConfig) -> Result<TrainingRun, AppError> {
    let registry = EncoderRegistry::fit(&ingest.records)?;
    let matrix = build_training_matrix(&ingest.records, &registry)?;

    let split = train_test_split(matrix.y.len(), config.test_fraction, config.seed)?;
    let (x_train, y_train) = take_rows(&matrix.x, &matrix.y, &split.train);
    let (x_test, y_test) = take_rows(&matrix.x, &matrix.y, &split.test);

    let scaler = RobustScaler::fit(&x_train)?;
    let x_train_scaled = scaler.transform_matrix(&x_train)?;

    info!(
        members = config.n_models,
        trees = config.forest.n_trees,
        train_rows = y_train.len(),
        test_rows = y_test.len(),
        "training ensemble"
    );
    let ensemble = train_ensemble(&x_train_scaled, &y_train, config.n_models, config.seed, &config.forest)?;

    let evaluation = evaluate(&ensemble, &scaler, &x_test, &y_test)?;
    let metrics = evaluation.metrics;
    info!(
        mae = metrics.mae,
        r2 = metrics.r2,
        coverage = metrics.coverage,
        mean_interval_width = metrics.mean_interval_width,
        "held-out evaluation"
    );

    let bundle = ModelBundle {
        tool: "compass".to_string(),
        trained_at: Utc::now(),
        ensemble,
        scaler,
        registry,
        feature_names: frozen_feature_names(),
        metrics,
        education_rank: config.education_rank,
        forest_params: config.forest,
        base_seed: config.seed,
        n_train: y_train.len(),
        n_test: y_test.len(),
    };
    bundle.validate()?;

    Ok(TrainingRun {
        ingest,
        bundle,
        held_out: evaluation.rows,
        excluded_rows: matrix.excluded,
    })
}
