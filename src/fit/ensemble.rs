//! Ensemble training.
//!
//! N random forests are fit on the identical scaled training set; member `i`
//! uses seed `base_seed + i`. Their disagreement at prediction time is the
//! uncertainty estimate.

use std::time::Instant;

use nalgebra::DMatrix;
use tracing::debug;

use crate::domain::ForestParams;
use crate::error::ModelError;
use crate::models::RandomForest;

/// A standard deviation over fewer members is meaningless.
pub const MIN_ENSEMBLE_SIZE: usize = 2;

/// Size used by the reference training run.
pub const DEFAULT_ENSEMBLE_SIZE: usize = 10;

pub fn train_ensemble(
    x_scaled: &DMatrix<f64>,
    y: &[f64],
    n_models: usize,
    base_seed: u64,
    params: &ForestParams,
) -> Result<Vec<RandomForest>, ModelError> {
    if n_models < MIN_ENSEMBLE_SIZE {
        return Err(ModelError::InvalidConfig(format!(
            "ensemble size must be >= {MIN_ENSEMBLE_SIZE}, got {n_models}"
        )));
    }

    let mut ensemble = Vec::with_capacity(n_models);
    for i in 0..n_models {
        let seed = base_seed.wrapping_add(i as u64);
        let started = Instant::now();
        let model = RandomForest::fit(x_scaled, y, params, seed)?;
        debug!(
            member = i,
            seed,
            trees = model.n_trees(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "fit ensemble member"
        );
        ensemble.push(model);
    }

    Ok(ensemble)
}
