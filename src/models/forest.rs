//! Bagged random forest regressor.
//!
//! Each tree is fit on a bootstrap resample (n rows drawn with replacement)
//! and, optionally, a random feature subset per split. The forest predicts the
//! mean of its trees.
//!
//! Trees are fit in parallel. Their seeds are drawn up front from the forest
//! seed, so the fitted forest does not depend on thread scheduling.

use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::ForestParams;
use crate::error::ModelError;
use crate::models::Regressor;
use crate::models::tree::{RegressionTree, TreeParams};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<RegressionTree>,
    n_features: usize,
    seed: u64,
}

impl RandomForest {
    pub fn fit(
        x: &DMatrix<f64>,
        y: &[f64],
        params: &ForestParams,
        seed: u64,
    ) -> Result<Self, ModelError> {
        validate_params(params)?;
        if x.nrows() == 0 {
            return Err(ModelError::TrainingData("Cannot fit a forest on zero rows.".to_string()));
        }
        if x.nrows() != y.len() {
            return Err(ModelError::TrainingData(format!(
                "Feature rows ({}) and targets ({}) differ in length.",
                x.nrows(),
                y.len()
            )));
        }

        let n_rows = x.nrows();
        let n_features = x.ncols();
        let tree_params = TreeParams {
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split,
            max_features: ((params.max_features * n_features as f64).floor() as usize).clamp(1, n_features),
        };

        let mut rng = StdRng::seed_from_u64(seed);
        let tree_seeds: Vec<u64> = (0..params.n_trees).map(|_| rng.next_u64()).collect();

        let trees = tree_seeds
            .par_iter()
            .map(|&tree_seed| {
                let mut rng = StdRng::seed_from_u64(tree_seed);
                let rows: Vec<usize> = (0..n_rows).map(|_| rng.gen_range(0..n_rows)).collect();
                RegressionTree::fit(x, y, &rows, &tree_params, &mut rng)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            trees,
            n_features,
            seed,
        })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Regressor for RandomForest {
    fn predict_row(&self, features: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return f64::NAN;
        }
        let total: f64 = self.trees.iter().map(|t| t.predict_row(features)).sum();
        total / self.trees.len() as f64
    }

    fn n_features(&self) -> usize {
        self.n_features
    }
}

fn validate_params(params: &ForestParams) -> Result<(), ModelError> {
    if params.n_trees == 0 {
        return Err(ModelError::InvalidConfig("n_trees must be >= 1".to_string()));
    }
    if params.max_depth == 0 {
        return Err(ModelError::InvalidConfig("max_depth must be >= 1".to_string()));
    }
    if params.min_samples_split < 2 {
        return Err(ModelError::InvalidConfig("min_samples_split must be >= 2".to_string()));
    }
    if !(params.max_features.is_finite() && params.max_features > 0.0 && params.max_features <= 1.0) {
        return Err(ModelError::InvalidConfig(format!(
            "max_features must be in (0, 1], got {}",
            params.max_features
        )));
    }
    Ok(())
}
