//! CART regression tree.
//!
//! Splits minimize the summed squared error of the two children. Growth stops
//! at `max_depth`, when a node holds fewer than `min_samples_split` rows, or
//! when no split separates distinct feature values.
//!
//! Nodes are stored in a flat vector (root at index 0) so the tree serializes
//! as plain data.

use std::cmp::Ordering;

use nalgebra::DMatrix;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::models::Regressor;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    /// Number of features examined per split (`<= n_features`).
    pub max_features: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
    n_features: usize,
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    sse: f64,
}

impl RegressionTree {
    /// Fit on the given row indices of `x` (duplicates allowed, e.g. a bootstrap sample).
    pub fn fit(
        x: &DMatrix<f64>,
        y: &[f64],
        rows: &[usize],
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> Result<Self, ModelError> {
        if rows.is_empty() {
            return Err(ModelError::TrainingData("Cannot fit a tree on zero rows.".to_string()));
        }
        if x.nrows() != y.len() {
            return Err(ModelError::TrainingData(format!(
                "Feature rows ({}) and targets ({}) differ in length.",
                x.nrows(),
                y.len()
            )));
        }
        if params.max_features == 0 || params.max_features > x.ncols() {
            return Err(ModelError::InvalidConfig(format!(
                "max_features must be in 1..={}, got {}",
                x.ncols(),
                params.max_features
            )));
        }

        let mut tree = Self {
            nodes: Vec::new(),
            n_features: x.ncols(),
        };
        let mut builder = Builder { x, y, params, rng };
        builder.grow(&mut tree.nodes, rows.to_vec(), 0);
        Ok(tree)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match nodes[idx] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, left).max(walk(nodes, right)),
            }
        }
        if self.nodes.is_empty() { 0 } else { walk(&self.nodes, 0) }
    }
}

impl Regressor for RegressionTree {
    fn predict_row(&self, features: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes.get(idx) {
                Some(Node::Leaf { value }) => return *value,
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let v = features.get(*feature).copied().unwrap_or(f64::NAN);
                    idx = if v <= *threshold { *left } else { *right };
                }
                None => return f64::NAN,
            }
        }
    }

    fn n_features(&self) -> usize {
        self.n_features
    }
}

struct Builder<'a> {
    x: &'a DMatrix<f64>,
    y: &'a [f64],
    params: &'a TreeParams,
    rng: &'a mut StdRng,
}

impl Builder<'_> {
    /// Grow the subtree for `rows` and return its root index.
    fn grow(&mut self, nodes: &mut Vec<Node>, rows: Vec<usize>, depth: usize) -> usize {
        let value = rows.iter().map(|&r| self.y[r]).sum::<f64>() / rows.len() as f64;
        let idx = nodes.len();
        nodes.push(Node::Leaf { value });

        if depth >= self.params.max_depth || rows.len() < self.params.min_samples_split.max(2) {
            return idx;
        }

        let Some(split) = self.best_split(&rows) else {
            return idx;
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .iter()
            .partition(|&&r| self.x[(r, split.feature)] <= split.threshold);
        if left_rows.is_empty() || right_rows.is_empty() {
            return idx;
        }

        let left = self.grow(nodes, left_rows, depth + 1);
        let right = self.grow(nodes, right_rows, depth + 1);
        nodes[idx] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        idx
    }

    fn candidate_features(&mut self) -> Vec<usize> {
        let n = self.x.ncols();
        let k = self.params.max_features;
        if k >= n {
            return (0..n).collect();
        }
        let mut features = rand::seq::index::sample(&mut *self.rng, n, k).into_vec();
        // Fixed examination order keeps tie-breaking deterministic.
        features.sort_unstable();
        features
    }

    fn best_split(&mut self, rows: &[usize]) -> Option<SplitCandidate> {
        let n = rows.len();
        let total_sum: f64 = rows.iter().map(|&r| self.y[r]).sum();
        let total_sq: f64 = rows.iter().map(|&r| self.y[r] * self.y[r]).sum();
        let parent_sse = total_sq - total_sum * total_sum / n as f64;
        if parent_sse <= 1e-12 {
            return None;
        }

        let mut best: Option<SplitCandidate> = None;
        let mut sorted = rows.to_vec();

        for feature in self.candidate_features() {
            sorted.sort_by(|&a, &b| {
                self.x[(a, feature)]
                    .partial_cmp(&self.x[(b, feature)])
                    .unwrap_or(Ordering::Equal)
            });

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for i in 1..n {
                let prev = sorted[i - 1];
                left_sum += self.y[prev];
                left_sq += self.y[prev] * self.y[prev];

                let lo = self.x[(prev, feature)];
                let hi = self.x[(sorted[i], feature)];
                if hi <= lo {
                    continue;
                }

                let n_left = i as f64;
                let n_right = (n - i) as f64;
                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let sse = (left_sq - left_sum * left_sum / n_left)
                    + (right_sq - right_sum * right_sum / n_right);

                if best.is_none_or(|b| sse < b.sse) {
                    let mut threshold = lo + (hi - lo) / 2.0;
                    if threshold >= hi {
                        threshold = lo;
                    }
                    best = Some(SplitCandidate {
                        feature,
                        threshold,
                        sse,
                    });
                }
            }
        }

        best
    }
}
