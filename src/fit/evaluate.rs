//! Held-out evaluation of an ensemble.
//!
//! Uses the same reduction as the predictor but on the *raw* 95% interval:
//! the salary guardrails would bias the coverage measurement.

use nalgebra::DMatrix;

use crate::domain::{BandUncertainty, EvaluationMetrics};
use crate::error::ModelError;
use crate::fit::predictor::{EnsembleSpread, member_predictions};
use crate::math::{RobustScaler, mean, mean_absolute_error, r2_score};
use crate::models::Regressor;

/// Per-row held-out result (for exports and band analysis).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeldOutPrediction {
    pub truth: f64,
    pub mean: f64,
    pub std: f64,
    pub lower: f64,
    pub upper: f64,
}

impl HeldOutPrediction {
    pub fn covered(&self) -> bool {
        self.truth >= self.lower && self.truth <= self.upper
    }
}

#[derive(Debug, Clone)]
pub struct Evaluation {
    pub metrics: EvaluationMetrics,
    pub rows: Vec<HeldOutPrediction>,
}

/// Salary bands used to break down the uncertainty (lower bound inclusive).
const SALARY_BANDS: [(&str, f64, f64); 3] = [
    ("Low (10-50K)", 10_000.0, 50_000.0),
    ("Mid (50-100K)", 50_000.0, 100_000.0),
    ("High (100K+)", 100_000.0, f64::INFINITY),
];

/// Evaluate an ensemble on an unscaled held-out matrix.
pub fn evaluate<M: Regressor>(
    ensemble: &[M],
    scaler: &RobustScaler,
    held_out_x: &DMatrix<f64>,
    held_out_y: &[f64],
) -> Result<Evaluation, ModelError> {
    if ensemble.is_empty() {
        return Err(ModelError::EmptyEnsemble);
    }
    if held_out_x.nrows() == 0 || held_out_x.nrows() != held_out_y.len() {
        return Err(ModelError::TrainingData(format!(
            "Held-out set is empty or misaligned ({} rows, {} targets).",
            held_out_x.nrows(),
            held_out_y.len()
        )));
    }

    let scaled = scaler.transform_matrix(held_out_x)?;
    let mut rows = Vec::with_capacity(held_out_y.len());
    for (i, &truth) in held_out_y.iter().enumerate() {
        let row: Vec<f64> = scaled.row(i).iter().copied().collect();
        let spread = EnsembleSpread::from_predictions(&member_predictions(ensemble, &row)?)?;
        if !(spread.mean.is_finite() && spread.std.is_finite()) {
            return Err(ModelError::NonFinite("held-out prediction"));
        }
        let (lower, upper) = spread.raw_interval();
        rows.push(HeldOutPrediction {
            truth,
            mean: spread.mean,
            std: spread.std,
            lower,
            upper,
        });
    }

    let metrics = summarize(&rows)?;
    Ok(Evaluation { metrics, rows })
}

fn summarize(rows: &[HeldOutPrediction]) -> Result<EvaluationMetrics, ModelError> {
    let truth: Vec<f64> = rows.iter().map(|r| r.truth).collect();
    let predicted: Vec<f64> = rows.iter().map(|r| r.mean).collect();
    let widths: Vec<f64> = rows.iter().map(|r| r.upper - r.lower).collect();

    let mae = mean_absolute_error(&truth, &predicted).ok_or(ModelError::NonFinite("MAE"))?;
    let r2 = r2_score(&truth, &predicted).ok_or(ModelError::NonFinite("R²"))?;
    let covered = rows.iter().filter(|r| r.covered()).count();
    let coverage = covered as f64 / rows.len() as f64;
    let mean_interval_width = mean(&widths).unwrap_or(0.0);

    let uncertainty_by_band = SALARY_BANDS
        .iter()
        .filter_map(|&(label, lo, hi)| {
            let stds: Vec<f64> = rows
                .iter()
                .filter(|r| r.truth >= lo && r.truth < hi)
                .map(|r| r.std)
                .collect();
            mean(&stds).map(|mean_uncertainty| BandUncertainty {
                label: label.to_string(),
                n: stds.len(),
                mean_uncertainty,
            })
        })
        .collect();

    Ok(EvaluationMetrics {
        mae,
        r2,
        coverage,
        mean_interval_width,
        n_rows: rows.len(),
        uncertainty_by_band,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand_distr::{Distribution, Normal};

    /// Linear model on the first feature plus a fixed member offset.
    struct OffsetModel {
        slope: f64,
        intercept: f64,
        offset: f64,
    }

    impl Regressor for OffsetModel {
        fn predict_row(&self, features: &[f64]) -> f64 {
            self.intercept + self.slope * features[0] + self.offset
        }
        fn n_features(&self) -> usize {
            1
        }
    }

    fn identity_scaler() -> RobustScaler {
        RobustScaler {
            center: vec![0.0],
            scale: vec![1.0],
        }
    }

    fn ensemble(sigma: f64) -> Vec<OffsetModel> {
        // Offsets of +/- sigma: mean 0, population std exactly sigma.
        (0..10)
            .map(|i| OffsetModel {
                slope: 2_000.0,
                intercept: 40_000.0,
                offset: if i % 2 == 0 { sigma } else { -sigma },
            })
            .collect()
    }

    #[test]
    fn coverage_is_near_nominal_when_spread_matches_noise() {
        let sigma = 8_000.0;
        let noise = Normal::new(0.0, sigma).unwrap();
        let mut rng = StdRng::seed_from_u64(11);

        let n = 4_000;
        let xs: Vec<f64> = (0..n).map(|i| (i % 20) as f64).collect();
        let ys: Vec<f64> = xs
            .iter()
            .map(|x| 40_000.0 + 2_000.0 * x + noise.sample(&mut rng))
            .collect();
        let x = DMatrix::from_column_slice(n, 1, &xs);

        let eval = evaluate(&ensemble(sigma), &identity_scaler(), &x, &ys).unwrap();
        let coverage = eval.metrics.coverage;
        assert!((0.85..=0.99).contains(&coverage), "coverage {coverage}");
        assert!((eval.metrics.mean_interval_width - 2.0 * 1.96 * sigma).abs() < 1e-6);
        assert!(eval.metrics.r2 > 0.5);
    }

    #[test]
    fn zero_spread_ensemble_covers_only_exact_hits() {
        let x = DMatrix::from_column_slice(3, 1, &[0.0, 1.0, 2.0]);
        let ys = [40_000.0, 42_000.0, 50_000.0];
        let eval = evaluate(&ensemble(0.0), &identity_scaler(), &x, &ys).unwrap();

        assert!((eval.metrics.coverage - 2.0 / 3.0).abs() < 1e-12);
        assert!((eval.metrics.mae - 6_000.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn coverage_uses_the_raw_interval() {
        // Predictions near 5K with a wide spread: the raw lower bound is negative.
        // A clamped interval would start at 10K and miss a 6K truth.
        let models: Vec<OffsetModel> = (0..4)
            .map(|i| OffsetModel {
                slope: 0.0,
                intercept: 5_000.0,
                offset: if i % 2 == 0 { 3_000.0 } else { -3_000.0 },
            })
            .collect();
        let x = DMatrix::from_column_slice(1, 1, &[0.0]);
        let eval = evaluate(&models, &identity_scaler(), &x, &[6_000.0]).unwrap();
        assert_eq!(eval.metrics.coverage, 1.0);
        assert!(eval.rows[0].lower < 0.0);
    }

    #[test]
    fn bands_group_by_true_salary() {
        let x = DMatrix::from_column_slice(3, 1, &[0.0, 0.0, 0.0]);
        let ys = [20_000.0, 30_000.0, 150_000.0];
        let eval = evaluate(&ensemble(1_000.0), &identity_scaler(), &x, &ys).unwrap();

        let labels: Vec<&str> = eval.metrics.uncertainty_by_band.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["Low (10-50K)", "High (100K+)"]);
        assert_eq!(eval.metrics.uncertainty_by_band[0].n, 2);
        assert!((eval.metrics.uncertainty_by_band[1].mean_uncertainty - 1_000.0).abs() < 1e-9);
    }

    #[test]
    fn empty_held_out_set_is_rejected() {
        let x = DMatrix::<f64>::zeros(0, 1);
        assert!(matches!(
            evaluate(&ensemble(1.0), &identity_scaler(), &x, &[]),
            Err(ModelError::TrainingData(_))
        ));
    }
}
