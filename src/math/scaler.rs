//! Robust feature scaling.
//!
//! Each column is centered on its median and divided by its interquartile
//! range, so a handful of extreme salaries or very long careers do not
//! dominate the scale the way they would with mean/variance scaling.
//!
//! A column with zero IQR (e.g. a binary flag that is almost always 0) keeps a
//! unit scale.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::math::stats::{median, percentile};

/// Per-feature center and scale, fit once on the training split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobustScaler {
    pub center: Vec<f64>,
    pub scale: Vec<f64>,
}

impl RobustScaler {
    /// Fit on a feature matrix (rows = samples, columns = features).
    pub fn fit(x: &DMatrix<f64>) -> Result<Self, ModelError> {
        if x.nrows() == 0 || x.ncols() == 0 {
            return Err(ModelError::TrainingData(
                "Cannot fit scaler on an empty feature matrix.".to_string(),
            ));
        }

        let mut center = Vec::with_capacity(x.ncols());
        let mut scale = Vec::with_capacity(x.ncols());

        for col in x.column_iter() {
            let values: Vec<f64> = col.iter().copied().collect();
            if values.iter().any(|v| !v.is_finite()) {
                return Err(ModelError::TrainingData(
                    "Non-finite value in feature matrix.".to_string(),
                ));
            }
            // Non-empty was checked above.
            let med = median(&values).unwrap_or(0.0);
            let q1 = percentile(&values, 0.25).unwrap_or(med);
            let q3 = percentile(&values, 0.75).unwrap_or(med);
            let iqr = q3 - q1;

            center.push(med);
            scale.push(if iqr.abs() < 1e-12 { 1.0 } else { iqr });
        }

        Ok(Self { center, scale })
    }

    pub fn width(&self) -> usize {
        self.center.len()
    }

    /// Scale a single feature vector.
    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>, ModelError> {
        if row.len() != self.width() {
            return Err(ModelError::FeatureShape {
                expected: self.width(),
                actual: row.len(),
            });
        }
        Ok(row
            .iter()
            .zip(self.center.iter().zip(&self.scale))
            .map(|(v, (c, s))| (v - c) / s)
            .collect())
    }

    /// Scale every row of a feature matrix.
    pub fn transform_matrix(&self, x: &DMatrix<f64>) -> Result<DMatrix<f64>, ModelError> {
        if x.ncols() != self.width() {
            return Err(ModelError::FeatureShape {
                expected: self.width(),
                actual: x.ncols(),
            });
        }
        Ok(DMatrix::from_fn(x.nrows(), x.ncols(), |i, j| {
            (x[(i, j)] - self.center[j]) / self.scale[j]
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_uses_median_and_iqr() {
        // Column 0: 1..=5 (median 3, IQR 2). Column 1: constant flag.
        let x = DMatrix::from_row_slice(5, 2, &[1.0, 0.0, 2.0, 0.0, 3.0, 0.0, 4.0, 0.0, 5.0, 0.0]);
        let scaler = RobustScaler::fit(&x).unwrap();

        assert!((scaler.center[0] - 3.0).abs() < 1e-12);
        assert!((scaler.scale[0] - 2.0).abs() < 1e-12);
        assert!((scaler.scale[1] - 1.0).abs() < 1e-12);

        let scaled = scaler.transform(&[5.0, 1.0]).unwrap();
        assert!((scaled[0] - 1.0).abs() < 1e-12);
        assert!((scaled[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn outlier_does_not_move_the_center() {
        let x = DMatrix::from_row_slice(5, 1, &[1.0, 2.0, 3.0, 4.0, 1_000_000.0]);
        let scaler = RobustScaler::fit(&x).unwrap();
        assert!((scaler.center[0] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn transform_rejects_wrong_width() {
        let x = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let scaler = RobustScaler::fit(&x).unwrap();
        let err = scaler.transform(&[1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(err, ModelError::FeatureShape { expected: 2, actual: 3 });
    }

    #[test]
    fn matrix_and_row_transforms_agree() {
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 10.0, 2.0, 20.0, 4.0, 35.0]);
        let scaler = RobustScaler::fit(&x).unwrap();
        let scaled = scaler.transform_matrix(&x).unwrap();
        let row = scaler.transform(&[2.0, 20.0]).unwrap();
        assert!((scaled[(1, 0)] - row[0]).abs() < 1e-12);
        assert!((scaled[(1, 1)] - row[1]).abs() < 1e-12);
    }
}
