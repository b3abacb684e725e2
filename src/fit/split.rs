//! Seeded train/test split.

use nalgebra::DMatrix;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::error::ModelError;

/// Row indices for each side of a split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n_rows` with `seed` and hold out `ceil(n_rows * test_fraction)` rows.
pub fn train_test_split(n_rows: usize, test_fraction: f64, seed: u64) -> Result<SplitIndices, ModelError> {
    if !(test_fraction.is_finite() && test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(ModelError::InvalidConfig(format!(
            "test fraction must be in (0, 1), got {test_fraction}"
        )));
    }

    let n_test = (n_rows as f64 * test_fraction).ceil() as usize;
    if n_test == 0 || n_test >= n_rows {
        return Err(ModelError::TrainingData(format!(
            "Cannot split {n_rows} rows with test fraction {test_fraction}: one side would be empty."
        )));
    }

    let mut idx: Vec<usize> = (0..n_rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    idx.shuffle(&mut rng);

    let train = idx.split_off(n_test);
    Ok(SplitIndices { train, test: idx })
}

/// Gather the given rows of a matrix and target vector.
pub fn take_rows(x: &DMatrix<f64>, y: &[f64], rows: &[usize]) -> (DMatrix<f64>, Vec<f64>) {
    let sub_x = x.select_rows(rows.iter());
    let sub_y = rows.iter().map(|&r| y[r]).collect();
    (sub_x, sub_y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_partitions_all_rows() {
        let split = train_test_split(10, 0.2, 42).unwrap();
        assert_eq!(split.test.len(), 2);
        assert_eq!(split.train.len(), 8);

        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn split_is_seeded() {
        assert_eq!(train_test_split(50, 0.2, 42).unwrap(), train_test_split(50, 0.2, 42).unwrap());
    }

    #[test]
    fn degenerate_splits_are_rejected() {
        assert!(matches!(train_test_split(1, 0.2, 0), Err(ModelError::TrainingData(_))));
        assert!(matches!(train_test_split(10, 1.5, 0), Err(ModelError::InvalidConfig(_))));
    }

    #[test]
    fn take_rows_keeps_alignment() {
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 10.0, 2.0, 20.0, 3.0, 30.0]);
        let y = [100.0, 200.0, 300.0];
        let (sx, sy) = take_rows(&x, &y, &[2, 0]);
        assert_eq!(sx[(0, 1)], 30.0);
        assert_eq!(sy, vec![300.0, 100.0]);
    }
}
