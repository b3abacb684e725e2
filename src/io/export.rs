//! Export held-out predictions to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::path::Path;

use serde::Serialize;

use crate::error::AppError;
use crate::fit::HeldOutPrediction;

#[derive(Serialize)]
struct ExportRow {
    salary_avg: f64,
    prediction: f64,
    lower_raw: f64,
    upper_raw: f64,
    uncertainty: f64,
    covered: bool,
}

/// Write per-row held-out results (raw, unclamped interval) to a CSV file.
pub fn write_predictions_csv(path: &Path, rows: &[HeldOutPrediction]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    for r in rows {
        writer
            .serialize(ExportRow {
                salary_avg: r.truth,
                prediction: r.mean,
                lower_raw: r.lower,
                upper_raw: r.upper,
                uncertainty: r.std,
                covered: r.covered(),
            })
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}
