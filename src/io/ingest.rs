//! CSV ingest of the cleaned salary dataset.
//!
//! This module turns the cleaned job-posting export into `SalaryRecord`s.
//!
//! Design goals:
//! - **Strict schema** for the required columns (clear errors)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **No modelling logic here**: encoding and feature derivation live in `features`

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{CategoricalField, SalaryRecord};
use crate::error::{AppError, ModelError};

/// Placeholder category for blank categorical cells.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

const EXPERIENCE_COLUMN: &str = "experience_years";
const SALARY_COLUMN: &str = "salary_avg";

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: usable records + row errors.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub records: Vec<SalaryRecord>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load the cleaned dataset from a CSV file.
pub fn load_salary_records(path: &Path) -> Result<IngestedData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_salary_records(file)
}

/// Parse the cleaned dataset from any reader (file, buffer).
pub fn read_salary_records<R: Read>(source: R) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        rows_read += 1;

        let row = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&row, &header_map) {
            Ok(record) => records.push(record),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    let rows_used = records.len();
    if rows_used == 0 {
        return Err(ModelError::TrainingData("No valid rows in the dataset.".to_string()).into());
    }

    Ok(IngestedData {
        records,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

/// `"\u{feff}Career Level"`, `"career_level"` and `"CAREER LEVEL"` all map to `career_level`.
fn normalize_header_name(name: &str) -> String {
    let name = name.trim().trim_start_matches('\u{feff}').trim();
    name.to_ascii_lowercase().replace(' ', "_")
}

fn required_columns() -> impl Iterator<Item = &'static str> {
    [EXPERIENCE_COLUMN, SALARY_COLUMN]
        .into_iter()
        .chain(CategoricalField::ALL.into_iter().map(CategoricalField::column_name))
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    let missing: Vec<&str> = required_columns()
        .filter(|col| !header_map.contains_key(&normalize_header_name(col)))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    Err(ModelError::TrainingData(format!("Missing required column(s): {}", missing.join(", "))).into())
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<SalaryRecord, String> {
    let salary_avg = get_optional(record, header_map, SALARY_COLUMN)
        .ok_or_else(|| format!("Missing `{SALARY_COLUMN}` value."))?;
    let salary_avg = parse_f64(salary_avg)
        .filter(|v| *v > 0.0)
        .ok_or_else(|| format!("Invalid `{SALARY_COLUMN}` value '{salary_avg}' (must be a positive number)."))?;

    let experience_years = get_optional(record, header_map, EXPERIENCE_COLUMN)
        .and_then(parse_f64)
        .filter(|v| *v >= 0.0);

    let category = |field: CategoricalField| {
        get_optional(record, header_map, field.column_name())
            .unwrap_or(UNKNOWN_CATEGORY)
            .to_string()
    };

    Ok(SalaryRecord {
        experience_years,
        career_level: category(CategoricalField::CareerLevel),
        functional_area: category(CategoricalField::FunctionalArea),
        city_group: category(CategoricalField::CityGroup),
        minimum_education: category(CategoricalField::MinimumEducation),
        salary_avg,
    })
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(&normalize_header_name(name))?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_f64(s: &str) -> Option<f64> {
    let v = s.replace(',', "").parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}
