//! Synthetic salary dataset generation.
//!
//! Produces a cleaned dataset with the same columns as the real job-posting
//! export, so the whole train/predict/market workflow can run without it.
//! Salaries follow a simple multiplicative model (experience, city, education,
//! functional area) with normal noise.

use std::path::Path;

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{CategoricalField, SalaryRecord, career_level_for_experience};
use crate::error::AppError;

const MAX_EXPERIENCE: u32 = 15;
const BASE_SALARY: f64 = 25_000.0;
const PER_YEAR: f64 = 7_000.0;
const MIN_SALARY: f64 = 10_000.0;

/// City label and salary multiplier. The last two are neighbourhood labels
/// that the scraped data sometimes carries in the city column.
const CITIES: [(&str, f64); 9] = [
    ("Karachi", 1.20),
    ("Lahore", 1.12),
    ("Islamabad", 1.25),
    ("Rawalpindi", 1.00),
    ("Faisalabad", 0.90),
    ("Multan", 0.85),
    ("Peshawar", 0.88),
    ("Johar Town", 1.05),
    ("DHA", 1.15),
];

const EDUCATION: [(&str, f64); 5] = [
    ("Matriculation/O-Level", 0.80),
    ("Intermediate/A-Level", 0.88),
    ("Diploma", 0.95),
    ("Bachelors", 1.10),
    ("Masters", 1.30),
];

const FUNCTIONAL_AREAS: [(&str, f64); 7] = [
    ("General", 1.00),
    ("Sales", 1.05),
    ("Software & Web Development", 1.35),
    ("Marketing", 1.08),
    ("Operations", 0.98),
    ("Accounts, Finance & Financial Services", 1.12),
    ("Human Resources", 0.97),
];

#[derive(Debug, Clone, Copy)]
pub struct SampleConfig {
    pub rows: usize,
    pub seed: u64,
    /// Standard deviation of the multiplicative noise (0.15 = 15%).
    pub noise: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            rows: 2_000,
            seed: 42,
            noise: 0.15,
        }
    }
}

/// Generate synthetic salary records.
///
/// The first rows cycle through every category and experience value, so even
/// small samples populate every code table.
pub fn generate_records(config: &SampleConfig) -> Result<Vec<SalaryRecord>, AppError> {
    if config.rows == 0 {
        return Err(AppError::new(2, "Sample row count must be > 0."));
    }
    if !(config.noise.is_finite() && config.noise >= 0.0) {
        return Err(AppError::new(2, "Sample noise must be finite and >= 0."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, 1.0).map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let mut records = Vec::with_capacity(config.rows);
    for i in 0..config.rows {
        let experience = if i <= MAX_EXPERIENCE as usize {
            i as u32
        } else {
            rng.gen_range(0..=MAX_EXPERIENCE)
        };
        let (city, city_mult) = pick(&mut rng, &CITIES, i);
        let (education, edu_mult) = pick(&mut rng, &EDUCATION, i);
        let (area, area_mult) = pick(&mut rng, &FUNCTIONAL_AREAS, i);

        let expected = (BASE_SALARY + PER_YEAR * experience as f64) * city_mult * edu_mult * area_mult;
        let z: f64 = normal.sample(&mut rng);
        let salary = (expected * (1.0 + config.noise * z)).max(MIN_SALARY);

        records.push(SalaryRecord {
            experience_years: Some(experience as f64),
            career_level: career_level_for_experience(experience).to_string(),
            functional_area: area.to_string(),
            city_group: city.to_string(),
            minimum_education: education.to_string(),
            salary_avg: (salary / 500.0).round() * 500.0,
        });
    }

    Ok(records)
}

/// Write records as a cleaned-dataset CSV.
pub fn write_records_csv(path: &Path, records: &[SalaryRecord]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create sample CSV '{}': {e}", path.display())))?;

    let mut header = vec!["experience_years"];
    header.extend(CategoricalField::ALL.iter().map(|f| f.column_name()));
    header.push("salary_avg");
    writer
        .write_record(&header)
        .map_err(|e| AppError::new(2, format!("Failed to write sample CSV header: {e}")))?;

    for r in records {
        let experience = r.experience_years.map(|v| v.to_string()).unwrap_or_default();
        let salary = r.salary_avg.to_string();
        let mut row = vec![experience.as_str()];
        row.extend(CategoricalField::ALL.iter().map(|&f| r.category(f)));
        row.push(salary.as_str());
        writer
            .write_record(&row)
            .map_err(|e| AppError::new(2, format!("Failed to write sample CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush sample CSV: {e}")))?;
    Ok(())
}

fn pick<T: Copy>(rng: &mut StdRng, options: &[T], i: usize) -> T {
    if i < options.len() {
        options[i]
    } else {
        options[rng.gen_range(0..options.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::load_salary_records;

    #[test]
    fn same_seed_same_records() {
        let config = SampleConfig { rows: 200, ..SampleConfig::default() };
        assert_eq!(generate_records(&config).unwrap(), generate_records(&config).unwrap());

        let other = SampleConfig { seed: 7, ..config };
        assert_ne!(generate_records(&config).unwrap(), generate_records(&other).unwrap());
    }

    #[test]
    fn small_samples_cover_every_category() {
        let records = generate_records(&SampleConfig { rows: 20, ..SampleConfig::default() }).unwrap();
        for (city, _) in CITIES {
            assert!(records.iter().any(|r| r.city_group == city), "missing {city}");
        }
        for level in ["Intern/Student", "Entry Level", "Experienced Professional", "Department Head"] {
            assert!(records.iter().any(|r| r.career_level == level), "missing {level}");
        }
        assert!(records.iter().all(|r| r.salary_avg >= MIN_SALARY));
    }

    #[test]
    fn written_csv_ingests_cleanly() {
        let records = generate_records(&SampleConfig { rows: 50, ..SampleConfig::default() }).unwrap();
        let path = std::env::temp_dir().join(format!("compass-{}-sample.csv", std::process::id()));

        write_records_csv(&path, &records).unwrap();
        let ingested = load_salary_records(&path).unwrap();
        assert_eq!(ingested.rows_used, 50);
        assert!(ingested.row_errors.is_empty());
        assert_eq!(ingested.records, records);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn zero_rows_is_rejected() {
        let err = generate_records(&SampleConfig { rows: 0, ..SampleConfig::default() }).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
