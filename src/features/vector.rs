//! Feature vector construction.
//!
//! The column order below is part of the bundle contract: the scaler and every
//! ensemble member are fit against exactly this layout.
//!
//! ```text
//! 0 experience_years
//! 1 career_level_code
//! 2 functional_area_code
//! 3 city_group_code
//! 4 minimum_education_code
//! 5 is_top_city            (0/1)
//! 6 experience_squared
//! 7 education_rank
//! ```
//!
//! `education_rank` is derived differently at training time (full 5-level
//! ordinal) and at prediction time (see [`EducationRankPolicy`]).

use nalgebra::DMatrix;

use crate::domain::{CategoricalField, EducationRankPolicy, JobProfile, SalaryRecord};
use crate::error::ModelError;
use crate::features::encoder::EncoderRegistry;

pub const FEATURE_COUNT: usize = 8;

pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "experience_years",
    "career_level_code",
    "functional_area_code",
    "city_group_code",
    "minimum_education_code",
    "is_top_city",
    "experience_squared",
    "education_rank",
];

/// Metropolitan areas treated as commanding a salary premium.
pub const TOP_CITIES: [&str; 3] = ["Karachi", "Islamabad", "Lahore"];

pub type FeatureVector = [f64; FEATURE_COUNT];

pub fn is_top_city(city: &str) -> bool {
    TOP_CITIES.contains(&city)
}

/// Training-time education ordinal. Unmapped levels (including `Unknown`) get 3.
pub fn education_ordinal(education: &str) -> f64 {
    match education {
        "Matriculation/O-Level" => 1.0,
        "Intermediate/A-Level" => 2.0,
        "Diploma" => 3.0,
        "Bachelors" => 4.0,
        "Masters" => 5.0,
        _ => 3.0,
    }
}

/// Prediction-time education rank under the given policy.
pub fn inference_education_rank(policy: EducationRankPolicy, education: &str) -> f64 {
    match policy {
        EducationRankPolicy::Legacy => {
            if education == "Bachelors" {
                4.0
            } else {
                5.0
            }
        }
        EducationRankPolicy::Ordinal => education_ordinal(education),
    }
}

/// Build the feature vector for a job profile at prediction time.
///
/// Fails with `UnknownCategory` if any categorical value was never seen during
/// training.
pub fn build_feature_vector(
    profile: &JobProfile,
    registry: &EncoderRegistry,
    policy: EducationRankPolicy,
) -> Result<FeatureVector, ModelError> {
    let experience = f64::from(profile.experience_years);
    let rank = inference_education_rank(policy, &profile.minimum_education);
    assemble(experience, |field| profile.category(field), registry, rank)
}

/// Build the feature vector for a training row.
///
/// Returns `Ok(None)` when the row has no usable experience value; such rows
/// are excluded from training.
pub fn build_training_vector(
    record: &SalaryRecord,
    registry: &EncoderRegistry,
) -> Result<Option<FeatureVector>, ModelError> {
    let Some(experience) = record.experience_years.filter(|v| v.is_finite()) else {
        return Ok(None);
    };
    let rank = education_ordinal(&record.minimum_education);
    assemble(experience, |field| record.category(field), registry, rank).map(Some)
}

fn assemble<'a>(
    experience: f64,
    category: impl Fn(CategoricalField) -> &'a str,
    registry: &EncoderRegistry,
    education_rank: f64,
) -> Result<FeatureVector, ModelError> {
    let code = |field: CategoricalField| registry.encode(field, category(field)).map(|c| c as f64);

    Ok([
        experience,
        code(CategoricalField::CareerLevel)?,
        code(CategoricalField::FunctionalArea)?,
        code(CategoricalField::CityGroup)?,
        code(CategoricalField::MinimumEducation)?,
        if is_top_city(category(CategoricalField::CityGroup)) { 1.0 } else { 0.0 },
        experience * experience,
        education_rank,
    ])
}

/// Training matrix + aligned targets.
#[derive(Debug, Clone)]
pub struct TrainingMatrix {
    pub x: DMatrix<f64>,
    pub y: Vec<f64>,
    /// Rows dropped because their numeric features were missing.
    pub excluded: usize,
}

/// Build the training matrix for a set of cleaned records.
pub fn build_training_matrix(
    records: &[SalaryRecord],
    registry: &EncoderRegistry,
) -> Result<TrainingMatrix, ModelError> {
    let mut flat = Vec::with_capacity(records.len() * FEATURE_COUNT);
    let mut y = Vec::with_capacity(records.len());
    let mut excluded = 0usize;

    for record in records {
        match build_training_vector(record, registry)? {
            Some(row) => {
                flat.extend_from_slice(&row);
                y.push(record.salary_avg);
            }
            None => excluded += 1,
        }
    }

    if y.is_empty() {
        return Err(ModelError::TrainingData(
            "No rows with usable numeric features.".to_string(),
        ));
    }

    Ok(TrainingMatrix {
        x: DMatrix::from_row_slice(y.len(), FEATURE_COUNT, &flat),
        y,
        excluded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(exp: Option<f64>, city: &str, edu: &str) -> SalaryRecord {
        SalaryRecord {
            experience_years: exp,
            career_level: "Entry Level".to_string(),
            functional_area: "General".to_string(),
            city_group: city.to_string(),
            minimum_education: edu.to_string(),
            salary_avg: 40_000.0,
        }
    }

    fn registry() -> EncoderRegistry {
        EncoderRegistry::fit(&[
            record(Some(1.0), "Karachi", "Bachelors"),
            record(Some(2.0), "Faisalabad", "Masters"),
            record(Some(3.0), "Lahore", "Diploma"),
        ])
        .unwrap()
    }

    fn profile(exp: u32, city: &str, edu: &str) -> JobProfile {
        JobProfile::new(exp, "Entry Level", "General", city, edu).unwrap()
    }

    fn encode(
        reg: &EncoderRegistry,
        exp: u32,
        city: &str,
        edu: &str,
        policy: EducationRankPolicy,
    ) -> Result<FeatureVector, ModelError> {
        build_feature_vector(&profile(exp, city, edu), reg, policy)
    }

    #[test]
    fn city_swap_moves_only_code_and_top_city_flag() {
        let reg = registry();
        let karachi = encode(&reg, 4, "Karachi", "Bachelors", EducationRankPolicy::Legacy).unwrap();
        let faisalabad = encode(&reg, 4, "Faisalabad", "Bachelors", EducationRankPolicy::Legacy).unwrap();

        assert_eq!(karachi[5], 1.0);
        assert_eq!(faisalabad[5], 0.0);

        // Apart from the city code itself, only the flag moves.
        let differing: Vec<usize> = (0..FEATURE_COUNT)
            .filter(|&i| i != 3)
            .filter(|&i| karachi[i] != faisalabad[i])
            .collect();
        assert_eq!(differing, vec![5]);
    }

    #[test]
    fn experience_squared_tracks_experience() {
        let reg = registry();
        let two = encode(&reg, 2, "Lahore", "Masters", EducationRankPolicy::Legacy).unwrap();
        let ten = encode(&reg, 10, "Lahore", "Masters", EducationRankPolicy::Legacy).unwrap();
        assert_eq!(two[6], 4.0);
        assert_eq!(ten[6], 100.0);
    }

    #[test]
    fn legacy_policy_uses_two_way_rule() {
        let reg = registry();
        let bachelors = encode(&reg, 1, "Lahore", "Bachelors", EducationRankPolicy::Legacy).unwrap();
        let diploma = encode(&reg, 1, "Lahore", "Diploma", EducationRankPolicy::Legacy).unwrap();
        assert_eq!(bachelors[7], 4.0);
        assert_eq!(diploma[7], 5.0);

        let ordinal = encode(&reg, 1, "Lahore", "Diploma", EducationRankPolicy::Ordinal).unwrap();
        assert_eq!(ordinal[7], 3.0);
    }

    #[test]
    fn unknown_city_fails_instead_of_defaulting() {
        let reg = registry();
        let err = encode(&reg, 1, "Quetta", "Bachelors", EducationRankPolicy::Legacy).unwrap_err();
        assert!(matches!(
            err,
            ModelError::UnknownCategory { field: CategoricalField::CityGroup, .. }
        ));
    }

    #[test]
    fn training_matrix_skips_rows_without_experience() {
        let records = vec![
            record(Some(1.0), "Karachi", "Bachelors"),
            record(None, "Lahore", "Diploma"),
            record(Some(3.0), "Faisalabad", "Masters"),
        ];
        let reg = EncoderRegistry::fit(&records).unwrap();
        let m = build_training_matrix(&records, &reg).unwrap();

        assert_eq!(m.x.nrows(), 2);
        assert_eq!(m.x.ncols(), FEATURE_COUNT);
        assert_eq!(m.excluded, 1);
        // Training uses the full ordinal: Masters -> 5.
        assert_eq!(m.x[(1, 7)], 5.0);
        assert_eq!(m.x[(1, 6)], 9.0);
    }
}
