//! Shared domain types.
//!
//! These types are kept small and serializable so they can be:
//!
//! - used in-memory during training and prediction
//! - persisted inside the model bundle
//! - emitted as JSON for the presentation layer

use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// The four categorical job attributes that go through the encoder registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalField {
    CareerLevel,
    FunctionalArea,
    CityGroup,
    MinimumEducation,
}

impl CategoricalField {
    pub const ALL: [CategoricalField; 4] = [
        CategoricalField::CareerLevel,
        CategoricalField::FunctionalArea,
        CategoricalField::CityGroup,
        CategoricalField::MinimumEducation,
    ];

    /// Column name in the cleaned dataset.
    pub fn column_name(self) -> &'static str {
        match self {
            CategoricalField::CareerLevel => "Career Level",
            CategoricalField::FunctionalArea => "Functional Area",
            CategoricalField::CityGroup => "city_grouped",
            CategoricalField::MinimumEducation => "Minimum Education",
        }
    }
}

impl fmt::Display for CategoricalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// How `education_rank` is derived for a job profile at prediction time.
///
/// Training always uses the full 5-level ordinal mapping. The legacy rule only
/// distinguishes Bachelors (4) from everything else (5), which disagrees with
/// training for three of the five levels; it is the default so that existing
/// bundles reproduce the estimates they were validated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EducationRankPolicy {
    /// Bachelors -> 4, anything else -> 5.
    #[default]
    Legacy,
    /// Same 5-level mapping as training (unmapped -> 3).
    Ordinal,
}

/// A structured job profile submitted for prediction.
///
/// Construct through [`JobProfile::new`], which rejects blank categorical values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobProfile {
    pub experience_years: u32,
    pub career_level: String,
    pub functional_area: String,
    pub city_group: String,
    pub minimum_education: String,
}

impl JobProfile {
    pub fn new(
        experience_years: u32,
        career_level: impl Into<String>,
        functional_area: impl Into<String>,
        city_group: impl Into<String>,
        minimum_education: impl Into<String>,
    ) -> Result<Self, ModelError> {
        let profile = Self {
            experience_years,
            career_level: career_level.into().trim().to_string(),
            functional_area: functional_area.into().trim().to_string(),
            city_group: city_group.into().trim().to_string(),
            minimum_education: minimum_education.into().trim().to_string(),
        };

        for field in CategoricalField::ALL {
            if profile.category(field).is_empty() {
                return Err(ModelError::InvalidProfile(format!("`{field}` must not be blank")));
            }
        }

        Ok(profile)
    }

    pub fn category(&self, field: CategoricalField) -> &str {
        match field {
            CategoricalField::CareerLevel => &self.career_level,
            CategoricalField::FunctionalArea => &self.functional_area,
            CategoricalField::CityGroup => &self.city_group,
            CategoricalField::MinimumEducation => &self.minimum_education,
        }
    }
}

/// Career level implied by years of experience, for profiles that omit it.
pub fn career_level_for_experience(experience_years: u32) -> &'static str {
    match experience_years {
        0..=1 => "Intern/Student",
        2..=3 => "Entry Level",
        4..=8 => "Experienced Professional",
        _ => "Department Head",
    }
}

/// One cleaned historical salary observation.
#[derive(Debug, Clone, PartialEq)]
pub struct SalaryRecord {
    /// `None` when the source value was missing or unparseable. Such rows still
    /// count toward market aggregates but are excluded from training.
    pub experience_years: Option<f64>,
    pub career_level: String,
    pub functional_area: String,
    pub city_group: String,
    pub minimum_education: String,
    /// Target, in PKR per month.
    pub salary_avg: f64,
}

impl SalaryRecord {
    pub fn category(&self, field: CategoricalField) -> &str {
        match field {
            CategoricalField::CareerLevel => &self.career_level,
            CategoricalField::FunctionalArea => &self.functional_area,
            CategoricalField::CityGroup => &self.city_group,
            CategoricalField::MinimumEducation => &self.minimum_education,
        }
    }
}

/// Hyperparameters of a single random forest ensemble member.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    /// Fraction of features considered at each split (1.0 = all).
    pub max_features: f64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 10,
            min_samples_split: 8,
            max_features: 1.0,
        }
    }
}

/// A full training run's configuration.
///
/// This is derived from CLI flags (plus env/defaults).
#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub data_path: PathBuf,
    pub bundle_path: PathBuf,
    /// Ensemble size N (>= 2).
    pub n_models: usize,
    /// Seed for the train/test split; member `i` is trained with `seed + i`.
    pub seed: u64,
    pub forest: ForestParams,
    pub test_fraction: f64,
    pub education_rank: EducationRankPolicy,
    /// Optional CSV export of held-out predictions.
    pub export_predictions: Option<PathBuf>,
}

/// Qualitative label derived from the ensemble uncertainty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn from_uncertainty(std: f64) -> Self {
        if std < 15_000.0 {
            ConfidenceLevel::High
        } else if std < 25_000.0 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfidenceLevel::High => "High",
            ConfidenceLevel::Medium => "Medium",
            ConfidenceLevel::Low => "Low",
        };
        f.write_str(label)
    }
}

/// Point estimate plus guardrail-clamped 95% interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub prediction: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    /// Population standard deviation of the ensemble member outputs.
    pub uncertainty: f64,
    pub confidence: ConfidenceLevel,
}

/// Mean uncertainty for held-out rows whose true salary falls in a band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandUncertainty {
    pub label: String,
    pub n: usize,
    pub mean_uncertainty: f64,
}

/// Held-out evaluation of an ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub mae: f64,
    pub r2: f64,
    /// Fraction of held-out targets inside the raw 95% interval, in `[0, 1]`.
    pub coverage: f64,
    pub mean_interval_width: f64,
    pub n_rows: usize,
    pub uncertainty_by_band: Vec<BandUncertainty>,
}
