//! Category -> integer code tables for the categorical job attributes.
//!
//! Codes are assigned by sorting the distinct training values, so the same
//! corpus always yields the same table. The table order is persisted in the
//! bundle and reused verbatim at prediction time.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::{CategoricalField, SalaryRecord};
use crate::error::ModelError;

/// Code table for a single categorical field. A value's code is its index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEncoder {
    classes: Vec<String>,
}

impl CategoryEncoder {
    pub fn fit<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let distinct: BTreeSet<&str> = values.into_iter().collect();
        Self {
            classes: distinct.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn encode(&self, value: &str) -> Option<usize> {
        self.classes.iter().position(|c| c == value)
    }

    pub fn decode(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// One code table per categorical field, frozen after training.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderRegistry {
    career_level: CategoryEncoder,
    functional_area: CategoryEncoder,
    city_group: CategoryEncoder,
    minimum_education: CategoryEncoder,
}

impl EncoderRegistry {
    /// Build the registry from every value observed in the training corpus.
    pub fn fit(records: &[SalaryRecord]) -> Result<Self, ModelError> {
        if records.is_empty() {
            return Err(ModelError::TrainingData(
                "Cannot fit encoders on an empty dataset.".to_string(),
            ));
        }

        let fit_field = |field: CategoricalField| {
            CategoryEncoder::fit(records.iter().map(|r| r.category(field)))
        };

        Ok(Self {
            career_level: fit_field(CategoricalField::CareerLevel),
            functional_area: fit_field(CategoricalField::FunctionalArea),
            city_group: fit_field(CategoricalField::CityGroup),
            minimum_education: fit_field(CategoricalField::MinimumEducation),
        })
    }

    pub fn encoder(&self, field: CategoricalField) -> &CategoryEncoder {
        match field {
            CategoricalField::CareerLevel => &self.career_level,
            CategoricalField::FunctionalArea => &self.functional_area,
            CategoricalField::CityGroup => &self.city_group,
            CategoricalField::MinimumEducation => &self.minimum_education,
        }
    }

    /// Encode a value, failing hard on anything not seen during fit.
    pub fn encode(&self, field: CategoricalField, value: &str) -> Result<usize, ModelError> {
        self.encoder(field)
            .encode(value)
            .ok_or_else(|| ModelError::UnknownCategory {
                field,
                value: value.to_string(),
            })
    }

    pub fn decode(&self, field: CategoricalField, code: usize) -> Option<&str> {
        self.encoder(field).decode(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(level: &str, area: &str, city: &str, edu: &str) -> SalaryRecord {
        SalaryRecord {
            experience_years: Some(1.0),
            career_level: level.to_string(),
            functional_area: area.to_string(),
            city_group: city.to_string(),
            minimum_education: edu.to_string(),
            salary_avg: 50_000.0,
        }
    }

    fn corpus() -> Vec<SalaryRecord> {
        vec![
            record("Entry Level", "General", "Lahore", "Bachelors"),
            record("Experienced Professional", "Engineering", "Karachi", "Masters"),
            record("Entry Level", "Accounts", "Faisalabad", "Unknown"),
        ]
    }

    #[test]
    fn codes_follow_sorted_class_order() {
        let registry = EncoderRegistry::fit(&corpus()).unwrap();
        let cities = registry.encoder(CategoricalField::CityGroup);
        assert_eq!(cities.classes(), ["Faisalabad", "Karachi", "Lahore"]);
        assert_eq!(registry.encode(CategoricalField::CityGroup, "Lahore").unwrap(), 2);
    }

    #[test]
    fn every_training_value_round_trips() {
        let records = corpus();
        let registry = EncoderRegistry::fit(&records).unwrap();
        for r in &records {
            for field in CategoricalField::ALL {
                let value = r.category(field);
                let code = registry.encode(field, value).unwrap();
                assert_eq!(registry.decode(field, code), Some(value));
            }
        }
    }

    #[test]
    fn unseen_value_is_an_error_for_every_field() {
        let registry = EncoderRegistry::fit(&corpus()).unwrap();
        for field in CategoricalField::ALL {
            let err = registry.encode(field, "Never Seen").unwrap_err();
            assert_eq!(
                err,
                ModelError::UnknownCategory {
                    field,
                    value: "Never Seen".to_string()
                }
            );
        }
    }

    #[test]
    fn empty_corpus_is_rejected() {
        assert!(matches!(
            EncoderRegistry::fit(&[]),
            Err(ModelError::TrainingData(_))
        ));
    }
}
