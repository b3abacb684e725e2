//! Market aggregates over the cleaned dataset.
//!
//! These summarize observed salaries, not the model. Each grouping drops small
//! groups so that averages over a handful of postings are never reported.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{CategoricalField, SalaryRecord};
use crate::math::{mean, pearson_correlation};

const MIN_EXPERIENCE_GROUP: usize = 5;
const MIN_EDUCATION_GROUP: usize = 10;
const MIN_CITY_GROUP: usize = 10;
const MIN_CAREER_GROUP: usize = 5;
const TOP_CITY_COUNT: usize = 6;

/// Neighbourhood labels that leak into the city column.
pub const EXCLUDED_AREAS: [&str; 2] = ["Johar Town", "DHA"];

/// Career level reported even when it has few postings.
pub const ALWAYS_SHOWN_CAREER_LEVEL: &str = "Department Head";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStat {
    pub label: String,
    pub mean_salary: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperienceStat {
    pub experience_years: f64,
    pub mean_salary: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketTrends {
    pub n_records: usize,
    /// Mean salary over every record, or 0 for an empty dataset.
    pub average_salary: f64,
    /// Pearson correlation of experience and salary over rows that have an
    /// experience value. `None` when it is undefined.
    pub experience_correlation: Option<f64>,
    pub experience_trend: Vec<ExperienceStat>,
    pub education: Vec<GroupStat>,
    pub cities: Vec<GroupStat>,
    pub career_levels: Vec<GroupStat>,
    /// Mean(Bachelors) - mean(Diploma), or 0 when either is absent.
    pub education_premium: f64,
}

pub fn analyze(records: &[SalaryRecord]) -> MarketTrends {
    let salaries: Vec<f64> = records.iter().map(|r| r.salary_avg).collect();
    let average_salary = mean(&salaries).unwrap_or(0.0);
    let experience_correlation = experience_correlation(records);
    let experience_trend = experience_trend(records);

    let mut education = group_by(records, CategoricalField::MinimumEducation, |_| true);
    let education_premium = premium(&education, "Bachelors", "Diploma");
    education.retain(|g| g.count >= MIN_EDUCATION_GROUP);
    sort_by_mean(&mut education, true);

    let mut cities = group_by(records, CategoricalField::CityGroup, |r| {
        !EXCLUDED_AREAS.contains(&r.city_group.as_str())
    });
    cities.retain(|g| g.count >= MIN_CITY_GROUP);
    sort_by_mean(&mut cities, true);
    cities.truncate(TOP_CITY_COUNT);

    let mut career_levels = group_by(records, CategoricalField::CareerLevel, |_| true);
    career_levels.retain(|g| g.count >= MIN_CAREER_GROUP || g.label == ALWAYS_SHOWN_CAREER_LEVEL);
    sort_by_mean(&mut career_levels, false);

    MarketTrends {
        n_records: records.len(),
        average_salary,
        experience_correlation,
        experience_trend,
        education,
        cities,
        career_levels,
        education_premium,
    }
}

fn experience_correlation(records: &[SalaryRecord]) -> Option<f64> {
    let (years, salaries): (Vec<f64>, Vec<f64>) = records
        .iter()
        .filter_map(|r| r.experience_years.map(|e| (e, r.salary_avg)))
        .unzip();
    pearson_correlation(&years, &salaries)
}

fn experience_trend(records: &[SalaryRecord]) -> Vec<ExperienceStat> {
    let mut pairs: Vec<(f64, f64)> = records
        .iter()
        .filter_map(|r| r.experience_years.map(|e| (e, r.salary_avg)))
        .collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

    pairs
        .chunk_by(|a, b| a.0 == b.0)
        .filter(|group| group.len() >= MIN_EXPERIENCE_GROUP)
        .map(|group| ExperienceStat {
            experience_years: group[0].0,
            mean_salary: group.iter().map(|p| p.1).sum::<f64>() / group.len() as f64,
            count: group.len(),
        })
        .collect()
}

fn group_by(
    records: &[SalaryRecord],
    field: CategoricalField,
    keep: impl Fn(&SalaryRecord) -> bool,
) -> Vec<GroupStat> {
    let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for r in records {
        if !keep(r) {
            continue;
        }
        let entry = sums.entry(r.category(field)).or_insert((0.0, 0));
        entry.0 += r.salary_avg;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(label, (sum, count))| GroupStat {
            label: label.to_string(),
            mean_salary: sum / count as f64,
            count,
        })
        .collect()
}

fn sort_by_mean(groups: &mut [GroupStat], descending: bool) {
    groups.sort_by(|a, b| {
        let ord = a.mean_salary.total_cmp(&b.mean_salary);
        if descending { ord.reverse() } else { ord }
    });
}

fn premium(groups: &[GroupStat], upper: &str, lower: &str) -> f64 {
    let mean_of = |label: &str| groups.iter().find(|g| g.label == label).map(|g| g.mean_salary);
    match (mean_of(upper), mean_of(lower)) {
        (Some(a), Some(b)) => a - b,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(exp: Option<f64>, level: &str, city: &str, edu: &str, salary: f64) -> SalaryRecord {
        SalaryRecord {
            experience_years: exp,
            career_level: level.to_string(),
            functional_area: "General".to_string(),
            city_group: city.to_string(),
            minimum_education: edu.to_string(),
            salary_avg: salary,
        }
    }

    fn repeat(n: usize, r: SalaryRecord) -> Vec<SalaryRecord> {
        vec![r; n]
    }

    #[test]
    fn experience_trend_filters_small_groups_and_sorts_ascending() {
        let mut records = repeat(5, rec(Some(3.0), "Entry Level", "Lahore", "Bachelors", 60_000.0));
        records.extend(repeat(4, rec(Some(1.0), "Entry Level", "Lahore", "Bachelors", 30_000.0)));
        records.extend(repeat(6, rec(Some(0.0), "Entry Level", "Lahore", "Bachelors", 25_000.0)));
        records.extend(repeat(9, rec(None, "Entry Level", "Lahore", "Bachelors", 99_000.0)));

        let trends = analyze(&records);
        let years: Vec<f64> = trends.experience_trend.iter().map(|s| s.experience_years).collect();
        assert_eq!(years, vec![0.0, 3.0]);
        assert_eq!(trends.experience_trend[1].count, 5);
        assert_eq!(trends.n_records, 24);
    }

    #[test]
    fn cities_exclude_neighbourhoods_and_keep_top_six() {
        let mut records = Vec::new();
        for (i, city) in ["A", "B", "C", "D", "E", "F", "G"].iter().enumerate() {
            let salary = 10_000.0 * (i + 1) as f64;
            records.extend(repeat(10, rec(Some(1.0), "Entry Level", city, "Bachelors", salary)));
        }
        records.extend(repeat(20, rec(Some(1.0), "Entry Level", "DHA", "Bachelors", 900_000.0)));
        records.extend(repeat(9, rec(Some(1.0), "Entry Level", "Tiny", "Bachelors", 800_000.0)));

        let cities = analyze(&records).cities;
        let labels: Vec<&str> = cities.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["G", "F", "E", "D", "C", "B"]);
    }

    #[test]
    fn department_head_survives_small_count() {
        let senior = rec(Some(4.0), "Experienced Professional", "Lahore", "Bachelors", 90_000.0);
        let mut records = repeat(5, senior);
        records.extend(repeat(5, rec(Some(1.0), "Entry Level", "Lahore", "Bachelors", 40_000.0)));
        records.extend(repeat(2, rec(Some(12.0), "Department Head", "Lahore", "Bachelors", 250_000.0)));
        records.extend(repeat(2, rec(Some(0.0), "Intern/Student", "Lahore", "Bachelors", 15_000.0)));

        let levels: Vec<String> = analyze(&records).career_levels.into_iter().map(|g| g.label).collect();
        assert_eq!(levels, vec!["Entry Level", "Experienced Professional", "Department Head"]);
    }

    #[test]
    fn education_groups_and_premium() {
        let mut records = repeat(10, rec(Some(2.0), "Entry Level", "Lahore", "Bachelors", 70_000.0));
        records.extend(repeat(10, rec(Some(2.0), "Entry Level", "Lahore", "Masters", 90_000.0)));
        records.extend(repeat(3, rec(Some(2.0), "Entry Level", "Lahore", "Diploma", 40_000.0)));

        let trends = analyze(&records);
        let labels: Vec<&str> = trends.education.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["Masters", "Bachelors"]);
        assert_eq!(trends.education_premium, 30_000.0);

        let no_diploma: Vec<SalaryRecord> = records
            .into_iter()
            .filter(|r| r.minimum_education != "Diploma")
            .collect();
        assert_eq!(analyze(&no_diploma).education_premium, 0.0);
    }

    #[test]
    fn average_salary_covers_every_record() {
        let mut records = repeat(3, rec(Some(1.0), "Entry Level", "Lahore", "Bachelors", 30_000.0));
        records.push(rec(None, "Entry Level", "Lahore", "Bachelors", 70_000.0));

        assert_eq!(analyze(&records).average_salary, 40_000.0);
        assert_eq!(analyze(&[]).average_salary, 0.0);
    }

    #[test]
    fn experience_correlation_skips_rows_without_experience() {
        let mut records: Vec<SalaryRecord> = (0..6)
            .map(|i| {
                let salary = 20_000.0 + 5_000.0 * i as f64;
                rec(Some(i as f64), "Entry Level", "Lahore", "Bachelors", salary)
            })
            .collect();
        records.push(rec(None, "Entry Level", "Lahore", "Bachelors", 1_000.0));

        let r = analyze(&records).experience_correlation.unwrap();
        assert!((r - 1.0).abs() < 1e-12);

        let flat = repeat(4, rec(Some(2.0), "Entry Level", "Lahore", "Bachelors", 50_000.0));
        assert_eq!(analyze(&flat).experience_correlation, None);
    }
}
