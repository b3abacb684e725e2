//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized

use std::path::Path;

use crate::app::pipeline::TrainingRun;
use crate::domain::{JobProfile, ModelBundle, PredictionResult};
use crate::market::{GroupStat, MarketTrends};

/// Format the training summary (dataset + ensemble + held-out evaluation).
pub fn format_training_summary(run: &TrainingRun, data_path: &Path, bundle_path: &Path) -> String {
    let bundle = &run.bundle;
    let params = &bundle.forest_params;
    let m = &bundle.metrics;
    let mut out = String::new();

    out.push_str("=== compass - Salary Confidence Model ===\n");
    out.push_str(&format!("Data: {}\n", data_path.display()));
    out.push_str(&format!(
        "Rows: read={} | used={} | row errors={} | no experience={}\n",
        run.ingest.rows_read,
        run.ingest.rows_used,
        run.ingest.row_errors.len(),
        run.excluded_rows,
    ));
    out.push_str(&format!(
        "Split: train={} | test={} | seed={}\n",
        bundle.n_train, bundle.n_test, bundle.base_seed
    ));
    out.push_str(&format!(
        "Ensemble: {} forests x {} trees (max_depth={}, min_samples_split={}, max_features={:.2})\n",
        bundle.ensemble.len(),
        params.n_trees,
        params.max_depth,
        params.min_samples_split,
        params.max_features,
    ));
    out.push_str(&format!("Education rank at inference: {:?}\n", bundle.education_rank));

    out.push_str("\nHeld-out evaluation:\n");
    out.push_str(&format!("- MAE: {}\n", fmt_pkr(m.mae)));
    out.push_str(&format!("- R2: {:.3}\n", m.r2));
    out.push_str(&format!("- 95% interval coverage: {:.1}%\n", m.coverage * 100.0));
    out.push_str(&format!("- Mean interval width: {}\n", fmt_pkr(m.mean_interval_width)));

    if !m.uncertainty_by_band.is_empty() {
        out.push_str("\nUncertainty by salary band:\n");
        for band in &m.uncertainty_by_band {
            out.push_str(&format!(
                "  {:<16} n={:<5} mean std {}\n",
                band.label,
                band.n,
                fmt_pkr(band.mean_uncertainty)
            ));
        }
    }

    out.push_str(&format!("\nBundle: {}\n", bundle_path.display()));
    out
}

/// Format a single prediction.
pub fn format_prediction(profile: &JobProfile, result: &PredictionResult) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Profile: {} yrs | {} | {} | {} | {}\n",
        profile.experience_years,
        profile.career_level,
        profile.functional_area,
        profile.city_group,
        profile.minimum_education,
    ));
    out.push_str(&format!(
        "Estimated salary range: {} - {}\n",
        fmt_pkr(result.lower_bound),
        fmt_pkr(result.upper_bound)
    ));
    out.push_str(&format!("Most likely: {}\n", fmt_pkr(result.prediction)));
    out.push_str(&format!(
        "Uncertainty: +/- {} ({} confidence)\n",
        fmt_pkr(result.uncertainty),
        result.confidence
    ));
    out
}

/// One-line note about the model a prediction came from.
pub fn format_bundle_note(bundle: &ModelBundle) -> String {
    format!(
        "Model: {} members, trained {} | held-out MAE {} | coverage {:.1}%",
        bundle.ensemble.len(),
        bundle.trained_at.format("%Y-%m-%d %H:%M UTC"),
        fmt_pkr(bundle.metrics.mae),
        bundle.metrics.coverage * 100.0
    )
}

/// Format the market aggregates.
pub fn format_market(trends: &MarketTrends) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== Market overview ({} postings) ===\n", trends.n_records));
    out.push_str(&format!("Average salary: {}\n", fmt_pkr(trends.average_salary)));
    match trends.experience_correlation {
        Some(r) => out.push_str(&format!("Experience-salary correlation: {r:.2}\n")),
        None => out.push_str("Experience-salary correlation: n/a\n"),
    }

    out.push_str("\nSalary by experience:\n");
    for s in &trends.experience_trend {
        out.push_str(&format!(
            "  {:>4} yrs  {:>14}  (n={})\n",
            s.experience_years,
            fmt_pkr(s.mean_salary),
            s.count
        ));
    }

    push_groups(&mut out, "Salary by education:", &trends.education);
    push_groups(&mut out, "Top cities:", &trends.cities);
    push_groups(&mut out, "Career progression:", &trends.career_levels);

    out.push_str(&format!(
        "\nBachelors premium over Diploma: {}\n",
        fmt_pkr(trends.education_premium)
    ));
    out
}

fn push_groups(out: &mut String, title: &str, groups: &[GroupStat]) {
    out.push('\n');
    out.push_str(title);
    out.push('\n');
    if groups.is_empty() {
        out.push_str("  (no group has enough postings)\n");
        return;
    }
    for g in groups {
        out.push_str(&format!(
            "  {:<28} {:>14}  (n={})\n",
            truncate(&g.label, 28),
            fmt_pkr(g.mean_salary),
            g.count
        ));
    }
}

/// `PKR 1,234,567` (rounded to the rupee).
pub fn fmt_pkr(v: f64) -> String {
    let rounded = v.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("PKR {sign}{grouped}")
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
