//! Command-line parsing for the salary confidence estimator.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::EducationRankPolicy;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "compass", version, about = "Salary range estimator with ensemble confidence intervals")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Train the ensemble on a cleaned dataset, evaluate it and write the bundle.
    Train(TrainArgs),
    /// Estimate a salary range for one job profile.
    Predict(PredictArgs),
    /// Summarize observed salaries by experience, education, city and career level.
    Market(MarketArgs),
    /// Write a synthetic cleaned dataset.
    Sample(SampleArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct TrainArgs {
    /// Cleaned dataset CSV (default: $COMPASS_DATA or cleaned_salary_data.csv).
    #[arg(long, value_name = "CSV")]
    pub data: Option<PathBuf>,

    /// Output bundle JSON (default: $COMPASS_BUNDLE or salary_prediction_confidence_model.json).
    #[arg(long, value_name = "JSON")]
    pub bundle: Option<PathBuf>,

    /// Number of ensemble members (>= 2).
    #[arg(long, default_value_t = 10)]
    pub models: usize,

    /// Trees per random forest.
    #[arg(long, default_value_t = 100)]
    pub trees: usize,

    #[arg(long, default_value_t = 10)]
    pub max_depth: usize,

    #[arg(long, default_value_t = 8)]
    pub min_samples_split: usize,

    /// Fraction of features tried at each split, in (0, 1].
    #[arg(long, default_value_t = 1.0)]
    pub max_features: f64,

    /// Seed for the split; member i uses seed + i.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Fraction of rows held out for evaluation.
    #[arg(long, default_value_t = 0.2)]
    pub test_fraction: f64,

    /// How education rank is derived at prediction time.
    #[arg(long, value_enum, default_value_t = EducationRankPolicy::Legacy)]
    pub education_rank: EducationRankPolicy,

    /// Export held-out predictions (raw interval) to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct PredictArgs {
    /// Bundle JSON produced by `compass train`.
    #[arg(long, value_name = "JSON")]
    pub bundle: Option<PathBuf>,

    #[arg(long)]
    pub experience: u32,

    /// Career level (derived from experience when omitted).
    #[arg(long)]
    pub career_level: Option<String>,

    #[arg(long)]
    pub functional_area: String,

    /// City group, e.g. Karachi or Faisalabad.
    #[arg(long)]
    pub city: String,

    /// Minimum education, e.g. Bachelors.
    #[arg(long)]
    pub education: String,

    /// Print the prediction as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser, Clone)]
pub struct MarketArgs {
    /// Cleaned dataset CSV (default: $COMPASS_DATA or cleaned_salary_data.csv).
    #[arg(long, value_name = "CSV")]
    pub data: Option<PathBuf>,

    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser, Clone)]
pub struct SampleArgs {
    #[arg(long, value_name = "CSV")]
    pub out: PathBuf,

    #[arg(long, default_value_t = 2000)]
    pub rows: usize,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Relative salary noise (standard deviation).
    #[arg(long, default_value_t = 0.15)]
    pub noise: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn train_defaults_match_reference_run() {
        let cli = Cli::parse_from(["compass", "train"]);
        let Command::Train(args) = cli.command else {
            panic!("expected train");
        };
        assert_eq!(args.models, 10);
        assert_eq!(args.trees, 100);
        assert_eq!(args.max_depth, 10);
        assert_eq!(args.min_samples_split, 8);
        assert_eq!(args.seed, 42);
        assert_eq!(args.test_fraction, 0.2);
        assert_eq!(args.education_rank, EducationRankPolicy::Legacy);
    }

    #[test]
    fn predict_parses_profile_flags() {
        let cli = Cli::parse_from([
            "compass",
            "predict",
            "--experience",
            "3",
            "--functional-area",
            "Sales",
            "--city",
            "Karachi",
            "--education",
            "Masters",
            "--json",
        ]);
        let Command::Predict(args) = cli.command else {
            panic!("expected predict");
        };
        assert_eq!(args.experience, 3);
        assert_eq!(args.career_level, None);
        assert!(args.json);
    }
}
