//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves dataset/bundle paths (flag > env > default)
//! - runs training, prediction, market summaries or sample generation
//! - prints reports and writes artifacts

use std::path::PathBuf;

use clap::Parser;

use crate::cli::{Command, MarketArgs, PredictArgs, SampleArgs, TrainArgs};
use crate::domain::{ForestParams, JobProfile, TrainConfig, career_level_for_experience};
use crate::error::AppError;

pub mod pipeline;

pub const DATA_ENV: &str = "COMPASS_DATA";
pub const BUNDLE_ENV: &str = "COMPASS_BUNDLE";
pub const DEFAULT_DATA_PATH: &str = "cleaned_salary_data.csv";
pub const DEFAULT_BUNDLE_PATH: &str = "salary_prediction_confidence_model.json";

/// Entry point for the `compass` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = crate::cli::Cli::parse();
    match cli.command {
        Command::Train(args) => handle_train(args),
        Command::Predict(args) => handle_predict(args),
        Command::Market(args) => handle_market(args),
        Command::Sample(args) => handle_sample(args),
    }
}

/// Logs go to stderr so stdout stays clean for reports and JSON.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    // A subscriber may already be installed (e.g. by an embedding process).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_train(args: TrainArgs) -> Result<(), AppError> {
    let config = train_config_from_args(&args);
    let run = pipeline::run_training(&config)?;

    crate::io::write_bundle(&config.bundle_path, &run.bundle)?;
    if let Some(path) = &config.export_predictions {
        crate::io::write_predictions_csv(path, &run.held_out)?;
    }

    println!(
        "{}",
        crate::report::format_training_summary(&run, &config.data_path, &config.bundle_path)
    );
    Ok(())
}

fn handle_predict(args: PredictArgs) -> Result<(), AppError> {
    let bundle_path = resolve_path(args.bundle.clone(), BUNDLE_ENV, DEFAULT_BUNDLE_PATH);
    let bundle = crate::io::read_bundle(&bundle_path)?;

    let career_level = args
        .career_level
        .clone()
        .unwrap_or_else(|| career_level_for_experience(args.experience).to_string());
    let profile = JobProfile::new(
        args.experience,
        career_level,
        args.functional_area.as_str(),
        args.city.as_str(),
        args.education.as_str(),
    )?;

    let result = crate::fit::predict(&profile, &bundle)?;

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| AppError::new(4, format!("Failed to serialize prediction: {e}")))?;
        println!("{json}");
    } else {
        println!("{}", crate::report::format_prediction(&profile, &result));
        println!("{}", crate::report::format_bundle_note(&bundle));
    }
    Ok(())
}

fn handle_market(args: MarketArgs) -> Result<(), AppError> {
    let data_path = resolve_path(args.data.clone(), DATA_ENV, DEFAULT_DATA_PATH);
    let ingest = crate::io::load_salary_records(&data_path)?;
    let trends = crate::market::analyze(&ingest.records);

    if args.json {
        let json = serde_json::to_string_pretty(&trends)
            .map_err(|e| AppError::new(4, format!("Failed to serialize market trends: {e}")))?;
        println!("{json}");
    } else {
        println!("{}", crate::report::format_market(&trends));
    }
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = crate::data::SampleConfig {
        rows: args.rows,
        seed: args.seed,
        noise: args.noise,
    };
    let records = crate::data::generate_records(&config)?;
    crate::data::write_records_csv(&args.out, &records)?;
    tracing::info!(path = %args.out.display(), rows = records.len(), "wrote synthetic dataset");
    Ok(())
}

pub fn train_config_from_args(args: &TrainArgs) -> TrainConfig {
    TrainConfig {
        data_path: resolve_path(args.data.clone(), DATA_ENV, DEFAULT_DATA_PATH),
        bundle_path: resolve_path(args.bundle.clone(), BUNDLE_ENV, DEFAULT_BUNDLE_PATH),
        n_models: args.models,
        seed: args.seed,
        forest: ForestParams {
            n_trees: args.trees,
            max_depth: args.max_depth,
            min_samples_split: args.min_samples_split,
            max_features: args.max_features,
        },
        test_fraction: args.test_fraction,
        education_rank: args.education_rank,
        export_predictions: args.export.clone(),
    }
}

/// Explicit flag, then environment variable, then the built-in default.
fn resolve_path(flag: Option<PathBuf>, env_key: &str, default: &str) -> PathBuf {
    choose_path(flag, std::env::var(env_key).ok(), default)
}

fn choose_path(flag: Option<PathBuf>, env_value: Option<String>, default: &str) -> PathBuf {
    flag.or_else(|| env_value.filter(|v| !v.trim().is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(default))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_beats_env_beats_default() {
        let flag = Some(PathBuf::from("flag.csv"));
        let env = Some("env.csv".to_string());

        assert_eq!(choose_path(flag.clone(), env.clone(), DEFAULT_DATA_PATH), PathBuf::from("flag.csv"));
        assert_eq!(choose_path(None, env, DEFAULT_DATA_PATH), PathBuf::from("env.csv"));
        assert_eq!(choose_path(None, Some("  ".to_string()), DEFAULT_DATA_PATH), PathBuf::from(DEFAULT_DATA_PATH));
        assert_eq!(choose_path(None, None, DEFAULT_BUNDLE_PATH), PathBuf::from(DEFAULT_BUNDLE_PATH));
    }

    #[test]
    fn train_args_map_onto_config() {
        let cli = crate::cli::Cli::parse_from([
            "compass",
            "train",
            "--data",
            "jobs.csv",
            "--bundle",
            "model.json",
            "--models",
            "5",
            "--trees",
            "50",
            "--education-rank",
            "ordinal",
        ]);
        let Command::Train(args) = cli.command else {
            panic!("expected train");
        };
        let config = train_config_from_args(&args);
        assert_eq!(config.data_path, PathBuf::from("jobs.csv"));
        assert_eq!(config.bundle_path, PathBuf::from("model.json"));
        assert_eq!(config.n_models, 5);
        assert_eq!(config.forest.n_trees, 50);
        assert_eq!(config.education_rank, crate::domain::EducationRankPolicy::Ordinal);
    }
}
