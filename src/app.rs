//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - resolves the dataset path
//! - runs the selection controller and diagnostics
//! - prints reports
//! - writes optional exports

use std::path::PathBuf;

use clap::Parser;
use tracing::{Level, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, DemoArgs, FitArgs};
use crate::data::{SampleConfig, generate_peers};
use crate::domain::{AxisLabels, RunConfig};
use crate::error::AppError;

pub mod pipeline;

use pipeline::{RunOutput, ViewOptions};

/// Environment variable consulted when `--data` is not given.
pub const DATA_ENV: &str = "PEERFIT_DATA";

/// Entry point for the `peerfit` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    init_tracing(cli.verbose);

    // A `.env` file may carry `PEERFIT_DATA`.
    dotenvy::dotenv().ok();

    match cli.command {
        Command::Fit(args) => handle_fit(args, OutputMode::Full),
        Command::Rank(args) => handle_fit(args, OutputMode::RankOnly),
        Command::Demo(args) => handle_demo(args),
    }
}

/// Log to stderr so report output on stdout stays clean for piping.
fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("peer_regression=info"),
        1 => EnvFilter::new("peer_regression=debug"),
        _ => EnvFilter::new("peer_regression=trace"),
    });
    // A second init (tests, embedding) is not an error worth surfacing.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_max_level(Level::TRACE)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Full,
    RankOnly,
}

fn handle_fit(args: FitArgs, mode: OutputMode) -> Result<(), AppError> {
    let env_path = std::env::var_os(DATA_ENV).map(PathBuf::from);
    let config = run_config_from_args(&args, env_path)?;
    let (ingest, run) = pipeline::run_fit(&config)?;

    if !ingest.row_errors.is_empty() {
        warn!(
            skipped = ingest.row_errors.len(),
            read = ingest.rows_read,
            "some peer rows were skipped"
        );
    }

    print_report(&run, &ingest.dataset.labels, mode);

    // Optional exports.
    if let Some(path) = &config.export_csv {
        crate::io::export::write_results_csv(path, run.view(), &run.influence)?;
    }
    if let Some(path) = &config.export_json {
        crate::io::export::write_snapshot_json(
            path,
            run.view(),
            run.controller.fixed(),
            &ingest.dataset.labels,
            run.residual_std_error,
            &run.band,
            &run.influence,
        )?;
    }

    Ok(())
}

fn handle_demo(args: DemoArgs) -> Result<(), AppError> {
    let sample = SampleConfig {
        count: args.count,
        seed: args.seed,
        slope: args.slope,
        intercept: args.intercept,
        noise: args.noise,
        ..SampleConfig::default()
    };
    let dataset = generate_peers(&sample)?;
    let labels = dataset.labels.clone();
    let options = ViewOptions {
        refit: args.refit,
        peers: None,
        top_n: args.top,
        sensitivity: args.sensitivity,
    };
    let run = pipeline::run_with_dataset(dataset, &options)?;

    println!(
        "Synthetic sample: {} peers, seed {}, true line y = {:.3} × x + {:.3}, noise σ = {:.3}\n",
        args.count, args.seed, args.slope, args.intercept, args.noise
    );
    print_report(&run, &labels, OutputMode::Full);
    Ok(())
}

fn print_report(run: &RunOutput, labels: &AxisLabels, mode: OutputMode) {
    let view = run.view();
    if mode == OutputMode::Full {
        println!(
            "{}",
            crate::report::format_run_summary(view, run.controller.fixed(), labels, run.residual_std_error)
        );
    }

    println!("{}", crate::report::format_rankings(&run.rankings));

    if mode == OutputMode::Full && !run.sensitivity.is_empty() {
        println!(
            "{}",
            crate::report::format_sensitivity(&run.influence, &run.sensitivity, &view.target.id)
        );
    }
}

/// Resolve CLI flags (plus the `PEERFIT_DATA` fallback) into a run config.
pub fn run_config_from_args(args: &FitArgs, env_path: Option<PathBuf>) -> Result<RunConfig, AppError> {
    let data_path = args.data.clone().or(env_path).ok_or_else(|| {
        AppError::new(
            2,
            format!("No dataset given: pass --data <JSON> or set {DATA_ENV}."),
        )
    })?;

    Ok(RunConfig {
        data_path,
        refit: args.refit || args.peers.is_some(),
        peers: args.peers.clone(),
        top_n: args.top,
        sensitivity: args.sensitivity,
        export_csv: args.export.clone(),
        export_json: args.export_json.clone(),
    })
}
