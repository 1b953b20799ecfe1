//! Command-line parsing for the peer regression tool.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! regression and controller code.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "peerfit", version, about = "Peer regression and residual analysis")]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit a peer dataset, print the regression summary and residual table.
    Fit(FitArgs),
    /// Print rich/cheap residual leaders only (useful for scripting).
    Rank(FitArgs),
    /// Run the full report over a seeded synthetic peer set.
    Demo(DemoArgs),
}

/// Common options for fitting and ranking.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Peer dataset JSON. Falls back to `PEERFIT_DATA`.
    #[arg(short, long, value_name = "JSON")]
    pub data: Option<PathBuf>,

    /// Refit on the peer selection instead of using the fixed coefficients.
    #[arg(long)]
    pub refit: bool,

    /// Comma-separated refit selection (implies `--refit`).
    #[arg(long, value_delimiter = ',', value_name = "ID,ID,...")]
    pub peers: Option<Vec<String>>,

    /// Show top-N rich and cheap names.
    #[arg(long, default_value_t = 5)]
    pub top: usize,

    /// Export per-peer results to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export a JSON snapshot of the current view.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Print Cook's distance and drop-one refits.
    #[arg(long)]
    pub sensitivity: bool,
}

/// Options for the synthetic demo.
#[derive(Debug, Parser, Clone)]
pub struct DemoArgs {
    /// Number of synthetic peers.
    #[arg(short = 'n', long, default_value_t = 12)]
    pub count: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Slope of the generating line.
    #[arg(long, default_value_t = 0.058, allow_negative_numbers = true)]
    pub slope: f64,

    /// Intercept of the generating line.
    #[arg(long, default_value_t = 0.82, allow_negative_numbers = true)]
    pub intercept: f64,

    /// Standard deviation of the y noise.
    #[arg(long, default_value_t = 0.12)]
    pub noise: f64,

    /// Refit on all synthetic peers instead of the derived fixed line.
    #[arg(long)]
    pub refit: bool,

    /// Show top-N rich and cheap names.
    #[arg(long, default_value_t = 5)]
    pub top: usize,

    /// Print Cook's distance and drop-one refits.
    #[arg(long)]
    pub sensitivity: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fit_flags() {
        let cli = Cli::parse_from([
            "peerfit", "-vv", "fit", "--data", "peers.json", "--peers", "EWBC,HOPE", "--top", "3",
            "--sensitivity",
        ]);
        assert_eq!(cli.verbose, 2);
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(args.data, Some(PathBuf::from("peers.json")));
        assert_eq!(args.peers, Some(vec!["EWBC".to_string(), "HOPE".to_string()]));
        assert_eq!(args.top, 3);
        assert!(args.sensitivity);
        assert!(!args.refit);
    }

    #[test]
    fn demo_defaults() {
        let cli = Cli::parse_from(["peerfit", "demo", "--slope", "-0.2"]);
        let Command::Demo(args) = cli.command else {
            panic!("expected demo");
        };
        assert_eq!(args.count, 12);
        assert_eq!(args.seed, 42);
        assert_eq!(args.slope, -0.2);
    }
}
