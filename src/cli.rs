use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Kinetic component analysis of noisy series.
#[derive(Parser)]
#[command(
    name = "kca",
    version,
    about = "Kinetic component analysis: smoothed position, velocity and acceleration with forecasts"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Fit a JSON request `{t, z, q, fwd}`.
    Fit(FitArgs),
    /// Read a price history CSV, standardize it, and fit.
    Prices(PricesArgs),
    /// Fit one request under several process-noise seeds in parallel.
    Sweep(SweepArgs),
}

/// Arguments for the `fit` subcommand.
#[derive(clap::Args)]
pub struct FitArgs {
    /// Path to the JSON request.
    #[arg(short, long)]
    pub request: PathBuf,

    /// Write the JSON response here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Path to TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the `prices` subcommand.
#[derive(clap::Args)]
pub struct PricesArgs {
    /// Price history CSV.
    #[arg(short, long)]
    pub input: PathBuf,

    /// Ticker to keep when the file holds several.
    #[arg(short, long)]
    pub symbol: Option<String>,

    /// First date to include (YYYY-MM-DD).
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// First date to exclude (YYYY-MM-DD).
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Process-noise seed; overrides `[model].q`.
    #[arg(short, long, allow_negative_numbers = true)]
    pub q: Option<f64>,

    /// Forecast horizon in steps; overrides `[model].forecast`.
    #[arg(short, long, allow_negative_numbers = true)]
    pub forecast: Option<i64>,

    /// Write the JSON response here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Path to TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the `sweep` subcommand.
#[derive(clap::Args)]
pub struct SweepArgs {
    /// Path to the JSON request; its `q` is ignored.
    #[arg(short, long)]
    pub request: PathBuf,

    /// Comma-separated process-noise seeds.
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub q: Vec<f64>,

    /// Write the JSON response here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Path to TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
