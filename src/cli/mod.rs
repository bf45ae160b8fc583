//! Command-line parsing for the `qufit` tool.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! model/prior code; dispatch lives in `crate::app`.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::domain::ModelKind;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "qufit",
    version,
    about = "Faraday-rotation QU models and priors for polarised radio spectra"
)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace, -vvv trace with source lines).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbosity: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the available models and their parameters.
    Models,
    /// Print (and optionally export) a model's prior specification.
    Priors(PriorsArgs),
    /// Evaluate a model spectrum for a parameter file.
    Eval(EvalArgs),
    /// Generate a noisy synthetic QU spectrum.
    Simulate(SimulateArgs),
    /// Draw parameter sets from a model's prior, honouring its constraints.
    Draw(DrawArgs),
    /// Score a parameter file against measured data (likelihood, chi^2, AIC/BIC).
    Loglike(LoglikeArgs),
}

/// Frequency grid options shared by `eval` and `simulate`.
#[derive(Debug, Args, Clone)]
pub struct GridArgs {
    /// Lowest channel frequency [Hz].
    #[arg(long, default_value_t = 800.0e6)]
    pub freq_min: f64,

    /// Highest channel frequency [Hz].
    #[arg(long, default_value_t = 1800.0e6)]
    pub freq_max: f64,

    /// Number of channels.
    #[arg(long, default_value_t = 288)]
    pub n_chan: usize,
}

#[derive(Debug, Parser, Clone)]
pub struct PriorsArgs {
    /// Which model.
    #[arg(short, long, value_enum)]
    pub model: ModelKind,

    /// Export the prior specification to JSON.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Estimate the fraction of unconstrained draws accepted by the constraints
    /// using this many Monte-Carlo draws (0 disables).
    #[arg(long, default_value_t = 0)]
    pub acceptance: usize,

    /// Random seed (falls back to QUFIT_SEED, then 42).
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Parser, Clone)]
pub struct EvalArgs {
    /// Which model.
    #[arg(short, long, value_enum)]
    pub model: ModelKind,

    /// Parameter JSON file.
    #[arg(short, long, value_name = "JSON")]
    pub params: PathBuf,

    /// Take channel frequencies from this QU data CSV instead of the grid options.
    #[arg(long, value_name = "CSV")]
    pub data: Option<PathBuf>,

    #[command(flatten)]
    pub grid: GridArgs,

    /// Export the spectrum to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Number of channels to print.
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
}

#[derive(Debug, Parser, Clone)]
pub struct SimulateArgs {
    /// Which model.
    #[arg(short, long, value_enum)]
    pub model: ModelKind,

    /// Parameter JSON file with the true parameters.
    #[arg(short, long, value_name = "JSON")]
    pub params: PathBuf,

    #[command(flatten)]
    pub grid: GridArgs,

    /// 1-sigma noise added to q and u (fractional units, > 0).
    #[arg(long, default_value_t = 0.01)]
    pub noise: f64,

    /// Random seed (falls back to QUFIT_SEED, then 42).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output QU data CSV.
    #[arg(short, long, value_name = "CSV")]
    pub out: PathBuf,
}

#[derive(Debug, Parser, Clone)]
pub struct DrawArgs {
    /// Which model.
    #[arg(short, long, value_enum)]
    pub model: ModelKind,

    /// Number of draws.
    #[arg(short = 'n', long, default_value_t = 10)]
    pub n_draws: usize,

    /// Random seed (falls back to QUFIT_SEED, then 42).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Export draws (with derived constraint columns) to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct LoglikeArgs {
    /// Which model.
    #[arg(short, long, value_enum)]
    pub model: ModelKind,

    /// Parameter JSON file.
    #[arg(short, long, value_name = "JSON")]
    pub params: PathBuf,

    /// QU data CSV.
    #[arg(short, long, value_name = "CSV")]
    pub data: PathBuf,
}
