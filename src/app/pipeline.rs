//! Shared workflows behind the subcommands.
//!
//! Keeping these here (rather than in the command handlers) means the same
//! steps can be driven from tests or another front-end without printing:
//! load -> evaluate/sample -> score.

use std::path::Path;

use log::{debug, warn};
use num_complex::Complex64;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::domain::{DrawConfig, FitQuality, FreqGrid, ModelKind, ParamMap};
use crate::error::AppError;
use crate::fit::evaluate_quality;
use crate::io::{read_params_json, read_qu_csv};
use crate::math::{freq_channels, lambda_sq_from_freq};
use crate::models::{convert, evaluate, priors};

/// An evaluated model spectrum with its channel grid.
#[derive(Debug, Clone)]
pub struct SpectrumOutput {
    pub freq_hz: Vec<f64>,
    pub lam_sq: Vec<f64>,
    pub spectrum: Vec<Complex64>,
    /// Constraints the parameter set violates (it is still evaluated).
    pub violated: Vec<String>,
}

/// Constrained prior draws, extended with the derived constraint values.
#[derive(Debug, Clone)]
pub struct DrawOutput {
    pub columns: Vec<String>,
    pub draws: Vec<ParamMap>,
}

/// Likelihood/diagnostics of a parameter set against data.
#[derive(Debug, Clone)]
pub struct ScoreOutput {
    pub params: ParamMap,
    pub quality: FitQuality,
    pub ln_prior: f64,
    pub violated: Vec<String>,
    pub skipped_rows: usize,
}

/// Load parameters and apply the model's periodic boundaries.
pub fn load_params(model: ModelKind, path: &Path) -> Result<ParamMap, AppError> {
    let mut params = read_params_json(path)?;
    priors(model).wrap_periodic(&mut params);
    Ok(params)
}

/// Evaluate a model on either a data file's channels or a regular grid.
pub fn run_eval(
    model: ModelKind,
    params: &ParamMap,
    data: Option<&Path>,
    grid: FreqGrid,
) -> Result<SpectrumOutput, AppError> {
    let (freq_hz, lam_sq) = match data {
        Some(path) => {
            let ingested = read_qu_csv(path)?;
            (ingested.data.freq_hz, ingested.data.lam_sq)
        }
        None => {
            let freq_hz = freq_channels(grid.freq_min_hz, grid.freq_max_hz, grid.n_chan)?;
            let lam_sq = lambda_sq_from_freq(&freq_hz);
            (freq_hz, lam_sq)
        }
    };

    let violated = priors(model).violated_constraints(params)?;
    for name in &violated {
        warn!("Parameters violate prior constraint '{name}'");
    }

    let spectrum = evaluate(model, params, &lam_sq)?;
    debug!("evaluated {} channels of model {model}", spectrum.len());
    Ok(SpectrumOutput {
        freq_hz,
        lam_sq,
        spectrum,
        violated,
    })
}

/// Draw from a model's prior.
pub fn run_draws(config: &DrawConfig) -> Result<DrawOutput, AppError> {
    if config.n_draws == 0 {
        return Err(AppError::new(2, "Number of draws must be > 0."));
    }
    let prior = priors(config.model);
    prior.validate()?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let draws = prior
        .sample_n(&mut rng, config.n_draws)?
        .iter()
        .map(|d| convert(config.model, d))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DrawOutput {
        columns: prior.keys().map(str::to_string).collect(),
        draws,
    })
}

/// Score a parameter file against a data file.
pub fn run_score(model: ModelKind, params_path: &Path, data_path: &Path) -> Result<ScoreOutput, AppError> {
    let params = load_params(model, params_path)?;
    let ingested = read_qu_csv(data_path)?;

    let prior = priors(model);
    let violated = prior.violated_constraints(&params)?;
    let ln_prior = prior.ln_prob(&params)?;
    let quality = evaluate_quality(model, &params, &ingested.data)?;

    Ok(ScoreOutput {
        params,
        quality,
        ln_prior,
        violated,
        skipped_rows: ingested.row_errors.len(),
    })
}
