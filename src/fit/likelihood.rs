//! Gaussian likelihood of a QU model given a measured spectrum.
//!
//! Q and U are treated as independent Gaussian measurements per channel:
//!
//! ```text
//! ln L = -1/2 Σ_i [ (q_i - Re m_i)² / dq_i² + ln(2π dq_i²)
//!                 + (u_i - Im m_i)² / du_i² + ln(2π du_i²) ]
//! ```
//!
//! This is what an external sampler calls once per proposed draw. Batches of
//! draws (e.g. an ensemble or a set of live points) are evaluated in parallel.

use std::f64::consts::TAU;

use log::trace;
use rayon::prelude::*;

use crate::domain::{ModelKind, ParamMap, QuData};
use crate::error::ParamError;
use crate::models::{evaluate, priors};
use crate::prior::PriorDict;

/// Per-channel residual sums for a model spectrum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ResidualSums {
    /// Σ residual²/σ² over q and u.
    pub chi_sq: f64,
    /// Σ ln(2πσ²) over q and u.
    pub ln_norm: f64,
}

/// Evaluate `model` on `data`'s channels and sum the residuals.
pub(crate) fn residual_sums(model: ModelKind, params: &ParamMap, data: &QuData) -> Result<ResidualSums, ParamError> {
    data.check_lengths()?;
    let model_qu = evaluate(model, params, &data.lam_sq)?;

    let mut chi_sq = 0.0;
    let mut ln_norm = 0.0;
    let columns = data.q.iter().zip(&data.u).zip(data.dq.iter().zip(&data.du));
    for (m, ((q, u), (dq, du))) in model_qu.iter().zip(columns) {
        let (dq2, du2) = (dq * dq, du * du);
        let rq = q - m.re;
        let ru = u - m.im;
        chi_sq += rq * rq / dq2 + ru * ru / du2;
        ln_norm += (TAU * dq2).ln() + (TAU * du2).ln();
    }
    Ok(ResidualSums { chi_sq, ln_norm })
}

/// Log-likelihood of `params` under `model` for `data`.
///
/// Fails if a data column's length differs from the number of channels.
pub fn ln_likelihood(model: ModelKind, params: &ParamMap, data: &QuData) -> Result<f64, ParamError> {
    let sums = residual_sums(model, params, data)?;
    Ok(-0.5 * (sums.chi_sq + sums.ln_norm))
}

/// Unnormalised log-posterior: log-prior plus log-likelihood.
///
/// Draws with zero prior density return `-inf` without evaluating the model.
pub fn ln_posterior(
    model: ModelKind,
    prior: &PriorDict,
    params: &ParamMap,
    data: &QuData,
) -> Result<f64, ParamError> {
    let ln_prior = prior.ln_prob(params)?;
    if ln_prior == f64::NEG_INFINITY {
        trace!("draw outside prior support, skipping likelihood");
        return Ok(ln_prior);
    }
    Ok(ln_prior + ln_likelihood(model, params, data)?)
}

/// Log-likelihoods for many draws, in input order.
pub fn ln_likelihood_batch(
    model: ModelKind,
    draws: &[ParamMap],
    data: &QuData,
) -> Result<Vec<f64>, ParamError> {
    draws
        .par_iter()
        .map(|p| ln_likelihood(model, p, data))
        .collect()
}

/// Log-posteriors for many draws, in input order, using the model's default priors.
pub fn ln_posterior_batch(
    model: ModelKind,
    draws: &[ParamMap],
    data: &QuData,
) -> Result<Vec<f64>, ParamError> {
    let prior = priors(model);
    draws
        .par_iter()
        .map(|p| ln_posterior(model, &prior, p, data))
        .collect()
}
