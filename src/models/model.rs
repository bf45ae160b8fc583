//! Model dispatch.
//!
//! Samplers hand us loose `ParamMap`s; each model validates them into its own
//! typed record and evaluates from there. The functions here select the model
//! by `ModelKind` so driver code can stay generic.

use num_complex::Complex64;

use crate::domain::{ModelKind, ParamMap};
use crate::error::ParamError;
use crate::models::{m6, m111};
use crate::prior::PriorDict;

/// A model with a closed-form complex polarization spectrum.
pub trait QuModel {
    /// Complex fractional polarization `q + iu` at each `λ²` [m²].
    ///
    /// The output always has the same length as `lam_sq`.
    fn model_qu(&self, lam_sq: &[f64]) -> Vec<Complex64>;
}

/// Fetch a required, finite parameter.
pub(crate) fn require(params: &ParamMap, name: &str) -> Result<f64, ParamError> {
    let value = params
        .get(name)
        .copied()
        .ok_or_else(|| ParamError::Missing(name.to_string()))?;
    if !value.is_finite() {
        return Err(ParamError::NonFinite {
            name: name.to_string(),
            value,
        });
    }
    Ok(value)
}

/// Evaluate a model's spectrum from a loose parameter draw.
pub fn evaluate(model: ModelKind, params: &ParamMap, lam_sq: &[f64]) -> Result<Vec<Complex64>, ParamError> {
    match model {
        ModelKind::M6 => m6::model(params, lam_sq),
        ModelKind::M111 => m111::model(params, lam_sq),
    }
}

/// Freshly constructed prior specification for a model.
pub fn priors(model: ModelKind) -> PriorDict {
    match model {
        ModelKind::M6 => m6::priors(),
        ModelKind::M111 => m111::priors(),
    }
}

/// Add the model's derived constraint parameters to a draw.
pub fn convert(model: ModelKind, params: &ParamMap) -> Result<ParamMap, ParamError> {
    match model {
        ModelKind::M6 => m6::converter(params),
        ModelKind::M111 => m111::converter(params),
    }
}
