//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - handed to/from an external sampler as plain name/value maps
//! - exported to JSON/CSV
//! - reloaded later for evaluation or comparisons

use std::path::PathBuf;
use std::str::FromStr;

use clap::ValueEnum;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ParamError;

/// A parameter draw: parameter name to value, in insertion order.
///
/// This is the loose representation a sampler works with. Models convert it
/// into their typed records before evaluating anything.
pub type ParamMap = IndexMap<String, f64>;

/// Which QU model to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Two Burn slabs (differential Faraday rotation), unresolved in the beam.
    M6,
    /// Three Faraday-thin components, unresolved in the beam.
    M111,
}

impl ModelKind {
    pub const ALL: [ModelKind; 2] = [ModelKind::M6, ModelKind::M111];

    /// Short identifier, as used on the command line and in files.
    pub fn name(self) -> &'static str {
        match self {
            ModelKind::M6 => "m6",
            ModelKind::M111 => "m111",
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::M6 => "Double Burn slab",
            ModelKind::M111 => "Three Faraday-thin components",
        }
    }

    /// Free (sampled) parameters, in prior order.
    pub fn param_names(self) -> &'static [&'static str] {
        match self {
            ModelKind::M6 => &[
                "fracPol1",
                "fracPol2",
                "psi01_deg",
                "psi02_deg",
                "RM1_radm2",
                "RM2_radm2",
                "deltaRM1_radm2",
                "deltaRM2_radm2",
            ],
            ModelKind::M111 => &[
                "fracPol1",
                "fracPol2",
                "fracPol3",
                "psi01_deg",
                "psi02_deg",
                "psi03_deg",
                "RM1_radm2",
                "RM2_radm2",
                "RM3_radm2",
            ],
        }
    }

    /// Derived constraint parameters added by the model's conversion function.
    pub fn constraint_names(self) -> &'static [&'static str] {
        match self {
            ModelKind::M6 => &["delta_RM1_RM2_radm2", "sum_p1_p2"],
            ModelKind::M111 => &["delta_RM1_RM2_radm2", "delta_RM2_RM3_radm2", "sum_p1_p2_p3"],
        }
    }

    /// Number of free parameters (for information criteria).
    pub fn param_count(self) -> usize {
        self.param_names().len()
    }
}

impl FromStr for ModelKind {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "m6" | "6" => Ok(ModelKind::M6),
            "m111" | "111" => Ok(ModelKind::M111),
            other => Err(ParamError::UnknownModel(other.to_string())),
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Observed (or simulated) fractional polarization spectrum.
///
/// `q`/`u` are Stokes Q/I and U/I; `dq`/`du` are their 1σ errors. All vectors
/// have one entry per channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuData {
    pub freq_hz: Vec<f64>,
    pub lam_sq: Vec<f64>,
    pub q: Vec<f64>,
    pub u: Vec<f64>,
    pub dq: Vec<f64>,
    pub du: Vec<f64>,
}

impl QuData {
    pub fn n_chan(&self) -> usize {
        self.lam_sq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lam_sq.is_empty()
    }

    /// Every column must have one entry per `λ²` channel.
    pub fn check_lengths(&self) -> Result<(), ParamError> {
        let expected = self.n_chan();
        for (column, got) in [
            ("freq_hz", self.freq_hz.len()),
            ("q", self.q.len()),
            ("u", self.u.len()),
            ("dq", self.dq.len()),
            ("du", self.du.len()),
        ] {
            if got != expected {
                return Err(ParamError::DataLength {
                    column,
                    expected,
                    got,
                });
            }
        }
        Ok(())
    }
}

/// Goodness-of-fit diagnostics for one parameter set against one dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitQuality {
    pub model: ModelKind,
    /// Number of real data values (two per channel).
    pub n: usize,
    /// Number of free parameters.
    pub k: usize,
    pub chi_sq: f64,
    pub chi_sq_red: f64,
    pub ln_likelihood: f64,
    pub aic: f64,
    pub bic: f64,
}

/// Frequency grid settings used when no data file supplies the channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreqGrid {
    pub freq_min_hz: f64,
    pub freq_max_hz: f64,
    pub n_chan: usize,
}

/// Settings for generating a synthetic spectrum.
#[derive(Debug, Clone)]
pub struct SimulateConfig {
    pub model: ModelKind,
    pub params: ParamMap,
    pub grid: FreqGrid,
    /// 1σ noise added independently to q and u.
    pub noise: f64,
    pub seed: u64,
}

/// Settings for drawing from a model's prior.
#[derive(Debug, Clone)]
pub struct DrawConfig {
    pub model: ModelKind,
    pub n_draws: usize,
    pub seed: u64,
    pub export: Option<PathBuf>,
}
