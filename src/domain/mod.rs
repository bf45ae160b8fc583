//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - the model selector (`ModelKind`) and loose parameter draws (`ParamMap`)
//! - observed spectra (`QuData`)
//! - evaluation outputs and run settings (`FitQuality`, `SimulateConfig`, etc.)

pub mod types;

pub use types::*;
