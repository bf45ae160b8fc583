//! `qufit-models` library crate.
//!
//! Closed-form Faraday-rotation QU models (`m6`: two Burn slabs, `m111`: three
//! Faraday-thin components) with their prior specifications, plus the pieces an
//! external sampler needs around them: a Gaussian QU likelihood, constrained
//! prior draws, synthetic data and file IO.
//!
//! The binary (`qufit`) is a thin wrapper around this library so that core
//! logic is testable without spawning processes.

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod prior;
pub mod report;
