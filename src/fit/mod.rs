//! Scoring parameter draws against data.
//!
//! Responsibilities:
//!
//! - Gaussian QU likelihood and posterior for single draws and batches (parallel)
//! - fit diagnostics (χ², AIC, BIC) and BIC-based model preference
//!
//! Proposal, chains and evidence integration belong to the external sampler.

pub mod likelihood;
pub mod quality;

pub use likelihood::*;
pub use quality::*;
