//! Reporting utilities: formatted terminal output for priors, draws and fits.

pub mod format;

pub use format::*;
