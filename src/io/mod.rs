//! Input/output helpers.
//!
//! - CSV ingest of measured spectra (`ingest`)
//! - spectrum and draw exports (`export`)
//! - parameter/prior JSON read/write (`params`)

pub mod export;
pub mod ingest;
pub mod params;

pub use export::*;
pub use ingest::*;
pub use params::*;
