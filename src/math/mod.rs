//! Mathematical utilities: Faraday-rotation components and channel grids.

pub mod faraday;
pub mod grid;

pub use faraday::*;
pub use grid::*;
