//! QU model implementations.
//!
//! Models are implemented as small, pure functions so that sampling/likelihood
//! code can stay generic. Each model file provides the same three pieces:
//! `model` (spectrum), `converter` (derived constraint parameters) and
//! `priors` (a freshly built prior specification).

pub mod m111;
pub mod m6;
pub mod model;

pub use m111::M111Params;
pub use m6::M6Params;
pub use model::*;
