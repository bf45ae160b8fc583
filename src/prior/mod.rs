//! Prior specifications for the QU models.

pub mod dict;
pub mod dist;

pub use dict::*;
pub use dist::*;
