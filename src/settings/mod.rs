//! The Maven settings model and the steps that produce the effective
//! settings: parse, validate, merge, decrypt.

mod builder;
mod decrypt;
mod merge;
mod model;

pub use builder::*;
pub use decrypt::*;
pub use model::*;
