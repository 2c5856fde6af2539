//! Core linear-algebra traits and their implementations for std and faer types.

pub mod traits;
pub mod wrappers;

pub use traits::{MatVec, Scalar};
pub use wrappers::{dot, norm};
