//! Option structs for assembling stop monitors.

pub mod options;
pub use options::{DivergenceOptions, StopOptions};
