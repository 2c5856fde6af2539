//! Core linear-algebra traits for kryst-monitor.

use std::fmt::{Debug, Display};

use num_traits::Float;

/// Matrix–vector product: y ← A x.
pub trait MatVec<V> {
    /// Compute y = A · x.
    fn matvec(&self, x: &V, y: &mut V);
}

/// Entry type of the vectors handed to stop criteria.
///
/// Implemented for `f32`, `f64` and their `num_complex::Complex` counterparts.
/// Criteria only need the squared modulus of an entry (to build Euclidean norms)
/// and a finiteness test, both expressed in the associated real type.
pub trait Scalar: Copy + PartialEq + Debug + Display + Send + Sync + 'static {
    /// Real field the norms live in.
    type Real: Float + Debug + Display + Send + Sync + 'static;

    /// |x|².
    fn modulus_sqr(self) -> Self::Real;

    /// `false` if any component is NaN or infinite.
    fn is_finite(self) -> bool;
}
