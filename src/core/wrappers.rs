//! Scalar implementations and vector norms.
//!
//! This module implements [`Scalar`] for the real and complex floating point types and
//! [`MatVec`] for `faer::Mat`, so that plain `Vec<T>`/`&[T]` buffers and faer dense
//! matrices can be fed directly to the reference solvers and to the stop criteria.
//!
//! With the `rayon` feature enabled, norms are reduced with parallel iterators.
//!
//! # References
//! - [faer crate documentation](https://docs.rs/faer)
//! - [num-complex crate documentation](https://docs.rs/num-complex)

use crate::core::traits::{MatVec, Scalar};
use faer::{Mat, MatRef};
use num_complex::Complex;
use num_traits::{Float, Zero};

impl Scalar for f32 {
    type Real = f32;
    #[inline]
    fn modulus_sqr(self) -> f32 {
        self * self
    }
    #[inline]
    fn is_finite(self) -> bool {
        f32::is_finite(self)
    }
}

impl Scalar for f64 {
    type Real = f64;
    #[inline]
    fn modulus_sqr(self) -> f64 {
        self * self
    }
    #[inline]
    fn is_finite(self) -> bool {
        f64::is_finite(self)
    }
}

impl Scalar for Complex<f32> {
    type Real = f32;
    #[inline]
    fn modulus_sqr(self) -> f32 {
        self.norm_sqr()
    }
    #[inline]
    fn is_finite(self) -> bool {
        Complex::is_finite(self)
    }
}

impl Scalar for Complex<f64> {
    type Real = f64;
    #[inline]
    fn modulus_sqr(self) -> f64 {
        self.norm_sqr()
    }
    #[inline]
    fn is_finite(self) -> bool {
        Complex::is_finite(self)
    }
}

/// Euclidean norm `‖x‖₂` of a slice of scalars.
///
/// NaN or infinite entries propagate into the result.
pub fn norm<T: Scalar>(x: &[T]) -> T::Real {
    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        x.par_iter()
            .map(|xi| xi.modulus_sqr())
            .reduce(T::Real::zero, |acc, v| acc + v)
            .sqrt()
    }
    #[cfg(not(feature = "rayon"))]
    {
        x.iter()
            .map(|xi| xi.modulus_sqr())
            .fold(T::Real::zero(), |acc, v| acc + v)
            .sqrt()
    }
}

/// Real dot product `xᵀ y`.
pub fn dot<T: Float + Send + Sync>(x: &[T], y: &[T]) -> T {
    assert_eq!(x.len(), y.len(), "Vectors must have the same length");
    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        x.par_iter()
            .zip(y.par_iter())
            .map(|(xi, yi)| *xi * *yi)
            .reduce(T::zero, |acc, v| acc + v)
    }
    #[cfg(not(feature = "rayon"))]
    {
        x.iter()
            .zip(y.iter())
            .map(|(xi, yi)| *xi * *yi)
            .fold(T::zero(), |acc, v| acc + v)
    }
}

/// Implements matrix-vector multiplication for `faer::Mat`.
///
/// Computes `y = A * x` where `A` is a dense matrix, `x` and `y` are vectors.
impl<T: Float> MatVec<Vec<T>> for Mat<T> {
    fn matvec(&self, x: &Vec<T>, y: &mut Vec<T>) {
        self.as_ref().matvec(x, y)
    }
}

/// Implements matrix-vector multiplication for a matrix reference (`faer::MatRef`).
impl<'a, T: Float> MatVec<Vec<T>> for MatRef<'a, T> {
    fn matvec(&self, x: &Vec<T>, y: &mut Vec<T>) {
        assert_eq!(self.nrows(), y.len(), "Output vector y has incorrect length");
        assert_eq!(self.ncols(), x.len(), "Input vector x has incorrect length");
        for (i, yi) in y.iter_mut().enumerate() {
            *yi = (0..self.ncols()).fold(T::zero(), |acc, j| acc + self[(i, j)] * x[j]);
        }
    }
}
