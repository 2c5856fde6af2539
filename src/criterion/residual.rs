//! Residual convergence: stop once ‖r‖ / ‖b‖ falls within a tolerance.

use std::fmt::Debug;

use log::debug;
use num_traits::Float;

use crate::core::traits::Scalar;
use crate::core::wrappers::norm;
use crate::criterion::{StopCriterion, check_iteration};
use crate::error::KError;
use crate::utils::convergence::CalculationStatus;

/// Reports `Converged` once the relative residual `‖r‖ / ‖b‖` is at or below `tolerance`.
///
/// When `‖b‖` is numerically zero (not above machine epsilon) the absolute residual
/// `‖r‖` is compared instead. A non-finite ratio never counts as convergence; it is
/// left to [`NumericalFailureCriterion`](crate::criterion::NumericalFailureCriterion).
///
/// With `minimum_iterations_below_tolerance = k`, the ratio must stay within tolerance
/// for `k` further consecutive evaluations before convergence is declared.
#[derive(Debug)]
pub struct ResidualConvergenceCriterion<R> {
    tolerance: R,
    minimum_iterations_below_tolerance: usize,
    // history
    iterations_below_tolerance: usize,
    last_relative_residual: Option<R>,
    status: CalculationStatus,
}

impl<R: Float + Debug> ResidualConvergenceCriterion<R> {
    pub fn new(tolerance: R) -> Result<Self, KError> {
        validate(tolerance)?;
        Ok(Self {
            tolerance,
            minimum_iterations_below_tolerance: 0,
            iterations_below_tolerance: 0,
            last_relative_residual: None,
            status: CalculationStatus::Indeterminate,
        })
    }

    /// Require `count` extra consecutive iterations within tolerance.
    pub fn with_minimum_iterations_below_tolerance(mut self, count: usize) -> Self {
        self.minimum_iterations_below_tolerance = count;
        self
    }

    pub fn tolerance(&self) -> R {
        self.tolerance
    }

    pub fn set_tolerance(&mut self, tolerance: R) -> Result<(), KError> {
        validate(tolerance)?;
        self.tolerance = tolerance;
        Ok(())
    }

    pub fn minimum_iterations_below_tolerance(&self) -> usize {
        self.minimum_iterations_below_tolerance
    }

    pub fn set_minimum_iterations_below_tolerance(&mut self, count: usize) -> Result<(), KError> {
        self.minimum_iterations_below_tolerance = count;
        Ok(())
    }

    /// Ratio computed by the most recent evaluation, if any.
    pub fn last_relative_residual(&self) -> Option<R> {
        self.last_relative_residual
    }

    pub fn status(&self) -> CalculationStatus {
        self.status
    }

    pub fn reset_to_precalculation_state(&mut self) {
        self.iterations_below_tolerance = 0;
        self.last_relative_residual = None;
        self.status = CalculationStatus::Indeterminate;
    }

    fn relative_residual<T: Scalar<Real = R>>(source: &[T], residual: &[T]) -> R {
        let source_norm = norm(source);
        let residual_norm = norm(residual);
        if source_norm > R::epsilon() {
            residual_norm / source_norm
        } else {
            residual_norm
        }
    }

    fn evaluate<T: Scalar<Real = R>>(
        &mut self,
        iteration: i64,
        source: &[T],
        residual: &[T],
    ) -> Result<CalculationStatus, KError> {
        check_iteration(iteration)?;
        if self.status.is_terminal() {
            return Ok(self.status);
        }
        let ratio = Self::relative_residual(source, residual);
        self.last_relative_residual = Some(ratio);
        if ratio.is_finite() && ratio <= self.tolerance {
            self.iterations_below_tolerance += 1;
        } else {
            self.iterations_below_tolerance = 0;
        }
        self.status = if self.iterations_below_tolerance > self.minimum_iterations_below_tolerance {
            debug!("residual ratio {ratio:?} within tolerance {:?} at iteration {iteration}", self.tolerance);
            CalculationStatus::Converged
        } else {
            CalculationStatus::Running
        };
        Ok(self.status)
    }
}

fn validate<R: Float>(tolerance: R) -> Result<(), KError> {
    if !(tolerance > R::zero()) || !tolerance.is_finite() {
        return Err(KError::InvalidConfiguration(format!(
            "tolerance must be positive and finite, got {:?}",
            tolerance.to_f64()
        )));
    }
    Ok(())
}

impl<R: Float> Clone for ResidualConvergenceCriterion<R> {
    fn clone(&self) -> Self {
        Self {
            tolerance: self.tolerance,
            minimum_iterations_below_tolerance: self.minimum_iterations_below_tolerance,
            iterations_below_tolerance: 0,
            last_relative_residual: None,
            status: CalculationStatus::Indeterminate,
        }
    }
}

impl<T: Scalar> StopCriterion<T> for ResidualConvergenceCriterion<T::Real> {
    fn name(&self) -> &'static str {
        "residual-convergence"
    }

    fn determine_status(
        &mut self,
        iteration: i64,
        _solution: &[T],
        source: &[T],
        residual: &[T],
    ) -> Result<CalculationStatus, KError> {
        self.evaluate(iteration, source, residual)
    }

    fn status(&self) -> CalculationStatus {
        self.status
    }

    fn reset_to_precalculation_state(&mut self) {
        ResidualConvergenceCriterion::reset_to_precalculation_state(self)
    }

    fn box_clone(&self) -> Box<dyn StopCriterion<T>> {
        Box::new(self.clone())
    }
}
