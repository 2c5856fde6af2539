//! Stop criteria for iterative solvers.
//!
//! This module defines the [`StopCriterion`] trait and the built-in rules: iteration
//! budget, residual convergence, divergence detection, cooperative cancellation and
//! numerical failure. Each criterion owns its configuration (validated on construction
//! and on every setter) and a private per-solve history. Criteria are combined into a
//! single decision by [`crate::monitor::CompositeEvaluator`].

use std::fmt;

use crate::core::traits::Scalar;
use crate::error::KError;
use crate::utils::convergence::CalculationStatus;

/// A rule deciding, after every solver iteration, whether the solve should halt.
pub trait StopCriterion<T: Scalar>: fmt::Debug + Send {
    /// Short identifier used in diagnostics.
    fn name(&self) -> &'static str;

    /// Evaluate the rule for `iteration` and remember the outcome.
    ///
    /// Fails with [`KError::InvalidArgument`] for a negative iteration index. Once a
    /// terminal status has been reached it is returned unchanged until the next reset.
    fn determine_status(
        &mut self,
        iteration: i64,
        solution: &[T],
        source: &[T],
        residual: &[T],
    ) -> Result<CalculationStatus, KError>;

    /// Last status computed by [`determine_status`](Self::determine_status).
    fn status(&self) -> CalculationStatus;

    /// Forget all history; the status returns to `Indeterminate`, configuration is kept.
    fn reset_to_precalculation_state(&mut self);

    /// Copy of the configuration with fresh history.
    fn box_clone(&self) -> Box<dyn StopCriterion<T>>;

    /// Flag watched by this criterion, for criteria that can be cancelled from outside.
    fn cancellation_token(&self) -> Option<CancellationToken> {
        None
    }
}

impl<T: Scalar> Clone for Box<dyn StopCriterion<T>> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Reject negative iteration indices.
pub(crate) fn check_iteration(iteration: i64) -> Result<(), KError> {
    if iteration < 0 {
        return Err(KError::InvalidArgument(format!(
            "iteration index must be non-negative, got {iteration}"
        )));
    }
    Ok(())
}

pub mod cancellation;
pub mod divergence;
pub mod failure;
pub mod iteration;
pub mod residual;

pub use cancellation::{CancellationCriterion, CancellationToken};
pub use divergence::DivergenceCriterion;
pub use failure::NumericalFailureCriterion;
pub use iteration::IterationBudgetCriterion;
pub use residual::ResidualConvergenceCriterion;
