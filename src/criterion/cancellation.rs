//! Cooperative cancellation driven by a flag set outside the iteration loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;

use crate::core::traits::Scalar;
use crate::criterion::{StopCriterion, check_iteration};
use crate::error::KError;
use crate::utils::convergence::CalculationStatus;

/// Shareable handle to a cancellation flag.
///
/// Clones of a token refer to the same flag, so one can be handed to a UI or
/// watchdog thread while the criterion polls it.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Reports `Cancelled` once its token has been cancelled.
///
/// The request is only observed at the next evaluation.
#[derive(Debug, Default)]
pub struct CancellationCriterion {
    token: CancellationToken,
    status: CalculationStatus,
}

impl CancellationCriterion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Criterion watching an existing token.
    pub fn with_token(token: CancellationToken) -> Self {
        Self { token, status: CalculationStatus::Indeterminate }
    }

    /// Handle for requesting cancellation from another thread.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel()
    }

    pub fn status(&self) -> CalculationStatus {
        self.status
    }

    /// Clears the status only; a cancelled token stays cancelled.
    pub fn reset_to_precalculation_state(&mut self) {
        self.status = CalculationStatus::Indeterminate;
    }

    fn evaluate(&mut self, iteration: i64) -> Result<CalculationStatus, KError> {
        check_iteration(iteration)?;
        if self.status.is_terminal() {
            return Ok(self.status);
        }
        self.status = if self.token.is_cancelled() {
            debug!("cancellation observed at iteration {iteration}");
            CalculationStatus::Cancelled
        } else {
            CalculationStatus::Running
        };
        Ok(self.status)
    }
}

/// The copy watches a fresh, uncancelled token of its own; reach it through
/// [`StopCriterion::cancellation_token`] or `CompositeEvaluator::cancellation_tokens`.
impl Clone for CancellationCriterion {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T: Scalar> StopCriterion<T> for CancellationCriterion {
    fn name(&self) -> &'static str {
        "cancellation"
    }

    fn determine_status(
        &mut self,
        iteration: i64,
        _solution: &[T],
        _source: &[T],
        _residual: &[T],
    ) -> Result<CalculationStatus, KError> {
        self.evaluate(iteration)
    }

    fn status(&self) -> CalculationStatus {
        self.status
    }

    fn reset_to_precalculation_state(&mut self) {
        CancellationCriterion::reset_to_precalculation_state(self)
    }

    fn box_clone(&self) -> Box<dyn StopCriterion<T>> {
        Box::new(self.clone())
    }

    fn cancellation_token(&self) -> Option<CancellationToken> {
        Some(self.token())
    }
}
