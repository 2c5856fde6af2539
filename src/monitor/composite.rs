//! Composite evaluator combining several stop criteria into one verdict.

use log::{debug, trace};

use crate::core::traits::Scalar;
use crate::criterion::{
    CancellationToken, IterationBudgetCriterion, NumericalFailureCriterion, ResidualConvergenceCriterion,
    StopCriterion, check_iteration,
};
use crate::error::KError;
use crate::utils::convergence::CalculationStatus;

/// Default relative residual tolerance of [`CompositeEvaluator::default`].
pub const DEFAULT_TOLERANCE: f64 = 1.0e-8;

/// Ordered set of stop criteria evaluated together.
///
/// Members are evaluated in insertion order; the reduced status is the member result
/// with the highest [`CalculationStatus::precedence`]. Once a terminal status has been
/// returned, further calls to [`evaluate`](Self::evaluate) return it unchanged until
/// [`reset_to_precalculation_state`](Self::reset_to_precalculation_state).
///
/// Cloning copies the configuration of every member with fresh history.
#[derive(Debug)]
pub struct CompositeEvaluator<T: Scalar> {
    criteria: Vec<Box<dyn StopCriterion<T>>>,
    status: CalculationStatus,
    triggered_by: Option<usize>,
}

impl<T: Scalar> CompositeEvaluator<T> {
    /// Evaluator without any criteria; it reports `Indeterminate` forever.
    pub fn new() -> Self {
        Self { criteria: Vec::new(), status: CalculationStatus::Indeterminate, triggered_by: None }
    }

    pub fn from_criteria(criteria: Vec<Box<dyn StopCriterion<T>>>) -> Self {
        Self { criteria, status: CalculationStatus::Indeterminate, triggered_by: None }
    }

    /// Builder-style [`push`](Self::push).
    pub fn with<C: StopCriterion<T> + 'static>(mut self, criterion: C) -> Self {
        self.push(Box::new(criterion));
        self
    }

    /// Append a criterion; it is evaluated after the existing ones.
    pub fn push(&mut self, criterion: Box<dyn StopCriterion<T>>) {
        self.criteria.push(criterion);
    }

    pub fn criteria(&self) -> &[Box<dyn StopCriterion<T>>] {
        &self.criteria
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Evaluate every member for this iteration and reduce the results.
    ///
    /// All members run even when an earlier one is already terminal, so each keeps its
    /// history consistent. The first member error aborts the call.
    pub fn evaluate(
        &mut self,
        iteration: i64,
        solution: &[T],
        source: &[T],
        residual: &[T],
    ) -> Result<CalculationStatus, KError> {
        check_iteration(iteration)?;
        if self.status.is_terminal() {
            return Ok(self.status);
        }

        let mut reduced = CalculationStatus::Indeterminate;
        let mut winner = None;
        for (idx, criterion) in self.criteria.iter_mut().enumerate() {
            let status = criterion.determine_status(iteration, solution, source, residual)?;
            trace!("iteration {iteration}: {} -> {status}", criterion.name());
            if winner.is_none() || status.precedence() > reduced.precedence() {
                reduced = status;
                winner = Some(idx);
            }
        }

        self.status = reduced;
        if reduced.is_terminal() {
            self.triggered_by = winner;
            if let Some(c) = self.triggered_criterion() {
                debug!("solve stopped at iteration {iteration}: {reduced} ({})", c.name());
            }
        }
        Ok(self.status)
    }

    /// Last reduced status; no side effects.
    pub fn status(&self) -> CalculationStatus {
        self.status
    }

    /// Index of the member that produced the terminal status, if any.
    pub fn triggered_by(&self) -> Option<usize> {
        self.triggered_by
    }

    pub fn triggered_criterion(&self) -> Option<&dyn StopCriterion<T>> {
        self.triggered_by.and_then(|idx| self.criteria.get(idx)).map(|c| &**c)
    }

    /// Tokens of every cancellable member, in evaluation order.
    ///
    /// A clone watches its own tokens, so each clone is cancelled through the tokens it returns here.
    pub fn cancellation_tokens(&self) -> Vec<CancellationToken> {
        self.criteria.iter().filter_map(|c| c.cancellation_token()).collect()
    }

    /// Return every member and the evaluator itself to `Indeterminate`.
    pub fn reset_to_precalculation_state(&mut self) {
        for criterion in &mut self.criteria {
            criterion.reset_to_precalculation_state();
        }
        self.status = CalculationStatus::Indeterminate;
        self.triggered_by = None;
        debug!("stop monitor reset ({} criteria)", self.criteria.len());
    }
}

impl<T: Scalar> Clone for CompositeEvaluator<T> {
    fn clone(&self) -> Self {
        Self::from_criteria(self.criteria.clone())
    }
}

/// Iteration budget of 1000, relative tolerance 1e-8 and a numerical failure check.
impl<T: Scalar> Default for CompositeEvaluator<T> {
    fn default() -> Self {
        let tolerance = num_traits::cast::<f64, T::Real>(DEFAULT_TOLERANCE)
            .and_then(|tol| ResidualConvergenceCriterion::new(tol).ok());
        let mut monitor = Self::new().with(IterationBudgetCriterion::default());
        if let Some(residual) = tolerance {
            monitor.push(Box::new(residual));
        }
        monitor.with(NumericalFailureCriterion::new())
    }
}
