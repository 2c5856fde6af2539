//! Iteration budget: stop once a maximum number of iterations has been spent.

use log::debug;

use crate::core::traits::Scalar;
use crate::criterion::{StopCriterion, check_iteration};
use crate::error::KError;
use crate::utils::convergence::CalculationStatus;

/// Default iteration budget.
pub const DEFAULT_MAXIMUM_ITERATIONS: i64 = 1000;

/// Reports `IterationLimitReached` when `iteration >= maximum_iterations`.
///
/// Iteration `0` denotes the initial guess and is a valid input.
#[derive(Debug)]
pub struct IterationBudgetCriterion {
    maximum_iterations: i64,
    status: CalculationStatus,
}

impl IterationBudgetCriterion {
    pub fn new(maximum_iterations: i64) -> Result<Self, KError> {
        validate(maximum_iterations)?;
        Ok(Self { maximum_iterations, status: CalculationStatus::Indeterminate })
    }

    pub fn maximum_iterations(&self) -> i64 {
        self.maximum_iterations
    }

    pub fn set_maximum_iterations(&mut self, maximum_iterations: i64) -> Result<(), KError> {
        validate(maximum_iterations)?;
        self.maximum_iterations = maximum_iterations;
        Ok(())
    }

    pub fn status(&self) -> CalculationStatus {
        self.status
    }

    pub fn reset_to_precalculation_state(&mut self) {
        self.status = CalculationStatus::Indeterminate;
    }

    fn evaluate(&mut self, iteration: i64) -> Result<CalculationStatus, KError> {
        check_iteration(iteration)?;
        if self.status.is_terminal() {
            return Ok(self.status);
        }
        self.status = if iteration >= self.maximum_iterations {
            debug!("iteration budget of {} exhausted at iteration {iteration}", self.maximum_iterations);
            CalculationStatus::IterationLimitReached
        } else {
            CalculationStatus::Running
        };
        Ok(self.status)
    }
}

fn validate(maximum_iterations: i64) -> Result<(), KError> {
    if maximum_iterations < 1 {
        return Err(KError::InvalidConfiguration(format!(
            "maximum iterations must be at least 1, got {maximum_iterations}"
        )));
    }
    Ok(())
}

impl Default for IterationBudgetCriterion {
    fn default() -> Self {
        Self { maximum_iterations: DEFAULT_MAXIMUM_ITERATIONS, status: CalculationStatus::Indeterminate }
    }
}

impl Clone for IterationBudgetCriterion {
    fn clone(&self) -> Self {
        Self { maximum_iterations: self.maximum_iterations, status: CalculationStatus::Indeterminate }
    }
}

impl<T: Scalar> StopCriterion<T> for IterationBudgetCriterion {
    fn name(&self) -> &'static str {
        "iteration-budget"
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
        IterationBudgetCriterion::reset_to_precalculation_state(self)
    }

    fn box_clone(&self) -> Box<dyn StopCriterion<T>> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(c: &mut IterationBudgetCriterion, i: i64) -> Result<CalculationStatus, KError> {
        let v: [f64; 0] = [];
        c.determine_status(i, &v, &v, &v)
    }

    #[test]
    fn runs_below_budget_and_latches_at_budget() {
        let mut c = IterationBudgetCriterion::new(5).unwrap();
        for i in 0..5 {
            assert_eq!(step(&mut c, i).unwrap(), CalculationStatus::Running, "iteration {i}");
        }
        assert_eq!(step(&mut c, 5).unwrap(), CalculationStatus::IterationLimitReached);
        assert_eq!(step(&mut c, 10).unwrap(), CalculationStatus::IterationLimitReached);
        // Latched even if the caller goes back.
        assert_eq!(step(&mut c, 1).unwrap(), CalculationStatus::IterationLimitReached);
    }

    #[test]
    fn rejects_non_positive_budgets() {
        for bad in [0, -1, i64::MIN] {
            assert!(matches!(IterationBudgetCriterion::new(bad), Err(KError::InvalidConfiguration(_))));
        }
        let mut c = IterationBudgetCriterion::default();
        assert_eq!(c.maximum_iterations(), 1000);
        assert!(matches!(c.set_maximum_iterations(0), Err(KError::InvalidConfiguration(_))));
        assert_eq!(c.maximum_iterations(), 1000);
        c.set_maximum_iterations(7).unwrap();
        assert_eq!(c.maximum_iterations(), 7);
    }

    #[test]
    fn negative_iteration_is_an_argument_error() {
        let mut c = IterationBudgetCriterion::new(3).unwrap();
        assert!(matches!(step(&mut c, -1), Err(KError::InvalidArgument(_))));
        assert_eq!(c.status(), CalculationStatus::Indeterminate);
    }

    #[test]
    fn reset_and_clone_drop_history() {
        let mut c = IterationBudgetCriterion::new(2).unwrap();
        step(&mut c, 3).unwrap();
        let copy = c.clone();
        assert_eq!(copy.maximum_iterations(), 2);
        assert_eq!(copy.status(), CalculationStatus::Indeterminate);
        assert_eq!(c.status(), CalculationStatus::IterationLimitReached);
        c.reset_to_precalculation_state();
        assert_eq!(c.status(), CalculationStatus::Indeterminate);
        assert_eq!(step(&mut c, 1).unwrap(), CalculationStatus::Running);
    }
}
