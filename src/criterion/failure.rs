//! Numerical failure: stop as soon as a NaN or infinity shows up.

use log::debug;

use crate::core::traits::Scalar;
use crate::criterion::{StopCriterion, check_iteration};
use crate::error::KError;
use crate::utils::convergence::CalculationStatus;

/// Reports `Failed` when the residual (and, unless disabled, the solution) holds a
/// non-finite entry.
#[derive(Debug)]
pub struct NumericalFailureCriterion {
    check_solution: bool,
    status: CalculationStatus,
}

impl NumericalFailureCriterion {
    pub fn new() -> Self {
        Self { check_solution: true, status: CalculationStatus::Indeterminate }
    }

    /// Whether the solution vector is scanned in addition to the residual.
    pub fn with_check_solution(mut self, check_solution: bool) -> Self {
        self.check_solution = check_solution;
        self
    }

    pub fn check_solution(&self) -> bool {
        self.check_solution
    }

    pub fn set_check_solution(&mut self, check_solution: bool) -> Result<(), KError> {
        self.check_solution = check_solution;
        Ok(())
    }

    pub fn status(&self) -> CalculationStatus {
        self.status
    }

    pub fn reset_to_precalculation_state(&mut self) {
        self.status = CalculationStatus::Indeterminate;
    }

    fn evaluate<T: Scalar>(&mut self, iteration: i64, solution: &[T], residual: &[T]) -> Result<CalculationStatus, KError> {
        check_iteration(iteration)?;
        if self.status.is_terminal() {
            return Ok(self.status);
        }
        let bad_residual = residual.iter().any(|v| !v.is_finite());
        let bad_solution = self.check_solution && solution.iter().any(|v| !v.is_finite());
        self.status = if bad_residual || bad_solution {
            debug!(
                "non-finite values at iteration {iteration} (residual: {bad_residual}, solution: {bad_solution})"
            );
            CalculationStatus::Failed
        } else {
            CalculationStatus::Running
        };
        Ok(self.status)
    }
}

impl Default for NumericalFailureCriterion {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for NumericalFailureCriterion {
    fn clone(&self) -> Self {
        Self::new().with_check_solution(self.check_solution)
    }
}

impl<T: Scalar> StopCriterion<T> for NumericalFailureCriterion {
    fn name(&self) -> &'static str {
        "numerical-failure"
    }

    fn determine_status(
        &mut self,
        iteration: i64,
        solution: &[T],
        _source: &[T],
        residual: &[T],
    ) -> Result<CalculationStatus, KError> {
        self.evaluate(iteration, solution, residual)
    }

    fn status(&self) -> CalculationStatus {
        self.status
    }

    fn reset_to_precalculation_state(&mut self) {
        NumericalFailureCriterion::reset_to_precalculation_state(self)
    }

    fn box_clone(&self) -> Box<dyn StopCriterion<T>> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex;

    #[test]
    fn finite_vectors_keep_running() {
        let mut c = NumericalFailureCriterion::new();
        let x: Vec<f64> = vec![1.0, -2.0];
        assert_eq!(c.determine_status(1, &x, &x, &x).unwrap(), CalculationStatus::Running);
    }

    #[test]
    fn nan_or_inf_in_residual_fails() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let mut c = NumericalFailureCriterion::new();
            let x: Vec<f64> = vec![0.0; 2];
            assert_eq!(c.determine_status(1, &x, &x, &[0.0, bad]).unwrap(), CalculationStatus::Failed);
        }
    }

    #[test]
    fn solution_scan_can_be_disabled() {
        let x: Vec<f32> = vec![f32::NAN];
        let r: Vec<f32> = vec![0.0];
        let mut strict = NumericalFailureCriterion::new();
        assert_eq!(strict.determine_status(1, &x, &r, &r).unwrap(), CalculationStatus::Failed);
        let mut lax = NumericalFailureCriterion::new().with_check_solution(false);
        assert_eq!(lax.determine_status(1, &x, &r, &r).unwrap(), CalculationStatus::Running);
        assert!(!lax.clone().check_solution());
    }

    #[test]
    fn imaginary_part_is_checked() {
        let mut c = NumericalFailureCriterion::new();
        let x = vec![Complex::new(1.0_f64, 0.0)];
        let r = vec![Complex::new(0.0_f64, f64::NAN)];
        assert_eq!(c.determine_status(2, &x, &x, &r).unwrap(), CalculationStatus::Failed);
        c.reset_to_precalculation_state();
        assert_eq!(c.status(), CalculationStatus::Indeterminate);
    }
}
