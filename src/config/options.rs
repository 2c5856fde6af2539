//! Command-line or API options for stop monitors.
//!
//! This module provides the `StopOptions` struct, which collects the parameters of the
//! built-in stop criteria: iteration budget, relative residual tolerance, optional
//! divergence detection, numerical failure checks and cooperative cancellation.
//! [`StopOptions::build`] validates every value and assembles a
//! [`CompositeEvaluator`].

use crate::core::traits::Scalar;
use crate::criterion::{
    CancellationCriterion, CancellationToken, DivergenceCriterion, IterationBudgetCriterion,
    NumericalFailureCriterion, ResidualConvergenceCriterion,
};
use crate::criterion::divergence::{DEFAULT_GROWTH_FACTOR, DEFAULT_MAX_CONSECUTIVE_INCREASES};
use crate::criterion::iteration::DEFAULT_MAXIMUM_ITERATIONS;
use crate::error::KError;
use crate::monitor::CompositeEvaluator;
use crate::monitor::composite::DEFAULT_TOLERANCE;

/// Divergence detection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DivergenceOptions {
    /// Growth over the smallest residual seen that counts as an increase
    pub growth_factor: f64,

    /// Consecutive increases before giving up
    pub max_consecutive_increases: usize,
}

impl Default for DivergenceOptions {
    fn default() -> Self {
        Self {
            growth_factor: DEFAULT_GROWTH_FACTOR,
            max_consecutive_increases: DEFAULT_MAX_CONSECUTIVE_INCREASES,
        }
    }
}

/// Stop criteria & parameters.
#[derive(Debug, Clone)]
pub struct StopOptions {
    /// Iteration budget (must be at least 1)
    pub max_iters: i64,

    /// Relative residual tolerance ‖r‖/‖b‖
    pub rtol: f64,

    /// Extra consecutive iterations the residual must stay within `rtol`
    pub min_iters_below_rtol: usize,

    /// Divergence detection, disabled when `None`
    pub divergence: Option<DivergenceOptions>,

    /// Scan for NaN/Inf entries
    pub check_finite: bool,

    /// Include the solution vector in the NaN/Inf scan
    pub check_solution: bool,

    /// Cancellation flag to watch, disabled when `None`
    pub cancellation: Option<CancellationToken>,
}

impl Default for StopOptions {
    fn default() -> Self {
        Self {
            max_iters: DEFAULT_MAXIMUM_ITERATIONS,
            rtol: DEFAULT_TOLERANCE,
            min_iters_below_rtol: 0,
            divergence: None,
            check_finite: true,
            check_solution: true,
            cancellation: None,
        }
    }
}

impl StopOptions {
    /// Assemble a monitor for scalar type `T`.
    ///
    /// Criteria are added in the order failure, cancellation, divergence, residual,
    /// budget. Evaluation order does not affect the reduced status.
    pub fn build<T: Scalar>(&self) -> Result<CompositeEvaluator<T>, KError> {
        let mut monitor = CompositeEvaluator::new();
        if self.check_finite {
            monitor.push(Box::new(
                NumericalFailureCriterion::new().with_check_solution(self.check_solution),
            ));
        }
        if let Some(token) = &self.cancellation {
            monitor.push(Box::new(CancellationCriterion::with_token(token.clone())));
        }
        if let Some(div) = self.divergence {
            let growth = to_real::<T>(div.growth_factor, "growth factor")?;
            monitor.push(Box::new(DivergenceCriterion::new(growth, div.max_consecutive_increases)?));
        }
        let rtol = to_real::<T>(self.rtol, "tolerance")?;
        monitor.push(Box::new(
            ResidualConvergenceCriterion::new(rtol)?
                .with_minimum_iterations_below_tolerance(self.min_iters_below_rtol),
        ));
        monitor.push(Box::new(IterationBudgetCriterion::new(self.max_iters)?));
        Ok(monitor)
    }
}

fn to_real<T: Scalar>(value: f64, what: &str) -> Result<T::Real, KError> {
    num_traits::cast(value)
        .ok_or_else(|| KError::InvalidConfiguration(format!("{what} {value} is not representable")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::convergence::CalculationStatus;
    use num_complex::Complex;

    #[test]
    fn default_options_build_three_criteria() {
        let m = StopOptions::default().build::<f64>().unwrap();
        let names: Vec<_> = m.criteria().iter().map(|c| c.name()).collect();
        assert_eq!(names, ["numerical-failure", "residual-convergence", "iteration-budget"]);
    }

    #[test]
    fn all_options_enabled() {
        let opts = StopOptions {
            divergence: Some(DivergenceOptions::default()),
            cancellation: Some(CancellationToken::new()),
            ..StopOptions::default()
        };
        let m = opts.build::<Complex<f32>>().unwrap();
        assert_eq!(m.len(), 5);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let bad_budget = StopOptions { max_iters: 0, ..StopOptions::default() };
        assert!(matches!(bad_budget.build::<f64>(), Err(KError::InvalidConfiguration(_))));
        let bad_tol = StopOptions { rtol: -1.0, ..StopOptions::default() };
        assert!(matches!(bad_tol.build::<f64>(), Err(KError::InvalidConfiguration(_))));
        let bad_div = StopOptions {
            divergence: Some(DivergenceOptions { growth_factor: 1.0, max_consecutive_increases: 2 }),
            ..StopOptions::default()
        };
        assert!(matches!(bad_div.build::<f64>(), Err(KError::InvalidConfiguration(_))));
    }

    #[test]
    fn shared_token_cancels_built_monitor() {
        let token = CancellationToken::new();
        let opts = StopOptions { cancellation: Some(token.clone()), ..StopOptions::default() };
        let mut m = opts.build::<f64>().unwrap();
        token.cancel();
        let v = [1.0];
        assert_eq!(m.evaluate(1, &v, &v, &v).unwrap(), CalculationStatus::Cancelled);
    }
}
