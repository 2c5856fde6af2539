//! Divergence detection: stop when the residual keeps growing past its best value.

use std::fmt::Debug;

use log::debug;
use num_traits::Float;

use crate::core::traits::Scalar;
use crate::core::wrappers::norm;
use crate::criterion::{StopCriterion, check_iteration};
use crate::error::KError;
use crate::utils::convergence::CalculationStatus;

/// Default growth factor over the smallest residual seen.
pub const DEFAULT_GROWTH_FACTOR: f64 = 1.0e4;
/// Default number of consecutive growing iterations tolerated.
pub const DEFAULT_MAX_CONSECUTIVE_INCREASES: usize = 3;

/// Reports `Diverged` after `max_consecutive_increases` consecutive iterations whose
/// residual norm exceeds `growth_factor` times the smallest norm observed so far.
///
/// Any iteration that does not exceed that bound breaks the streak; an iteration that
/// improves on the minimum also becomes the new reference. Non-finite norms are ignored.
#[derive(Debug)]
pub struct DivergenceCriterion<R> {
    growth_factor: R,
    max_consecutive_increases: usize,
    // history
    minimum_residual: Option<R>,
    consecutive_increases: usize,
    status: CalculationStatus,
}

impl<R: Float + Debug> DivergenceCriterion<R> {
    pub fn new(growth_factor: R, max_consecutive_increases: usize) -> Result<Self, KError> {
        validate_growth_factor(growth_factor)?;
        validate_max_consecutive_increases(max_consecutive_increases)?;
        Ok(Self {
            growth_factor,
            max_consecutive_increases,
            minimum_residual: None,
            consecutive_increases: 0,
            status: CalculationStatus::Indeterminate,
        })
    }

    pub fn growth_factor(&self) -> R {
        self.growth_factor
    }

    pub fn set_growth_factor(&mut self, growth_factor: R) -> Result<(), KError> {
        validate_growth_factor(growth_factor)?;
        self.growth_factor = growth_factor;
        Ok(())
    }

    pub fn max_consecutive_increases(&self) -> usize {
        self.max_consecutive_increases
    }

    pub fn set_max_consecutive_increases(&mut self, count: usize) -> Result<(), KError> {
        validate_max_consecutive_increases(count)?;
        self.max_consecutive_increases = count;
        Ok(())
    }

    /// Smallest finite residual norm seen in the current solve.
    pub fn minimum_residual(&self) -> Option<R> {
        self.minimum_residual
    }

    pub fn consecutive_increases(&self) -> usize {
        self.consecutive_increases
    }

    pub fn status(&self) -> CalculationStatus {
        self.status
    }

    pub fn reset_to_precalculation_state(&mut self) {
        self.minimum_residual = None;
        self.consecutive_increases = 0;
        self.status = CalculationStatus::Indeterminate;
    }

    fn evaluate<T: Scalar<Real = R>>(&mut self, iteration: i64, residual: &[T]) -> Result<CalculationStatus, KError> {
        check_iteration(iteration)?;
        if self.status.is_terminal() {
            return Ok(self.status);
        }
        self.observe(norm(residual));
        self.status = if self.consecutive_increases >= self.max_consecutive_increases {
            debug!(
                "residual grew past {:?}x its minimum for {} consecutive iterations (iteration {iteration})",
                self.growth_factor, self.consecutive_increases
            );
            CalculationStatus::Diverged
        } else {
            CalculationStatus::Running
        };
        Ok(self.status)
    }

    fn observe(&mut self, residual_norm: R) {
        if !residual_norm.is_finite() {
            return;
        }
        match self.minimum_residual {
            Some(min) if residual_norm >= min => {
                if residual_norm > self.growth_factor * min {
                    self.consecutive_increases += 1;
                } else {
                    self.consecutive_increases = 0;
                }
            }
            _ => {
                self.minimum_residual = Some(residual_norm);
                self.consecutive_increases = 0;
            }
        }
    }
}

fn validate_growth_factor<R: Float>(growth_factor: R) -> Result<(), KError> {
    if !(growth_factor > R::one()) || !growth_factor.is_finite() {
        return Err(KError::InvalidConfiguration(format!(
            "growth factor must be finite and greater than 1, got {:?}",
            growth_factor.to_f64()
        )));
    }
    Ok(())
}

fn validate_max_consecutive_increases(count: usize) -> Result<(), KError> {
    if count < 1 {
        return Err(KError::InvalidConfiguration(
            "maximum consecutive increases must be at least 1".to_string(),
        ));
    }
    Ok(())
}

impl<R: Float> Clone for DivergenceCriterion<R> {
    fn clone(&self) -> Self {
        Self {
            growth_factor: self.growth_factor,
            max_consecutive_increases: self.max_consecutive_increases,
            minimum_residual: None,
            consecutive_increases: 0,
            status: CalculationStatus::Indeterminate,
        }
    }
}

impl<T: Scalar> StopCriterion<T> for DivergenceCriterion<T::Real> {
    fn name(&self) -> &'static str {
        "divergence"
    }

    fn determine_status(
        &mut self,
        iteration: i64,
        _solution: &[T],
        _source: &[T],
        residual: &[T],
    ) -> Result<CalculationStatus, KError> {
        self.evaluate(iteration, residual)
    }

    fn status(&self) -> CalculationStatus {
        self.status
    }

    fn reset_to_precalculation_state(&mut self) {
        DivergenceCriterion::reset_to_precalculation_state(self)
    }

    fn box_clone(&self) -> Box<dyn StopCriterion<T>> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(c: &mut DivergenceCriterion<f64>, norms: &[f64]) -> Vec<CalculationStatus> {
        let empty: [f64; 0] = [];
        norms
            .iter()
            .enumerate()
            .map(|(i, &r)| c.determine_status(i as i64, &empty, &empty, &[r]).unwrap())
            .collect()
    }

    #[test]
    fn diverges_on_third_consecutive_increase() {
        let mut c = DivergenceCriterion::new(2.0_f64, 3).unwrap();
        let s = feed(&mut c, &[1.0, 2.5, 2.6, 2.7]);
        assert_eq!(
            s,
            vec![
                CalculationStatus::Running,
                CalculationStatus::Running,
                CalculationStatus::Running,
                CalculationStatus::Diverged
            ]
        );
        assert_eq!(c.minimum_residual(), Some(1.0));
    }

    #[test]
    fn improvement_resets_streak() {
        let mut c = DivergenceCriterion::new(2.0_f64, 3).unwrap();
        let s = feed(&mut c, &[1.0, 2.5, 2.6, 0.5, 1.2, 1.3]);
        assert!(s.iter().all(|&st| st == CalculationStatus::Running), "{s:?}");
        assert_eq!(c.minimum_residual(), Some(0.5));
        assert_eq!(c.consecutive_increases(), 2);
    }

    #[test]
    fn mild_growth_breaks_streak() {
        let mut c = DivergenceCriterion::new(2.0_f64, 2).unwrap();
        let s = feed(&mut c, &[1.0, 3.0, 1.5, 3.0]);
        assert_eq!(*s.last().unwrap(), CalculationStatus::Running);
        assert_eq!(c.consecutive_increases(), 1);
    }

    #[test]
    fn non_finite_norms_are_left_to_failure_check() {
        let mut c = DivergenceCriterion::new(2.0_f64, 1).unwrap();
        let s = feed(&mut c, &[1.0, f64::NAN, f64::INFINITY]);
        assert!(s.iter().all(|&st| st == CalculationStatus::Running), "{s:?}");
    }

    #[test]
    fn rejects_invalid_configuration() {
        assert!(matches!(DivergenceCriterion::new(1.0_f64, 3), Err(KError::InvalidConfiguration(_))));
        assert!(matches!(DivergenceCriterion::new(0.5_f64, 3), Err(KError::InvalidConfiguration(_))));
        assert!(matches!(DivergenceCriterion::new(2.0_f64, 0), Err(KError::InvalidConfiguration(_))));
        let mut c = DivergenceCriterion::new(2.0_f64, 3).unwrap();
        assert!(c.set_growth_factor(f64::NAN).is_err());
        assert!(c.set_max_consecutive_increases(0).is_err());
        assert_eq!((c.growth_factor(), c.max_consecutive_increases()), (2.0, 3));
    }

    #[test]
    fn clone_and_reset_forget_the_minimum() {
        let mut c = DivergenceCriterion::new(2.0_f64, 1).unwrap();
        feed(&mut c, &[1.0, 5.0]);
        assert_eq!(c.status(), CalculationStatus::Diverged);
        let copy = c.clone();
        assert_eq!(copy.status(), CalculationStatus::Indeterminate);
        assert_eq!(copy.minimum_residual(), None);
        assert_eq!(copy.growth_factor(), 2.0);
        c.reset_to_precalculation_state();
        assert_eq!(c.status(), CalculationStatus::Indeterminate);
        assert_eq!(feed(&mut c, &[5.0]), vec![CalculationStatus::Running]);
    }
}
