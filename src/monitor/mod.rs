//! Stop-criterion monitoring.
//!
//! The [`CompositeEvaluator`] owns a set of [`StopCriterion`](crate::criterion::StopCriterion)
//! instances, evaluates every one of them after each solver iteration and reduces their
//! verdicts to one [`CalculationStatus`](crate::utils::CalculationStatus) with a fixed
//! precedence:
//!
//! `Failed > Cancelled > Diverged > Converged > IterationLimitReached > Running > Indeterminate`
//!
//! # Example
//! ```rust
//! use kryst_monitor::criterion::{IterationBudgetCriterion, ResidualConvergenceCriterion};
//! use kryst_monitor::monitor::CompositeEvaluator;
//! use kryst_monitor::utils::CalculationStatus;
//!
//! let mut monitor = CompositeEvaluator::<f64>::new()
//!     .with(IterationBudgetCriterion::new(50).unwrap())
//!     .with(ResidualConvergenceCriterion::new(1e-6_f64).unwrap());
//! let b = [1.0, 1.0];
//! let status = monitor.evaluate(1, &[0.5, 0.5], &b, &[1e-9, 0.0]).unwrap();
//! assert_eq!(status, CalculationStatus::Converged);
//! ```

pub mod composite;
pub use composite::CompositeEvaluator;
