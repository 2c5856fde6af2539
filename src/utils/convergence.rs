//! Calculation status & solve statistics for iterative solvers.

use std::fmt;

/// State of an iterative calculation as judged by the stop criteria.
///
/// `Indeterminate` and `Running` keep the solver iterating; every other
/// variant is terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CalculationStatus {
    /// No iteration has been evaluated yet.
    #[default]
    Indeterminate,
    /// Keep iterating.
    Running,
    /// The residual criterion is satisfied.
    Converged,
    /// The residual is growing beyond repair.
    Diverged,
    /// The iteration budget is exhausted without convergence.
    IterationLimitReached,
    /// An external cancellation request was observed.
    Cancelled,
    /// Non-finite values were encountered.
    Failed,
}

impl CalculationStatus {
    /// All variants, lowest precedence first.
    pub const BY_PRECEDENCE: [CalculationStatus; 7] = [
        CalculationStatus::Indeterminate,
        CalculationStatus::Running,
        CalculationStatus::IterationLimitReached,
        CalculationStatus::Converged,
        CalculationStatus::Diverged,
        CalculationStatus::Cancelled,
        CalculationStatus::Failed,
    ];

    /// `true` once the solve loop must halt.
    pub fn is_terminal(self) -> bool {
        !matches!(self, CalculationStatus::Indeterminate | CalculationStatus::Running)
    }

    /// Rank used when reducing several statuses into one; higher wins.
    ///
    /// `Failed > Cancelled > Diverged > Converged > IterationLimitReached > Running > Indeterminate`
    pub fn precedence(self) -> u8 {
        match self {
            CalculationStatus::Indeterminate => 0,
            CalculationStatus::Running => 1,
            CalculationStatus::IterationLimitReached => 2,
            CalculationStatus::Converged => 3,
            CalculationStatus::Diverged => 4,
            CalculationStatus::Cancelled => 5,
            CalculationStatus::Failed => 6,
        }
    }
}

impl fmt::Display for CalculationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CalculationStatus::Indeterminate => "indeterminate",
            CalculationStatus::Running => "running",
            CalculationStatus::Converged => "converged",
            CalculationStatus::Diverged => "diverged",
            CalculationStatus::IterationLimitReached => "stopped without convergence",
            CalculationStatus::Cancelled => "cancelled",
            CalculationStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Outcome of a solve driven by a stop-criterion monitor.
#[derive(Clone, Debug)]
pub struct SolveStats<T> {
    pub iterations: usize,
    pub final_residual: T,
    pub converged: bool,
    pub status: CalculationStatus,
}

impl<T> SolveStats<T> {
    pub fn new(iterations: usize, final_residual: T, status: CalculationStatus) -> Self {
        Self {
            iterations,
            final_residual,
            converged: status == CalculationStatus::Converged,
            status,
        }
    }
}
