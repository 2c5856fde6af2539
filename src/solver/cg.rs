//! Conjugate Gradient (unpreconditioned) per Saad §6.1.

use log::trace;
use num_traits::Float;

use crate::core::traits::{MatVec, Scalar};
use crate::core::wrappers::{dot, norm};
use crate::criterion::{IterationBudgetCriterion, NumericalFailureCriterion, ResidualConvergenceCriterion};
use crate::error::KError;
use crate::monitor::CompositeEvaluator;
use crate::solver::LinearSolver;
use crate::utils::convergence::SolveStats;

pub struct CgSolver<T: Scalar> {
    pub monitor: CompositeEvaluator<T>,
}

impl<T: Float + Scalar<Real = T>> CgSolver<T> {
    /// CG stopped by a relative residual tolerance, an iteration budget and a NaN/Inf check.
    pub fn new(tol: T, max_iters: i64) -> Result<Self, KError> {
        let monitor = CompositeEvaluator::new()
            .with(NumericalFailureCriterion::new())
            .with(ResidualConvergenceCriterion::new(tol)?)
            .with(IterationBudgetCriterion::new(max_iters)?);
        Ok(Self { monitor })
    }

    pub fn with_monitor(monitor: CompositeEvaluator<T>) -> Self {
        Self { monitor }
    }
}

impl<M, V, T> LinearSolver<M, V> for CgSolver<T>
where
    M: MatVec<V>,
    V: AsMut<[T]> + AsRef<[T]> + From<Vec<T>> + Clone,
    T: Float + Scalar<Real = T>,
{
    type Error = KError;
    type Scalar = T;

    fn solve(&mut self, a: &M, b: &V, x: &mut V) -> Result<SolveStats<T>, KError> {
        let n = b.as_ref().len();
        if x.as_ref().len() != n {
            return Err(KError::DimensionMismatch { expected: n, found: x.as_ref().len() });
        }
        if self.monitor.is_empty() {
            return Err(KError::InvalidConfiguration("CG needs at least one stop criterion".into()));
        }
        self.monitor.reset_to_precalculation_state();

        // r0 = b - A x0
        let mut r = V::from(vec![T::zero(); n]);
        a.matvec(x, &mut r);
        for (rj, &bj) in r.as_mut().iter_mut().zip(b.as_ref()) {
            *rj = bj - *rj;
        }
        let mut p = r.clone();
        let mut ap = V::from(vec![T::zero(); n]);
        let mut rsq = dot(r.as_ref(), r.as_ref());

        let mut iterations = 0usize;
        let mut status = self.monitor.evaluate(0, x.as_ref(), b.as_ref(), r.as_ref())?;
        while !status.is_terminal() {
            a.matvec(&p, &mut ap);
            let pap = dot(p.as_ref(), ap.as_ref());
            if pap <= T::zero() {
                return Err(KError::IndefiniteMatrix);
            }
            let alpha = rsq / pap;
            for (xj, &pj) in x.as_mut().iter_mut().zip(p.as_ref()) {
                *xj = *xj + alpha * pj;
            }
            for (rj, &apj) in r.as_mut().iter_mut().zip(ap.as_ref()) {
                *rj = *rj - alpha * apj;
            }
            let rsq_new = dot(r.as_ref(), r.as_ref());
            iterations += 1;
            trace!("cg iteration {iterations}: |r| = {}", rsq_new.sqrt());
            status = self.monitor.evaluate(iterations as i64, x.as_ref(), b.as_ref(), r.as_ref())?;
            if status.is_terminal() {
                break;
            }
            let beta = rsq_new / rsq;
            for (pj, &rj) in p.as_mut().iter_mut().zip(r.as_ref()) {
                *pj = rj + beta * *pj;
            }
            rsq = rsq_new;
        }
        Ok(SolveStats::new(iterations, norm(r.as_ref()), status))
    }
}
