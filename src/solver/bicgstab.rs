//! BiCGStab solver (Saad §7.1)

use log::warn;
use num_traits::Float;

use crate::core::traits::{MatVec, Scalar};
use crate::core::wrappers::{dot, norm};
use crate::criterion::{IterationBudgetCriterion, NumericalFailureCriterion, ResidualConvergenceCriterion};
use crate::error::KError;
use crate::monitor::CompositeEvaluator;
use crate::solver::LinearSolver;
use crate::utils::convergence::SolveStats;

pub struct BiCgStabSolver<T: Scalar> {
    pub monitor: CompositeEvaluator<T>,
}

impl<T: Float + Scalar<Real = T>> BiCgStabSolver<T> {
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

impl<M, V, T> LinearSolver<M, V> for BiCgStabSolver<T>
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
            return Err(KError::InvalidConfiguration("BiCGStab needs at least one stop criterion".into()));
        }
        self.monitor.reset_to_precalculation_state();

        // r0 = b - A x0
        let mut r = V::from(vec![T::zero(); n]);
        a.matvec(x, &mut r);
        for (rj, &bj) in r.as_mut().iter_mut().zip(b.as_ref()) {
            *rj = bj - *rj;
        }
        let r_hat = r.clone(); // shadow residual
        let r_hat_norm = norm(r_hat.as_ref());
        let mut rho_prev = T::one();
        let mut alpha = T::one();
        let mut omega_prev = T::one();
        let mut v = V::from(vec![T::zero(); n]);
        let mut p = V::from(vec![T::zero(); n]);
        let mut s = V::from(vec![T::zero(); n]);
        let mut t = V::from(vec![T::zero(); n]);

        let mut iterations = 0usize;
        let mut status = self.monitor.evaluate(0, x.as_ref(), b.as_ref(), r.as_ref())?;
        while !status.is_terminal() {
            let r_norm = norm(r.as_ref());
            let rho = dot(r_hat.as_ref(), r.as_ref());
            if rho.abs() <= T::epsilon() * r_hat_norm * r_norm {
                warn!("BiCGStab breakdown at iteration {iterations}: rho = {rho}");
                return Err(KError::SolveError(format!(
                    "BiCGStab breakdown at iteration {iterations}: (r_hat, r) vanished"
                )));
            }
            let beta = if iterations == 0 {
                T::zero()
            } else {
                (rho / rho_prev) * (alpha / omega_prev)
            };
            // p = r + beta * (p - omega_prev * v)
            for ((pj, &rj), &vj) in p.as_mut().iter_mut().zip(r.as_ref()).zip(v.as_ref()) {
                *pj = rj + beta * (*pj - omega_prev * vj);
            }
            a.matvec(&p, &mut v);
            let alpha_den = dot(r_hat.as_ref(), v.as_ref());
            if alpha_den.abs() <= T::epsilon() * r_hat_norm * norm(v.as_ref()) {
                warn!("BiCGStab breakdown at iteration {iterations}: (r_hat, v) = {alpha_den}");
                return Err(KError::SolveError(format!(
                    "BiCGStab breakdown at iteration {iterations}: (r_hat, A p) vanished"
                )));
            }
            alpha = rho / alpha_den;
            // s = r - alpha * v
            for ((sj, &rj), &vj) in s.as_mut().iter_mut().zip(r.as_ref()).zip(v.as_ref()) {
                *sj = rj - alpha * vj;
            }
            a.matvec(&s, &mut t);
            let omega = if norm(s.as_ref()) <= T::epsilon() * r_norm {
                // s is negligible next to r: take the half step only
                T::zero()
            } else {
                dot(t.as_ref(), s.as_ref()) / dot(t.as_ref(), t.as_ref())
            };
            // x = x + alpha * p + omega * s
            for ((xj, &pj), &sj) in x.as_mut().iter_mut().zip(p.as_ref()).zip(s.as_ref()) {
                *xj = *xj + alpha * pj + omega * sj;
            }
            // r = s - omega * t
            for ((rj, &sj), &tj) in r.as_mut().iter_mut().zip(s.as_ref()).zip(t.as_ref()) {
                *rj = sj - omega * tj;
            }
            iterations += 1;
            status = self.monitor.evaluate(iterations as i64, x.as_ref(), b.as_ref(), r.as_ref())?;
            if !status.is_terminal() && omega.abs() < T::epsilon() {
                warn!("BiCGStab stagnated at iteration {iterations}: omega = {omega}");
                return Err(KError::SolveError(format!(
                    "BiCGStab stagnated at iteration {iterations}: omega = {omega}"
                )));
            }
            rho_prev = rho;
            omega_prev = omega;
        }
        Ok(SolveStats::new(iterations, norm(r.as_ref()), status))
    }
}
