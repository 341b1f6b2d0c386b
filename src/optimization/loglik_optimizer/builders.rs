//! loglik_optimizer::builders — L-BFGS solver construction helpers.
//!
//! Purpose
//! -------
//! Build L-BFGS solvers for the two supported line searches and apply the
//! tolerances carried by [`MLEOptions`], so the runner never touches
//! Argmin's generic wiring.
//!
//! Conventions
//! -----------
//! - History size is `opts.lbfgs_mem`, or [`DEFAULT_LBFGS_MEM`] when `None`.
//! - Builders do not set `theta0` or `max_iters`; the runner applies them on
//!   the executor state.
//! - Argmin rejections of a tolerance surface as [`OptError`] through
//!   `From<argmin::core::Error>`.
//!
//! [`OptError`]: crate::optimization::errors::OptError
use argmin::solver::quasinewton::LBFGS;

use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        traits::MLEOptions,
        types::{
            Cost, DEFAULT_LBFGS_MEM, Grad, HZ_MAX_STEP, HagerZhangLS, LbfgsHagerZhang,
            LbfgsMoreThuente, MoreThuenteLS, Theta,
        },
    },
};

/// L-BFGS with Hager–Zhang line search, tolerances applied.
///
/// Trial steps are confined to `[f64::EPSILON, HZ_MAX_STEP]`.
///
/// # Errors
/// Propagates Argmin's rejection of `tol_grad` / `tol_cost` or of the step
/// bounds.
pub fn build_optimizer_hager_zhang(opts: &MLEOptions) -> OptResult<LbfgsHagerZhang> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    let line_search = HagerZhangLS::new().with_bounds(f64::EPSILON, HZ_MAX_STEP)?;
    configure_lbfgs(LbfgsHagerZhang::new(line_search, mem), opts)
}

/// L-BFGS with More–Thuente line search, tolerances applied.
///
/// # Errors
/// Propagates Argmin's rejection of `tol_grad` / `tol_cost`.
pub fn build_optimizer_more_thuente(opts: &MLEOptions) -> OptResult<LbfgsMoreThuente> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_lbfgs(LbfgsMoreThuente::new(MoreThuenteLS::new(), mem), opts)
}

/// Apply the optional gradient-norm and cost-change tolerances to an L-BFGS
/// solver, whatever its line search.
///
/// A `None` tolerance leaves Argmin's default in effect.
pub fn configure_lbfgs<L>(
    mut solver: LBFGS<L, Theta, Grad, Cost>, opts: &MLEOptions,
) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    if let Some(g) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(g)?;
    }
    if let Some(c) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(c)?;
    }
    Ok(solver)
}
