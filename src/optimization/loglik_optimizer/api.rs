//! High-level entry point for maximizing a user-provided `LogLikelihood`.
//!
//! Selects an L-BFGS solver with Hager–Zhang or More–Thuente line search,
//! wraps the model in an `ArgMinAdapter` (which minimizes `-ℓ(θ)`), and hands
//! the run to `run_lbfgs`.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        OptimOutcome, Theta,
        adapter::ArgMinAdapter,
        builders::{build_optimizer_hager_zhang, build_optimizer_more_thuente},
        run::run_lbfgs,
        traits::{LineSearcher, LogLikelihood, MLEOptions},
    },
};

/// Maximize a log-likelihood `ℓ(θ)` using L-BFGS with the chosen line search.
///
/// # Parameters
/// - `f`: model implementing [`LogLikelihood`].
/// - `theta0`: initial parameter vector, consumed.
/// - `data`: passed through to `value`/`grad`/`check`.
/// - `opts`: tolerances, line search, verbosity and history size.
///
/// # Errors
/// - Anything `f.check` rejects.
/// - Builder errors from `build_optimizer_*`.
/// - Runtime errors from `run_lbfgs`.
///
/// # Example
/// ```
/// use ndarray::{Array1, array};
/// use rust_pointprocess::optimization::errors::OptResult;
/// use rust_pointprocess::optimization::loglik_optimizer::{
///     LineSearcher, LogLikelihood, MLEOptions, Tolerances, maximize,
/// };
///
/// struct Bowl;
/// impl LogLikelihood for Bowl {
///     type Data = ();
///     fn value(&self, theta: &Array1<f64>, _: &()) -> OptResult<f64> {
///         Ok(-theta.dot(theta))
///     }
///     fn check(&self, _: &Array1<f64>, _: &()) -> OptResult<()> {
///         Ok(())
///     }
/// }
///
/// let tols = Tolerances::new(Some(1e-8), None, Some(200))?;
/// let opts = MLEOptions::new(tols, LineSearcher::HagerZhang, false, None)?;
/// let out = maximize(&Bowl, array![0.1, -0.2, 0.3], &(), &opts)?;
/// assert!(out.theta_hat.iter().all(|v| v.abs() < 1e-4));
/// # Ok::<(), rust_pointprocess::optimization::errors::OptError>(())
/// ```
pub fn maximize<F: LogLikelihood>(
    f: &F, theta0: Theta, data: &F::Data, opts: &MLEOptions,
) -> OptResult<OptimOutcome> {
    f.check(&theta0, data)?;
    let problem = ArgMinAdapter::new(f, data);
    match opts.line_searcher {
        LineSearcher::MoreThuente => {
            let solver = build_optimizer_more_thuente(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
        LineSearcher::HagerZhang => {
            let solver = build_optimizer_hager_zhang(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
    }
}
