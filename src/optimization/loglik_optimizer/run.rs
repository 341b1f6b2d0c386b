//! Execution helper that runs an `argmin` solver on a log-likelihood problem
//! and returns an [`OptimOutcome`].
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        Grad, LogLikelihood, MLEOptions, OptimOutcome, Theta, adapter::ArgMinAdapter,
    },
};
#[cfg(feature = "obs_slog")]
use argmin::core::{CostFunction, Gradient};
use argmin::core::{Executor, State, TerminationReason, TerminationStatus};
#[cfg(feature = "obs_slog")]
use argmin_math::ArgminL2Norm;

/// Run an L-BFGS solve of `problem` from `theta0`.
///
/// Shared by both line-search variants. Sets the initial parameters and
/// `max_iters` on the executor state, attaches a terminal slog observer when
/// built with `obs_slog` and `opts.verbose` is set, and converts the final
/// state into an [`OptimOutcome`] carrying `ℓ(θ̂)` rather than the cost.
///
/// # Errors
/// - Solver failures, via `From<argmin::core::Error>`. Errors raised by the
///   model inside the cost are recovered as their original `OptError`.
/// - `OptError::SolverExit` when the solver gives up on its own, which L-BFGS
///   does when a line search fails.
/// - Validation failures while building the outcome.
pub fn run_lbfgs<'a, F, S>(
    theta0: Theta, opts: &MLEOptions, problem: ArgMinAdapter<'a, F>, solver: S,
) -> OptResult<OptimOutcome>
where
    F: LogLikelihood,
    S: argmin::core::Solver<
            ArgMinAdapter<'a, F>,
            argmin::core::IterState<Theta, Grad, (), (), (), f64>,
        > + Send
        + 'static,
{
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        log_initial_state(&theta0, &problem)?;
    }
    let mut optimizer = Executor::new(problem, solver).configure(|state| state.param(theta0));
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        optimizer = optimizer.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }
    if let Some(max_iter) = opts.tols.max_iter {
        optimizer = optimizer.configure(|state| state.max_iters(max_iter as u64));
    }

    let mut result = optimizer.run()?.state().clone();
    let iterations = result.get_iter();
    let function_counts = result.get_func_counts().clone();
    let termination = result.get_termination_status().clone();
    if let TerminationStatus::Terminated(TerminationReason::SolverExit(text)) = &termination {
        return Err(OptError::SolverExit { text: text.clone() });
    }
    let grad = result.take_gradient();
    OptimOutcome::new(
        result.take_best_param(),
        -result.get_best_cost(),
        termination,
        iterations,
        function_counts,
        grad,
    )
}

// ---- Helper Methods ----

#[cfg(feature = "obs_slog")]
fn log_initial_state<F>(theta0: &Theta, problem: &ArgMinAdapter<'_, F>) -> OptResult<()>
where
    F: LogLikelihood,
{
    let ll0 = -problem.cost(theta0)?;
    let g0n = problem.gradient(theta0).ok().map(|g| g.l2_norm());

    eprintln!(
        "init: loglik(theta0) = {:.6}{}",
        ll0,
        g0n.map(|n| format!(", ||grad|| = {n:.6}")).unwrap_or_default()
    );
    Ok(())
}
