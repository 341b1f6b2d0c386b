//! loglik_optimizer — MLE-friendly, argmin-powered log-likelihood optimizer.
//!
//! Purpose
//! -------
//! Provide a high-level, Argmin-backed optimization layer for **maximizing
//! log-likelihoods** `ℓ(θ)`. Callers implement a single trait,
//! [`LogLikelihood`], and invoke [`maximize`] to run L-BFGS with a
//! configurable line search, tolerances, and finite-difference fallbacks.
//!
//! Key behaviors
//! -------------
//! - Convert user-supplied log-likelihoods `ℓ(θ)` into Argmin-compatible
//!   cost functions `c(θ) = -ℓ(θ)` via [`adapter::ArgMinAdapter`].
//! - Expose a single, user-facing entrypoint [`maximize`] that:
//!   - validates the initial guess with [`LogLikelihood::check`],
//!   - selects an L-BFGS solver via [`builders`] based on [`LineSearcher`],
//!   - executes the solver via [`run::run_lbfgs`], and
//!   - normalizes results into an [`OptimOutcome`].
//! - Provide a forward-difference gradient helper in [`finite_diff`] used
//!   when analytic derivatives are missing or fail validation.
//! - Centralize optimizer configuration ([`Tolerances`], [`MLEOptions`]) and
//!   validation logic ([`validation`]) so downstream code can assume sane,
//!   finite inputs.
//!
//! Invariants & assumptions
//! ------------------------
//! - The optimizer **always maximizes** a log-likelihood `ℓ(θ)` by minimizing
//!   a cost `c(θ) = -ℓ(θ)`; user code implements `ℓ(θ)` and `∇ℓ(θ)`
//!   (when available), **never** the cost directly.
//! - [`LogLikelihood::value`] and [`LogLikelihood::grad`] must treat invalid
//!   inputs as recoverable [`OptError`] values, not panics.
//! - Configuration types ([`Tolerances`], [`MLEOptions`]) are validated on
//!   construction and are treated as internally consistent by the solver
//!   layer.
//!
//! Conventions
//! -----------
//! - Parameters live in an unconstrained optimizer space as [`Theta`]
//!   (`Array1<f64>`). Any mapping from constrained → unconstrained space
//!   happens in the model layer.
//! - Gradients exposed by [`LogLikelihood::grad`] are for the log-likelihood
//!   (`∇ℓ(θ)`); the adapter flips signs to obtain the cost gradient.
//! - Errors bubble up as [`OptResult<T>`] / [`OptError`].
//!
//! Testing notes
//! -------------
//! - Unit tests in submodules cover sign conventions in [`adapter`], solver
//!   construction in [`builders`], the finite-difference path in
//!   [`finite_diff`], validation helpers, and an end-to-end [`maximize`] on
//!   a concave quadratic in [`api`].
//!
//! [`OptError`]: crate::optimization::errors::OptError
//! [`OptResult<T>`]: crate::optimization::errors::OptResult

pub mod adapter;
pub mod api;
pub mod builders;
pub mod finite_diff;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::maximize;
pub use self::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Theta};

pub mod prelude {
    pub use super::api::maximize;
    pub use super::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
    pub use super::types::{Cost, Grad, Theta};
}
