//! optimization — MLE stack, numerical helpers, and unified error surface.
//!
//! Purpose
//! -------
//! Provide a cohesive optimization layer for fitting point-process models,
//! combining an Argmin-backed log-likelihood optimizer, numerically stable
//! positivity transforms, and a single error/result surface. Callers
//! implement a log-likelihood, choose tolerances, and obtain fitted
//! parameters and diagnostics without touching backend solver details.
//!
//! Key behaviors
//! -------------
//! - Expose a high-level API for **maximizing log-likelihoods** `ℓ(θ)`
//!   (`loglik_optimizer`), including configuration of solvers and stopping
//!   criteria.
//! - Supply shared numerical primitives (`numerical_stability`) for mapping
//!   unconstrained parameters onto the positive half-line and back.
//! - Normalize configuration issues, numerical failures, and backend solver
//!   errors into a single enum (`errors::OptError`) with a common result
//!   alias (`OptResult<T>`).
//!
//! Invariants & assumptions
//! ------------------------
//! - Optimizers operate in an unconstrained parameter space `θ` and assume
//!   that inputs are finite once validation has passed; invalid states are
//!   reported as `OptError`, not panics.
//! - Log-likelihood implementations treat domain violations (e.g., an event
//!   falling where the intensity is zero) as recoverable errors surfaced
//!   through the optimization layer.
//!
//! Conventions
//! -----------
//! - All solvers conceptually maximize a log-likelihood `ℓ(θ)` by minimizing
//!   an internal cost `c(θ) = -ℓ(θ)`; user-facing APIs and outcomes are
//!   expressed in terms of `ℓ`.
//! - Parameters and gradients are represented using `ndarray`-based aliases
//!   (`Theta`, `Grad`); any mapping between unconstrained θ-space and model
//!   parameters is handled by the fitting layer with the transforms here.
//! - This module avoids I/O; progress output is opt-in through the
//!   `obs_slog` feature and `MLEOptions::verbose`.
//!
//! Downstream usage
//! ----------------
//! - `process::fitting` implements `LogLikelihood` over any point-process
//!   model and calls `maximize` with an initial θ and `MLEOptions`.
//! - Front-ends typically import the curated surface via
//!   `optimization::prelude::*`.
//!
//! Testing notes
//! -------------
//! - Unit tests in the submodules focus on local concerns: solver wiring,
//!   tolerance handling, finite-difference fallbacks, transform accuracy,
//!   and error conversions.
//! - Integration tests exercise end-to-end fits through `process::fitting`.

pub mod errors;
pub mod loglik_optimizer;
pub mod numerical_stability;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_pointprocess::optimization::prelude::*;
//
// to import the main optimization surface in a single line.

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::loglik_optimizer::prelude::*;
    pub use super::numerical_stability::prelude::*;
}
