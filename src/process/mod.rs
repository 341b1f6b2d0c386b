//! process — parametric temporal point processes and their consumers.
//!
//! Purpose
//! -------
//! Provide a uniform contract for multivariate temporal point processes
//! (parameters, conditional intensity, intensity upper bound, negative
//! log-likelihood with per-event gradients) together with the generic
//! consumers built on it: maximum-likelihood fitting, thinning simulation,
//! and time-rescaling diagnostics.
//!
//! Key behaviors
//! -------------
//! - [`models::PointProcess`] is the capability trait; `HomogeneousPoisson`,
//!   `ExpHawkes`, and `SelfCorrecting` implement it.
//! - [`fitting::fit`] maximizes the likelihood of a bound model through the
//!   L-BFGS driver in `optimization::loglik_optimizer`.
//! - [`simulation::simulate`] draws realizations by Ogata thinning.
//! - [`diagnostics::time_rescaling`] and [`diagnostics::ks_exp1`] check fit.
//!
//! Invariants & assumptions
//! ------------------------
//! - Boundary operations (construction, `set_parameters`, `bind`) fail fast
//!   and leave state unchanged on error.
//! - Evaluations take `&self`, return fresh values, and never write partial
//!   results.
//!
//! Conventions
//! -----------
//! - Time starts at 0; dimensions and events are 0-indexed.
//! - The numerical core does not log. Optimizer progress is reported through
//!   `MLEOptions::verbose` (see `optimization::loglik_optimizer::run`).
//!
//! Downstream usage
//! ----------------
//! - Rust callers typically `use rust_pointprocess::process::prelude::*`.
//! - Python callers go through the `PointProcess` class in the crate root.

pub mod core;
pub mod diagnostics;
pub mod errors;
pub mod fitting;
pub mod models;
pub mod simulation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::core::{Event, IntensityEval, NegLogLik, ProcessParams, Sequence};
pub use self::diagnostics::{KsOutcome, RescaledTimes, RescalingOpts, ks_exp1, time_rescaling};
pub use self::errors::{ProcessError, ProcessResult};
pub use self::fitting::{FitOptions, FitOutcome, ParamLink, fit};
pub use self::models::{ExpHawkes, HomogeneousPoisson, PointProcess, SelfCorrecting};
pub use self::simulation::{SimOpts, simulate};

pub mod prelude {
    pub use super::core::prelude::*;
    pub use super::diagnostics::{RescalingOpts, ks_exp1, time_rescaling};
    pub use super::errors::{ProcessError, ProcessResult};
    pub use super::fitting::{FitOptions, ParamLink, fit};
    pub use super::models::prelude::*;
    pub use super::simulation::{SimOpts, simulate};
}
