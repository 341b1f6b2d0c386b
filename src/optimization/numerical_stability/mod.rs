//! numerical_stability — stable positivity transforms for optimizer space.
//!
//! Purpose
//! -------
//! Collect the guarded nonlinear transforms used to move point-process
//! parameters between the positive half-line (model space) and the real
//! line (optimizer space) without overflow or catastrophic cancellation.
//!
//! Key behaviors
//! -------------
//! - `safe_softplus` maps ℝ → (0, ∞); `safe_softplus_inv` inverts it.
//! - `safe_logistic` is the derivative of softplus and is used for the
//!   chain rule when mapping model-space gradients back to θ-space.
//!
//! Downstream usage
//! ----------------
//! - `process::fitting::ParamLink` applies these coordinate-wise.
//!
//! Testing notes
//! -------------
//! - Unit tests in [`transformations`] cover agreement with naïve formulas
//!   on safe grids, tail behavior, and the inverse relationship.

pub mod transformations;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::transformations::{
    SOFTPLUS_CUTOFF, safe_logistic, safe_softplus, safe_softplus_inv,
};

pub mod prelude {
    pub use super::transformations::{safe_logistic, safe_softplus, safe_softplus_inv};
}
