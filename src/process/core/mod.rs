//! core — shared point-process state, event histories, results, and checks.
//!
//! Purpose
//! -------
//! Collect the building blocks every point-process family shares: the
//! parameter container, the event-sequence collaborator, the bound history
//! with its span partition, the immutable evaluation results, and the
//! validation helpers. Concrete families in `process::models` are thin
//! layers of model math on top of these primitives.
//!
//! Key behaviors
//! -------------
//! - [`ProcessParams`] holds a zero-initialized, fixed-length parameter vector
//!   and a fixed dimensionality, with fail-fast replacement.
//! - [`Sequence`] / [`Event`] carry a validated, time-ordered history on
//!   `[0, t_end]` with causal counting helpers.
//! - [`BoundHistory`] fixes the per-event span partition that makes the
//!   likelihood decompose exactly into per-event terms.
//! - [`NegLogLik`] and [`IntensityEval`] replace output parameters with
//!   validated values.
//!
//! Invariants & assumptions
//! ------------------------
//! - Parameter vectors keep their construction length and only hold finite
//!   values.
//! - Event times are non-decreasing and inside `[0, t_end]`; every dimension
//!   tag is `< num_dims`.
//! - `IntensityEval::total` equals the sum of its per-dimension entries.
//!
//! Conventions
//! -----------
//! - Indexing is 0-based throughout (events, dimensions, parameters).
//! - This module performs no I/O and no logging. Errors are reported via
//!   [`ProcessResult`](crate::process::errors::ProcessResult).
//!
//! Testing notes
//! -------------
//! - Each submodule carries unit tests for its constructors and validation
//!   paths; model-level properties live with the families.

pub mod history;
pub mod params;
pub mod results;
pub mod sequence;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::history::{BoundHistory, Span};
pub use self::params::ProcessParams;
pub use self::results::{IntensityEval, NegLogLik};
pub use self::sequence::{Event, Sequence};

pub mod prelude {
    pub use super::history::BoundHistory;
    pub use super::params::ProcessParams;
    pub use super::results::{IntensityEval, NegLogLik};
    pub use super::sequence::{Event, Sequence};
}
