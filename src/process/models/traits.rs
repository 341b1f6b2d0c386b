//! The capability interface every point-process family implements.
//!
//! [`PointProcess`] fixes the calling contract that optimizers, simulators,
//! and diagnostics rely on, so any family can be swapped in behind
//! `&dyn PointProcess`:
//!
//! - parameter access ([`parameters`](PointProcess::parameters),
//!   [`set_parameters`](PointProcess::set_parameters)) and the fixed
//!   dimensionality;
//! - binding a history ([`bind`](PointProcess::bind)), after which the
//!   likelihood and per-event gradients are defined;
//! - intensity and intensity upper bound at an arbitrary time against any
//!   sequence.
//!
//! Contract
//! --------
//! - `set_parameters` replaces the whole vector or fails without changing it.
//! - `intensity(t, data)` only depends on events of `data` with `time < t`.
//! - `intensity_upper_bound(t, data)` dominates `intensity(s, data)` per
//!   dimension for every `s` in `[t, t + upper_bound_window()]`, as long as no
//!   event is added to `data` in between.
//! - `gradient(k)` is the gradient of event `k`'s share of the negative
//!   log-likelihood (see `process::core::history` for the span ownership
//!   rule), so the per-event gradients sum to the full likelihood gradient.
//! - Evaluations take `&self` and are deterministic for fixed parameters and
//!   history.
use ndarray::{Array1, ArrayView1};

use crate::process::{
    core::{BoundHistory, IntensityEval, NegLogLik, ProcessParams, Sequence},
    errors::{ProcessError, ProcessResult},
};

pub trait PointProcess {
    /// Family label used in log output and bindings.
    fn name(&self) -> &'static str;

    /// Shared parameter state.
    fn params(&self) -> &ProcessParams;

    fn parameters(&self) -> ArrayView1<'_, f64> {
        self.params().values()
    }

    fn num_dims(&self) -> usize {
        self.params().num_dims()
    }

    fn num_params(&self) -> usize {
        self.params().len()
    }

    /// Replace the full parameter vector.
    ///
    /// # Errors
    /// Length mismatch, non-finite entries, or a family-specific domain
    /// violation. The previous vector is kept on error.
    fn set_parameters(&mut self, values: Array1<f64>) -> ProcessResult<()>;

    /// Bind an event history, replacing any previous binding.
    ///
    /// # Errors
    /// `DimensionMismatch` when `sequence.num_dims() != self.num_dims()`.
    fn bind(&mut self, sequence: Sequence) -> ProcessResult<()>;

    fn history(&self) -> Option<&BoundHistory>;

    fn is_bound(&self) -> bool {
        self.history().is_some()
    }

    /// Negative log-likelihood of the bound history over `[0, t_end]` and its
    /// gradient with respect to every parameter.
    ///
    /// # Errors
    /// - `HistoryNotBound` before [`bind`](Self::bind).
    /// - `NonPositiveIntensity` when an event falls where the intensity is
    ///   not positive.
    /// - `NonFiniteValue` on overflow.
    fn neg_loglikelihood(&self) -> ProcessResult<NegLogLik>;

    /// Conditional intensity at `t` given the events of `data` before `t`.
    ///
    /// # Errors
    /// `InvalidTime` or `DimensionMismatch`.
    fn intensity(&self, t: f64, data: &Sequence) -> ProcessResult<IntensityEval>;

    /// Dominating rate at `t`, valid over [`upper_bound_window`](Self::upper_bound_window).
    ///
    /// # Errors
    /// `InvalidTime` or `DimensionMismatch`.
    fn intensity_upper_bound(&self, t: f64, data: &Sequence) -> ProcessResult<IntensityEval>;

    /// Gradient of event `k`'s per-event term.
    ///
    /// # Errors
    /// `HistoryNotBound`, `EventIndexOutOfRange`, or the evaluation errors of
    /// [`neg_loglikelihood`](Self::neg_loglikelihood).
    fn gradient(&self, k: usize) -> ProcessResult<Array1<f64>>;

    /// Length of the interval after `t` over which
    /// `intensity_upper_bound(t, ·)` stays valid.
    fn upper_bound_window(&self) -> f64 {
        f64::INFINITY
    }

    /// The bound history, or `HistoryNotBound`.
    fn bound_history(&self) -> ProcessResult<&BoundHistory> {
        self.history().ok_or(ProcessError::HistoryNotBound)
    }
}
