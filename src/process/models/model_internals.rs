//! Point-process model internals — binding state and per-event assembly.
//!
//! Purpose
//! -------
//! Factor out the bookkeeping every family repeats: keeping a bound history
//! next to its family-specific cache, checking evaluation arguments, and
//! assembling the negative log-likelihood and per-event gradients from two
//! family-supplied pieces.
//!
//! Key behaviors
//! -------------
//! - [`Binding`] pairs a [`BoundHistory`] with a parameter-independent cache
//!   built once at bind time.
//! - [`SpanLikelihood`] is what a family implements: the `-ln λ` term at an
//!   event and the compensator over one span, each accumulating its
//!   gradient.
//! - [`assemble_neg_loglikelihood`] and [`assemble_event_gradient`] combine
//!   them using the ownership rule of `BoundHistory::owned_spans`, so the
//!   per-event gradients sum to the full gradient by construction.
//! - [`check_eval_args`] is the shared precondition check for `intensity` and
//!   `intensity_upper_bound`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Caches depend only on the history (and fixed construction constants),
//!   never on the parameter vector, so `set_parameters` does not invalidate
//!   them.
//! - Gradients passed to the family hooks have the model's parameter length.
use ndarray::Array1;

use crate::process::{
    core::{
        BoundHistory, NegLogLik, Sequence,
        validation::{validate_dims, validate_time},
    },
    errors::{ProcessError, ProcessResult},
};

/// A bound history plus a family-specific cache derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding<C> {
    pub history: BoundHistory,
    pub cache: C,
}

/// The two likelihood pieces a family supplies.
pub trait SpanLikelihood {
    type Cache;

    /// `-ln λ_{d_k}(t_k)`, adding its gradient into `grad`.
    fn neg_log_intensity_at(
        &self, binding: &Binding<Self::Cache>, k: usize, grad: &mut Array1<f64>,
    ) -> ProcessResult<f64>;

    /// `Σ_n ∫_{span s} λ_n(u) du`, adding its gradient into `grad`.
    fn span_compensator(
        &self, binding: &Binding<Self::Cache>, s: usize, grad: &mut Array1<f64>,
    ) -> ProcessResult<f64>;
}

fn event_term<M: SpanLikelihood>(
    model: &M, binding: &Binding<M::Cache>, k: usize, grad: &mut Array1<f64>,
) -> ProcessResult<f64> {
    let owned = binding.history.owned_spans(k)?;
    let mut value = model.neg_log_intensity_at(binding, k, grad)?;
    for s in owned {
        value += model.span_compensator(binding, s, grad)?;
    }
    Ok(value)
}

/// Sum of all per-event terms, or the bare compensator of `(0, t_end]` for
/// an empty history.
pub fn assemble_neg_loglikelihood<M: SpanLikelihood>(
    model: &M, binding: &Binding<M::Cache>, n_params: usize,
) -> ProcessResult<NegLogLik> {
    let mut grad = Array1::zeros(n_params);
    let value = if binding.history.is_empty() {
        model.span_compensator(binding, 0, &mut grad)?
    } else {
        let mut total = 0.0;
        for k in 0..binding.history.len() {
            total += event_term(model, binding, k, &mut grad)?;
        }
        total
    };
    NegLogLik::new(value, grad)
}

/// Gradient of event `k`'s term alone.
pub fn assemble_event_gradient<M: SpanLikelihood>(
    model: &M, binding: &Binding<M::Cache>, k: usize, n_params: usize,
) -> ProcessResult<Array1<f64>> {
    let mut grad = Array1::zeros(n_params);
    let value = event_term(model, binding, k, &mut grad)?;
    Ok(NegLogLik::new(value, grad)?.gradient)
}

/// The binding, or `HistoryNotBound`.
pub fn require_binding<C>(binding: Option<&Binding<C>>) -> ProcessResult<&Binding<C>> {
    binding.ok_or(ProcessError::HistoryNotBound)
}

/// Shared preconditions for intensity-style queries.
pub fn check_eval_args(t: f64, data: &Sequence, num_dims: usize) -> ProcessResult<()> {
    validate_time(t)?;
    validate_dims(num_dims, data.num_dims())
}
