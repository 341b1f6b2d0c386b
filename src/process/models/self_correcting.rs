//! Multivariate self-correcting (stress-release) process.
//!
//! Purpose
//! -------
//! Intensity that grows exponentially with time and drops by a fixed factor
//! after every event in its own dimension:
//!
//! `λ_n(t) = exp(μ_n t - α_n N_n(t⁻))`,
//!
//! where `N_n(t⁻)` counts dimension-`n` events strictly before `t`.
//!
//! Key behaviors
//! -------------
//! - Parameter layout is `[μ_0..μ_{D-1}, α_0..α_{D-1}]` (`n = 2D`), domain
//!   `μ, α >= 0`.
//! - Compensator integrals are closed-form on every span. The scaled
//!   integrals `∫_0^1 e^{xw} dw` and `∫_0^1 w e^{xw} dw` switch to a Taylor
//!   series for small `|x|` so that `μ_n → 0` stays accurate.
//! - The upper bound uses a look-ahead `h` fixed at construction:
//!   `exp(μ_n (t + h) - α_n N_n(t⁻))`, valid for `h` time units.
//!
//! Invariants & assumptions
//! ------------------------
//! - `h` is finite and strictly positive.
//! - Counts are cached per span at bind time and never depend on parameters.
use ndarray::{Array1, Array2};

use crate::process::{
    core::{
        BoundHistory, IntensityEval, NegLogLik, ProcessParams, Sequence,
        validation::{validate_dims, validate_finite_value, validate_non_negative},
    },
    errors::{ProcessError, ProcessResult},
    models::{
        model_internals::{
            Binding, SpanLikelihood, assemble_event_gradient, assemble_neg_loglikelihood,
            check_eval_args, require_binding,
        },
        traits::PointProcess,
    },
};

/// Below this `|x|` the scaled integrals use their Taylor expansions.
const TAYLOR_CUTOFF: f64 = 1e-2;
const TAYLOR_TERMS: usize = 6;

#[derive(Debug, Clone, PartialEq)]
pub struct SelfCorrectingCache {
    /// `[s, n]`: dimension-`n` events among the first `s` events, i.e. the
    /// count in effect on the interior of span `s`.
    span_counts: Array2<f64>,
    /// Count of same-dimension events strictly before event `k`.
    prior_same: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelfCorrecting {
    params: ProcessParams,
    look_ahead: f64,
    binding: Option<Binding<SelfCorrectingCache>>,
}

impl SelfCorrecting {
    /// # Errors
    /// - `InvalidSize` if `num_dims == 0`.
    /// - `InvalidBoundWindow` unless `look_ahead` is finite and `> 0`.
    pub fn new(num_dims: usize, look_ahead: f64) -> ProcessResult<Self> {
        if !(look_ahead.is_finite() && look_ahead > 0.0) {
            return Err(ProcessError::InvalidBoundWindow { value: look_ahead });
        }
        let params = ProcessParams::new(2 * num_dims, num_dims)?;
        Ok(Self { params, look_ahead, binding: None })
    }

    fn log_intensity(&self, t: f64, counts: &[f64]) -> Array1<f64> {
        let d = self.num_dims();
        let theta = self.params.values();
        Array1::from_shape_fn(d, |n| theta[n] * t - theta[d + n] * counts[n])
    }

    fn counts_before(&self, t: f64, data: &Sequence) -> Vec<f64> {
        let mut counts = vec![0.0; self.num_dims()];
        for e in &data.events()[..data.count_before(t)] {
            counts[e.dim] += 1.0;
        }
        counts
    }

    fn build_cache(&self, history: &BoundHistory) -> SelfCorrectingCache {
        let d = self.num_dims();
        let seq = history.sequence();
        let mut span_counts = Array2::zeros((seq.len() + 1, d));
        for (s, e) in seq.events().iter().enumerate() {
            let mut next = span_counts.row(s).to_owned();
            next[e.dim] += 1.0;
            span_counts.row_mut(s + 1).assign(&next);
        }
        let prior_same = seq
            .events()
            .iter()
            .map(|e| span_counts[[seq.count_before(e.time), e.dim]])
            .collect();
        SelfCorrectingCache { span_counts, prior_same }
    }
}

/// `(∫_0^1 e^{xw} dw, ∫_0^1 w e^{xw} dw)`.
fn scaled_exp_integrals(x: f64) -> (f64, f64) {
    if x.abs() < TAYLOR_CUTOFF {
        let mut g0 = 0.0;
        let mut g1 = 0.0;
        let mut power_over_fact = 1.0;
        for k in 0..TAYLOR_TERMS {
            let kf = k as f64;
            g0 += power_over_fact / (kf + 1.0);
            g1 += power_over_fact / (kf + 2.0);
            power_over_fact *= x / (kf + 1.0);
        }
        (g0, g1)
    } else {
        let g0 = x.exp_m1() / x;
        let g1 = (x.exp() * (x - 1.0) + 1.0) / (x * x);
        (g0, g1)
    }
}

impl SpanLikelihood for SelfCorrecting {
    type Cache = SelfCorrectingCache;

    fn neg_log_intensity_at(
        &self, binding: &Binding<SelfCorrectingCache>, k: usize, grad: &mut Array1<f64>,
    ) -> ProcessResult<f64> {
        let d = self.num_dims();
        let theta = self.params.values();
        let event = binding.history.sequence().events()[k];
        let count = binding.cache.prior_same[k];

        grad[event.dim] -= event.time;
        grad[d + event.dim] += count;
        Ok(-theta[event.dim] * event.time + theta[d + event.dim] * count)
    }

    fn span_compensator(
        &self, binding: &Binding<SelfCorrectingCache>, s: usize, grad: &mut Array1<f64>,
    ) -> ProcessResult<f64> {
        let span = binding.history.spans()[s];
        let len = span.len();
        if len <= 0.0 {
            return Ok(0.0);
        }
        let d = self.num_dims();
        let theta = self.params.values();
        let counts = binding.cache.span_counts.row(s);

        let mut value = 0.0;
        for n in 0..d {
            let (mu, alpha, c) = (theta[n], theta[d + n], counts[n]);
            let (g0, g1) = scaled_exp_integrals(mu * len);
            let scale = (mu * span.start - alpha * c).exp();
            let area = scale * len * g0;
            let first_moment = scale * (span.start * len * g0 + len * len * g1);
            value += area;
            grad[n] += first_moment;
            grad[d + n] -= c * area;
        }
        validate_finite_value(value, "self-correcting compensator")?;
        Ok(value)
    }
}

impl PointProcess for SelfCorrecting {
    fn name(&self) -> &'static str {
        "self_correcting"
    }

    fn params(&self) -> &ProcessParams {
        &self.params
    }

    fn set_parameters(&mut self, values: Array1<f64>) -> ProcessResult<()> {
        self.params.check(values.view())?;
        validate_non_negative(values.view())?;
        self.params.set(values)
    }

    fn bind(&mut self, sequence: Sequence) -> ProcessResult<()> {
        validate_dims(self.num_dims(), sequence.num_dims())?;
        let history = BoundHistory::new(sequence);
        let cache = self.build_cache(&history);
        self.binding = Some(Binding { history, cache });
        Ok(())
    }

    fn history(&self) -> Option<&BoundHistory> {
        self.binding.as_ref().map(|b| &b.history)
    }

    fn neg_loglikelihood(&self) -> ProcessResult<NegLogLik> {
        let binding = require_binding(self.binding.as_ref())?;
        assemble_neg_loglikelihood(self, binding, self.num_params())
    }

    fn intensity(&self, t: f64, data: &Sequence) -> ProcessResult<IntensityEval> {
        check_eval_args(t, data, self.num_dims())?;
        let counts = self.counts_before(t, data);
        let lambda = self.log_intensity(t, &counts).mapv(f64::exp);
        IntensityEval::from_per_dim(lambda).checked("self-correcting intensity")
    }

    fn intensity_upper_bound(&self, t: f64, data: &Sequence) -> ProcessResult<IntensityEval> {
        check_eval_args(t, data, self.num_dims())?;
        let counts = self.counts_before(t, data);
        let bound = self.log_intensity(t + self.look_ahead, &counts).mapv(f64::exp);
        IntensityEval::from_per_dim(bound).checked("self-correcting intensity bound")
    }

    fn gradient(&self, k: usize) -> ProcessResult<Array1<f64>> {
        let binding = require_binding(self.binding.as_ref())?;
        assemble_event_gradient(self, binding, k, self.num_params())
    }

    fn upper_bound_window(&self) -> f64 {
        self.look_ahead
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::models::property_checks;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - A hand-computed likelihood and gradient at μ = 0 (Taylor branch).
    // - Continuity of the scaled integrals across the Taylor cutoff.
    // - Look-ahead validation and the bound window.
    // - The shared contract properties (see `models::property_checks`).
    // -------------------------------------------------------------------------

    fn bound_model() -> SelfCorrecting {
        let mut model = SelfCorrecting::new(2, 0.5).unwrap();
        model.set_parameters(array![0.8, 0.3, 0.6, 0.4]).unwrap();
        let seq =
            Sequence::from_parts(&[0.4, 1.1, 1.1, 2.5, 3.0], &[0, 1, 0, 0, 1], 2, 4.0).unwrap();
        model.bind(seq).unwrap();
        model
    }

    #[test]
    // Purpose
    // -------
    // Verify value and gradient against a hand computation.
    //
    // Given
    // -----
    // - D = 1, μ = 0, α = ln 2, events at 1 and 2, T = 4, so λ is 1, 1/2,
    //   1/4 on the three spans.
    //
    // Expect
    // ------
    // - NLL = 2 + ln 2.
    // - ∂/∂μ = (0.5 + 0.75 + 1.5) - 3 = -0.25.
    // - ∂/∂α = -(0.5 + 1.0) + 1 = -0.5.
    fn likelihood_matches_hand_computation() {
        let mut model = SelfCorrecting::new(1, 1.0).unwrap();
        model.set_parameters(array![0.0, 2.0_f64.ln()]).unwrap();
        model.bind(Sequence::from_parts(&[1.0, 2.0], &[0, 0], 1, 4.0).unwrap()).unwrap();

        let nll = model.neg_loglikelihood().unwrap();

        assert_relative_eq!(nll.value, 2.0 + 2.0_f64.ln(), epsilon = 1e-12);
        assert_relative_eq!(nll.gradient[0], -0.25, epsilon = 1e-12);
        assert_relative_eq!(nll.gradient[1], -0.5, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // The Taylor and closed-form branches agree at the cutoff.
    //
    // Given
    // -----
    // - x just below and just above `TAYLOR_CUTOFF`, positive and negative.
    //
    // Expect
    // ------
    // - Both integrals agree to 1e-10.
    fn scaled_integrals_are_continuous_at_cutoff() {
        for sign in [1.0, -1.0] {
            let below = scaled_exp_integrals(sign * (TAYLOR_CUTOFF - 1e-12));
            let above = scaled_exp_integrals(sign * (TAYLOR_CUTOFF + 1e-12));

            assert_relative_eq!(below.0, above.0, epsilon = 1e-10);
            assert_relative_eq!(below.1, above.1, epsilon = 1e-10);
        }
    }

    #[test]
    // Purpose
    // -------
    // Look-ahead is validated and exposed as the bound window.
    //
    // Given
    // -----
    // - Look-ahead values 0, NaN, and 0.5.
    //
    // Expect
    // ------
    // - `InvalidBoundWindow` for the first two; window 0.5 for the last.
    fn look_ahead_sets_bound_window() {
        assert!(matches!(
            SelfCorrecting::new(1, 0.0),
            Err(ProcessError::InvalidBoundWindow { .. })
        ));
        assert!(matches!(
            SelfCorrecting::new(1, f64::NAN),
            Err(ProcessError::InvalidBoundWindow { .. })
        ));
        assert_eq!(SelfCorrecting::new(1, 0.5).unwrap().upper_bound_window(), 0.5);
    }

    #[test]
    // Purpose
    // -------
    // The shared contract properties hold.
    //
    // Given
    // -----
    // - The bound two-dimensional model (with a tie at 1.1) and a grid
    //   including μ = 0.
    //
    // Expect
    // ------
    // - Every check in `property_checks` passes.
    fn satisfies_contract_properties() {
        let mut model = bound_model();
        let grid =
            vec![array![0.8, 0.3, 0.6, 0.4], array![0.0, 1e-3, 1.2, 0.0], array![1.5, 0.9, 0.05, 2.0]];

        property_checks::fresh_instance(&SelfCorrecting::new(3, 1.0).unwrap(), 6, 3);
        property_checks::set_get_round_trip(&mut model, array![0.1, 0.2, 0.3, 0.4]);
        property_checks::bound_dominates(&mut model, &grid);
        property_checks::causal_and_deterministic(&model);
        property_checks::event_gradients_sum_to_fd(&mut model, &grid);
        property_checks::out_of_range_index_fails(&model);
    }
}
