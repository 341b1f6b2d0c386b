//! Multivariate Hawkes process with exponential kernels and fixed decays.
//!
//! Purpose
//! -------
//! Self-exciting counting process where every event in source dimension `m`
//! raises the intensity of target dimension `n` by `α_{m,n}` and the effect
//! decays at rate `β_{m,n}`:
//!
//! `λ_n(t) = μ_n + Σ_m α_{m,n} Σ_{t_j < t, d_j = m} exp(-β_{m,n} (t - t_j))`.
//!
//! Key behaviors
//! -------------
//! - Parameter layout is `[μ_0..μ_{D-1}, α_{0,0}, α_{0,1}, …, α_{D-1,D-1}]`
//!   (`n = D + D²`, α row-major by source). Decays are fixed at construction.
//! - `bind` runs one `O(N·D²)` recursion that caches, for every event, the
//!   decayed excitation sum from each source, and, for every span, the
//!   integrated excitation. Likelihood and per-event gradients are then
//!   closed-form and linear in the number of events.
//! - The upper bound at `t` is the right-limit intensity (events at exactly
//!   `t` included). With non-negative α it dominates the intensity until the
//!   next event, so the bound window is infinite.
//!
//! Invariants & assumptions
//! ------------------------
//! - `β` is `D × D`, finite, and strictly positive.
//! - Parameter domain is `μ, α >= 0`; `set_parameters` enforces it.
//! - Events tied at the same time do not excite each other: only events with
//!   `t_j < t` contribute to `λ(t)`.
//!
//! Conventions
//! -----------
//! - Sources index rows and targets index columns of both `α` and `β`.
use ndarray::{Array1, Array2, Array3, ArrayView1, Axis, s};

use crate::process::{
    core::{
        BoundHistory, IntensityEval, NegLogLik, ProcessParams, Sequence,
        validation::{validate_dims, validate_event_intensity, validate_non_negative},
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

/// History-derived quantities that do not depend on `μ` or `α`.
#[derive(Debug, Clone, PartialEq)]
pub struct HawkesCache {
    /// `[k, m]`: `Σ_{t_j < t_k, d_j = m} exp(-β_{m,d_k}(t_k - t_j))`.
    excitation: Array2<f64>,
    /// `[s, m, n]`: `∫_{span s} Σ_{t_j < u, d_j = m} exp(-β_{m,n}(u - t_j)) du`.
    span_excitation: Array3<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpHawkes {
    params: ProcessParams,
    decays: Array2<f64>,
    binding: Option<Binding<HawkesCache>>,
}

impl ExpHawkes {
    /// A Hawkes process whose dimensionality is the size of `decays`.
    ///
    /// # Errors
    /// - `InvalidSize` for an empty matrix.
    /// - `DimensionMismatch` if `decays` is not square.
    /// - `InvalidDecay` for the first non-finite or non-positive rate.
    pub fn new(decays: Array2<f64>) -> ProcessResult<Self> {
        let num_dims = decays.nrows();
        if decays.ncols() != num_dims {
            return Err(ProcessError::DimensionMismatch {
                expected: num_dims,
                actual: decays.ncols(),
            });
        }
        for ((row, col), &value) in decays.indexed_iter() {
            if !(value.is_finite() && value > 0.0) {
                return Err(ProcessError::InvalidDecay { row, col, value });
            }
        }
        let params = ProcessParams::new(num_dims + num_dims * num_dims, num_dims)?;
        Ok(Self { params, decays, binding: None })
    }

    /// Every kernel decays at the same rate `beta`.
    pub fn with_uniform_decay(num_dims: usize, beta: f64) -> ProcessResult<Self> {
        Self::new(Array2::from_elem((num_dims, num_dims), beta))
    }

    pub fn decays(&self) -> &Array2<f64> {
        &self.decays
    }

    pub fn baseline(&self) -> ArrayView1<'_, f64> {
        let d = self.num_dims();
        self.params.values().slice_move(s![..d])
    }

    /// Excitation matrix `α` (sources × targets).
    pub fn excitation(&self) -> Array2<f64> {
        let theta = self.params.values();
        Array2::from_shape_fn((self.num_dims(), self.num_dims()), |(m, n)| {
            theta[self.alpha_index(m, n)]
        })
    }

    fn alpha_index(&self, source: usize, target: usize) -> usize {
        let d = self.num_dims();
        d + source * d + target
    }

    /// Per-dimension intensity from the first `count` events of `data`.
    fn intensity_from(&self, t: f64, data: &Sequence, count: usize) -> Array1<f64> {
        let d = self.num_dims();
        let theta = self.params.values();
        let mut lambda = self.baseline().to_owned();
        for event in &data.events()[..count] {
            let m = event.dim;
            let dt = t - event.time;
            for n in 0..d {
                let alpha = theta[self.alpha_index(m, n)];
                if alpha != 0.0 {
                    lambda[n] += alpha * (-self.decays[[m, n]] * dt).exp();
                }
            }
        }
        lambda
    }

    /// One pass over the history building [`HawkesCache`].
    ///
    /// `state[m, n]` holds the decayed excitation at `last_t` from source-`m`
    /// events strictly before `last_t`; `tied[m]` counts source-`m` events at
    /// exactly `last_t`. Keeping them apart lets tied events stay out of each
    /// other's intensity without any subtraction.
    fn build_cache(&self, history: &BoundHistory) -> HawkesCache {
        let d = self.num_dims();
        let events = history.sequence().events();
        let spans = history.spans();
        let mut excitation = Array2::zeros((events.len(), d));
        let mut span_excitation = Array3::zeros((spans.len(), d, d));
        let mut state = Array2::<f64>::zeros((d, d));
        let mut tied = vec![0.0_f64; d];

        for (s, span) in spans.iter().enumerate() {
            let dt = span.len();
            if dt > 0.0 {
                for m in 0..d {
                    for n in 0..d {
                        let beta = self.decays[[m, n]];
                        let at_start = state[[m, n]] + tied[m];
                        span_excitation[[s, m, n]] = at_start * -(-beta * dt).exp_m1() / beta;
                        state[[m, n]] = at_start * (-beta * dt).exp();
                    }
                }
                tied.iter_mut().for_each(|c| *c = 0.0);
            }
            if let Some(event) = events.get(s) {
                excitation.row_mut(s).assign(&state.column(event.dim));
                tied[event.dim] += 1.0;
            }
        }
        HawkesCache { excitation, span_excitation }
    }
}

impl SpanLikelihood for ExpHawkes {
    type Cache = HawkesCache;

    fn neg_log_intensity_at(
        &self, binding: &Binding<HawkesCache>, k: usize, grad: &mut Array1<f64>,
    ) -> ProcessResult<f64> {
        let d = self.num_dims();
        let theta = self.params.values();
        let target = binding.history.sequence().events()[k].dim;
        let exc = binding.cache.excitation.row(k);

        let mut lambda = theta[target];
        for m in 0..d {
            lambda += theta[self.alpha_index(m, target)] * exc[m];
        }
        validate_event_intensity(k, lambda)?;

        grad[target] -= 1.0 / lambda;
        for m in 0..d {
            grad[self.alpha_index(m, target)] -= exc[m] / lambda;
        }
        Ok(-lambda.ln())
    }

    fn span_compensator(
        &self, binding: &Binding<HawkesCache>, s: usize, grad: &mut Array1<f64>,
    ) -> ProcessResult<f64> {
        let d = self.num_dims();
        let theta = self.params.values();
        let len = binding.history.spans()[s].len();
        let integrated = binding.cache.span_excitation.index_axis(Axis(0), s);

        let mut value = 0.0;
        for n in 0..d {
            value += theta[n] * len;
            grad[n] += len;
        }
        for ((m, n), &area) in integrated.indexed_iter() {
            let idx = self.alpha_index(m, n);
            value += theta[idx] * area;
            grad[idx] += area;
        }
        Ok(value)
    }
}

impl PointProcess for ExpHawkes {
    fn name(&self) -> &'static str {
        "exp_hawkes"
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
        let lambda = self.intensity_from(t, data, data.count_before(t));
        IntensityEval::from_per_dim(lambda).checked("hawkes intensity")
    }

    fn intensity_upper_bound(&self, t: f64, data: &Sequence) -> ProcessResult<IntensityEval> {
        check_eval_args(t, data, self.num_dims())?;
        let lambda = self.intensity_from(t, data, data.count_at_or_before(t));
        IntensityEval::from_per_dim(lambda).checked("hawkes intensity bound")
    }

    fn gradient(&self, k: usize) -> ProcessResult<Array1<f64>> {
        let binding = require_binding(self.binding.as_ref())?;
        assemble_event_gradient(self, binding, k, self.num_params())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{core::Event, models::property_checks};
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Baseline-only intensity on an empty history.
    // - Agreement of the cached recursion with a direct O(N²) likelihood.
    // - Tie handling and construction checks.
    // - The shared contract properties (see `models::property_checks`).
    // -------------------------------------------------------------------------

    fn two_dim_model() -> ExpHawkes {
        let mut model = ExpHawkes::new(array![[1.5, 0.7], [2.0, 1.0]]).unwrap();
        model.set_parameters(array![0.4, 0.2, 0.3, 0.1, 0.25, 0.5]).unwrap();
        let seq = Sequence::from_parts(
            &[0.3, 0.8, 0.8, 1.7, 2.2, 3.9],
            &[0, 1, 0, 0, 1, 1],
            2,
            5.0,
        )
        .unwrap();
        model.bind(seq).unwrap();
        model
    }

    /// Direct evaluation: `Σ_n ∫_0^T λ_n - Σ_k ln λ_{d_k}(t_k)`.
    fn brute_force_nll(model: &ExpHawkes) -> f64 {
        let history = model.history().unwrap();
        let seq = history.sequence();
        let t_end = seq.t_end();
        let alpha = model.excitation();
        let mu = model.baseline().to_owned();
        let beta = model.decays();

        let mut compensator = mu.sum() * t_end;
        for e in seq.events() {
            for n in 0..model.num_dims() {
                let b = beta[[e.dim, n]];
                compensator += alpha[[e.dim, n]] * (1.0 - (-b * (t_end - e.time)).exp()) / b;
            }
        }
        let log_terms: f64 = seq
            .events()
            .iter()
            .map(|e| model.intensity(e.time, seq).unwrap().per_dim[e.dim].ln())
            .sum();
        compensator - log_terms
    }

    #[test]
    // Purpose
    // -------
    // With an empty history the intensity is the baseline.
    //
    // Given
    // -----
    // - D = 1, parameters [μ, α] = [0.5, 0.5], `intensity(1.0, empty)`.
    //
    // Expect
    // ------
    // - total = 0.5 and per_dim = [0.5].
    fn empty_history_intensity_is_baseline() {
        let mut model = ExpHawkes::with_uniform_decay(1, 1.0).unwrap();
        model.set_parameters(array![0.5, 0.5]).unwrap();
        let empty = Sequence::empty(1, 2.0).unwrap();

        let eval = model.intensity(1.0, &empty).unwrap();

        assert_eq!(model.num_params(), 2);
        assert_relative_eq!(eval.total, 0.5);
        assert_eq!(eval.per_dim, array![0.5]);
    }

    #[test]
    // Purpose
    // -------
    // The cached recursion reproduces a direct evaluation of the likelihood.
    //
    // Given
    // -----
    // - A two-dimensional history with a tie at t = 0.8.
    //
    // Expect
    // ------
    // - Relative agreement to 1e-10.
    fn cached_likelihood_matches_direct_evaluation() {
        let model = two_dim_model();

        let nll = model.neg_loglikelihood().unwrap();

        assert_relative_eq!(nll.value, brute_force_nll(&model), max_relative = 1e-10);
    }

    #[test]
    // Purpose
    // -------
    // Tied events do not excite each other, but the bound includes them.
    //
    // Given
    // -----
    // - D = 1, μ = 0.1, α = 1, β = 1, two events at t = 1.
    //
    // Expect
    // ------
    // - intensity(1.0) = 0.1; bound(1.0) = 2.1.
    // - intensity just after 1.0 is close to 2.1.
    fn ties_are_excluded_from_intensity_but_not_bound() {
        let mut model = ExpHawkes::with_uniform_decay(1, 1.0).unwrap();
        model.set_parameters(array![0.1, 1.0]).unwrap();
        let seq = Sequence::new(vec![Event::new(1.0, 0), Event::new(1.0, 0)], 1, 2.0).unwrap();

        let at = model.intensity(1.0, &seq).unwrap();
        let bound = model.intensity_upper_bound(1.0, &seq).unwrap();
        let after = model.intensity(1.0 + 1e-9, &seq).unwrap();

        assert_relative_eq!(at.total, 0.1);
        assert_relative_eq!(bound.total, 2.1);
        assert_relative_eq!(after.total, 2.1, epsilon = 1e-6);
    }

    #[test]
    // Purpose
    // -------
    // Construction rejects malformed decay matrices.
    //
    // Given
    // -----
    // - A non-square matrix, a zero rate, and an empty matrix.
    //
    // Expect
    // ------
    // - `DimensionMismatch`, `InvalidDecay { row: 1, col: 0, .. }`, `InvalidSize`.
    fn construction_validates_decays() {
        assert!(matches!(
            ExpHawkes::new(Array2::ones((2, 3))),
            Err(ProcessError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            ExpHawkes::new(array![[1.0, 1.0], [0.0, 1.0]]),
            Err(ProcessError::InvalidDecay { row: 1, col: 0, .. })
        ));
        assert!(matches!(ExpHawkes::new(Array2::ones((0, 0))), Err(ProcessError::InvalidSize { .. })));
    }

    #[test]
    // Purpose
    // -------
    // The shared contract properties hold.
    //
    // Given
    // -----
    // - The bound two-dimensional model and a grid including zero excitation.
    //
    // Expect
    // ------
    // - Every check in `property_checks` passes.
    fn satisfies_contract_properties() {
        let mut model = two_dim_model();
        let grid = vec![
            array![0.4, 0.2, 0.3, 0.1, 0.25, 0.5],
            array![1.0, 0.5, 0.0, 0.0, 0.0, 0.0],
            array![0.05, 0.9, 2.0, 1.5, 0.8, 0.3],
        ];

        property_checks::fresh_instance(&ExpHawkes::with_uniform_decay(3, 2.0).unwrap(), 12, 3);
        property_checks::set_get_round_trip(&mut model, array![0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);
        property_checks::bound_dominates(&mut model, &grid);
        property_checks::causal_and_deterministic(&model);
        property_checks::event_gradients_sum_to_fd(&mut model, &grid);
        property_checks::out_of_range_index_fails(&model);
    }
}
