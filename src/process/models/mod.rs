//! models — concrete point-process families behind the `PointProcess` trait.
//!
//! Purpose
//! -------
//! Provide the capability trait and three parametric families that implement
//! it: a homogeneous Poisson baseline, an exponential-kernel Hawkes process,
//! and a self-correcting process. Each family is a thin layer of model math
//! on top of `process::core` and the shared assembly in
//! [`model_internals`].
//!
//! Key behaviors
//! -------------
//! - [`PointProcess`] is object safe; consumers take `&dyn PointProcess` or a
//!   generic `P: PointProcess + ?Sized`.
//! - Families implement [`model_internals::SpanLikelihood`] and delegate
//!   likelihood and per-event gradient assembly to it.
//!
//! Downstream usage
//! ----------------
//! - Construct a family, `set_parameters`, `bind` a `Sequence`, then evaluate.
//! - `process::fitting`, `process::simulation`, and `process::diagnostics`
//!   only use the trait.
//!
//! Testing notes
//! -------------
//! - Every family runs the generic checks in `property_checks` in addition to
//!   its own closed-form tests.

pub mod hawkes;
pub mod model_internals;
pub mod poisson;
pub mod self_correcting;
pub mod traits;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::hawkes::ExpHawkes;
pub use self::poisson::HomogeneousPoisson;
pub use self::self_correcting::SelfCorrecting;
pub use self::traits::PointProcess;

pub mod prelude {
    pub use super::hawkes::ExpHawkes;
    pub use super::poisson::HomogeneousPoisson;
    pub use super::self_correcting::SelfCorrecting;
    pub use super::traits::PointProcess;
}

/// Family-agnostic contract checks shared by the per-family test modules.
#[cfg(test)]
pub(crate) mod property_checks {
    use approx::assert_relative_eq;
    use ndarray::Array1;

    use crate::process::{
        core::{Event, IntensityEval, Sequence, validation::first_bound_violation},
        errors::ProcessError,
        models::traits::PointProcess,
    };

    fn bound_sequence<P: PointProcess>(model: &P) -> Sequence {
        model.history().expect("model must be bound").sequence().clone()
    }

    /// Events of `seq` with `time <= t`, on the same window.
    fn prefix(seq: &Sequence, t: f64) -> Sequence {
        let events = seq.events()[..seq.count_at_or_before(t)].to_vec();
        Sequence::new(events, seq.num_dims(), seq.t_end()).unwrap()
    }

    /// Evaluation times: 0, every event time, midpoints, and `t_end`.
    fn time_grid(seq: &Sequence) -> Vec<f64> {
        let mut grid = vec![0.0];
        let mut prev = 0.0;
        for e in seq.events() {
            grid.push(0.5 * (prev + e.time));
            grid.push(e.time);
            prev = e.time;
        }
        grid.push(0.5 * (prev + seq.t_end()));
        grid.push(seq.t_end());
        grid
    }

    fn assert_total_is_sum(eval: &IntensityEval) {
        assert_relative_eq!(eval.total, eval.per_dim.sum(), epsilon = 1e-12);
    }

    pub fn fresh_instance<P: PointProcess>(model: &P, n: usize, num_dims: usize) {
        assert_eq!(model.num_params(), n);
        assert_eq!(model.num_dims(), num_dims);
        assert!(model.parameters().iter().all(|&v| v == 0.0));
        assert!(!model.is_bound());
    }

    pub fn set_get_round_trip<P: PointProcess>(model: &mut P, values: Array1<f64>) {
        let original = model.parameters().to_owned();

        model.set_parameters(values.clone()).unwrap();
        assert_eq!(model.parameters(), values.view());

        let mut wrong = values.to_vec();
        wrong.push(1.0);
        assert!(matches!(
            model.set_parameters(Array1::from(wrong)),
            Err(ProcessError::ParameterLengthMismatch { .. })
        ));
        assert_eq!(model.parameters(), values.view());

        model.set_parameters(original).unwrap();
    }

    /// Upper bound at `t` dominates the intensity on `[t, t + window]` for
    /// the history up to `t` and for an empty history.
    pub fn bound_dominates<P: PointProcess>(model: &mut P, grid: &[Array1<f64>]) {
        let original = model.parameters().to_owned();
        let seq = bound_sequence(model);
        let empty = Sequence::empty(seq.num_dims(), seq.t_end()).unwrap();
        let reach = model.upper_bound_window().min(1.0);

        for theta in grid {
            model.set_parameters(theta.clone()).unwrap();
            for t in time_grid(&seq) {
                for data in [prefix(&seq, t), empty.clone()] {
                    let bound = model.intensity_upper_bound(t, &data).unwrap();
                    assert_total_is_sum(&bound);
                    for frac in [0.0, 1e-9, 0.25, 0.5, 1.0] {
                        let lambda = model.intensity(t + frac * reach, &data).unwrap();
                        assert_total_is_sum(&lambda);
                        assert_eq!(
                            first_bound_violation(&lambda, &bound),
                            None,
                            "θ = {theta}, t = {t}, offset = {}",
                            frac * reach
                        );
                        assert!(lambda.total <= bound.total * (1.0 + 1e-10) + 1e-10);
                    }
                }
            }
        }
        model.set_parameters(original).unwrap();
    }

    /// `intensity(t, ·)` is repeatable and ignores events at or after `t`.
    pub fn causal_and_deterministic<P: PointProcess>(model: &P) {
        let seq = bound_sequence(model);
        let t_end = seq.t_end() + 1.0;
        for t in time_grid(&seq) {
            let mut base: Vec<Event> = seq.events()[..seq.count_before(t)].to_vec();
            let before = Sequence::new(base.clone(), seq.num_dims(), t_end).unwrap();
            base.push(Event::new(t + 0.5, seq.num_dims() - 1));
            let extended = Sequence::new(base, seq.num_dims(), t_end).unwrap();

            let first = model.intensity(t, &before).unwrap();
            assert_eq!(model.intensity(t, &before).unwrap(), first);
            assert_eq!(model.intensity(t, &extended).unwrap(), first);
            assert_eq!(model.intensity(t, &seq).unwrap(), first);
        }
    }

    /// `Σ_k gradient(k)` equals the analytic gradient and a finite-difference
    /// gradient of the likelihood value.
    pub fn event_gradients_sum_to_fd<P: PointProcess>(model: &mut P, grid: &[Array1<f64>]) {
        let original = model.parameters().to_owned();
        let len = model.history().expect("model must be bound").len();

        for theta in grid {
            model.set_parameters(theta.clone()).unwrap();
            let nll = model.neg_loglikelihood().unwrap();

            let mut summed = Array1::<f64>::zeros(model.num_params());
            for k in 0..len {
                summed += &model.gradient(k).unwrap();
            }

            for i in 0..model.num_params() {
                let h = 1e-6 * theta[i].abs().max(1.0);
                let value_at = |model: &mut P, x: f64| {
                    let mut shifted = theta.clone();
                    shifted[i] = x;
                    model.set_parameters(shifted).unwrap();
                    model.neg_loglikelihood().unwrap().value
                };
                let fd = if theta[i] >= h {
                    (value_at(model, theta[i] + h) - value_at(model, theta[i] - h)) / (2.0 * h)
                } else {
                    (value_at(model, theta[i] + h) - nll.value) / h
                };

                assert_relative_eq!(summed[i], nll.gradient[i], epsilon = 1e-9, max_relative = 1e-9);
                assert_relative_eq!(nll.gradient[i], fd, epsilon = 1e-4, max_relative = 1e-4);
            }
        }
        model.set_parameters(original).unwrap();
    }

    pub fn out_of_range_index_fails<P: PointProcess>(model: &P) {
        let len = model.history().expect("model must be bound").len();
        assert_eq!(model.gradient(len), Err(ProcessError::EventIndexOutOfRange { index: len, len }));
    }
}
