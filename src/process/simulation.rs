//! Event simulation by Ogata thinning.
//!
//! Purpose
//! -------
//! Draw a realization of any [`PointProcess`] on `[0, horizon]` using only
//! its `intensity` and `intensity_upper_bound` capabilities.
//!
//! Key behaviors
//! -------------
//! - Candidates arrive at rate `UB_total(t)`; a candidate at `τ` is accepted
//!   with probability `λ_total(τ) / UB_total(t)` and assigned a dimension in
//!   proportion to `λ_n(τ)`.
//! - A candidate beyond `t + upper_bound_window()` is discarded and the bound
//!   is re-evaluated at the end of the window.
//! - A candidate where the intensity exceeds the bound in some dimension
//!   aborts with `UpperBoundViolated`; the bound contract is checked here
//!   instead of in every evaluation.
//! - Gaps are `rand_distr::Exp` draws and the accepted dimension is a
//!   `WeightedIndex` draw over `λ_n(τ)`, all from one seeded `StdRng`, so a
//!   fixed seed reproduces the same sequence.
//! - When `max_events` stops the run, the window closes at the last accepted
//!   event: nothing after it was simulated.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every returned event lies in `[0, t_end]` and the sequence has the
//!   model's dimensionality. `t_end == horizon` unless the event cap was
//!   reached first.
//! - The model's parameters are not modified.
use rand::{Rng, SeedableRng, distr::weighted::WeightedIndex, rngs::StdRng};
use rand_distr::{Distribution, Exp};

use crate::process::{
    core::{Event, Sequence, validation::first_bound_violation},
    errors::{ProcessError, ProcessResult},
    models::PointProcess,
};

/// Options for [`simulate`].
///
/// - `horizon`: end of the simulation window (finite, `> 0`).
/// - `seed`: RNG seed; `None` seeds from the operating system.
/// - `max_events`: stop after this many accepted events; the returned
///   window then ends at the last of them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimOpts {
    pub horizon: f64,
    pub seed: Option<u64>,
    pub max_events: Option<usize>,
}

impl SimOpts {
    /// # Errors
    /// - `InvalidHorizon` unless `horizon` is finite and `> 0`.
    /// - `InvalidSimOption` for `max_events == Some(0)`.
    pub fn new(horizon: f64, seed: Option<u64>, max_events: Option<usize>) -> ProcessResult<Self> {
        if !(horizon.is_finite() && horizon > 0.0) {
            return Err(ProcessError::InvalidHorizon { value: horizon });
        }
        if max_events == Some(0) {
            return Err(ProcessError::InvalidSimOption {
                reason: "max_events must be greater than zero.",
            });
        }
        Ok(Self { horizon, seed, max_events })
    }
}

impl Default for SimOpts {
    fn default() -> Self {
        Self { horizon: 100.0, seed: None, max_events: None }
    }
}

/// Simulate one realization of `model` on `[0, opts.horizon]`.
///
/// # Errors
/// - `UpperBoundViolated` when the model's bound fails to dominate its
///   intensity at a candidate time.
/// - `SamplingFailed` when a bound or intensity is not a usable rate
///   (e.g. NaN).
/// - Any evaluation error from the model.
pub fn simulate<P: PointProcess + ?Sized>(model: &P, opts: &SimOpts) -> ProcessResult<Sequence> {
    let mut rng = match opts.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let window = model.upper_bound_window();
    let mut seq = Sequence::empty(model.num_dims(), opts.horizon)?;
    let mut t = 0.0;

    while t < opts.horizon {
        if opts.max_events.is_some_and(|cap| seq.len() >= cap) {
            seq.close_window(t)?;
            break;
        }
        let bound = model.intensity_upper_bound(t, &seq)?;
        if bound.total <= 0.0 {
            if window.is_finite() {
                t += window;
                continue;
            }
            break;
        }

        let gap = Exp::new(bound.total)
            .map_err(|err| ProcessError::SamplingFailed { time: t, reason: err.to_string() })?;
        let candidate = t + gap.sample(&mut rng);
        if candidate > t + window {
            t += window;
            continue;
        }
        if candidate >= opts.horizon {
            break;
        }

        let lambda = model.intensity(candidate, &seq)?;
        if let Some(dim) = first_bound_violation(&lambda, &bound) {
            return Err(ProcessError::UpperBoundViolated {
                time: candidate,
                dim,
                intensity: lambda.per_dim[dim],
                bound: bound.per_dim[dim],
            });
        }

        let v: f64 = rng.random();
        if v * bound.total < lambda.total {
            let dim = WeightedIndex::<f64>::new(lambda.per_dim.iter())
                .map_err(|err| ProcessError::SamplingFailed {
                    time: candidate,
                    reason: err.to_string(),
                })?
                .sample(&mut rng);
            seq.push(Event::new(candidate, dim))?;
        }
        t = candidate;
    }
    Ok(seq)
}
