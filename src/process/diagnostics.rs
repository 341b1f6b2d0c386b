//! Goodness-of-fit diagnostics by time rescaling.
//!
//! Purpose
//! -------
//! Turn an observed history into residuals that are i.i.d. Exp(1) under a
//! correctly specified model, and test them with a one-sample
//! Kolmogorov–Smirnov statistic.
//!
//! Key behaviors
//! -------------
//! - [`time_rescaling`] integrates each dimension's intensity over the
//!   inter-event segments of the whole history with composite 5-point
//!   Gauss–Legendre quadrature, then reports, for every event of dimension
//!   `n`, the compensator increment of `n` since the previous event of `n`
//!   (or since 0 for the first one).
//! - Quadrature nodes are interior to each segment, so the jump of the
//!   intensity at an event time is never sampled.
//! - [`ks_exp1`] compares residuals against the Exp(1) CDF from `statrs` and
//!   returns the statistic with its asymptotic p-value.
//!
//! Invariants & assumptions
//! ------------------------
//! - Only `intensity` is used, so any [`PointProcess`] can be checked and the
//!   model need not be bound to `data`.
//! - Residual order within a dimension follows event order.
use statrs::distribution::{ContinuousCDF, Exp};

use crate::process::{
    core::{Sequence, validation::validate_finite_value},
    errors::{ProcessError, ProcessResult},
    models::PointProcess,
};

/// Gauss–Legendre nodes and weights on `[-1, 1]`.
const GL5_NODES: [f64; 5] =
    [-0.906_179_845_938_664, -0.538_469_310_105_683_1, 0.0, 0.538_469_310_105_683_1, 0.906_179_845_938_664];
const GL5_WEIGHTS: [f64; 5] = [
    0.236_926_885_056_189_1,
    0.478_628_670_499_366_5,
    0.568_888_888_888_888_9,
    0.478_628_670_499_366_5,
    0.236_926_885_056_189_1,
];

/// Terms of the Kolmogorov series before it is considered non-convergent.
const KS_SERIES_TERMS: usize = 100;

/// Quadrature options for [`time_rescaling`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RescalingOpts {
    pub panels: usize,
}

impl RescalingOpts {
    /// # Errors
    /// `InvalidQuadrature` for `panels == 0`.
    pub fn new(panels: usize) -> ProcessResult<Self> {
        if panels == 0 {
            return Err(ProcessError::InvalidQuadrature { panels });
        }
        Ok(Self { panels })
    }
}

impl Default for RescalingOpts {
    fn default() -> Self {
        Self { panels: 4 }
    }
}

/// Rescaled inter-event times, grouped by dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct RescaledTimes {
    pub per_dim: Vec<Vec<f64>>,
}

impl RescaledTimes {
    /// All residuals, dimension by dimension.
    pub fn pooled(&self) -> Vec<f64> {
        self.per_dim.iter().flatten().copied().collect()
    }
}

/// Kolmogorov–Smirnov test against Exp(1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KsOutcome {
    pub statistic: f64,
    pub p_value: f64,
    pub n: usize,
}

/// Per-dimension compensator integrals of `model` over `(a, b)`.
fn segment_compensator<P: PointProcess + ?Sized>(
    model: &P, data: &Sequence, a: f64, b: f64, opts: &RescalingOpts, out: &mut [f64],
) -> ProcessResult<()> {
    if b <= a {
        return Ok(());
    }
    let width = (b - a) / opts.panels as f64;
    for p in 0..opts.panels {
        let lo = a + p as f64 * width;
        let half = 0.5 * width;
        let mid = lo + half;
        for (x, w) in GL5_NODES.iter().zip(GL5_WEIGHTS.iter()) {
            let lambda = model.intensity(mid + half * x, data)?;
            for (acc, rate) in out.iter_mut().zip(lambda.per_dim.iter()) {
                *acc += w * half * rate;
            }
        }
    }
    Ok(())
}

/// Rescale the events of `data` through the compensator of `model`.
///
/// Errors
/// ------
/// - `DimensionMismatch` if `data` and `model` disagree on dimensionality.
/// - `NonFiniteValue` if a compensator increment overflows.
/// - Any intensity evaluation error.
pub fn time_rescaling<P: PointProcess + ?Sized>(
    model: &P, data: &Sequence, opts: &RescalingOpts,
) -> ProcessResult<RescaledTimes> {
    let d = model.num_dims();
    if data.num_dims() != d {
        return Err(ProcessError::DimensionMismatch { expected: d, actual: data.num_dims() });
    }
    let mut cumulative = vec![0.0; d];
    let mut last_seen = vec![0.0; d];
    let mut per_dim = vec![Vec::new(); d];
    let mut prev = 0.0;

    for event in data.events() {
        segment_compensator(model, data, prev, event.time, opts, &mut cumulative)?;
        let residual = cumulative[event.dim] - last_seen[event.dim];
        validate_finite_value(residual, "rescaled inter-event time")?;
        per_dim[event.dim].push(residual);
        last_seen[event.dim] = cumulative[event.dim];
        prev = event.time;
    }
    Ok(RescaledTimes { per_dim })
}

/// One-sample KS test of `samples` against Exp(1).
///
/// The p-value uses the asymptotic Kolmogorov distribution with the
/// `√n + 0.12 + 0.11/√n` small-sample correction.
///
/// # Errors
/// - `EmptyResiduals` for an empty slice.
/// - `NonFiniteValue` for a NaN/±inf sample.
pub fn ks_exp1(samples: &[f64]) -> ProcessResult<KsOutcome> {
    if samples.is_empty() {
        return Err(ProcessError::EmptyResiduals);
    }
    for &x in samples {
        validate_finite_value(x, "KS sample")?;
    }
    let unit = Exp::new(1.0)?;
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len();
    let nf = n as f64;
    let statistic = sorted.iter().enumerate().fold(0.0_f64, |acc, (i, &x)| {
        let cdf = unit.cdf(x);
        let above = (i + 1) as f64 / nf - cdf;
        let below = cdf - i as f64 / nf;
        acc.max(above).max(below)
    });

    let root_n = nf.sqrt();
    let p_value = kolmogorov_survival((root_n + 0.12 + 0.11 / root_n) * statistic);
    Ok(KsOutcome { statistic, p_value, n })
}

/// `Q(λ) = 2 Σ_{j≥1} (-1)^{j-1} exp(-2 j² λ²)`, clamped to `[0, 1]`.
fn kolmogorov_survival(lambda: f64) -> f64 {
    let a = -2.0 * lambda * lambda;
    let mut sign = 2.0;
    let mut sum = 0.0;
    for j in 1..=KS_SERIES_TERMS {
        let jf = j as f64;
        let term = sign * (a * jf * jf).exp();
        sum += term;
        if term.abs() <= 1e-12 * sum.abs() || term.abs() < 1e-300 {
            return sum.clamp(0.0, 1.0);
        }
        sign = -sign;
    }
    1.0
}
