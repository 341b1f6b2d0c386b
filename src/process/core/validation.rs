//! Validation helpers shared by point-process families.
//!
//! This module centralizes the precondition checks every family performs at
//! its boundaries:
//!
//! - **Sizes**: [`validate_sizes`] rejects zero parameter counts or zero
//!   dimensionality.
//! - **Parameter vectors**: [`validate_parameter_length`],
//!   [`validate_finite_parameters`], [`validate_non_negative`].
//! - **Evaluation arguments**: [`validate_time`], [`validate_dims`],
//!   [`validate_event_index`].
//! - **Results**: [`validate_event_intensity`], [`validate_finite_value`],
//!   and [`first_bound_violation`] for upper-bound dominance checks made by
//!   consumers.
//!
//! All helpers report the first offending element with its index, and never
//! panic.
use ndarray::ArrayView1;

use crate::process::{
    core::results::IntensityEval,
    errors::{ProcessError, ProcessResult},
};

/// Relative slack used when comparing an intensity against its upper bound.
pub const BOUND_TOLERANCE: f64 = 1e-10;

/// Both the parameter count `n` and `num_dims` must be at least one.
///
/// # Errors
/// [`ProcessError::InvalidSize`] when either is zero.
pub fn validate_sizes(n: usize, num_dims: usize) -> ProcessResult<()> {
    if n == 0 || num_dims == 0 {
        return Err(ProcessError::InvalidSize { n, num_dims });
    }
    Ok(())
}

/// Reject a replacement vector whose length differs from `expected`.
///
/// # Errors
/// [`ProcessError::ParameterLengthMismatch`].
pub fn validate_parameter_length(values: ArrayView1<f64>, expected: usize) -> ProcessResult<()> {
    if values.len() != expected {
        return Err(ProcessError::ParameterLengthMismatch { expected, actual: values.len() });
    }
    Ok(())
}

/// Every parameter must be finite.
///
/// # Errors
/// [`ProcessError::NonFiniteParameter`] for the first NaN/±inf entry.
pub fn validate_finite_parameters(values: ArrayView1<f64>) -> ProcessResult<()> {
    for (index, &value) in values.iter().enumerate() {
        if !value.is_finite() {
            return Err(ProcessError::NonFiniteParameter { index, value });
        }
    }
    Ok(())
}

/// Every parameter must be `>= 0`.
///
/// # Errors
/// [`ProcessError::NegativeParameter`] for the first negative entry.
pub fn validate_non_negative(values: ArrayView1<f64>) -> ProcessResult<()> {
    for (index, &value) in values.iter().enumerate() {
        if value < 0.0 {
            return Err(ProcessError::NegativeParameter { index, value });
        }
    }
    Ok(())
}

/// Evaluation times must be finite and non-negative.
///
/// # Errors
/// [`ProcessError::InvalidTime`].
pub fn validate_time(t: f64) -> ProcessResult<()> {
    if !t.is_finite() || t < 0.0 {
        return Err(ProcessError::InvalidTime { value: t });
    }
    Ok(())
}

/// The dimensionality of supplied data must match the model's.
///
/// # Errors
/// [`ProcessError::DimensionMismatch`].
pub fn validate_dims(expected: usize, actual: usize) -> ProcessResult<()> {
    if expected != actual {
        return Err(ProcessError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

/// `k` must index into a history of `len` events.
///
/// # Errors
/// [`ProcessError::EventIndexOutOfRange`].
pub fn validate_event_index(k: usize, len: usize) -> ProcessResult<()> {
    if k >= len {
        return Err(ProcessError::EventIndexOutOfRange { index: k, len });
    }
    Ok(())
}

/// The intensity at an observed event must be finite and strictly positive,
/// otherwise `ln λ` is undefined.
///
/// # Errors
/// [`ProcessError::NonPositiveIntensity`].
pub fn validate_event_intensity(index: usize, value: f64) -> ProcessResult<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(ProcessError::NonPositiveIntensity { index, value });
    }
    Ok(())
}

/// # Errors
/// [`ProcessError::NonFiniteValue`] tagged with `context`.
pub fn validate_finite_value(value: f64, context: &'static str) -> ProcessResult<()> {
    if !value.is_finite() {
        return Err(ProcessError::NonFiniteValue { value, context });
    }
    Ok(())
}

/// First dimension where `intensity` exceeds `bound`, if any.
///
/// Comparison allows a relative slack of [`BOUND_TOLERANCE`] so that
/// analytically equal quantities computed along different paths do not
/// register as violations.
pub fn first_bound_violation(intensity: &IntensityEval, bound: &IntensityEval) -> Option<usize> {
    intensity
        .per_dim
        .iter()
        .zip(bound.per_dim.iter())
        .position(|(&lam, &ub)| lam > ub + BOUND_TOLERANCE * ub.abs().max(1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Size and parameter-vector checks report the first offending entry.
    // - Time, dimension, and index checks.
    // - Event-intensity positivity and bound-violation detection.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Zero sizes are rejected and positive sizes pass.
    //
    // Given
    // -----
    // - (0, 1), (3, 0), and (3, 1).
    //
    // Expect
    // ------
    // - Two `InvalidSize` errors and one `Ok`.
    fn validate_sizes_rejects_zero() {
        assert_eq!(validate_sizes(0, 1), Err(ProcessError::InvalidSize { n: 0, num_dims: 1 }));
        assert_eq!(validate_sizes(3, 0), Err(ProcessError::InvalidSize { n: 3, num_dims: 0 }));
        assert!(validate_sizes(3, 1).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Parameter-vector checks name the first offending index.
    //
    // Given
    // -----
    // - `[1, -2, NaN]`.
    //
    // Expect
    // ------
    // - Length 2 expected → mismatch; finiteness → index 2; sign → index 1.
    fn parameter_checks_report_first_offender() {
        let v = array![1.0, -2.0, f64::NAN];

        assert_eq!(
            validate_parameter_length(v.view(), 2),
            Err(ProcessError::ParameterLengthMismatch { expected: 2, actual: 3 })
        );
        assert!(matches!(
            validate_finite_parameters(v.view()),
            Err(ProcessError::NonFiniteParameter { index: 2, .. })
        ));
        assert_eq!(
            validate_non_negative(v.view()),
            Err(ProcessError::NegativeParameter { index: 1, value: -2.0 })
        );
    }

    #[test]
    // Purpose
    // -------
    // Time, dimension, and index arguments are checked at the boundary.
    //
    // Given
    // -----
    // - Negative and infinite times, mismatched dims, an index equal to len.
    //
    // Expect
    // ------
    // - The matching error variants; valid inputs pass.
    fn argument_checks() {
        assert!(validate_time(0.0).is_ok());
        assert_eq!(validate_time(-1.0), Err(ProcessError::InvalidTime { value: -1.0 }));
        assert!(validate_time(f64::INFINITY).is_err());
        assert_eq!(
            validate_dims(2, 3),
            Err(ProcessError::DimensionMismatch { expected: 2, actual: 3 })
        );
        assert_eq!(
            validate_event_index(4, 4),
            Err(ProcessError::EventIndexOutOfRange { index: 4, len: 4 })
        );
        assert!(validate_event_index(3, 4).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Zero or negative event intensities are degeneracies; bound violations
    // are located per dimension.
    //
    // Given
    // -----
    // - Event intensities 0.0 and 0.3.
    // - Intensity [1, 3] against bounds [1, 2].
    //
    // Expect
    // ------
    // - 0.0 → `NonPositiveIntensity`; 0.3 passes.
    // - Violation reported in dimension 1; equal entries do not violate.
    fn event_intensity_and_bound_checks() {
        assert_eq!(
            validate_event_intensity(7, 0.0),
            Err(ProcessError::NonPositiveIntensity { index: 7, value: 0.0 })
        );
        assert!(validate_event_intensity(7, 0.3).is_ok());

        let lam = IntensityEval::from_per_dim(array![1.0, 3.0]);
        let ub = IntensityEval::from_per_dim(array![1.0, 2.0]);

        assert_eq!(first_bound_violation(&lam, &ub), Some(1));
        assert_eq!(first_bound_violation(&ub, &lam), None);
    }
}
