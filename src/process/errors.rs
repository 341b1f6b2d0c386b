//! Errors for point-process models (construction and parameter checks,
//! event-sequence validation, numerical degeneracies during evaluation, and
//! failures raised by the simulator, diagnostics, and fitting layers).
//!
//! [`ProcessError`] is the single error type of the `process` module. It
//! implements `Display`/`Error`, converts to and from the optimizer's
//! [`OptError`], and converts to a Python `ValueError` when the
//! `python-bindings` feature is enabled.
//!
//! ## Conventions
//! - **Indices are 0-based** (event indices, parameter indices, dimensions).
//! - Boundary errors (construction, `set_parameters`, `bind`) leave the model
//!   unchanged; evaluation errors abort the evaluation without producing a
//!   partial result.
//! - Optimizer failures are normalized to [`ProcessError::OptimizationFailed`]
//!   with a human-readable status, except the few optimizer variants that
//!   mirror a process variant one-to-one.
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};
use statrs::distribution::ExpError;

use crate::optimization::errors::OptError;

/// Result alias for point-process operations that may produce [`ProcessError`].
pub type ProcessResult<T> = Result<T, ProcessError>;

#[derive(Debug, Clone, PartialEq)]
pub enum ProcessError {
    // ---- Construction / parameter preconditions ----
    /// Parameter count and dimensionality must both be at least one.
    InvalidSize { n: usize, num_dims: usize },

    /// Replacement parameter vector has the wrong length.
    ParameterLengthMismatch { expected: usize, actual: usize },

    /// A parameter is NaN/±inf.
    NonFiniteParameter { index: usize, value: f64 },

    /// A parameter lies outside a non-negative domain.
    NegativeParameter { index: usize, value: f64 },

    /// Per-event gradient requested for an index past the bound history.
    EventIndexOutOfRange { index: usize, len: usize },

    /// Likelihood or per-event gradient requested before `bind`.
    HistoryNotBound,

    /// Two dimensionalities that must agree do not.
    DimensionMismatch { expected: usize, actual: usize },

    /// Evaluation time must be finite and >= 0.
    InvalidTime { value: f64 },

    /// Exponential decay rates must be finite and > 0.
    InvalidDecay { row: usize, col: usize, value: f64 },

    /// Upper-bound look-ahead window must be finite and > 0.
    InvalidBoundWindow { value: f64 },

    // ---- Event sequence validation ----
    /// An event time is NaN/±inf.
    NonFiniteEventTime { index: usize, value: f64 },

    /// An event time is < 0.
    NegativeEventTime { index: usize, value: f64 },

    /// Event times must be non-decreasing.
    UnorderedEvents { index: usize, previous: f64, value: f64 },

    /// An event carries a dimension tag >= num_dims.
    EventDimOutOfRange { index: usize, dim: usize, num_dims: usize },

    /// Observation horizon must be finite and >= 0 (> 0 for simulation).
    InvalidHorizon { value: f64 },

    /// An event lies past the observation horizon.
    EventAfterHorizon { index: usize, time: f64, t_end: f64 },

    // ---- Numerical degeneracies ----
    /// An observed event falls where the model intensity is not positive.
    NonPositiveIntensity { index: usize, value: f64 },

    /// An evaluation produced NaN/±inf.
    NonFiniteValue { value: f64, context: &'static str },

    // ---- Simulation / diagnostics / fitting ----
    /// The intensity exceeded its advertised upper bound during thinning.
    UpperBoundViolated { time: f64, dim: usize, intensity: f64, bound: f64 },

    /// Simulation options are inconsistent.
    InvalidSimOption { reason: &'static str },

    /// A sampling distribution could not be built from the model's rates.
    SamplingFailed { time: f64, reason: String },

    /// Initial value incompatible with the chosen parameter link.
    InvalidInitialValue { index: usize, value: f64, reason: &'static str },

    /// Unknown parameter link name.
    InvalidLink { name: String },

    /// Quadrature needs at least one panel per segment.
    InvalidQuadrature { panels: usize },

    /// No residuals were available for a goodness-of-fit statistic.
    EmptyResiduals,

    /// Wrapper for statrs::distribution::ExpError
    InvalidExpParam,

    /// Optimizer failed; include a human-readable status/reason.
    OptimizationFailed { status: String },
}

impl std::error::Error for ProcessError {}

impl std::fmt::Display for ProcessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Construction / parameter preconditions ----
            ProcessError::InvalidSize { n, num_dims } => {
                write!(f, "Invalid model size: n = {n}, num_dims = {num_dims}; both must be >= 1.")
            }
            ProcessError::ParameterLengthMismatch { expected, actual } => {
                write!(f, "Parameter length mismatch: expected {expected}, actual {actual}.")
            }
            ProcessError::NonFiniteParameter { index, value } => {
                write!(f, "Parameter at index {index} is non-finite: {value}")
            }
            ProcessError::NegativeParameter { index, value } => {
                write!(f, "Parameter at index {index} must be >= 0; got: {value}")
            }
            ProcessError::EventIndexOutOfRange { index, len } => {
                write!(f, "Event index {index} is out of range for a history of {len} events.")
            }
            ProcessError::HistoryNotBound => {
                write!(f, "No event history is bound to the model; call bind first.")
            }
            ProcessError::DimensionMismatch { expected, actual } => {
                write!(f, "Dimension mismatch: expected {expected}, actual {actual}.")
            }
            ProcessError::InvalidTime { value } => {
                write!(f, "Evaluation time must be finite and >= 0; got: {value}")
            }
            ProcessError::InvalidDecay { row, col, value } => {
                write!(f, "Decay rate at ({row}, {col}) must be finite and > 0; got: {value}")
            }
            ProcessError::InvalidBoundWindow { value } => {
                write!(f, "Upper-bound window must be finite and > 0; got: {value}")
            }

            // ---- Event sequence validation ----
            ProcessError::NonFiniteEventTime { index, value } => {
                write!(f, "Event time at index {index} is non-finite: {value}")
            }
            ProcessError::NegativeEventTime { index, value } => {
                write!(f, "Event time at index {index} is negative: {value}")
            }
            ProcessError::UnorderedEvents { index, previous, value } => {
                write!(f, "Event at index {index} ({value}) precedes the previous event ({previous}).")
            }
            ProcessError::EventDimOutOfRange { index, dim, num_dims } => {
                write!(f, "Event at index {index} has dimension {dim}; expected < {num_dims}.")
            }
            ProcessError::InvalidHorizon { value } => {
                write!(f, "Observation horizon must be finite and non-negative; got: {value}")
            }
            ProcessError::EventAfterHorizon { index, time, t_end } => {
                write!(f, "Event at index {index} ({time}) lies after the horizon {t_end}.")
            }

            // ---- Numerical degeneracies ----
            ProcessError::NonPositiveIntensity { index, value } => {
                write!(f, "Intensity at event {index} is {value}; the log-likelihood is undefined.")
            }
            ProcessError::NonFiniteValue { value, context } => {
                write!(f, "Non-finite value {value} while evaluating {context}.")
            }

            // ---- Simulation / diagnostics / fitting ----
            ProcessError::UpperBoundViolated { time, dim, intensity, bound } => {
                write!(
                    f,
                    "Intensity {intensity} exceeds upper bound {bound} in dimension {dim} at time {time}."
                )
            }
            ProcessError::InvalidSimOption { reason } => {
                write!(f, "Invalid simulation option: {reason}")
            }
            ProcessError::SamplingFailed { time, reason } => {
                write!(f, "Sampling failed at time {time}: {reason}")
            }
            ProcessError::InvalidInitialValue { index, value, reason } => {
                write!(f, "Invalid initial value at index {index}: {value}. {reason}")
            }
            ProcessError::InvalidLink { name } => {
                write!(
                    f,
                    "Invalid parameter link '{name}'. Valid options are case insensitive 'identity' or 'softplus'."
                )
            }
            ProcessError::InvalidQuadrature { panels } => {
                write!(f, "Quadrature needs at least one panel per segment; got {panels}.")
            }
            ProcessError::EmptyResiduals => {
                write!(f, "No residuals available for the goodness-of-fit statistic.")
            }
            ProcessError::InvalidExpParam => {
                write!(f, "Invalid exponential distribution parameter.")
            }
            ProcessError::OptimizationFailed { status } => {
                write!(f, "Optimization failed: {status}")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl std::convert::From<ProcessError> for PyErr {
    fn from(err: ProcessError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

impl From<ExpError> for ProcessError {
    fn from(_: ExpError) -> ProcessError {
        ProcessError::InvalidExpParam
    }
}

impl From<OptError> for ProcessError {
    fn from(err: OptError) -> ProcessError {
        match err {
            OptError::ThetaLengthMismatch { expected, actual } => {
                ProcessError::ParameterLengthMismatch { expected, actual }
            }
            OptError::NonPositiveIntensity { index, value } => {
                ProcessError::NonPositiveIntensity { index, value }
            }
            OptError::HistoryNotBound => ProcessError::HistoryNotBound,
            other => ProcessError::OptimizationFailed { status: other.to_string() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Mapping of optimizer errors back into `ProcessError`.
    // - The statrs `ExpError` wrapper.
    // - Display text carrying the offending payload.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Optimizer variants that mirror a process variant keep their payload;
    // everything else becomes `OptimizationFailed`.
    //
    // Given
    // -----
    // - `OptError::HistoryNotBound`, `OptError::ThetaLengthMismatch`,
    //   `OptError::NoTolerancesProvided`, and `OptError::SolverExit`.
    //
    // Expect
    // ------
    // - `HistoryNotBound`, `ParameterLengthMismatch`, then `OptimizationFailed`
    //   for the last two (carrying the solver's text).
    fn opt_errors_map_back_to_process_errors() {
        assert_eq!(ProcessError::from(OptError::HistoryNotBound), ProcessError::HistoryNotBound);
        assert_eq!(
            ProcessError::from(OptError::ThetaLengthMismatch { expected: 4, actual: 1 }),
            ProcessError::ParameterLengthMismatch { expected: 4, actual: 1 }
        );
        assert!(matches!(
            ProcessError::from(OptError::NoTolerancesProvided),
            ProcessError::OptimizationFailed { .. }
        ));
        match ProcessError::from(OptError::SolverExit { text: "line search".to_string() }) {
            ProcessError::OptimizationFailed { status } => assert!(status.contains("line search")),
            other => panic!("expected OptimizationFailed, got {other:?}"),
        }
    }

    #[test]
    // Purpose
    // -------
    // A round trip through the optimizer error keeps structured variants.
    //
    // Given
    // -----
    // - `ProcessError::NonPositiveIntensity { index: 3, value: 0.0 }`.
    //
    // Expect
    // ------
    // - Converting to `OptError` and back yields the same value.
    fn non_positive_intensity_survives_optimizer_round_trip() {
        let original = ProcessError::NonPositiveIntensity { index: 3, value: 0.0 };

        let back = ProcessError::from(OptError::from(original.clone()));

        assert_eq!(back, original);
    }

    #[test]
    // Purpose
    // -------
    // Display text names the offending index and value.
    //
    // Given
    // -----
    // - `EventIndexOutOfRange { index: 5, len: 2 }`.
    //
    // Expect
    // ------
    // - The message mentions both numbers.
    fn display_includes_payload() {
        let msg = ProcessError::EventIndexOutOfRange { index: 5, len: 2 }.to_string();

        assert!(msg.contains('5'));
        assert!(msg.contains('2'));
        assert_eq!(ProcessError::from(ExpError::RateInvalid), ProcessError::InvalidExpParam);
    }
}
