//! Shared parameter state embedded by every point-process family.
//!
//! Purpose
//! -------
//! Hold the parameter vector and the fixed dimensionality behind a small,
//! validated API so that concrete families only add their own domain checks.
//!
//! Key behaviors
//! -------------
//! - [`ProcessParams::new`] allocates a zero vector of length `n` for a
//!   process with `num_dims` coordinate streams.
//! - [`ProcessParams::set`] replaces the whole vector after checking length
//!   and finiteness; on failure the previous vector is kept.
//!
//! Invariants & assumptions
//! ------------------------
//! - `values.len() == n` for the lifetime of the instance.
//! - `num_dims >= 1` and never changes.
//! - Every stored entry is finite.
use ndarray::{Array1, ArrayView1};

use crate::process::{
    core::validation::{validate_finite_parameters, validate_parameter_length, validate_sizes},
    errors::ProcessResult,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessParams {
    values: Array1<f64>,
    num_dims: usize,
}

impl ProcessParams {
    /// Zero-initialized parameters of length `n` for `num_dims` dimensions.
    ///
    /// # Errors
    /// [`ProcessError::InvalidSize`](crate::process::errors::ProcessError::InvalidSize)
    /// if `n == 0` or `num_dims == 0`.
    pub fn new(n: usize, num_dims: usize) -> ProcessResult<Self> {
        validate_sizes(n, num_dims)?;
        Ok(Self { values: Array1::zeros(n), num_dims })
    }

    pub fn values(&self) -> ArrayView1<'_, f64> {
        self.values.view()
    }

    pub fn num_dims(&self) -> usize {
        self.num_dims
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Check a candidate replacement without storing it.
    ///
    /// # Errors
    /// - `ParameterLengthMismatch` when `candidate.len() != n`.
    /// - `NonFiniteParameter` for the first NaN/±inf entry.
    pub fn check(&self, candidate: ArrayView1<f64>) -> ProcessResult<()> {
        validate_parameter_length(candidate, self.values.len())?;
        validate_finite_parameters(candidate)
    }

    /// Replace the whole vector after [`check`](Self::check).
    pub fn set(&mut self, values: Array1<f64>) -> ProcessResult<()> {
        self.check(values.view())?;
        self.values = values;
        Ok(())
    }
}
