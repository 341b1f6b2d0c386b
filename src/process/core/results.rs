//! Immutable evaluation results returned by point-process models.
//!
//! Every evaluation returns a fresh value instead of writing into caller
//! buffers, so a failed evaluation never leaves a partially written result.
use ndarray::Array1;

use crate::process::{
    core::validation::validate_finite_value,
    errors::{ProcessError, ProcessResult},
};

/// Negative log-likelihood of the bound history and its gradient.
///
/// Invariants
/// ----------
/// - `value` is finite.
/// - `gradient.len()` equals the model's parameter count and every entry is
///   finite.
#[derive(Debug, Clone, PartialEq)]
pub struct NegLogLik {
    pub value: f64,
    pub gradient: Array1<f64>,
}

impl NegLogLik {
    /// Build a validated result.
    ///
    /// # Errors
    /// [`ProcessError::NonFiniteValue`] if the value or any gradient entry is
    /// NaN/±inf.
    pub fn new(value: f64, gradient: Array1<f64>) -> ProcessResult<Self> {
        validate_finite_value(value, "negative log-likelihood")?;
        if let Some(&bad) = gradient.iter().find(|g| !g.is_finite()) {
            return Err(ProcessError::NonFiniteValue {
                value: bad,
                context: "negative log-likelihood gradient",
            });
        }
        Ok(Self { value, gradient })
    }
}

/// Per-dimension intensity (or intensity bound) and its total.
///
/// `total == per_dim.sum()` and `per_dim.len() == num_dims` hold for every
/// value built through [`IntensityEval::from_per_dim`].
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityEval {
    pub total: f64,
    pub per_dim: Array1<f64>,
}

impl IntensityEval {
    pub fn from_per_dim(per_dim: Array1<f64>) -> Self {
        let total = per_dim.sum();
        Self { total, per_dim }
    }

    pub fn num_dims(&self) -> usize {
        self.per_dim.len()
    }

    /// Reject NaN/±inf totals before handing the result to a consumer.
    pub(crate) fn checked(self, context: &'static str) -> ProcessResult<Self> {
        validate_finite_value(self.total, context)?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Totals equal the sum of per-dimension entries.
    // - Non-finite likelihood values and gradients are rejected.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // The total is the sum of the per-dimension entries.
    //
    // Given
    // -----
    // - per_dim = [0.25, 1.5, 0.0].
    //
    // Expect
    // ------
    // - total == 1.75, num_dims == 3.
    fn total_is_sum_of_entries() {
        let eval = IntensityEval::from_per_dim(array![0.25, 1.5, 0.0]);

        assert_eq!(eval.total, 1.75);
        assert_eq!(eval.num_dims(), 3);
    }

    #[test]
    // Purpose
    // -------
    // `NegLogLik::new` refuses non-finite content.
    //
    // Given
    // -----
    // - A NaN value, and a finite value with an infinite gradient entry.
    //
    // Expect
    // ------
    // - Both return `NonFiniteValue`; a clean input succeeds.
    fn neg_loglik_rejects_non_finite() {
        assert!(matches!(
            NegLogLik::new(f64::NAN, array![0.0]),
            Err(ProcessError::NonFiniteValue { .. })
        ));
        assert!(matches!(
            NegLogLik::new(1.0, array![0.0, f64::INFINITY]),
            Err(ProcessError::NonFiniteValue { .. })
        ));
        assert!(NegLogLik::new(1.0, array![0.5]).is_ok());
    }
}
