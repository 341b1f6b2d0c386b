//! Adapter that exposes a user `LogLikelihood` as an `argmin` problem.
//!
//! Maximizing `ℓ(θ)` becomes minimizing the cost `c(θ) = -ℓ(θ)`. Analytic
//! gradients are negated; finite differences are taken of the cost closure
//! itself, so that branch needs no sign flip.
use crate::optimization::{
    errors::OptError,
    loglik_optimizer::{
        finite_diff::fd_gradient,
        traits::LogLikelihood,
        types::{Cost, Grad, Theta},
        validation::validate_grad,
    },
};
use argmin::core::{CostFunction, Error, Gradient};

/// Bridges a user `LogLikelihood` to `argmin`'s `CostFunction` and `Gradient`.
#[derive(Debug, Clone)]
pub struct ArgMinAdapter<'a, F: LogLikelihood> {
    pub f: &'a F,
    pub data: &'a F::Data,
}

impl<'a, F: LogLikelihood> ArgMinAdapter<'a, F> {
    pub fn new(f: &'a F, data: &'a F::Data) -> Self {
        Self { f, data }
    }
}

impl<F: LogLikelihood> CostFunction for ArgMinAdapter<'_, F> {
    type Param = Theta;
    type Output = Cost;

    /// Evaluate `c(θ) = -ℓ(θ)`.
    ///
    /// # Errors
    /// - Any `OptError` from the user's `value`.
    /// - `OptError::NonFiniteCost` if `ℓ(θ)` is not finite.
    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let output = self.f.value(theta, self.data)?;
        if !output.is_finite() {
            return Err(OptError::NonFiniteCost { value: output }.into());
        }
        Ok(-output)
    }
}

impl<F: LogLikelihood> Gradient for ArgMinAdapter<'_, F> {
    type Param = Theta;
    type Gradient = Grad;

    /// Evaluate `∇c(θ)`.
    ///
    /// - Analytic path: validate the user's `∇ℓ(θ)` and return its negation.
    /// - `GradientNotImplemented`: finite-difference the cost via
    ///   [`fd_gradient`].
    ///
    /// # Errors
    /// - Any other error from the user's `grad`.
    /// - Validation or evaluation errors from either path.
    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        match self.f.grad(theta, self.data) {
            Ok(g) => {
                validate_grad(&g, theta.len())?;
                Ok(-g)
            }
            Err(OptError::GradientNotImplemented) => Ok(fd_gradient(theta, |x| self.cost(x))?),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptResult;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The sign flip between log-likelihood and cost.
    // - Analytic versus finite-difference gradient routing.
    // - Rejection of non-finite log-likelihood values.
    // -------------------------------------------------------------------------

    /// ℓ(θ) = -‖θ - 1‖², optionally with its analytic gradient.
    struct Bowl {
        analytic: bool,
    }

    impl LogLikelihood for Bowl {
        type Data = ();

        fn value(&self, theta: &Theta, _data: &()) -> OptResult<Cost> {
            Ok(-theta.mapv(|v| (v - 1.0).powi(2)).sum())
        }

        fn check(&self, _theta: &Theta, _data: &()) -> OptResult<()> {
            Ok(())
        }

        fn grad(&self, theta: &Theta, _data: &()) -> OptResult<Grad> {
            if self.analytic {
                Ok(theta.mapv(|v| -2.0 * (v - 1.0)))
            } else {
                Err(OptError::GradientNotImplemented)
            }
        }
    }

    struct NanModel;

    impl LogLikelihood for NanModel {
        type Data = ();

        fn value(&self, _theta: &Theta, _data: &()) -> OptResult<Cost> {
            Ok(f64::NAN)
        }

        fn check(&self, _theta: &Theta, _data: &()) -> OptResult<()> {
            Ok(())
        }
    }

    #[test]
    // Purpose
    // -------
    // The adapter reports the negated log-likelihood and gradient.
    //
    // Given
    // -----
    // - `Bowl` with an analytic gradient at θ = [0, 3].
    //
    // Expect
    // ------
    // - cost = ‖θ - 1‖² = 5 and ∇c = 2(θ - 1) = [-2, 4].
    fn adapter_negates_value_and_analytic_gradient() {
        let model = Bowl { analytic: true };
        let adapter = ArgMinAdapter::new(&model, &());
        let theta = array![0.0, 3.0];

        let cost = adapter.cost(&theta).unwrap();
        let grad = adapter.gradient(&theta).unwrap();

        assert_relative_eq!(cost, 5.0);
        assert_relative_eq!(grad[0], -2.0);
        assert_relative_eq!(grad[1], 4.0);
    }

    #[test]
    // Purpose
    // -------
    // Without an analytic gradient the cost is finite-differenced directly.
    //
    // Given
    // -----
    // - `Bowl` without an analytic gradient at θ = [0, 3].
    //
    // Expect
    // ------
    // - ∇c ≈ [-2, 4].
    fn adapter_falls_back_to_finite_differences() {
        let model = Bowl { analytic: false };
        let adapter = ArgMinAdapter::new(&model, &());

        let grad = adapter.gradient(&array![0.0, 3.0]).unwrap();

        assert_relative_eq!(grad[0], -2.0, epsilon = 1e-5);
        assert_relative_eq!(grad[1], 4.0, epsilon = 1e-5);
    }

    #[test]
    // Purpose
    // -------
    // A non-finite log-likelihood is surfaced as `NonFiniteCost`.
    //
    // Given
    // -----
    // - A model whose value is always NaN.
    //
    // Expect
    // ------
    // - The boxed error converts back into `OptError::NonFiniteCost`.
    fn adapter_rejects_non_finite_values() {
        let adapter = ArgMinAdapter::new(&NanModel, &());

        let err = adapter.cost(&array![0.0]).unwrap_err();

        assert!(matches!(OptError::from(err), OptError::NonFiniteCost { .. }));
    }
}
