//! Maximum-likelihood fitting of a bound point process.
//!
//! Purpose
//! -------
//! Bridge any [`PointProcess`] to the L-BFGS driver in
//! `optimization::loglik_optimizer`. The model is wrapped as a
//! [`LogLikelihood`] over an unconstrained vector `θ`, mapped to model space
//! through a coordinate-wise [`ParamLink`].
//!
//! Key behaviors
//! -------------
//! - `ParamLink::Softplus` (default) keeps every parameter strictly positive
//!   while the optimizer moves freely on ℝⁿ; `ParamLink::Identity` optimizes
//!   the model parameters directly.
//! - The analytic likelihood gradient is mapped to `θ` by the chain rule, so
//!   finite differences are never needed.
//! - The objective is divided by `max(1, ‖∇ℓ(θ₀)‖)` so that the first L-BFGS
//!   trial step has at most unit length in `θ`. Families with exponential
//!   intensities would otherwise overflow on the first line search.
//!   `optim.value` and `optim.grad_norm` are reported on the original scale.
//! - On success the fitted parameters are written back to the model; on
//!   failure the model keeps the parameters it had before the call.
//!
//! Invariants & assumptions
//! ------------------------
//! - The model must be bound before fitting.
//! - A model error raised at any trial point, including inside a line search,
//!   aborts the fit and is returned unchanged. With `Identity`, a trial point
//!   outside the family's domain therefore yields the family's parameter
//!   error.
//! - A run that stops without converging on its own (a failed line search)
//!   is `OptimizationFailed`, never a fitted result.
//!
//! Downstream usage
//! ----------------
//! - `fit(&mut model, initial, &FitOptions::default())`, then read
//!   `outcome.params` or `model.parameters()`.
use std::{cell::RefCell, str::FromStr};

use ndarray::{Array1, ArrayView1};

use crate::{
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{Cost, Grad, LogLikelihood, MLEOptions, OptimOutcome, Theta, maximize},
        numerical_stability::{safe_logistic, safe_softplus, safe_softplus_inv},
    },
    process::{
        core::{
            NegLogLik,
            validation::{validate_finite_parameters, validate_parameter_length},
        },
        errors::{ProcessError, ProcessResult},
        models::PointProcess,
    },
};

/// Map between optimizer space `θ` and model parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamLink {
    Identity,
    #[default]
    Softplus,
}

impl FromStr for ParamLink {
    type Err = ProcessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "identity" => Ok(ParamLink::Identity),
            "softplus" => Ok(ParamLink::Softplus),
            _ => Err(ProcessError::InvalidLink { name: s.to_string() }),
        }
    }
}

impl ParamLink {
    /// Model-space parameters for optimizer coordinates `theta`.
    pub fn to_model(&self, theta: &Theta) -> Array1<f64> {
        match self {
            ParamLink::Identity => theta.clone(),
            ParamLink::Softplus => theta.mapv(safe_softplus),
        }
    }

    /// Optimizer coordinates for model-space `params`.
    ///
    /// # Errors
    /// `InvalidInitialValue` for a non-positive entry under `Softplus`.
    pub fn to_theta(&self, params: ArrayView1<f64>) -> ProcessResult<Theta> {
        match self {
            ParamLink::Identity => Ok(params.to_owned()),
            ParamLink::Softplus => {
                if let Some((index, &value)) = params.indexed_iter().find(|(_, v)| **v <= 0.0) {
                    return Err(ProcessError::InvalidInitialValue {
                        index,
                        value,
                        reason: "Softplus link requires strictly positive starting values.",
                    });
                }
                Ok(params.mapv(safe_softplus_inv))
            }
        }
    }

    /// `d params / d θ`, coordinate-wise.
    fn jacobian_diag(&self, theta: &Theta) -> Array1<f64> {
        match self {
            ParamLink::Identity => Array1::ones(theta.len()),
            ParamLink::Softplus => theta.mapv(safe_logistic),
        }
    }
}

/// Options for [`fit`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FitOptions {
    pub mle: MLEOptions,
    pub link: ParamLink,
}

impl FitOptions {
    pub fn new(mle: MLEOptions, link: ParamLink) -> Self {
        Self { mle, link }
    }
}

/// Result of [`fit`].
///
/// - `optim`: raw optimizer outcome in `θ` space (`value` is the maximized
///   log-likelihood).
/// - `params`: fitted model-space parameters, already set on the model.
/// - `neg_loglikelihood`: NLL recomputed at `params`.
#[derive(Debug, Clone, PartialEq)]
pub struct FitOutcome {
    pub optim: OptimOutcome,
    pub params: Array1<f64>,
    pub neg_loglikelihood: f64,
}

/// A bound model seen as a log-likelihood in `θ` space.
///
/// The first model error is kept in `model_error`; argmin reduces errors
/// raised inside a line search to text.
struct ProcessLikelihood<'m, P: ?Sized> {
    model: RefCell<&'m mut P>,
    link: ParamLink,
    scale: f64,
    model_error: RefCell<Option<ProcessError>>,
}

impl<'m, P: PointProcess + ?Sized> ProcessLikelihood<'m, P> {
    fn new(model: &'m mut P, link: ParamLink) -> Self {
        Self { model: RefCell::new(model), link, scale: 1.0, model_error: RefCell::new(None) }
    }

    fn evaluate(&self, theta: &Theta) -> OptResult<NegLogLik> {
        let mut model = self.model.borrow_mut();
        let nll = model
            .set_parameters(self.link.to_model(theta))
            .and_then(|()| model.neg_loglikelihood());
        nll.map_err(|err| {
            self.model_error.borrow_mut().get_or_insert_with(|| err.clone());
            OptError::from(err)
        })
    }
}

impl<P: PointProcess + ?Sized> LogLikelihood for ProcessLikelihood<'_, P> {
    type Data = ();

    fn value(&self, theta: &Theta, _data: &()) -> OptResult<Cost> {
        Ok(-self.scale * self.evaluate(theta)?.value)
    }

    fn check(&self, theta: &Theta, _data: &()) -> OptResult<()> {
        let model = self.model.borrow();
        if theta.len() != model.num_params() {
            return Err(OptError::ThetaLengthMismatch {
                expected: model.num_params(),
                actual: theta.len(),
            });
        }
        if let Some((index, &value)) = theta.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(OptError::InvalidThetaInput { index, value });
        }
        if !model.is_bound() {
            return Err(OptError::HistoryNotBound);
        }
        Ok(())
    }

    fn grad(&self, theta: &Theta, _data: &()) -> OptResult<Grad> {
        let nll = self.evaluate(theta)?;
        Ok(-self.scale * (nll.gradient * self.link.jacobian_diag(theta)))
    }
}

/// Set the objective scale from the gradient at `theta0`, then maximize.
fn run_scaled<P: PointProcess + ?Sized>(
    objective: &mut ProcessLikelihood<'_, P>, theta0: Theta, mle: &MLEOptions,
) -> OptResult<(OptimOutcome, f64)> {
    let g0 = objective.grad(&theta0, &())?;
    objective.scale = 1.0 / g0.dot(&g0).sqrt().max(1.0);
    let optim = maximize(&*objective, theta0, &(), mle)?;
    Ok((optim, objective.scale))
}

/// Fit `model` to its bound history by maximum likelihood.
///
/// Parameters
/// ----------
/// - `model`: bound model; receives the fitted parameters on success.
/// - `initial`: model-space starting point (length `num_params`).
/// - `opts`: optimizer options and parameter link.
///
/// Errors
/// ------
/// - `HistoryNotBound` if `model` is unbound.
/// - `ParameterLengthMismatch` / `NonFiniteParameter` for a malformed start.
/// - `InvalidInitialValue` for a non-positive start under `Softplus`.
/// - The first model evaluation error raised during the run, as is.
/// - `OptimizationFailed` for optimizer failures, including a line search
///   that cannot make progress.
///
/// The model's previous parameters are restored in every error case.
pub fn fit<P: PointProcess + ?Sized>(
    model: &mut P, initial: Array1<f64>, opts: &FitOptions,
) -> ProcessResult<FitOutcome> {
    model.bound_history()?;
    validate_parameter_length(initial.view(), model.num_params())?;
    validate_finite_parameters(initial.view())?;
    let theta0 = opts.link.to_theta(initial.view())?;
    let original = model.parameters().to_owned();

    let result = {
        let mut objective = ProcessLikelihood::new(&mut *model, opts.link);
        let run = run_scaled(&mut objective, theta0, &opts.mle);
        match (run, objective.model_error.into_inner()) {
            (Err(_), Some(err)) => Err(err),
            (run, _) => run.map_err(ProcessError::from),
        }
    };

    let finish = |model: &mut P, (mut optim, scale): (OptimOutcome, f64)| -> ProcessResult<FitOutcome> {
        optim.value /= scale;
        optim.grad_norm = optim.grad_norm.map(|g| g / scale);
        let params = opts.link.to_model(&optim.theta_hat);
        model.set_parameters(params.clone())?;
        let neg_loglikelihood = model.neg_loglikelihood()?.value;
        Ok(FitOutcome { optim, params, neg_loglikelihood })
    };

    match result.and_then(|optim| finish(model, optim)) {
        Ok(outcome) => Ok(outcome),
        Err(err) => {
            model.set_parameters(original)?;
            Err(err)
        }
    }
}
