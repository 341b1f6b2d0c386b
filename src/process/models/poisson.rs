//! Homogeneous multivariate Poisson process.
//!
//! `λ_n(t) = μ_n` for each dimension `n`, with parameter layout
//! `[μ_0, …, μ_{D-1}]` (`n = D`) and domain `μ_n >= 0`.
//!
//! The intensity ignores the history, so the upper bound equals the intensity
//! and stays valid forever.
use ndarray::Array1;

use crate::process::{
    core::{
        BoundHistory, IntensityEval, NegLogLik, ProcessParams, Sequence,
        validation::{validate_dims, validate_event_intensity, validate_non_negative},
    },
    errors::ProcessResult,
    models::{
        model_internals::{
            Binding, SpanLikelihood, assemble_event_gradient, assemble_neg_loglikelihood,
            check_eval_args, require_binding,
        },
        traits::PointProcess,
    },
};

#[derive(Debug, Clone, PartialEq)]
pub struct HomogeneousPoisson {
    params: ProcessParams,
    binding: Option<Binding<()>>,
}

impl HomogeneousPoisson {
    /// A `num_dims`-dimensional Poisson process with all rates at zero.
    ///
    /// # Errors
    /// `InvalidSize` if `num_dims == 0`.
    pub fn new(num_dims: usize) -> ProcessResult<Self> {
        Ok(Self { params: ProcessParams::new(num_dims, num_dims)?, binding: None })
    }

    fn rates(&self) -> Array1<f64> {
        self.params.values().to_owned()
    }
}

impl SpanLikelihood for HomogeneousPoisson {
    type Cache = ();

    fn neg_log_intensity_at(
        &self, binding: &Binding<()>, k: usize, grad: &mut Array1<f64>,
    ) -> ProcessResult<f64> {
        let dim = binding.history.sequence().events()[k].dim;
        let mu = self.params.values()[dim];
        validate_event_intensity(k, mu)?;
        grad[dim] -= 1.0 / mu;
        Ok(-mu.ln())
    }

    fn span_compensator(
        &self, binding: &Binding<()>, s: usize, grad: &mut Array1<f64>,
    ) -> ProcessResult<f64> {
        let len = binding.history.spans()[s].len();
        let mu = self.params.values();
        grad.iter_mut().for_each(|g| *g += len);
        Ok(mu.sum() * len)
    }
}

impl PointProcess for HomogeneousPoisson {
    fn name(&self) -> &'static str {
        "poisson"
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
        self.binding = Some(Binding { history: BoundHistory::new(sequence), cache: () });
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
        Ok(IntensityEval::from_per_dim(self.rates()))
    }

    fn intensity_upper_bound(&self, t: f64, data: &Sequence) -> ProcessResult<IntensityEval> {
        self.intensity(t, data)
    }

    fn gradient(&self, k: usize) -> ProcessResult<Array1<f64>> {
        let binding = require_binding(self.binding.as_ref())?;
        assemble_event_gradient(self, binding, k, self.num_params())
    }
}
