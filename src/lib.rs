//! rust_pointprocess — parametric temporal point processes with Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that exposes
//! point-process models to Python via the `_rust_pointprocess` extension
//! module. When the `python-bindings` feature is enabled, this module defines
//! the Python-facing classes and submodules used by the `rust_pointprocess`
//! package.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules (`process` and `optimization`) as the
//!   public crate surface.
//! - Define `#[pyclass]` wrappers and the `#[pymodule]` initializer for the
//!   `_rust_pointprocess` Python extension.
//! - Create and register Python submodules (`models`, `diagnostics`) under
//!   `rust_pointprocess` so that dot-notation imports work as expected.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work is implemented in the inner Rust modules; this file
//!   performs only FFI glue, input conversion, and error mapping.
//! - The Python `PointProcess` class holds a `Box<dyn PointProcess>`, so every
//!   family goes through the same trait-level contract as Rust callers.
//!
//! Conventions
//! -----------
//! - Event histories cross the boundary as parallel `times` / `dims` arrays.
//! - Errors from core Rust code are propagated as rich error types internally
//!   and converted to `PyErr` values at the PyO3 boundary.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code should depend directly on `process` (usually through
//!   `process::prelude`) and can ignore the PyO3 items guarded by the
//!   `python-bindings` feature.
//! - The Python packaging layer imports `_rust_pointprocess` and wraps its
//!   classes in user-facing Python APIs.
//!
//! Testing notes
//! -------------
//! - Core behavior is covered by unit tests in the inner modules and by the
//!   end-to-end test in `tests/`.

pub mod optimization;
pub mod process;
pub mod utils;

#[cfg(feature = "python-bindings")]
use ndarray::Array1;

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    process::{
        core::Sequence,
        diagnostics::{RescalingOpts, ks_exp1, time_rescaling},
        fitting::{FitOutcome, fit},
        models::{ExpHawkes, HomogeneousPoisson, PointProcess, SelfCorrecting},
        simulation::{SimOpts, simulate},
    },
    utils::{extract_f64_vec, extract_fit_options, extract_sequence},
};

/// PointProcess — Python-facing wrapper for any point-process family.
///
/// Purpose
/// -------
/// Expose the [`PointProcess`] contract to Python together with fitting,
/// simulation, and time-rescaling, independent of the concrete family.
///
/// Parameters
/// ----------
/// Constructed from Python via factory-style static methods:
/// - `PointProcess.poisson(num_dims)`
/// - `PointProcess.hawkes(num_dims, decay)`: exponential kernels with a
///   uniform decay rate.
/// - `PointProcess.self_correcting(num_dims, look_ahead=1.0)`
///
/// Fields
/// ------
/// - `inner`: `Box<dyn PointProcess>`
///   The family instance, holding parameters and the bound history.
///
/// Notes
/// -----
/// - Marked `unsendable`: the instance stays on the Python thread that
///   created it.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_pointprocess.models", name = "PointProcess", unsendable)]
pub struct PyPointProcess {
    inner: Box<dyn PointProcess>,
}

#[cfg(feature = "python-bindings")]
impl PyPointProcess {
    /// The explicit `times`/`dims` if given, otherwise the bound history.
    fn data_or_history<'py>(
        &self, py: Python<'py>, times: Option<&Bound<'py, PyAny>>,
        dims: Option<&Bound<'py, PyAny>>,
    ) -> PyResult<Sequence> {
        match times {
            Some(times) => extract_sequence(py, times, dims, self.inner.num_dims(), None),
            None => Ok(self.inner.bound_history()?.sequence().clone()),
        }
    }
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PyPointProcess {
    #[staticmethod]
    #[pyo3(signature = (num_dims), text_signature = "(num_dims, /)")]
    pub fn poisson(num_dims: usize) -> PyResult<Self> {
        Ok(Self { inner: Box::new(HomogeneousPoisson::new(num_dims)?) })
    }

    #[staticmethod]
    #[pyo3(signature = (num_dims, decay), text_signature = "(num_dims, decay, /)")]
    pub fn hawkes(num_dims: usize, decay: f64) -> PyResult<Self> {
        Ok(Self { inner: Box::new(ExpHawkes::with_uniform_decay(num_dims, decay)?) })
    }

    #[staticmethod]
    #[pyo3(signature = (num_dims, look_ahead = 1.0), text_signature = "(num_dims, /, look_ahead=1.0)")]
    pub fn self_correcting(num_dims: usize, look_ahead: f64) -> PyResult<Self> {
        Ok(Self { inner: Box::new(SelfCorrecting::new(num_dims, look_ahead)?) })
    }

    #[getter]
    pub fn name(&self) -> &'static str {
        self.inner.name()
    }

    #[getter]
    pub fn num_dims(&self) -> usize {
        self.inner.num_dims()
    }

    #[getter]
    pub fn num_params(&self) -> usize {
        self.inner.num_params()
    }

    #[getter]
    pub fn is_bound(&self) -> bool {
        self.inner.is_bound()
    }

    pub fn parameters(&self) -> Vec<f64> {
        self.inner.parameters().to_vec()
    }

    pub fn set_parameters<'py>(&mut self, py: Python<'py>, values: &Bound<'py, PyAny>) -> PyResult<()> {
        let values = extract_f64_vec(py, values, "values")?;
        self.inner.set_parameters(Array1::from(values))?;
        Ok(())
    }

    #[pyo3(signature = (times, dims = None, t_end = None), text_signature = "(times, /, dims=None, t_end=None)")]
    pub fn bind<'py>(
        &mut self, py: Python<'py>, times: &Bound<'py, PyAny>, dims: Option<&Bound<'py, PyAny>>,
        t_end: Option<f64>,
    ) -> PyResult<()> {
        let seq = extract_sequence(py, times, dims, self.inner.num_dims(), t_end)?;
        self.inner.bind(seq)?;
        Ok(())
    }

    /// Negative log-likelihood of the bound history and its gradient.
    pub fn neg_loglikelihood(&self) -> PyResult<(f64, Vec<f64>)> {
        let nll = self.inner.neg_loglikelihood()?;
        Ok((nll.value, nll.gradient.to_vec()))
    }

    /// `(total, per_dim)` intensity at `t`, against `times`/`dims` or the bound history.
    #[pyo3(signature = (t, times = None, dims = None), text_signature = "(t, /, times=None, dims=None)")]
    pub fn intensity<'py>(
        &self, py: Python<'py>, t: f64, times: Option<&Bound<'py, PyAny>>,
        dims: Option<&Bound<'py, PyAny>>,
    ) -> PyResult<(f64, Vec<f64>)> {
        let data = self.data_or_history(py, times, dims)?;
        let eval = self.inner.intensity(t, &data)?;
        Ok((eval.total, eval.per_dim.to_vec()))
    }

    #[pyo3(signature = (t, times = None, dims = None), text_signature = "(t, /, times=None, dims=None)")]
    pub fn intensity_upper_bound<'py>(
        &self, py: Python<'py>, t: f64, times: Option<&Bound<'py, PyAny>>,
        dims: Option<&Bound<'py, PyAny>>,
    ) -> PyResult<(f64, Vec<f64>)> {
        let data = self.data_or_history(py, times, dims)?;
        let eval = self.inner.intensity_upper_bound(t, &data)?;
        Ok((eval.total, eval.per_dim.to_vec()))
    }

    pub fn gradient(&self, k: usize) -> PyResult<Vec<f64>> {
        Ok(self.inner.gradient(k)?.to_vec())
    }

    #[pyo3(
        signature = (
            initial,
            tol_grad = None,
            tol_cost = None,
            max_iter = None,
            line_searcher = None,
            verbose = None,
            lbfgs_mem = None,
            link = None,
        ),
        text_signature = "(initial, /, tol_grad=None, tol_cost=None, max_iter=None, \
                          line_searcher=None, verbose=None, lbfgs_mem=None, link=None)"
    )]
    pub fn fit<'py>(
        &mut self, py: Python<'py>, initial: &Bound<'py, PyAny>, tol_grad: Option<f64>,
        tol_cost: Option<f64>, max_iter: Option<usize>, line_searcher: Option<&str>,
        verbose: Option<bool>, lbfgs_mem: Option<usize>, link: Option<&str>,
    ) -> PyResult<PyFitOutcome> {
        let initial = Array1::from(extract_f64_vec(py, initial, "initial")?);
        let opts =
            extract_fit_options(tol_grad, tol_cost, max_iter, line_searcher, verbose, lbfgs_mem, link)?;
        let inner = fit(self.inner.as_mut(), initial, &opts)?;
        Ok(PyFitOutcome { inner })
    }

    /// Simulate on `[0, horizon]`; returns `(times, dims, t_end)`.
    ///
    /// `t_end` is `horizon`, or the last event time when `max_events` stopped
    /// the run. Pass it to `bind` to refit the realization.
    #[pyo3(signature = (horizon, seed = None, max_events = None), text_signature = "(horizon, /, seed=None, max_events=None)")]
    pub fn simulate(
        &self, horizon: f64, seed: Option<u64>, max_events: Option<usize>,
    ) -> PyResult<(Vec<f64>, Vec<usize>, f64)> {
        let opts = SimOpts::new(horizon, seed, max_events)?;
        let seq = simulate(self.inner.as_ref(), &opts)?;
        Ok((seq.times(), seq.dims(), seq.t_end()))
    }

    /// Rescaled inter-event times per dimension for the bound history.
    #[pyo3(signature = (panels = None), text_signature = "(/, panels=None)")]
    pub fn rescaled_times(&self, panels: Option<usize>) -> PyResult<Vec<Vec<f64>>> {
        let opts = match panels {
            Some(p) => RescalingOpts::new(p)?,
            None => RescalingOpts::default(),
        };
        let seq = self.inner.bound_history()?.sequence();
        Ok(time_rescaling(self.inner.as_ref(), seq, &opts)?.per_dim)
    }
}

/// FitResult — read-only view of a [`FitOutcome`] for Python callers.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_pointprocess.models", name = "FitResult")]
pub struct PyFitOutcome {
    inner: FitOutcome,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PyFitOutcome {
    #[getter]
    pub fn params(&self) -> Vec<f64> {
        self.inner.params.to_vec()
    }

    #[getter]
    pub fn neg_loglikelihood(&self) -> f64 {
        self.inner.neg_loglikelihood
    }

    #[getter]
    pub fn converged(&self) -> bool {
        self.inner.optim.converged
    }

    #[getter]
    pub fn status(&self) -> String {
        self.inner.optim.status.clone()
    }

    #[getter]
    pub fn iterations(&self) -> usize {
        self.inner.optim.iterations
    }

    #[getter]
    pub fn grad_norm(&self) -> Option<f64> {
        self.inner.optim.grad_norm
    }

    #[getter]
    pub fn fn_evals(&self) -> Vec<(String, u64)> {
        self.inner.optim.fn_evals.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }
}

/// Kolmogorov–Smirnov test of residuals against Exp(1); returns
/// `(statistic, p_value)`.
#[cfg(feature = "python-bindings")]
#[pyfunction(name = "ks_exp1")]
fn py_ks_exp1<'py>(py: Python<'py>, samples: &Bound<'py, PyAny>) -> PyResult<(f64, f64)> {
    let samples = extract_f64_vec(py, samples, "samples")?;
    let out = ks_exp1(&samples)?;
    Ok((out.statistic, out.p_value))
}

/// _rust_pointprocess — PyO3 module initializer for the Python extension.
///
/// Creates the `models` and `diagnostics` submodules, attaches them to the
/// parent module, and registers them in `sys.modules` so they are importable
/// via dotted paths from Python.
///
/// # Errors
/// `PyErr` if creating submodules or manipulating `sys.modules` fails.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_pointprocess<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let models_mod = PyModule::new(_py, "models")?;
    let diagnostics_mod = PyModule::new(_py, "diagnostics")?;
    models(_py, m, &models_mod)?;
    diagnostics(_py, m, &diagnostics_mod)?;

    // Manually add submodules into sys.modules to allow for dot notation.
    _py.import("sys")?.getattr("modules")?.set_item("rust_pointprocess.models", models_mod)?;

    _py.import("sys")?
        .getattr("modules")?
        .set_item("rust_pointprocess.diagnostics", diagnostics_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn models<'py>(
    _py: Python, rust_pointprocess: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<PyPointProcess>()?;
    m.add_class::<PyFitOutcome>()?;
    rust_pointprocess.add_submodule(m)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn diagnostics<'py>(
    _py: Python, rust_pointprocess: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(py_ks_exp1, m)?)?;
    rust_pointprocess.add_submodule(m)?;
    Ok(())
}
