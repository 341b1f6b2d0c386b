//! Python-boundary helpers: array extraction and option parsing.
//!
//! Everything here is compiled only with the `python-bindings` feature and
//! converts loosely typed Python arguments into validated Rust values,
//! mapping failures to `ValueError` / `TypeError`.
#[cfg(feature = "python-bindings")]
use std::str::FromStr;

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    optimization::loglik_optimizer::traits::{LineSearcher, MLEOptions, Tolerances},
    process::{
        core::Sequence,
        errors::ProcessError,
        fitting::{FitOptions, ParamLink},
    },
};

#[cfg(feature = "python-bindings")]
use numpy::{
    IntoPyArray,    // Vec → PyArray
    PyArrayMethods, // .readonly()
    PyReadonlyArray1,
};

#[cfg(feature = "python-bindings")]
#[inline]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray1<f64>>() {
        if arr_ro.as_slice().is_ok() {
            return Ok(arr_ro);
        }
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(series_ro) = obj.extract::<PyReadonlyArray1<f64>>() {
            if series_ro.as_slice().is_ok() {
                return Ok(series_ro);
            }
        }
    }

    let vec: Vec<f64> = raw_data.extract().map_err(|_| {
        pyo3::exceptions::PyTypeError::new_err(
            "expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64",
        )
    })?;
    Ok(vec.into_pyarray(py).readonly())
}

/// Copy a 1-D float array-like into an owned vector.
#[cfg(feature = "python-bindings")]
pub fn extract_f64_vec<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>, what: &str,
) -> PyResult<Vec<f64>> {
    let arr = extract_f64_array(py, raw_data)?;
    let slice = arr.as_slice().map_err(|_| {
        PyValueError::new_err(format!("{what} must be a 1-D contiguous float64 array or sequence"))
    })?;
    Ok(slice.to_vec())
}

/// Build a validated [`Sequence`] from parallel `times` / `dims`.
///
/// When `t_end` is `None` the window closes at the last event (or 0 for an
/// empty history).
#[cfg(feature = "python-bindings")]
pub fn extract_sequence<'py>(
    py: Python<'py>, times: &Bound<'py, PyAny>, dims: Option<&Bound<'py, PyAny>>,
    num_dims: usize, t_end: Option<f64>,
) -> PyResult<Sequence> {
    let times = extract_f64_vec(py, times, "times")?;
    let dims: Vec<usize> = match dims {
        Some(raw) => raw.extract().map_err(|_| {
            pyo3::exceptions::PyTypeError::new_err("dims must be a sequence of non-negative ints")
        })?,
        None if num_dims == 1 => vec![0; times.len()],
        None => {
            return Err(PyValueError::new_err(
                "dims must be provided for a multi-dimensional process",
            ));
        }
    };
    let t_end = t_end.unwrap_or_else(|| times.last().copied().unwrap_or(0.0));
    Ok(Sequence::from_parts(&times, &dims, num_dims, t_end)?)
}

#[cfg(feature = "python-bindings")]
pub fn extract_mle_opts(
    tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    line_searcher: Option<&str>, verbose: Option<bool>, lbfgs_mem: Option<usize>,
) -> PyResult<MLEOptions> {
    // Fall back to the library defaults when no stopping rule is given.
    let defaults = MLEOptions::default();
    let tols = if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
        defaults.tols
    } else {
        Tolerances::new(tol_grad, tol_cost, max_iter).map_err(ProcessError::from)?
    };

    let ls = match line_searcher {
        Some(name) => LineSearcher::from_str(name).map_err(ProcessError::from)?,
        None => defaults.line_searcher,
    };

    let opts = MLEOptions::new(tols, ls, verbose.unwrap_or(false), lbfgs_mem)
        .map_err(ProcessError::from)?;
    Ok(opts)
}

#[cfg(feature = "python-bindings")]
pub fn extract_fit_options(
    tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    line_searcher: Option<&str>, verbose: Option<bool>, lbfgs_mem: Option<usize>,
    link: Option<&str>,
) -> PyResult<FitOptions> {
    let mle = extract_mle_opts(tol_grad, tol_cost, max_iter, line_searcher, verbose, lbfgs_mem)?;
    let link = match link {
        Some(name) => ParamLink::from_str(name)?,
        None => ParamLink::default(),
    };
    Ok(FitOptions::new(mle, link))
}
