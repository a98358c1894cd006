//! Python-side conversion helpers used by the PyO3 bindings in `lib.rs`.
#[cfg(feature = "python-bindings")]
use pyo3::{
    exceptions::{PyTypeError, PyValueError},
    prelude::*,
    types::PyAny,
};

#[cfg(feature = "python-bindings")]
use crate::{
    observer::core::{
        data::TrialData,
        options::{OptimizerConfig, Readout},
    },
    optimization::loglik_optimizer::MLEOptions,
};

#[cfg(feature = "python-bindings")]
use numpy::{
    IntoPyArray,    // Vec → PyArray
    PyArrayMethods, // .readonly()
    PyReadonlyArray1,
};

/// Accept a 1-D numpy array, a pandas Series, or any float sequence.
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
        PyTypeError::new_err("expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64")
    })?;
    Ok(vec.into_pyarray(py).readonly())
}

/// String column (e.g. `prior_shape`) from a pandas Series or a sequence.
#[cfg(feature = "python-bindings")]
pub fn extract_str_column(raw: &Bound<'_, PyAny>) -> PyResult<Vec<String>> {
    if let Ok(list) = raw.call_method0("tolist") {
        if let Ok(values) = list.extract::<Vec<String>>() {
            return Ok(values);
        }
    }
    raw.extract::<Vec<String>>()
        .map_err(|_| PyTypeError::new_err("expected a pandas.Series or sequence of str"))
}

#[cfg(feature = "python-bindings")]
fn column_vec<'py>(py: Python<'py>, name: &str, raw: &Bound<'py, PyAny>) -> PyResult<Vec<f64>> {
    let arr = extract_f64_array(py, raw)?;
    let slice = arr.as_slice().map_err(|_| {
        PyValueError::new_err(format!("{name} must be a 1-D contiguous float64 array or sequence"))
    })?;
    Ok(slice.to_vec())
}

/// Build a validated [`TrialData`] from the six dataset columns.
#[cfg(feature = "python-bindings")]
pub fn extract_trial_data<'py>(
    py: Python<'py>, stim_mean: &Bound<'py, PyAny>, stim_std: &Bound<'py, PyAny>,
    prior_mode: &Bound<'py, PyAny>, prior_std: &Bound<'py, PyAny>,
    prior_shape: &Bound<'py, PyAny>, estimate: &Bound<'py, PyAny>,
) -> PyResult<TrialData> {
    let stim_mean = column_vec(py, "stim_mean", stim_mean)?;
    let stim_std = column_vec(py, "stim_std", stim_std)?;
    let prior_mode = column_vec(py, "prior_mode", prior_mode)?;
    let prior_std = column_vec(py, "prior_std", prior_std)?;
    let prior_shape = extract_str_column(prior_shape)?;
    let estimate = column_vec(py, "estimate", estimate)?;
    Ok(TrialData::new(&stim_mean, &stim_std, &prior_mode, &prior_std, &prior_shape, &estimate)?)
}

/// Optimizer budget from keyword arguments; `None` keeps the default.
#[cfg(feature = "python-bindings")]
pub fn extract_mle_opts(
    tol_f: Option<f64>, tol_x: Option<f64>, max_iter: Option<usize>,
    max_fun_evals: Option<usize>, verbose: Option<bool>,
) -> PyResult<MLEOptions> {
    let defaults = OptimizerConfig::default();
    let config = OptimizerConfig {
        max_iter: max_iter.unwrap_or(defaults.max_iter),
        max_fun_evals: max_fun_evals.unwrap_or(defaults.max_fun_evals),
        tol_f: tol_f.unwrap_or(defaults.tol_f),
        tol_x: tol_x.unwrap_or(defaults.tol_x),
        verbose: verbose.unwrap_or(defaults.verbose),
    };
    Ok(config.to_mle_options()?)
}

#[cfg(feature = "python-bindings")]
pub fn extract_readout(readout: Option<&str>) -> PyResult<Readout> {
    Ok(readout.unwrap_or("map").parse::<Readout>()?)
}
