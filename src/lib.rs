//! circular_observer — Bayesian observer model for circular estimation, with
//! Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that exposes
//! the observer fit to Python via the `_circular_observer` extension module.
//! When the `python-bindings` feature is enabled, this module defines the
//! Python-facing class and submodule used by the `circular_observer` package.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules (`observer` and `optimization`) as the
//!   public crate surface.
//! - Define the `#[pyclass]` wrapper and the `#[pymodule]` initializer for
//!   the `_circular_observer` Python extension.
//! - Register the `observer_models` submodule under `circular_observer` so
//!   that dot-notation imports work as expected.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work is implemented in the inner Rust modules; this file
//!   performs only FFI glue, input conversion, and error mapping.
//! - Python inputs are copied into validated [`observer::TrialData`]; caller
//!   arrays are never modified.
//!
//! Conventions
//! -----------
//! - Degrees, parameter ordering and noise-level ordering follow the
//!   documentation of [`observer`].
//! - Errors from core Rust code are propagated as rich error types internally
//!   and converted to `ValueError` at the PyO3 boundary.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code should depend directly on [`observer`] (or its
//!   prelude) and can ignore the PyO3 items guarded by `python-bindings`.
//! - The Python packaging layer imports `_circular_observer` and wraps its
//!   classes in user-facing APIs.
//!
//! Testing notes
//! -------------
//! - Core numerical behavior is covered by unit tests in the inner modules and
//!   by `tests/integration_observer_fit.rs`.

pub mod observer;
pub mod optimization;
pub mod utils;

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    observer::{
        core::{options::ModelFixedParams, params::ParamGroup},
        models::observer::{BayesianObserver, FitResult},
    },
    utils::{extract_mle_opts, extract_readout, extract_trial_data},
};

/// ObserverFit — Python-facing result of a Bayesian observer fit.
///
/// Purpose
/// -------
/// Fit the observer to a dataset passed from Python and expose the fit
/// summary as read-only properties.
///
/// Parameters
/// ----------
/// Constructed from Python via
/// `ObserverFit(stim_mean, stim_std, prior_mode, prior_std, prior_shape,
/// estimate, readout="map", fixed_groups=None, tol_f=None, tol_x=None,
/// max_iter=None, max_fun_evals=None, verbose=None)`:
/// - The six dataset columns are array-likes of equal length;
///   `prior_shape` holds strings.
/// - `fixed_groups`: names of parameter groups held at their defaults
///   (`"k_llh"`, `"k_prior"`, `"k_card"`, `"prior_tail"`, `"p_rand"`, `"k_m"`).
///
/// Notes
/// -----
/// - Prior mode and shape are taken from the dataset and must be unique.
/// - Native Rust code should use [`BayesianObserver`] directly.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "circular_observer.observer_models")]
pub struct ObserverFit {
    inner: FitResult,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl ObserverFit {
    #[new]
    #[pyo3(
        signature = (
            stim_mean,
            stim_std,
            prior_mode,
            prior_std,
            prior_shape,
            estimate,
            readout = None,
            fixed_groups = None,
            tol_f = None,
            tol_x = None,
            max_iter = None,
            max_fun_evals = None,
            verbose = None,
        ),
        text_signature = "(stim_mean, stim_std, prior_mode, prior_std, prior_shape, estimate, \
                          /, readout='map', fixed_groups=None, tol_f=None, tol_x=None, \
                          max_iter=None, max_fun_evals=None, verbose=None)"
    )]
    pub fn new<'py>(
        py: Python<'py>, stim_mean: &Bound<'py, PyAny>, stim_std: &Bound<'py, PyAny>,
        prior_mode: &Bound<'py, PyAny>, prior_std: &Bound<'py, PyAny>,
        prior_shape: &Bound<'py, PyAny>, estimate: &Bound<'py, PyAny>, readout: Option<&str>,
        fixed_groups: Option<Vec<String>>, tol_f: Option<f64>, tol_x: Option<f64>,
        max_iter: Option<usize>, max_fun_evals: Option<usize>, verbose: Option<bool>,
    ) -> PyResult<Self> {
        let data = extract_trial_data(
            py,
            stim_mean,
            stim_std,
            prior_mode,
            prior_std,
            prior_shape,
            estimate,
        )?;
        let fixed = ModelFixedParams::from_data(&data, extract_readout(readout)?)?;
        let fixed_groups = fixed_groups
            .unwrap_or_default()
            .iter()
            .map(|name| name.parse::<ParamGroup>())
            .collect::<Result<Vec<_>, _>>()?;
        let options = extract_mle_opts(tol_f, tol_x, max_iter, max_fun_evals, verbose)?;

        let mut model = BayesianObserver::new(data, fixed, None, &fixed_groups, options)?;
        let inner = py.allow_threads(|| model.fit())?;
        Ok(ObserverFit { inner })
    }

    #[getter]
    pub fn neg_log_likelihood_trace(&self) -> Vec<f64> {
        self.inner.neg_log_likelihood_trace.clone()
    }

    #[getter]
    pub fn best_fit_params(&self) -> Vec<f64> {
        self.inner.best_fit_params.to_vec()
    }

    #[getter]
    pub fn neg_log_likelihood(&self) -> f64 {
        self.inner.neg_log_likelihood
    }

    #[getter]
    pub fn aic(&self) -> f64 {
        self.inner.aic
    }

    #[getter]
    pub fn converged(&self) -> bool {
        self.inner.converged
    }

    #[getter]
    pub fn status(&self) -> String {
        self.inner.status.clone()
    }

    #[getter]
    pub fn iterations(&self) -> usize {
        self.inner.iterations
    }
}

/// _circular_observer — PyO3 module initializer for the Python extension.
///
/// Creates the `observer_models` submodule, attaches it to the parent
/// module, and registers it in `sys.modules` so
/// `circular_observer.observer_models` is importable by dotted path.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _circular_observer<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let observer_models_mod = PyModule::new(_py, "observer_models")?;
    observer_models(_py, m, &observer_models_mod)?;

    // Manually add the submodule into sys.modules to allow for dot notation.
    _py.import("sys")?
        .getattr("modules")?
        .set_item("circular_observer.observer_models", observer_models_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn observer_models<'py>(
    _py: Python, circular_observer: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<ObserverFit>()?;
    circular_observer.add_submodule(m)?;
    Ok(())
}
