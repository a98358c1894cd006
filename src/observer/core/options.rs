//! Fit configuration: fixed model settings, initial parameters and optimizer
//! budget.
//!
//! Mirrors the two-level configuration the fitting pipeline consumes:
//! `model.init_params` (named groups of initial values, which define the
//! free-parameter ordering) and `model.fixed_params` (prior shape, prior mode,
//! readout). Per-trial task settings (`stim_std`, `prior_std`) live in
//! [`TrialData`](crate::observer::core::data::TrialData).
//!
//! All structs derive `serde` so a fit can be described in JSON; defaults are
//! filled through `#[serde(default = ...)]` and re-validated by
//! [`FitConfig::validate`].
use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    observer::{
        core::{
            data::TrialData,
            params::{InitParams, ParamGroup},
            prior::PriorShape,
            space::CircularSpace,
            validation::unique_sorted,
        },
        errors::{ObserverError, ObserverResult},
    },
    optimization::{
        loglik_optimizer::{MLEOptions, SimplexOptions, Tolerances},
        numerical_stability::POSTERIOR_PRECISION,
    },
};

/// Decision rule mapping a posterior to percept(s).
///
/// Only maximum-a-posteriori is implemented; parsing any other name returns
/// `ObserverError::UnsupportedReadout`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Readout {
    #[default]
    #[serde(rename = "map")]
    Map,
}

impl FromStr for Readout {
    type Err = ObserverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "map" => Ok(Readout::Map),
            _ => Err(ObserverError::UnsupportedReadout { name: s.to_string() }),
        }
    }
}

impl fmt::Display for Readout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Readout::Map => write!(f, "map"),
        }
    }
}

fn default_posterior_precision() -> f64 {
    POSTERIOR_PRECISION
}

/// Settings held constant during a fit (`model.fixed_params`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelFixedParams {
    pub prior_shape: PriorShape,
    /// Prior mode in `[1, 360]`.
    pub prior_mode: f64,
    pub readout: Readout,
    /// Rounding grid applied to posteriors before MAP tie detection.
    #[serde(default = "default_posterior_precision")]
    pub posterior_precision: f64,
}

impl ModelFixedParams {
    /// Build fixed settings with the default posterior precision.
    ///
    /// # Errors
    /// - `InvalidDegree` / `NonFiniteData` if `prior_mode` is not an integer
    ///   degree in `[0, 360]`.
    pub fn new(prior_shape: PriorShape, prior_mode: f64, readout: Readout) -> ObserverResult<Self> {
        let prior_mode = CircularSpace::check_degree("prior_mode", 0, prior_mode)?;
        Ok(Self { prior_shape, prior_mode, readout, posterior_precision: POSTERIOR_PRECISION })
    }

    /// Replace the posterior rounding precision.
    pub fn with_posterior_precision(mut self, precision: f64) -> ObserverResult<Self> {
        if !precision.is_finite() || precision <= 0.0 {
            return Err(ObserverError::InvalidPrecision { value: precision });
        }
        self.posterior_precision = precision;
        Ok(self)
    }

    /// Take the prior mode and shape from the dataset, which must hold a
    /// single value of each.
    pub fn from_data(data: &TrialData, readout: Readout) -> ObserverResult<Self> {
        let modes = unique_sorted(&data.prior_mode.to_vec(), false);
        if modes.len() != 1 {
            return Err(ObserverError::NonUniqueFixedParam { name: "prior_mode" });
        }
        let shape = data.prior_shape[0];
        if data.prior_shape.iter().any(|&s| s != shape) {
            return Err(ObserverError::NonUniqueFixedParam { name: "prior_shape" });
        }
        Self::new(shape, modes[0], readout)
    }

    /// Re-check values that may have bypassed [`ModelFixedParams::new`]
    /// (e.g. deserialized configurations).
    pub fn validate(&self) -> ObserverResult<()> {
        CircularSpace::check_degree("prior_mode", 0, self.prior_mode)?;
        if !self.posterior_precision.is_finite() || self.posterior_precision <= 0.0 {
            return Err(ObserverError::InvalidPrecision { value: self.posterior_precision });
        }
        Ok(())
    }
}

fn default_max_iter() -> usize {
    100
}
fn default_max_fun_evals() -> usize {
    100
}
fn default_tol() -> f64 {
    1e-4
}

/// Serializable optimizer budget; converted into [`MLEOptions`] for a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,
    #[serde(default = "default_max_fun_evals")]
    pub max_fun_evals: usize,
    #[serde(default = "default_tol")]
    pub tol_f: f64,
    #[serde(default = "default_tol")]
    pub tol_x: f64,
    #[serde(default)]
    pub verbose: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_iter: default_max_iter(),
            max_fun_evals: default_max_fun_evals(),
            tol_f: default_tol(),
            tol_x: default_tol(),
            verbose: false,
        }
    }
}

impl OptimizerConfig {
    pub fn to_mle_options(&self) -> ObserverResult<MLEOptions> {
        let tols = Tolerances::new(
            Some(self.tol_f),
            Some(self.tol_x),
            Some(self.max_iter),
            Some(self.max_fun_evals),
        )?;
        Ok(MLEOptions::new(tols, SimplexOptions::default(), self.verbose)?)
    }
}

/// `model` section of a fit configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Initial values; `None` uses [`InitParams::default_for`].
    #[serde(default)]
    pub init_params: Option<InitParams>,
    pub fixed_params: ModelFixedParams,
    /// Groups held at their initial values.
    #[serde(default)]
    pub fixed_groups: Vec<ParamGroup>,
}

/// Complete description of a fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitConfig {
    pub model: ModelConfig,
    #[serde(default)]
    pub optimizer: OptimizerConfig,
}

impl FitConfig {
    pub fn validate(&self) -> ObserverResult<()> {
        self.model.fixed_params.validate()?;
        self.optimizer.to_mle_options()?;
        Ok(())
    }
}
