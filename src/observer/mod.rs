//! observer — Bayesian observer model for circular estimation tasks.
//!
//! Purpose
//! -------
//! Model how an observer estimates a direction on the circle `[1, 360]` by
//! combining a noisy measurement with a learned von Mises prior, reading out
//! the posterior mode, and reporting it with motor noise and occasional
//! random guesses. The model parameters are fitted to trial data by
//! maximizing the likelihood of the observed estimates.
//!
//! Key behaviors
//! -------------
//! - [`core`]: the discretized circle, von Mises densities, the learned
//!   prior, circular convolution, validated datasets, parameter layouts and
//!   serde-backed fit configuration.
//! - [`models`]: the inference pipeline (posterior, MAP readout, percept
//!   likelihood, per-condition lookup), the trial-level likelihood engine
//!   and the fit entry points.
//! - [`errors`]: a single error enum, [`ObserverError`], with a coarse
//!   [`ErrorKind`] taxonomy.
//!
//! Invariants & assumptions
//! ------------------------
//! - Degrees are integers; `0` and `360` denote the same point and are
//!   stored as `360` after validation. Caller buffers are never modified.
//! - Concentrations are `>= 0`, with `0` meaning uniform and `+inf` a point
//!   mass.
//! - Every probability column handed between stages sums to one; any
//!   violation aborts the evaluation.
//!
//! Conventions
//! -----------
//! - `k_llh[j]` pairs with the j-th largest stimulus noise level and
//!   `k_prior[i]` with the i-th largest prior noise level.
//! - The full parameter vector concatenates `k_llh`, `k_prior`, `k_card`,
//!   `prior_tail`, `p_rand`, `k_m` in that order. NaN marks an unused entry.
//!
//! Downstream usage
//! ----------------
//! - Most callers need only [`TrialData`], [`ModelFixedParams`] and either
//!   [`fit_maxlogl`] or [`BayesianObserver`]; the [`prelude`] re-exports
//!   them.
//! - Configuration files deserialize into [`FitConfig`] and feed
//!   [`BayesianObserver::from_config`].
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each component. `tests/integration_observer_fit.rs`
//!   checks reference lookups, wrap handling and end-to-end fits through the
//!   public API.

pub mod core;
pub mod errors;
pub mod models;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::core::{
    CircularSpace, ConditionGrid, FitConfig, InitParams, LearnedPrior, ModelConfig,
    ModelFixedParams, ObserverParams, OptimizerConfig, ParamGroup, ParamLayout, PriorShape,
    Readout, TrialData,
};

pub use self::errors::{ErrorKind, ObserverError, ObserverResult};

pub use self::models::{BayesianObserver, Evaluation, FitResult, LikelihoodEngine, fit_maxlogl};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use circular_observer::observer::prelude::*;
//
// to import the main observer surface in a single line.

pub mod prelude {
    pub use super::{
        BayesianObserver, ErrorKind, Evaluation, FitConfig, FitResult, InitParams,
        LikelihoodEngine, ModelFixedParams, ObserverError, ObserverResult, OptimizerConfig,
        ParamGroup, PriorShape, Readout, TrialData, fit_maxlogl,
    };
}
