//! models — the Bayesian observer pipeline and its fit entry points.
//!
//! Purpose
//! -------
//! Turn the building blocks in `observer::core` into a trial-level
//! likelihood and fit it by maximum likelihood. Each stage is its own
//! component so it can be tested in isolation:
//! posterior → percept(s) → `P(percept | stimulus)` → lapse mixing → motor
//! noise → trial likelihood.
//!
//! Key behaviors
//! -------------
//! - [`BayesCombiner`] multiplies likelihood and prior columns, normalizes
//!   them, and rounds to the posterior precision.
//! - [`PerceptSelector`] applies the MAP readout and keeps every tied mode.
//! - [`PerceptLikelihoodAggregator`] splits each measurement's probability
//!   equally across its percepts and sums by stimulus.
//! - [`ConditionLookup`] builds one `(360 × n_stimuli)` table per occupied
//!   `(stim_std, prior_std)` condition.
//! - [`LikelihoodEngine`] mixes, convolves, floors and scores the dataset.
//! - [`BayesianObserver`] implements [`LogLikelihood`] on the free parameter
//!   vector and drives the simplex search; [`fit_maxlogl`] is the
//!   default-settings shortcut.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every column a stage hands on sums to one within `1e-9`; violations
//!   abort the evaluation with `ColumnSumViolation`.
//! - Tables are rebuilt on every evaluation; nothing is cached across
//!   parameter vectors.
//! - Components are stateless apart from their fixed settings, so a single
//!   engine can be shared read-only.
//!
//! Conventions
//! -----------
//! - Matrices are `(domain × columns)`: rows index degrees `1..=360`.
//! - Errors are reported as [`ObserverResult`]; inside the optimizer they
//!   travel as `OptError::Model` and are restored on the way out.
//!
//! Downstream usage
//! ----------------
//! - Build [`TrialData`], pick [`ModelFixedParams`], then either call
//!   [`fit_maxlogl`] or construct a [`BayesianObserver`] with custom initial
//!   values, fixed groups and budget.
//! - Use [`LikelihoodEngine::predictive_density`] for predictions at given
//!   parameters without scoring.
//!
//! Testing notes
//! -------------
//! - Unit tests in each submodule cover tie handling, the degenerate
//!   posterior path, lookup orientation, lapse/motor stages and fit
//!   bookkeeping. End-to-end fits live under `tests/`.
//!
//! [`LogLikelihood`]: crate::optimization::loglik_optimizer::LogLikelihood
//! [`ObserverResult`]: crate::observer::errors::ObserverResult
//! [`TrialData`]: crate::observer::core::TrialData
//! [`ModelFixedParams`]: crate::observer::core::ModelFixedParams

pub mod bayes;
pub mod engine;
pub mod lookup;
pub mod observer;
pub mod percept;
pub mod readout;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::bayes::BayesCombiner;
pub use self::engine::{Evaluation, LikelihoodEngine};
pub use self::lookup::{ConditionLookup, percept_likelihood};
pub use self::observer::{BayesianObserver, FitResult, fit_maxlogl};
pub use self::percept::PerceptLikelihoodAggregator;
pub use self::readout::{PerceptCandidates, PerceptSelector};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use circular_observer::observer::models::prelude::*;
//
// to import the main model surface in a single line.

pub mod prelude {
    pub use super::engine::{Evaluation, LikelihoodEngine};
    pub use super::observer::{BayesianObserver, FitResult, fit_maxlogl};
}
