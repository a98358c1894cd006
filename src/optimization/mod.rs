//! optimization — MLE stack, numerical helpers, and unified error surface.
//!
//! Purpose
//! -------
//! Provide a cohesive optimization layer for model fitting, combining an
//! Argmin-backed derivative-free log-likelihood optimizer, numerically
//! stable probability helpers, and a single error/result surface. Callers
//! implement a log-likelihood, choose a budget, and obtain fitted parameters
//! and diagnostics without touching backend solver details.
//!
//! Key behaviors
//! -------------
//! - Expose a high-level API for **maximizing log-likelihoods** `ℓ(θ)`
//!   (`loglik_optimizer`) with a downhill simplex search and explicit
//!   stopping rules.
//! - Supply shared numerical primitives (`numerical_stability`) for posterior
//!   rounding, probability flooring, and column normalization.
//! - Normalize configuration issues, numerical failures, and backend solver
//!   errors into a single enum (`errors::OptError`) with a common result
//!   alias (`OptResult<T>`). Model errors raised inside the objective are
//!   carried as `OptError::Model` and restored by the model layer.
//!
//! Invariants & assumptions
//! ------------------------
//! - Optimizers assume that inputs are finite once validation has passed;
//!   invalid states are reported as `OptError`, not panics.
//! - An objective error aborts the run; nothing is retried.
//!
//! Conventions
//! -----------
//! - All solvers maximize a log-likelihood `ℓ(θ)` by minimizing an internal
//!   cost `c(θ) = -ℓ(θ)`; user-facing outcomes are expressed in terms of `ℓ`.
//! - Public optimization entrypoints that can fail return `OptResult<T>`;
//!   callers never see raw Argmin errors.
//! - Run summaries are emitted through `tracing`; installing a subscriber is
//!   left to the application.
//!
//! Downstream usage
//! ----------------
//! - `observer::models::observer` implements `LogLikelihood` for the Bayesian
//!   observer and calls `maximize`.
//! - `observer::models` uses `numerical_stability` for posterior rounding and
//!   predictive-density flooring.
//!
//! Testing notes
//! -------------
//! - `loglik_optimizer`: solver wiring, tolerance handling, and toy MLEs.
//! - `numerical_stability`: rounding, flooring, and normalization edge cases.
//! - `errors`: round-trips through `argmin::core::Error`.

pub mod errors;
pub mod loglik_optimizer;
pub mod numerical_stability;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use circular_observer::optimization::prelude::*;
//
// to import the main optimization surface in a single line.

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::loglik_optimizer::prelude::*;
    pub use super::numerical_stability::prelude::*;
}
