//! loglik_optimizer — MLE-friendly, argmin-powered log-likelihood optimizer.
//!
//! Purpose
//! -------
//! Provide a high-level, Argmin-backed optimization layer for **maximizing
//! log-likelihoods** `ℓ(θ)` whose gradients are unavailable. Callers
//! implement a single trait, [`LogLikelihood`], and invoke [`maximize`] to
//! run a downhill simplex with a fixed evaluation budget.
//!
//! Key behaviors
//! -------------
//! - Convert user-supplied log-likelihoods `ℓ(θ)` into Argmin-compatible
//!   cost functions `c(θ) = -ℓ(θ)` via [`adapter::ArgMinAdapter`].
//! - Expose a single, user-facing entrypoint [`maximize`] that:
//!   - validates the initial guess with [`LogLikelihood::check`],
//!   - builds the initial simplex via [`builders`],
//!   - executes [`simplex::SimplexSearch`] via [`run::run_simplex`], and
//!   - normalizes results into an [`OptimOutcome`].
//! - Centralize optimizer configuration ([`Tolerances`], [`SimplexOptions`],
//!   [`MLEOptions`]) and validation logic ([`validation`]) so downstream code
//!   can assume sane, finite inputs.
//!
//! Invariants & assumptions
//! ------------------------
//! - The optimizer **always maximizes** a log-likelihood `ℓ(θ)` by minimizing
//!   a cost `c(θ) = -ℓ(θ)`; user code implements `ℓ(θ)`, never the cost.
//! - [`LogLikelihood::value`] must report invalid inputs as [`OptError`]
//!   values, not panics. The first error aborts the run and is returned
//!   unchanged.
//! - Configuration types are validated on construction and are treated as
//!   internally consistent by the solver layer.
//!
//! Conventions
//! -----------
//! - Parameters are [`Theta`] (`Array1<f64>`). Any mapping from named model
//!   groups to the free vector happens in the model layer.
//! - All user-facing diagnostics (including [`OptimOutcome::value`]) are in
//!   terms of `ℓ`; [`OptimOutcome::cost_trace`] is in terms of `c = -ℓ`.
//!
//! Downstream usage
//! ----------------
//! - Model code implements [`LogLikelihood`] and calls [`maximize`] with the
//!   model, a starting vector, a data payload, and [`MLEOptions`].
//!
//! Testing notes
//! -------------
//! - Unit tests in submodules cover the sign convention in [`adapter`], the
//!   simplex layout in [`builders`], convergence and budget handling in
//!   [`simplex`], configuration invariants in [`traits`], and an end-to-end
//!   toy fit in [`api`].
//!
//! [`OptError`]: crate::optimization::errors::OptError

pub mod adapter;
pub mod api;
pub mod builders;
pub mod run;
pub mod simplex;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::maximize;
pub use self::simplex::SimplexSearch;
pub use self::traits::{LogLikelihood, MLEOptions, OptimOutcome, SimplexOptions, Tolerances};
pub use self::types::{Cost, FnEvalMap, SimplexState, Theta};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use circular_observer::optimization::loglik_optimizer::prelude::*;
//
// to import the main optimizer surface in a single line.

pub mod prelude {
    pub use super::api::maximize;
    pub use super::traits::{LogLikelihood, MLEOptions, OptimOutcome, SimplexOptions, Tolerances};
    pub use super::types::{Cost, Theta};
}
