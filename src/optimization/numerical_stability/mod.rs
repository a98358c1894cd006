//! numerical_stability — guarded arithmetic on probability tables.
//!
//! Purpose
//! -------
//! Centralize the numeric tolerances and small in-place helpers shared by the
//! observer model so every stage rounds, floors and renormalizes the same way.
//!
//! Key behaviors
//! -------------
//! - Snap posteriors to a decimal grid (`round_to_precision`) so exact
//!   equality can detect MAP ties.
//! - Replace non-positive predicted probabilities with a strictly positive
//!   floor (`floor_non_positive`) before taking logarithms.
//! - Renormalize probability columns in place (`normalize_columns`).
//! - Map concentrations to and from an unconstrained search space
//!   (`safe_softplus`, `safe_softplus_inv`).
//!
//! Invariants & assumptions
//! ------------------------
//! - Tables are `(domain × columns)` with probabilities down each column.
//! - Helpers never reject inputs; shape and range validation happens in the
//!   observer layer, which owns the error types.
//!
//! Conventions
//! -----------
//! - This module never logs or touches global state. Callers decide whether a
//!   floor application is worth a `tracing` event.
//!
//! Downstream usage
//! ----------------
//! - `observer::models::bayes` rounds posteriors with [`POSTERIOR_PRECISION`].
//! - `observer::models::engine` floors and renormalizes predictive columns.
//! - `observer::core::params` applies softplus to concentration groups.

pub mod transformations;

pub use self::transformations::{
    COLUMN_SUM_TOL, POSTERIOR_PRECISION, PROBABILITY_FLOOR, floor_non_positive, normalize_columns,
    round_to_precision, safe_softplus, safe_softplus_inv,
};

pub mod prelude {
    pub use super::transformations::{
        COLUMN_SUM_TOL, POSTERIOR_PRECISION, PROBABILITY_FLOOR, floor_non_positive,
        normalize_columns, round_to_precision, safe_softplus, safe_softplus_inv,
    };
}
