//! loglik_optimizer::types — shared numeric aliases and solver wiring.
//!
//! Purpose
//! -------
//! Centralize the core numeric types used by the log-likelihood optimizer so
//! the rest of the optimization code stays agnostic to `ndarray` and Argmin
//! generics.
//!
//! Key behaviors
//! -------------
//! - Define canonical aliases for parameter vectors and scalar costs
//!   (`Theta`, `Cost`).
//! - Provide a standard map type for Argmin function-evaluation counters
//!   (`FnEvalMap`).
//! - Pin the Argmin state type the simplex solver runs on (`SimplexState`).
//!
//! Invariants & assumptions
//! ------------------------
//! - All optimizer vectors are `ndarray` containers over `f64`.
//! - `Cost` is always the minimized quantity `c(θ) = -ℓ(θ)`.
//!
//! Testing notes
//! -------------
//! - This module only defines type aliases and constants; there are no
//!   dedicated unit tests.
use argmin::core::IterState;
use ndarray::Array1;
use std::collections::HashMap;

/// Parameter vector `θ` for log-likelihood optimization.
///
/// Alias for `ndarray::Array1<f64>`, used as the canonical parameter type
/// throughout the optimizer.
pub type Theta = Array1<f64>;

/// Scalar objective value used by the optimizer.
///
/// In this crate, this is the cost `c(θ) = -ℓ(θ)` derived from a
/// log-likelihood `ℓ(θ)`.
pub type Cost = f64;

/// Function-evaluation counters as reported by the solver.
///
/// Maps human-readable counter names (e.g., `"cost_count"`) to counts.
pub type FnEvalMap = HashMap<String, u64>;

/// Argmin state for derivative-free runs: parameters and cost only.
pub type SimplexState = IterState<Theta, (), (), (), (), Cost>;

/// Relative perturbation applied to non-zero coordinates of `θ₀` when
/// building the initial simplex.
pub const DEFAULT_NONZERO_DELTA: f64 = 0.05;

/// Absolute value assigned to zero coordinates of `θ₀` when building the
/// initial simplex.
pub const DEFAULT_ZERO_DELTA: f64 = 0.00025;
