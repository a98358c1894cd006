//! core — circular domain, densities, dataset and configuration types.
//!
//! Purpose
//! -------
//! Collect the building blocks the Bayesian observer model is assembled
//! from: the discretized circle, von Mises densities, the learned prior,
//! circular convolution, the validated trial table with its condition grid,
//! parameter layouts, and fit configuration. Higher-level model code in
//! `observer::models` composes these into lookup tables and the likelihood.
//!
//! Key behaviors
//! -------------
//! - Define the circular domain `[1, 360]` and its wrap convention
//!   ([`CircularSpace`]).
//! - Evaluate normalized von Mises matrices ([`von_mises`]) and priors
//!   ([`LearnedPrior`]), with exact uniform and point-mass limits.
//! - Convolve probability columns on the circle ([`CircularConvolver`]).
//! - Validate and privately canonicalize datasets ([`TrialData`]) and
//!   partition them into noise conditions ([`ConditionGrid`]).
//! - Map between named parameter groups and the optimizer's flat free
//!   vector ([`ParamLayout`]).
//!
//! Invariants & assumptions
//! ------------------------
//! - Every probability column produced here sums to one over the domain.
//! - Degrees are integers; `0` is stored as `360` after validation.
//! - Noise levels are ordered descending; condition ids are
//!   `prior_idx * n_stim_levels + stim_idx`.
//!
//! Conventions
//! -----------
//! - Matrices are `(domain × columns)`: rows index degrees `1..=360`.
//! - Fallible constructors return `ObserverResult<T>`.
//!
//! Downstream usage
//! ----------------
//! - `observer::models` consumes these types to build per-condition lookup
//!   tables and evaluate the trial likelihood.
//!
//! Testing notes
//! -------------
//! - Each submodule carries unit tests for its invariants (normalization,
//!   wrap handling, index maps, configuration defaults).

pub mod convolution;
pub mod data;
pub mod density;
pub mod options;
pub mod params;
pub mod prior;
pub mod space;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::convolution::{CircularConvolver, circ_convolve, offset_kernel};
pub use self::data::{ConditionGrid, TrialData};
pub use self::density::von_mises;
pub use self::options::{FitConfig, ModelConfig, ModelFixedParams, OptimizerConfig, Readout};
pub use self::params::{InitParams, ObserverParams, ParamGroup, ParamLayout};
pub use self::prior::{LearnedPrior, PriorShape};
pub use self::space::{CircularSpace, DOMAIN_SIZE};
pub use self::validation::check_column_sums;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use circular_observer::observer::core::prelude::*;
//
// to import the main core surface in a single line.

pub mod prelude {
    pub use super::data::{ConditionGrid, TrialData};
    pub use super::density::von_mises;
    pub use super::options::{FitConfig, ModelConfig, ModelFixedParams, OptimizerConfig, Readout};
    pub use super::params::{InitParams, ObserverParams, ParamGroup, ParamLayout};
    pub use super::prior::{LearnedPrior, PriorShape};
    pub use super::space::{CircularSpace, DOMAIN_SIZE};
}
