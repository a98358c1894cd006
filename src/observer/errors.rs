//! Errors for the Bayesian observer model (dataset validation, configuration
//! checks, probability invariants, and optimizer failures).
//!
//! This module defines the model error type, [`ObserverError`], and a coarse
//! classification, [`ErrorKind`], so callers can tell configuration mistakes
//! apart from numerical-invariant failures without matching every variant.
//!
//! ## Conventions
//! - **Indices are 0-based** (trial, measurement and column positions).
//! - Degrees are reported as stored: after canonicalization `0` reads `360`.
//! - Every error aborts the evaluation that raised it; there is no retry or
//!   silent repair. The probability floor applied to predictive columns is a
//!   stabilization step and never surfaces here.
//! - Optimizer/backend errors are normalized to [`ObserverError::Optimization`]
//!   unless they wrap a model error, which is restored unchanged.
#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*};

use crate::optimization::errors::OptError;

/// Result alias for observer operations that may produce [`ObserverError`].
pub type ObserverResult<T> = Result<T, ObserverError>;

/// Coarse classification of [`ObserverError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A probability table broke a structural guarantee (sums, ranges, signs).
    InvariantViolation,
    /// A requested feature exists in the configuration surface but is not supported.
    UnsupportedConfiguration,
    /// Malformed dataset or configuration detected before evaluation.
    InvalidInput,
    /// Solver or backend failure not caused by the model itself.
    Optimization,
}

/// Unified error type for the observer model.
#[derive(Debug, Clone, PartialEq)]
pub enum ObserverError {
    // ---- Invariant violations ----
    /// A probability column does not sum to one within tolerance.
    ColumnSumViolation { stage: &'static str, column: usize, sum: f64 },

    /// A measurement produced no MAP candidate.
    MissingPercept { measurement: usize },

    /// A percept candidate fell outside `[1, 360]`.
    PerceptOutOfRange { measurement: usize, percept: f64 },

    /// A gathered trial likelihood is `<= 0` after flooring.
    NonPositiveLikelihood { trial: usize, value: f64 },

    /// A gathered trial likelihood is NaN or infinite.
    NonFiniteLikelihood { trial: usize, value: f64 },

    /// A trial references a lookup table that was never built.
    MissingLookup { trial: usize, condition: usize },

    // ---- Unsupported configuration ----
    /// Readout policy other than `"map"`.
    UnsupportedReadout { name: String },

    /// Prior shape tag other than `"vonMisesPrior"`.
    UnsupportedPriorShape { name: String },

    /// Posterior columns collapsed to NaN for a concentration pair outside the
    /// doubly-infinite case.
    DegeneratePosterior { k_llh: f64, k_prior: f64, n_columns: usize },

    // ---- Input validation ----
    /// Concentration is negative or NaN.
    InvalidConcentration { name: &'static str, value: f64 },

    /// Dataset has no trials.
    EmptyData,

    /// Dataset columns have different lengths.
    ColumnLengthMismatch { column: &'static str, expected: usize, actual: usize },

    /// A numeric dataset cell is NaN/±inf.
    NonFiniteData { column: &'static str, index: usize, value: f64 },

    /// A degree value is not an integer in `[0, 360]`.
    InvalidDegree { column: &'static str, index: usize, value: f64 },

    /// A per-trial column expected to be constant holds several values.
    NonUniqueFixedParam { name: &'static str },

    /// A parameter group has the wrong number of entries.
    GroupLengthMismatch { group: &'static str, expected: usize, actual: usize },

    /// Parameter group name not recognized.
    UnknownParamGroup { name: String },

    /// A parameter group consumed by the model contains NaN.
    MissingParameter { group: &'static str, index: usize },

    /// A flat parameter vector has the wrong length for the layout.
    ParamLengthMismatch { expected: usize, actual: usize },

    /// Posterior rounding precision is not finite and positive.
    InvalidPrecision { value: f64 },

    /// Every parameter is fixed or unused, leaving nothing to optimize.
    NoFreeParameters,

    // ---- Estimation ----
    /// Optimizer/backend failure.
    Optimization { text: String },
}

impl ObserverError {
    /// Classify the error into the taxonomy callers branch on.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ObserverError::ColumnSumViolation { .. }
            | ObserverError::MissingPercept { .. }
            | ObserverError::PerceptOutOfRange { .. }
            | ObserverError::NonPositiveLikelihood { .. }
            | ObserverError::NonFiniteLikelihood { .. }
            | ObserverError::MissingLookup { .. } => ErrorKind::InvariantViolation,
            ObserverError::UnsupportedReadout { .. }
            | ObserverError::UnsupportedPriorShape { .. }
            | ObserverError::DegeneratePosterior { .. } => ErrorKind::UnsupportedConfiguration,
            ObserverError::Optimization { .. } => ErrorKind::Optimization,
            _ => ErrorKind::InvalidInput,
        }
    }
}

impl std::error::Error for ObserverError {}

impl std::fmt::Display for ObserverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObserverError::ColumnSumViolation { stage, column, sum } => {
                write!(f, "{stage}: column {column} sums to {sum}, expected 1")
            }
            ObserverError::MissingPercept { measurement } => {
                write!(f, "Measurement {measurement} has no percept(s)")
            }
            ObserverError::PerceptOutOfRange { measurement, percept } => {
                write!(
                    f,
                    "Percept {percept} for measurement {measurement} must belong to [1, 360]"
                )
            }
            ObserverError::NonPositiveLikelihood { trial, value } => {
                write!(f, "Likelihood of trial {trial} is {value}, but must be > 0")
            }
            ObserverError::NonFiniteLikelihood { trial, value } => {
                write!(f, "Likelihood of trial {trial} is {value}, but must be finite")
            }
            ObserverError::MissingLookup { trial, condition } => {
                write!(f, "Trial {trial} references condition {condition} with no lookup table")
            }
            ObserverError::UnsupportedReadout { name } => {
                write!(f, "Readout '{name}' has not been implemented (expected 'map')")
            }
            ObserverError::UnsupportedPriorShape { name } => {
                write!(f, "Prior shape '{name}' has not been implemented (expected 'vonMisesPrior')")
            }
            ObserverError::DegeneratePosterior { k_llh, k_prior, n_columns } => {
                write!(
                    f,
                    "{n_columns} posterior column(s) underflowed with k_llh = {k_llh}, \
                     k_prior = {k_prior}; only k_llh = k_prior = inf has a closed form"
                )
            }
            ObserverError::InvalidConcentration { name, value } => {
                write!(f, "Invalid concentration {name} = {value}: must be >= 0 and not NaN")
            }
            ObserverError::EmptyData => write!(f, "Dataset contains no trials"),
            ObserverError::ColumnLengthMismatch { column, expected, actual } => {
                write!(f, "Column '{column}' has length {actual}, expected {expected}")
            }
            ObserverError::NonFiniteData { column, index, value } => {
                write!(f, "Non-finite value in column '{column}' at index {index}: {value}")
            }
            ObserverError::InvalidDegree { column, index, value } => {
                write!(
                    f,
                    "Invalid degree in column '{column}' at index {index}: {value} \
                     (expected an integer in [0, 360])"
                )
            }
            ObserverError::NonUniqueFixedParam { name } => {
                write!(f, "Column '{name}' must hold a single value across trials")
            }
            ObserverError::GroupLengthMismatch { group, expected, actual } => {
                write!(f, "Parameter group '{group}' has {actual} entries, expected {expected}")
            }
            ObserverError::UnknownParamGroup { name } => {
                write!(f, "Unknown parameter group '{name}'")
            }
            ObserverError::MissingParameter { group, index } => {
                write!(f, "Parameter group '{group}' is NaN at index {index}")
            }
            ObserverError::ParamLengthMismatch { expected, actual } => {
                write!(f, "Parameter vector has length {actual}, expected {expected}")
            }
            ObserverError::InvalidPrecision { value } => {
                write!(f, "Invalid posterior precision {value}: must be finite and > 0")
            }
            ObserverError::NoFreeParameters => write!(f, "No free parameters to fit"),
            ObserverError::Optimization { text } => write!(f, "Optimization failed: {text}"),
        }
    }
}

impl From<OptError> for ObserverError {
    fn from(err: OptError) -> Self {
        match err {
            OptError::Model(inner) => inner,
            other => ObserverError::Optimization { text: other.to_string() },
        }
    }
}

#[cfg(feature = "python-bindings")]
impl std::convert::From<ObserverError> for PyErr {
    fn from(err: ObserverError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
