//! Optimizer error surface: configuration checks, cost-function failures,
//! argmin errors, and model errors carried through the solver.
use argmin::core::{ArgminError, Error};

use crate::observer::errors::ObserverError;

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

/// Crate-wide result alias for optimizer operations.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- MLEOptions ----
    /// Function tolerance needs to be positive and finite.
    InvalidTolF {
        tol: f64,
        reason: &'static str,
    },
    /// Parameter tolerance needs to be positive and finite.
    InvalidTolX {
        tol: f64,
        reason: &'static str,
    },
    /// Maximum iterations needs to be positive.
    InvalidMaxIter {
        max_iter: usize,
        reason: &'static str,
    },
    /// Maximum function evaluations needs to be positive.
    InvalidMaxFunEvals {
        max_fun_evals: usize,
        reason: &'static str,
    },
    /// At least one stopping rule must be provided.
    NoTolerancesProvided,

    /// Initial simplex perturbations need to be positive and finite.
    InvalidSimplexDelta {
        delta: f64,
        reason: &'static str,
    },

    // ---- Cost function ----
    /// Cost function returned a non-finite value.
    NonFiniteCost {
        value: f64,
    },

    /// Initial parameter vector is empty or contains non-finite values.
    InvalidThetaInput {
        index: usize,
        value: f64,
    },

    // ---- Optimizer outcome ----
    /// Estimated parameters must be finite.
    InvalidThetaHat {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    /// Theta hat is missing
    MissingThetaHat,

    // ---- Simplex ----
    /// Initial simplex does not have `n + 1` vertices of one length `n >= 1`.
    MalformedSimplex {
        n_vertices: usize,
        dim: usize,
    },

    // ---- Argmin ---
    /// Error from argmin's own taxonomy; `kind` names the `ArgminError` variant.
    Solver {
        kind: &'static str,
        text: String,
    },
    /// Any other error type boxed by argmin.
    BackendError {
        text: String,
    },

    // ---- Model ----
    /// Error raised by the observer model inside the objective.
    Model(ObserverError),

    // ---- Fallback ----
    UnknownError,
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- MLEOptions ----
            OptError::InvalidTolF { tol, reason } => {
                write!(f, "Invalid function tolerance {tol}: {reason}")
            }
            OptError::InvalidTolX { tol, reason } => {
                write!(f, "Invalid parameter tolerance {tol}: {reason}")
            }
            OptError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Invalid maximum iterations {max_iter}: {reason}")
            }
            OptError::InvalidMaxFunEvals { max_fun_evals, reason } => {
                write!(f, "Invalid maximum function evaluations {max_fun_evals}: {reason}")
            }
            OptError::NoTolerancesProvided => {
                write!(f, "No tolerances provided")
            }
            OptError::InvalidSimplexDelta { delta, reason } => {
                write!(f, "Invalid simplex perturbation {delta}: {reason}")
            }

            // ---- Cost function ----
            OptError::NonFiniteCost { value } => {
                write!(f, "Non-finite cost value: {value}")
            }
            OptError::InvalidThetaInput { index, value } => {
                write!(f, "Invalid theta input at index {index}: {value}, must be finite")
            }

            // ---- Optimizer outcome ----
            OptError::InvalidThetaHat { index, value, reason } => {
                write!(f, "Invalid estimated parameter at index {index}: {value}: {reason}")
            }
            OptError::MissingThetaHat => {
                write!(f, "Missing estimated parameters (theta hat)")
            }

            // ---- Simplex ----
            OptError::MalformedSimplex { n_vertices, dim } => {
                write!(
                    f,
                    "Simplex needs n + 1 vertices of length n >= 1, got {n_vertices} of length {dim}"
                )
            }

            // ---- Argmin ----
            OptError::Solver { kind, text } => {
                write!(f, "Solver error ({kind}): {text}")
            }
            OptError::BackendError { text } => {
                write!(f, "Backend error: {text}")
            }

            // ---- Model ----
            OptError::Model(err) => {
                write!(f, "Model error: {err}")
            }

            // ---- Fallback ----
            OptError::UnknownError => {
                write!(f, "Unknown error")
            }
        }
    }
}

impl From<Error> for OptError {
    fn from(original_err: Error) -> Self {
        let original_err = match original_err.downcast::<OptError>() {
            Ok(opt_err) => return opt_err,
            Err(err) => err,
        };
        match original_err.downcast::<ArgminError>() {
            Ok(native) => {
                let kind = match &native {
                    ArgminError::InvalidParameter { .. } => "InvalidParameter",
                    ArgminError::NotImplemented { .. } => "NotImplemented",
                    ArgminError::NotInitialized { .. } => "NotInitialized",
                    ArgminError::ConditionViolated { .. } => "ConditionViolated",
                    ArgminError::CheckpointNotFound { .. } => "CheckpointNotFound",
                    ArgminError::PotentialBug { .. } => "PotentialBug",
                    ArgminError::ImpossibleError { .. } => "ImpossibleError",
                    _ => return OptError::UnknownError,
                };
                OptError::Solver { kind, text: native.to_string() }
            }
            Err(err) => OptError::BackendError { text: err.to_string() },
        }
    }
}

impl From<ObserverError> for OptError {
    fn from(err: ObserverError) -> Self {
        OptError::Model(err)
    }
}

#[cfg(feature = "python-bindings")]
impl From<OptError> for PyErr {
    fn from(err: OptError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
