//! Validation helpers for log-likelihood optimization.
//!
//! This module centralizes common consistency checks used across the
//! optimizer interface:
//!
//! - **Tolerance checks**: [`verify_tol_f`], [`verify_tol_x`] ensure numeric
//!   tolerances are finite and strictly positive when provided.
//! - **Budgets**: [`verify_max_iter`], [`verify_max_fun_evals`] reject zero caps.
//! - **Simplex set-up**: [`verify_simplex_delta`], [`validate_theta0`].
//! - **Parameter estimates**: [`validate_theta_hat`] ensures a candidate
//!   `theta_hat` exists and contains only finite values.
//! - **Objective values**: [`validate_value`] checks log-likelihood outputs
//!   for finiteness.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::Theta,
};

/// Validate the optional objective-spread tolerance.
///
/// # Errors
/// Returns [`OptError::InvalidTolF`] if the value is non-finite or ≤ 0.0.
pub fn verify_tol_f(tol: Option<f64>) -> OptResult<()> {
    if let Some(tol) = tol {
        if !tol.is_finite() {
            return Err(OptError::InvalidTolF { tol, reason: "Tolerance must be finite." });
        }
        if tol <= 0.0 {
            return Err(OptError::InvalidTolF { tol, reason: "Tolerance must be positive." });
        }
    }
    Ok(())
}

/// Validate the optional simplex-size tolerance.
///
/// # Errors
/// Returns [`OptError::InvalidTolX`] if the value is non-finite or ≤ 0.0.
pub fn verify_tol_x(tol: Option<f64>) -> OptResult<()> {
    if let Some(tol) = tol {
        if !tol.is_finite() {
            return Err(OptError::InvalidTolX { tol, reason: "Tolerance must be finite." });
        }
        if tol <= 0.0 {
            return Err(OptError::InvalidTolX { tol, reason: "Tolerance must be positive." });
        }
    }
    Ok(())
}

pub fn verify_max_iter(max_iter: Option<usize>) -> OptResult<()> {
    if let Some(max_iter) = max_iter {
        if max_iter == 0 {
            return Err(OptError::InvalidMaxIter {
                max_iter,
                reason: "Maximum iterations must be greater than zero.",
            });
        }
    }
    Ok(())
}

pub fn verify_max_fun_evals(max_fun_evals: Option<usize>) -> OptResult<()> {
    if let Some(max_fun_evals) = max_fun_evals {
        if max_fun_evals == 0 {
            return Err(OptError::InvalidMaxFunEvals {
                max_fun_evals,
                reason: "Maximum function evaluations must be greater than zero.",
            });
        }
    }
    Ok(())
}

/// Validate an initial-simplex perturbation.
///
/// # Errors
/// Returns [`OptError::InvalidSimplexDelta`] if `delta` is non-finite or ≤ 0.0.
pub fn verify_simplex_delta(delta: f64) -> OptResult<()> {
    if !delta.is_finite() {
        return Err(OptError::InvalidSimplexDelta { delta, reason: "Delta must be finite." });
    }
    if delta <= 0.0 {
        return Err(OptError::InvalidSimplexDelta { delta, reason: "Delta must be positive." });
    }
    Ok(())
}

/// Reject empty or non-finite starting points.
///
/// # Errors
/// Returns [`OptError::InvalidThetaInput`]; an empty vector reports index 0
/// with a NaN value.
pub fn validate_theta0(theta0: &Theta) -> OptResult<()> {
    if theta0.is_empty() {
        return Err(OptError::InvalidThetaInput { index: 0, value: f64::NAN });
    }
    for (index, &value) in theta0.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::InvalidThetaInput { index, value });
        }
    }
    Ok(())
}

/// Validate and unwrap an estimated parameter vector (`theta_hat`).
///
/// Accepts only a present vector with all **finite** entries.
///
/// # Errors
/// - [`OptError::MissingThetaHat`] if no vector was provided.
/// - [`OptError::InvalidThetaHat`] if any element is non-finite.
pub fn validate_theta_hat(theta_hat: Option<Theta>) -> OptResult<Theta> {
    match theta_hat {
        Some(t) => {
            for (index, &value) in t.iter().enumerate() {
                if !value.is_finite() {
                    return Err(OptError::InvalidThetaHat {
                        index,
                        value,
                        reason: "Parameter estimates must be finite.",
                    });
                }
            }
            Ok(t)
        }
        None => Err(OptError::MissingThetaHat),
    }
}

/// Validate that a scalar log-likelihood value is finite.
///
/// # Errors
/// Returns [`OptError::NonFiniteCost`] if the value is `NaN` or infinite.
pub fn validate_value(value: f64) -> OptResult<()> {
    if !value.is_finite() {
        return Err(OptError::NonFiniteCost { value });
    }
    Ok(())
}
