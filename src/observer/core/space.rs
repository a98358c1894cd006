//! Circular domain of integer degrees `[1, 360]` with `0 ≡ 360`.
//!
//! Every density, posterior and lookup table in the observer model is indexed
//! by this space: row `i` holds the value for degree `i + 1`. The helpers here
//! are the only place where the wrap convention is spelled out.
use ndarray::Array1;

use crate::observer::errors::{ObserverError, ObserverResult};

/// Number of points on the discretized circle.
pub const DOMAIN_SIZE: usize = 360;

/// Discretized circle of unit-degree resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CircularSpace;

impl CircularSpace {
    /// Number of points in the domain.
    #[inline]
    pub const fn len(&self) -> usize {
        DOMAIN_SIZE
    }

    /// Always `false`; present for symmetry with `len`.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Domain values `1, 2, …, 360` as `f64`.
    pub fn points(&self) -> Array1<f64> {
        Array1::from_iter((1..=DOMAIN_SIZE).map(|d| d as f64))
    }

    /// Map `0` to `360`; any other value is returned unchanged.
    #[inline]
    pub fn canonicalize(deg: f64) -> f64 {
        if deg == 0.0 { DOMAIN_SIZE as f64 } else { deg }
    }

    /// Wrap an arbitrary real angle into `(0, 360]`.
    pub fn wrap(deg: f64) -> f64 {
        let r = deg.rem_euclid(DOMAIN_SIZE as f64);
        Self::canonicalize(r)
    }

    /// Row index for a canonical integer degree in `[1, 360]`.
    #[inline]
    pub fn index_of(deg: f64) -> usize {
        (Self::canonicalize(deg) as usize) - 1
    }

    /// Validate an observed degree: an integer in `[0, 360]`.
    ///
    /// Returns the canonical value in `[1, 360]`.
    pub fn check_degree(column: &'static str, index: usize, value: f64) -> ObserverResult<f64> {
        if !value.is_finite() {
            return Err(ObserverError::NonFiniteData { column, index, value });
        }
        if value.fract() != 0.0 || !(0.0..=DOMAIN_SIZE as f64).contains(&value) {
            return Err(ObserverError::InvalidDegree { column, index, value });
        }
        Ok(Self::canonicalize(value))
    }

    /// Circular distance in degrees, in `[0, 180]`.
    pub fn distance(a: f64, b: f64) -> f64 {
        let d = (a - b).rem_euclid(DOMAIN_SIZE as f64);
        d.min(DOMAIN_SIZE as f64 - d)
    }
}

/// Degrees to radians.
#[inline]
pub fn deg_to_rad(deg: f64) -> f64 {
    deg.to_radians()
}

/// Radians to degrees wrapped into `[0, 360)`.
#[inline]
pub fn rad_to_deg(rad: f64) -> f64 {
    rad.to_degrees().rem_euclid(DOMAIN_SIZE as f64)
}
