//! LearnedPrior — prior density over the stimulus domain.
//!
//! The prior depends only on the stimulus value, never on the measurement, so
//! the `(stimulus × measurement)` matrix used by Bayesian combination is a
//! single column replicated once per measurement.
use std::{fmt, str::FromStr};

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::observer::{
    core::{
        density::{column, validate_concentration},
        space::CircularSpace,
    },
    errors::{ObserverError, ObserverResult},
};

/// Functional form of the learned prior.
///
/// Parsing accepts the dataset tag `"vonMisesPrior"` (case-sensitive, as it
/// appears in experiment files). Any other tag returns
/// `ObserverError::UnsupportedPriorShape`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PriorShape {
    #[default]
    #[serde(rename = "vonMisesPrior")]
    VonMises,
}

impl FromStr for PriorShape {
    type Err = ObserverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vonMisesPrior" => Ok(PriorShape::VonMises),
            _ => Err(ObserverError::UnsupportedPriorShape { name: s.to_string() }),
        }
    }
}

impl fmt::Display for PriorShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriorShape::VonMises => write!(f, "vonMisesPrior"),
        }
    }
}

/// Prior over the stimulus domain with a fixed mode and concentration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LearnedPrior {
    pub shape: PriorShape,
    pub mode: f64,
    pub k_prior: f64,
}

impl LearnedPrior {
    /// Build a prior, rejecting negative or NaN `k_prior`.
    pub fn new(shape: PriorShape, mode: f64, k_prior: f64) -> ObserverResult<Self> {
        validate_concentration("k_prior", k_prior)?;
        Ok(Self { shape, mode, k_prior })
    }

    /// Prior probabilities over `1..=360`.
    pub fn density(&self) -> Array1<f64> {
        let support = CircularSpace.points().to_vec();
        match self.shape {
            PriorShape::VonMises => column(&support, self.mode, self.k_prior),
        }
    }

    /// `(360 × n_measurements)` matrix with the prior repeated in every column.
    pub fn tiled(&self, n_measurements: usize) -> Array2<f64> {
        let col = self.density();
        Array2::from_shape_fn((col.len(), n_measurements), |(s, _)| col[s])
    }
}
