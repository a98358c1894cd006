//! PerceptSelector — MAP readout of posterior columns.
//!
//! For every measurement column the percepts are all stimulus values whose
//! posterior equals the column maximum. Because posteriors are rounded before
//! they get here, near-ties collapse into exact ties and a flat posterior
//! yields every point of the domain.
//!
//! Candidates are stored as a `(slot × measurement)` matrix padded with NaN,
//! together with the number of valid slots per measurement. A candidate at
//! `0` is reported as `360`.
use ndarray::{Array2, Axis};

use crate::observer::{
    core::{options::Readout, space::CircularSpace},
    errors::{ObserverError, ObserverResult},
};

/// MAP candidates for every measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct PerceptCandidates {
    /// `(max_count × n_measurements)`; unused slots are NaN.
    pub percepts: Array2<f64>,
    /// Number of valid slots per measurement, always `>= 1`.
    pub counts: Vec<usize>,
}

impl PerceptCandidates {
    pub fn n_measurements(&self) -> usize {
        self.counts.len()
    }

    /// Valid candidates for one measurement.
    pub fn of(&self, measurement: usize) -> impl Iterator<Item = f64> + '_ {
        self.percepts.column(measurement).into_iter().take(self.counts[measurement]).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PerceptSelector {
    pub readout: Readout,
}

impl PerceptSelector {
    pub fn new(readout: Readout) -> Self {
        Self { readout }
    }

    /// Select percepts from a `(stimulus × measurement)` posterior whose rows
    /// sit at `support`.
    ///
    /// # Errors
    /// - `MissingPercept` if a column has no maximum (all NaN).
    /// - `PerceptOutOfRange` if a candidate lies outside `[1, 360]`.
    pub fn select(&self, posterior: &Array2<f64>, support: &[f64]) -> ObserverResult<PerceptCandidates> {
        match self.readout {
            Readout::Map => map_candidates(posterior, support),
        }
    }
}

fn map_candidates(posterior: &Array2<f64>, support: &[f64]) -> ObserverResult<PerceptCandidates> {
    let mut per_column: Vec<Vec<f64>> = Vec::with_capacity(posterior.ncols());
    for (m, col) in posterior.axis_iter(Axis(1)).enumerate() {
        let max = col.iter().copied().filter(|p| !p.is_nan()).fold(f64::NEG_INFINITY, f64::max);
        let mut found = Vec::new();
        for (&p, &s) in col.iter().zip(support) {
            if p == max {
                let percept = CircularSpace::canonicalize(s);
                if !(1.0..=360.0).contains(&percept) {
                    return Err(ObserverError::PerceptOutOfRange { measurement: m, percept });
                }
                found.push(percept);
            }
        }
        if found.is_empty() {
            return Err(ObserverError::MissingPercept { measurement: m });
        }
        per_column.push(found);
    }

    let max_count = per_column.iter().map(Vec::len).max().unwrap_or(0);
    let mut percepts = Array2::from_elem((max_count, per_column.len()), f64::NAN);
    let mut counts = Vec::with_capacity(per_column.len());
    for (m, found) in per_column.iter().enumerate() {
        for (slot, &p) in found.iter().enumerate() {
            percepts[[slot, m]] = p;
        }
        counts.push(found.len());
    }
    Ok(PerceptCandidates { percepts, counts })
}
