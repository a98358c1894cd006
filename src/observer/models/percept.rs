//! PerceptLikelihoodAggregator — `P(percept | stimulus)` from MAP candidates.
//!
//! Purpose
//! -------
//! Marginalize the measurement out of the readout:
//! `P(p | s) = Σ_m P(m | s) · Σ_{slot} [percept(slot, m) = p] / count(m)`.
//! Each measurement spreads its probability evenly over its tied percepts.
//!
//! Key behaviors
//! -------------
//! - Output is `(360 × n_stimuli)`; rows index percept degrees `1..=360`,
//!   columns follow the measurement-density columns.
//! - Percepts no measurement maps to keep probability zero.
//! - Columns are renormalized and then checked to sum to one.
//!
//! Invariants & assumptions
//! ------------------------
//! - `meas_density` is `(n_measurements × n_stimuli)` with columns summing to
//!   one, and its rows match the candidate columns.
//! - Candidates lie in `[1, 360]` (guaranteed by the selector).
use ndarray::{Array2, Axis};

use crate::{
    observer::{
        core::{space::CircularSpace, space::DOMAIN_SIZE, validation::check_column_sums},
        errors::ObserverResult,
        models::readout::PerceptCandidates,
    },
    optimization::numerical_stability::normalize_columns,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PerceptLikelihoodAggregator;

impl PerceptLikelihoodAggregator {
    /// Percept likelihood `(360 × n_stimuli)`.
    ///
    /// # Errors
    /// - `ColumnSumViolation { stage: "percept_likelihood", .. }` if a column
    ///   fails to sum to one.
    pub fn aggregate(
        &self, candidates: &PerceptCandidates, meas_density: &Array2<f64>,
    ) -> ObserverResult<Array2<f64>> {
        let mut out = Array2::<f64>::zeros((DOMAIN_SIZE, meas_density.ncols()));
        for (mut dst, src) in out.axis_iter_mut(Axis(1)).zip(meas_density.axis_iter(Axis(1))) {
            for (m, &p_m) in src.iter().enumerate() {
                let share = p_m / candidates.counts[m] as f64;
                for percept in candidates.of(m) {
                    dst[CircularSpace::index_of(percept)] += share;
                }
            }
        }
        normalize_columns(&mut out);
        check_column_sums("percept_likelihood", &out)?;
        Ok(out)
    }
}
