//! Per-condition percept lookup tables.
//!
//! A lookup table holds `P(percept | stimulus)` for one `(stim_std, prior_std)`
//! condition: rows are percept degrees `1..=360`, columns the distinct
//! stimulus means of the dataset (ascending, see
//! [`ConditionGrid::stimuli`](crate::observer::core::data::ConditionGrid)).
//!
//! Building one runs the full observer chain:
//! measurement density `P(m | s)` → likelihood `L(s | m)` → prior →
//! [`BayesCombiner`] → [`PerceptSelector`] → [`PerceptLikelihoodAggregator`].
//!
//! Tables are stored in a `Vec` indexed by condition id and built only for
//! conditions that contain at least one trial. Prior levels form the outer
//! loop and stimulus levels the inner one, so construction order matches the
//! id layout.
use ndarray::Array2;

use crate::observer::{
    core::{
        data::ConditionGrid, density::von_mises, options::ModelFixedParams,
        params::ObserverParams, prior::LearnedPrior, space::CircularSpace,
    },
    errors::{ObserverError, ObserverResult},
    models::{
        bayes::BayesCombiner, percept::PerceptLikelihoodAggregator, readout::PerceptSelector,
    },
};

/// Percept likelihood `(360 × stimuli.len())` for one pair of concentrations.
///
/// # Errors
/// Propagates concentration, degenerate-posterior, readout and column-sum
/// errors from the individual stages.
pub fn percept_likelihood(
    stimuli: &[f64], k_llh: f64, prior: &LearnedPrior, fixed: &ModelFixedParams,
) -> ObserverResult<Array2<f64>> {
    let space = CircularSpace.points().to_vec();

    let meas_density = von_mises(&space, stimuli, &[k_llh])?;
    let llh = von_mises(&space, &space, &[k_llh])?;
    let prior_matrix = prior.tiled(space.len());

    let posterior = BayesCombiner::new(fixed.posterior_precision)?.combine(
        &llh,
        &prior_matrix,
        k_llh,
        prior.k_prior,
        prior.mode,
        &space,
    )?;
    let candidates = PerceptSelector::new(fixed.readout).select(&posterior, &space)?;
    PerceptLikelihoodAggregator.aggregate(&candidates, &meas_density)
}

/// Lookup tables for every occupied condition of a grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionLookup {
    tables: Vec<Option<Array2<f64>>>,
}

impl ConditionLookup {
    pub fn build(
        grid: &ConditionGrid, fixed: &ModelFixedParams, params: &ObserverParams,
    ) -> ObserverResult<Self> {
        let occupied = grid.occupied();
        let n_stim = grid.n_stim_levels();
        let mut tables = vec![None; grid.n_conditions()];
        for (ix, &k_prior) in params.k_prior.iter().enumerate() {
            let prior = LearnedPrior::new(fixed.prior_shape, fixed.prior_mode, k_prior)?;
            for (jx, &k_llh) in params.k_llh.iter().enumerate() {
                let condition = ix * n_stim + jx;
                if !occupied.get(condition).copied().unwrap_or(false) {
                    continue;
                }
                tables[condition] = Some(percept_likelihood(&grid.stimuli, k_llh, &prior, fixed)?);
            }
        }
        Ok(Self { tables })
    }

    pub fn table(&self, condition: usize) -> Option<&Array2<f64>> {
        self.tables.get(condition).and_then(Option::as_ref)
    }

    /// Table for a trial's condition, or `MissingLookup`.
    pub fn for_trial(&self, trial: usize, condition: usize) -> ObserverResult<&Array2<f64>> {
        self.table(condition).ok_or(ObserverError::MissingLookup { trial, condition })
    }

    pub fn n_built(&self) -> usize {
        self.tables.iter().filter(|t| t.is_some()).count()
    }
}
