//! Trial-level dataset and the condition grid derived from it.
//!
//! [`TrialData`] is a validated, privately owned copy of the six dataset
//! columns with every degree canonicalized (`0 → 360`). Callers keep their own
//! buffers untouched. [`ConditionGrid`] partitions trials by
//! `(stim_std level, prior_std level)` and records which lookup-table column
//! each trial reads.
//!
//! ## Conventions
//! - Noise levels are the sorted unique values in **descending** order, so
//!   `k_llh[j]` pairs with the j-th largest stimulus noise and `k_prior[i]`
//!   with the i-th largest prior noise.
//! - Condition ids are `prior_idx * n_stim_levels + stim_idx`.
//! - Lookup-table columns are the distinct canonical stimulus means in
//!   ascending order.
use ndarray::Array1;

use crate::observer::{
    core::{
        prior::PriorShape,
        space::CircularSpace,
        validation::{check_finite, check_len, unique_sorted},
    },
    errors::{ObserverError, ObserverResult},
};

/// Validated trial table (row = trial).
#[derive(Debug, Clone, PartialEq)]
pub struct TrialData {
    /// Stimulus means in `[1, 360]`.
    pub stim_mean: Array1<f64>,
    /// Stimulus noise level (condition key only).
    pub stim_std: Array1<f64>,
    /// Prior modes in `[1, 360]`.
    pub prior_mode: Array1<f64>,
    /// Prior noise level (condition key only).
    pub prior_std: Array1<f64>,
    /// Prior shape tag per trial.
    pub prior_shape: Vec<PriorShape>,
    /// Observed estimates in `[1, 360]`.
    pub estimate: Array1<f64>,
}

impl TrialData {
    /// Copy and validate the dataset columns.
    ///
    /// # Errors
    /// - `EmptyData` when `stim_mean` is empty.
    /// - `ColumnLengthMismatch` when any column length differs from `stim_mean`.
    /// - `NonFiniteData` / `InvalidDegree` for malformed cells.
    /// - `UnsupportedPriorShape` for unknown shape tags.
    pub fn new<S: AsRef<str>>(
        stim_mean: &[f64], stim_std: &[f64], prior_mode: &[f64], prior_std: &[f64],
        prior_shape: &[S], estimate: &[f64],
    ) -> ObserverResult<Self> {
        let n = stim_mean.len();
        if n == 0 {
            return Err(ObserverError::EmptyData);
        }
        check_len("stim_std", n, stim_std.len())?;
        check_len("prior_mode", n, prior_mode.len())?;
        check_len("prior_std", n, prior_std.len())?;
        check_len("prior_shape", n, prior_shape.len())?;
        check_len("estimate", n, estimate.len())?;
        check_finite("stim_std", stim_std)?;
        check_finite("prior_std", prior_std)?;

        let stim_mean = canonical_degrees("stim_mean", stim_mean)?;
        let prior_mode = canonical_degrees("prior_mode", prior_mode)?;
        let estimate = canonical_degrees("estimate", estimate)?;
        let prior_shape = prior_shape
            .iter()
            .map(|s| s.as_ref().parse::<PriorShape>())
            .collect::<ObserverResult<Vec<_>>>()?;

        Ok(Self {
            stim_mean,
            stim_std: Array1::from(stim_std.to_vec()),
            prior_mode,
            prior_std: Array1::from(prior_std.to_vec()),
            prior_shape,
            estimate,
        })
    }

    pub fn len(&self) -> usize {
        self.stim_mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stim_mean.is_empty()
    }

    /// Same design, different estimates (e.g. simulated or shuffled responses).
    pub fn with_estimates(&self, estimate: &[f64]) -> ObserverResult<Self> {
        check_len("estimate", self.len(), estimate.len())?;
        let estimate = canonical_degrees("estimate", estimate)?;
        Ok(Self { estimate, ..self.clone() })
    }
}

fn canonical_degrees(column: &'static str, values: &[f64]) -> ObserverResult<Array1<f64>> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| CircularSpace::check_degree(column, i, v))
        .collect::<ObserverResult<Vec<_>>>()
        .map(Array1::from)
}

/// Partition of trials into `(stim_std, prior_std)` conditions.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionGrid {
    /// Stimulus noise levels, descending.
    pub stim_levels: Vec<f64>,
    /// Prior noise levels, descending.
    pub prior_levels: Vec<f64>,
    /// Distinct stimulus means, ascending; lookup-table column order.
    pub stimuli: Vec<f64>,
    /// Condition id of each trial.
    pub trial_condition: Vec<usize>,
    /// Lookup-table column of each trial.
    pub trial_column: Vec<usize>,
}

impl ConditionGrid {
    pub fn from_data(data: &TrialData) -> Self {
        let stim_std = data.stim_std.to_vec();
        let prior_std = data.prior_std.to_vec();
        let stim_mean = data.stim_mean.to_vec();

        let stim_levels = unique_sorted(&stim_std, true);
        let prior_levels = unique_sorted(&prior_std, true);
        let stimuli = unique_sorted(&stim_mean, false);

        let n_stim = stim_levels.len();
        let position = |levels: &[f64], v: f64| levels.iter().position(|&l| l == v).unwrap_or(0);

        let trial_condition = stim_std
            .iter()
            .zip(prior_std.iter())
            .map(|(&s, &p)| position(&prior_levels, p) * n_stim + position(&stim_levels, s))
            .collect();
        let trial_column = stim_mean.iter().map(|&m| position(&stimuli, m)).collect();

        Self { stim_levels, prior_levels, stimuli, trial_condition, trial_column }
    }

    pub fn n_stim_levels(&self) -> usize {
        self.stim_levels.len()
    }

    pub fn n_prior_levels(&self) -> usize {
        self.prior_levels.len()
    }

    pub fn n_conditions(&self) -> usize {
        self.stim_levels.len() * self.prior_levels.len()
    }

    /// `(stim_idx, prior_idx)` of a condition id.
    pub fn levels_of(&self, condition: usize) -> (usize, usize) {
        let n_stim = self.n_stim_levels();
        (condition % n_stim, condition / n_stim)
    }

    /// Whether at least one trial falls in each condition.
    pub fn occupied(&self) -> Vec<bool> {
        let mut out = vec![false; self.n_conditions()];
        for &c in &self.trial_condition {
            out[c] = true;
        }
        out
    }
}
