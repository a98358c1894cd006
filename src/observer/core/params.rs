//! Parameter groups, the flat-vector index map, and typed model parameters.
//!
//! The optimizer sees a flat vector `θ` of free parameters. The model sees
//! six named groups. [`ParamLayout`] is derived once per fit from the initial
//! configuration and is the single source of truth for moving between the two:
//!
//! - full vector = concatenation of the groups in [`ParamGroup::ALL`] order
//!   (`k_llh`, `k_prior`, `k_card`, `prior_tail`, `p_rand`, `k_m`);
//! - free subvector = full entries that are not NaN and whose group is not
//!   held fixed, in full-vector order.
//!
//! NaN entries mark unused parameters: they are never optimized and do not
//! count toward AIC. The groups the likelihood consumes (`k_llh`, `k_prior`,
//! `p_rand`, `k_m`) must therefore be finite.
//!
//! Free concentrations (`k_llh`, `k_prior`, `k_m`) are searched on the
//! softplus scale: the free subvector holds `softplus⁻¹(k)` and
//! [`ParamLayout::expand`] maps it back, so every proposal the optimizer
//! makes is a valid concentration. Full vectors are always in natural units.
use std::{fmt, str::FromStr};

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::{
    observer::{
        core::data::ConditionGrid,
        errors::{ObserverError, ObserverResult},
    },
    optimization::{
        loglik_optimizer::Theta,
        numerical_stability::{safe_softplus, safe_softplus_inv},
    },
};

/// Smallest concentration mapped onto the softplus scale; a zero start
/// (flat motor noise) would otherwise sit at `-inf`.
const MIN_FREE_CONCENTRATION: f64 = 1e-6;

/// Named parameter group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamGroup {
    KLlh,
    KPrior,
    KCard,
    PriorTail,
    PRand,
    KM,
}

impl ParamGroup {
    /// Groups in flat-vector order.
    pub const ALL: [ParamGroup; 6] = [
        ParamGroup::KLlh,
        ParamGroup::KPrior,
        ParamGroup::KCard,
        ParamGroup::PriorTail,
        ParamGroup::PRand,
        ParamGroup::KM,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ParamGroup::KLlh => "k_llh",
            ParamGroup::KPrior => "k_prior",
            ParamGroup::KCard => "k_card",
            ParamGroup::PriorTail => "prior_tail",
            ParamGroup::PRand => "p_rand",
            ParamGroup::KM => "k_m",
        }
    }

    fn required(self) -> bool {
        matches!(self, ParamGroup::KLlh | ParamGroup::KPrior | ParamGroup::PRand | ParamGroup::KM)
    }

    /// Whether the group holds von Mises concentrations (searched on the
    /// softplus scale when free).
    pub fn is_concentration(self) -> bool {
        matches!(self, ParamGroup::KLlh | ParamGroup::KPrior | ParamGroup::KM)
    }
}

impl fmt::Display for ParamGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ParamGroup {
    type Err = ObserverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParamGroup::ALL
            .into_iter()
            .find(|g| g.name() == s)
            .ok_or_else(|| ObserverError::UnknownParamGroup { name: s.to_string() })
    }
}

/// Initial values per group (`model.init_params`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitParams {
    pub k_llh: Vec<f64>,
    pub k_prior: Vec<f64>,
    pub k_card: Vec<f64>,
    pub prior_tail: Vec<f64>,
    pub p_rand: Vec<f64>,
    pub k_m: Vec<f64>,
}

impl InitParams {
    /// Starting point used by `fit_maxlogl`: unit concentrations, no lapse,
    /// flat motor noise, sized to the dataset's noise levels.
    pub fn default_for(grid: &ConditionGrid) -> Self {
        Self {
            k_llh: vec![1.0; grid.n_stim_levels()],
            k_prior: vec![1.0; grid.n_prior_levels()],
            k_card: vec![1.0],
            prior_tail: vec![0.0],
            p_rand: vec![0.0],
            k_m: vec![0.0],
        }
    }

    pub fn group(&self, g: ParamGroup) -> &[f64] {
        match g {
            ParamGroup::KLlh => &self.k_llh,
            ParamGroup::KPrior => &self.k_prior,
            ParamGroup::KCard => &self.k_card,
            ParamGroup::PriorTail => &self.prior_tail,
            ParamGroup::PRand => &self.p_rand,
            ParamGroup::KM => &self.k_m,
        }
    }

    /// Concatenate the groups in [`ParamGroup::ALL`] order.
    pub fn flatten(&self) -> Array1<f64> {
        ParamGroup::ALL.iter().flat_map(|&g| self.group(g).iter().copied()).collect()
    }
}

/// Index map between the full parameter vector, its named groups, and the
/// free subvector handled by the optimizer.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamLayout {
    positions: Vec<Vec<usize>>,
    free: Vec<usize>,
    /// Per free entry: mapped through softplus.
    positive: Vec<bool>,
    template: Array1<f64>,
}

impl ParamLayout {
    /// Derive the layout from initial values and the condition grid.
    ///
    /// # Errors
    /// - `GroupLengthMismatch` when `k_llh`/`k_prior` do not match the number
    ///   of noise levels or a scalar group does not have exactly one entry.
    /// - `MissingParameter` when a group consumed by the model contains NaN.
    /// - `InvalidConcentration` when a concentration group holds a negative
    ///   value.
    /// - `NoFreeParameters` when nothing is left to optimize.
    pub fn new(
        init: &InitParams, grid: &ConditionGrid, fixed: &[ParamGroup],
    ) -> ObserverResult<Self> {
        for g in ParamGroup::ALL {
            let expected = match g {
                ParamGroup::KLlh => grid.n_stim_levels(),
                ParamGroup::KPrior => grid.n_prior_levels(),
                _ => 1,
            };
            let values = init.group(g);
            if values.len() != expected {
                return Err(ObserverError::GroupLengthMismatch {
                    group: g.name(),
                    expected,
                    actual: values.len(),
                });
            }
            if g.required() {
                if let Some(index) = values.iter().position(|v| v.is_nan()) {
                    return Err(ObserverError::MissingParameter { group: g.name(), index });
                }
            }
            if g.is_concentration() {
                if let Some(&value) = values.iter().find(|&&v| v < 0.0) {
                    return Err(ObserverError::InvalidConcentration { name: g.name(), value });
                }
            }
        }

        let mut positions = Vec::with_capacity(ParamGroup::ALL.len());
        let mut free = Vec::new();
        let mut positive = Vec::new();
        let mut loc = 0;
        for g in ParamGroup::ALL {
            let values = init.group(g);
            let idx: Vec<usize> = (loc..loc + values.len()).collect();
            if !fixed.contains(&g) {
                let before = free.len();
                free.extend(idx.iter().copied().filter(|&i| !values[i - loc].is_nan()));
                positive.resize(positive.len() + free.len() - before, g.is_concentration());
            }
            loc += values.len();
            positions.push(idx);
        }
        if free.is_empty() {
            return Err(ObserverError::NoFreeParameters);
        }
        Ok(Self { positions, free, positive, template: init.flatten() })
    }

    /// Positions of a group in the full vector.
    pub fn positions(&self, g: ParamGroup) -> &[usize] {
        &self.positions[g as usize]
    }

    /// Length of the full vector.
    pub fn full_len(&self) -> usize {
        self.template.len()
    }

    /// Number of free parameters (the AIC penalty count).
    pub fn n_free(&self) -> usize {
        self.free.len()
    }

    /// Full-vector positions of the free parameters.
    pub fn free_indices(&self) -> &[usize] {
        &self.free
    }

    /// Whether each free entry is a concentration on the softplus scale.
    pub fn positive_mask(&self) -> &[bool] {
        &self.positive
    }

    /// Initial free subvector, on the search scale.
    pub fn initial_free(&self) -> Theta {
        self.free
            .iter()
            .zip(&self.positive)
            .map(|(&i, &pos)| to_search_scale(self.template[i], pos))
            .collect()
    }

    /// Map a free subvector back to natural units and insert it into the full
    /// vector (fixed/unused entries keep their initial values).
    pub fn expand(&self, free: &Theta) -> ObserverResult<Array1<f64>> {
        if free.len() != self.free.len() {
            return Err(ObserverError::ParamLengthMismatch {
                expected: self.free.len(),
                actual: free.len(),
            });
        }
        let mut full = self.template.clone();
        for ((&i, &pos), &v) in self.free.iter().zip(&self.positive).zip(free.iter()) {
            full[i] = if pos { safe_softplus(v) } else { v };
        }
        Ok(full)
    }

    /// Pick the free entries out of a natural-unit full vector and move them
    /// to the search scale (e.g. to warm-start a refit from a previous
    /// `best_fit_params`).
    ///
    /// # Errors
    /// - `ParamLengthMismatch` for a full vector of the wrong length.
    /// - `InvalidConcentration` for a negative free concentration.
    pub fn free_from(&self, full: &Array1<f64>) -> ObserverResult<Theta> {
        if full.len() != self.full_len() {
            return Err(ObserverError::ParamLengthMismatch {
                expected: self.full_len(),
                actual: full.len(),
            });
        }
        let mut theta = Theta::zeros(self.free.len());
        for (slot, (&i, &pos)) in theta.iter_mut().zip(self.free.iter().zip(&self.positive)) {
            if pos && full[i] < 0.0 {
                return Err(ObserverError::InvalidConcentration {
                    name: self.group_of(i).name(),
                    value: full[i],
                });
            }
            *slot = to_search_scale(full[i], pos);
        }
        Ok(theta)
    }

    fn group_of(&self, index: usize) -> ParamGroup {
        ParamGroup::ALL
            .into_iter()
            .find(|&g| self.positions(g).contains(&index))
            .unwrap_or(ParamGroup::KLlh)
    }

    /// Slice a full vector into typed groups.
    pub fn unpack(&self, full: &Array1<f64>) -> ObserverResult<ObserverParams> {
        if full.len() != self.full_len() {
            return Err(ObserverError::ParamLengthMismatch {
                expected: self.full_len(),
                actual: full.len(),
            });
        }
        let take = |g: ParamGroup| -> Vec<f64> {
            self.positions(g).iter().map(|&i| full[i]).collect()
        };
        let first =
            |g: ParamGroup| -> f64 { self.positions(g).first().map_or(f64::NAN, |&i| full[i]) };
        Ok(ObserverParams {
            k_llh: take(ParamGroup::KLlh),
            k_prior: take(ParamGroup::KPrior),
            k_card: first(ParamGroup::KCard),
            prior_tail: first(ParamGroup::PriorTail),
            p_rand: first(ParamGroup::PRand),
            k_m: first(ParamGroup::KM),
        })
    }
}

fn to_search_scale(value: f64, positive: bool) -> f64 {
    if positive { safe_softplus_inv(value.max(MIN_FREE_CONCENTRATION)) } else { value }
}

/// Model parameters for one objective evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObserverParams {
    /// Likelihood concentration per stimulus-noise level (descending noise).
    pub k_llh: Vec<f64>,
    /// Prior concentration per prior-noise level (descending noise).
    pub k_prior: Vec<f64>,
    /// Cardinal-prior strength; carried for bookkeeping, unused by the von Mises prior.
    pub k_card: f64,
    /// Prior tail weight; carried for bookkeeping, unused by the von Mises prior.
    pub prior_tail: f64,
    /// Lapse (random guess) rate.
    pub p_rand: f64,
    /// Motor-noise concentration.
    pub k_m: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::core::data::TrialData;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Group positions in flat-vector order.
    // - Free-mask construction with NaN entries and fixed groups.
    // - Round-trip between free subvector, full vector and typed groups.
    // - The softplus search scale for concentration groups.
    // - Rejection of mis-sized or NaN required groups.
    // -------------------------------------------------------------------------

    fn grid_2x2() -> ConditionGrid {
        let data = TrialData::new(
            &[10.0, 20.0, 30.0, 40.0],
            &[0.66, 0.33, 0.66, 0.33],
            &[225.0; 4],
            &[80.0, 80.0, 20.0, 20.0],
            &["vonMisesPrior"; 4],
            &[10.0, 20.0, 30.0, 40.0],
        )
        .unwrap();
        ConditionGrid::from_data(&data)
    }

    #[test]
    // Purpose
    // -------
    // Verify the default index map matches group order.
    //
    // Given
    // -----
    // - Default init for 2 stimulus and 2 prior noise levels.
    //
    // Expect
    // ------
    // - k_llh → [0, 1], k_prior → [2, 3], k_card → [4], prior_tail → [5],
    //   p_rand → [6], k_m → [7]; all 8 entries free.
    fn layout_positions_follow_group_order() {
        let grid = grid_2x2();
        let init = InitParams::default_for(&grid);

        let layout = ParamLayout::new(&init, &grid, &[]).unwrap();

        assert_eq!(layout.positions(ParamGroup::KLlh), &[0, 1]);
        assert_eq!(layout.positions(ParamGroup::KPrior), &[2, 3]);
        assert_eq!(layout.positions(ParamGroup::KCard), &[4]);
        assert_eq!(layout.positions(ParamGroup::PriorTail), &[5]);
        assert_eq!(layout.positions(ParamGroup::PRand), &[6]);
        assert_eq!(layout.positions(ParamGroup::KM), &[7]);
        assert_eq!(layout.n_free(), 8);
        assert_eq!(layout.full_len(), 8);
    }

    #[test]
    // Purpose
    // -------
    // Ensure NaN entries and fixed groups are excluded from the free set and
    // survive expansion unchanged.
    //
    // Given
    // -----
    // - k_card = NaN, prior_tail = NaN, k_m fixed at 50.
    //
    // Expect
    // ------
    // - 5 free parameters (k_llh ×2, k_prior ×2, p_rand).
    // - Expanding a new free vector keeps k_m = 50 and NaN placeholders.
    fn layout_skips_nan_and_fixed_groups() {
        let grid = grid_2x2();
        let init = InitParams {
            k_llh: vec![1.0, 2.0],
            k_prior: vec![3.0, 4.0],
            k_card: vec![f64::NAN],
            prior_tail: vec![f64::NAN],
            p_rand: vec![0.1],
            k_m: vec![50.0],
        };

        let layout = ParamLayout::new(&init, &grid, &[ParamGroup::KM]).unwrap();
        let full = layout.expand(&Theta::from(vec![25.0, 30.0, 40.0, 50.0, 0.2])).unwrap();
        let params = layout.unpack(&full).unwrap();

        assert_eq!(layout.n_free(), 5);
        assert_eq!(layout.free_indices(), &[0, 1, 2, 3, 6]);
        assert_eq!(layout.positive_mask(), &[true, true, true, true, false]);
        assert_eq!(params.k_llh, vec![25.0, 30.0]);
        assert_eq!(params.k_prior, vec![40.0, 50.0]);
        assert_eq!(params.p_rand, 0.2);
        assert_eq!(params.k_m, 50.0);
        assert!(params.k_card.is_nan());
        assert_eq!(layout.free_from(&full).unwrap().to_vec(), vec![25.0, 30.0, 40.0, 50.0, 0.2]);
    }

    #[test]
    // Purpose
    // -------
    // Ensure malformed initial configurations are rejected.
    //
    // Given
    // -----
    // - k_llh with one entry for two levels, NaN p_rand, and everything fixed.
    //
    // Expect
    // ------
    // - `GroupLengthMismatch`, `MissingParameter`, `NoFreeParameters`.
    fn layout_rejects_inconsistent_groups() {
        let grid = grid_2x2();
        let mut short = InitParams::default_for(&grid);
        short.k_llh = vec![1.0];
        let mut nan_lapse = InitParams::default_for(&grid);
        nan_lapse.p_rand = vec![f64::NAN];

        assert!(matches!(
            ParamLayout::new(&short, &grid, &[]),
            Err(ObserverError::GroupLengthMismatch { group: "k_llh", expected: 2, actual: 1 })
        ));
        assert!(matches!(
            ParamLayout::new(&nan_lapse, &grid, &[]),
            Err(ObserverError::MissingParameter { group: "p_rand", index: 0 })
        ));
        assert_eq!(
            ParamLayout::new(&InitParams::default_for(&grid), &grid, &ParamGroup::ALL),
            Err(ObserverError::NoFreeParameters)
        );
        assert!(matches!(
            ParamLayout::new(&InitParams::default_for(&grid), &grid, &[])
                .unwrap()
                .expand(&Theta::zeros(3)),
            Err(ObserverError::ParamLengthMismatch { expected: 8, actual: 3 })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Ensure every proposal the optimizer can make expands to a valid
    // concentration, while directly supplied negatives are still rejected.
    //
    // Given
    // -----
    // - Default init (k_m = 0) for a 2×2 grid.
    // - Free vectors with strongly negative entries.
    // - Init and warm-start vectors holding k_prior = −0.5.
    //
    // Expect
    // ------
    // - The initial free vector is finite and expands back to the initial
    //   values (k_m to within 1e-6 of zero).
    // - Negative search-scale values give concentrations in `[0, ∞)`;
    //   p_rand passes through untouched.
    // - `InvalidConcentration { name: "k_prior", value: -0.5 }` from both
    //   `new` and `free_from`.
    fn concentrations_are_searched_on_softplus_scale() {
        let grid = grid_2x2();
        let init = InitParams::default_for(&grid);
        let layout = ParamLayout::new(&init, &grid, &[]).unwrap();

        let theta0 = layout.initial_free();
        let start = layout.unpack(&layout.expand(&theta0).unwrap()).unwrap();
        let far = layout.unpack(&layout.expand(&Theta::from_elem(8, -5.0)).unwrap()).unwrap();

        assert!(theta0.iter().all(|v| v.is_finite()));
        assert!(start.k_llh.iter().all(|&k| (k - 1.0).abs() < 1e-12));
        assert!(start.k_m >= 0.0 && start.k_m <= 1e-6 + 1e-12);
        assert_eq!(start.p_rand, 0.0);
        assert!(far.k_llh.iter().chain(&far.k_prior).all(|&k| k > 0.0 && k < 0.01));
        assert!(far.k_m > 0.0);
        assert_eq!(far.p_rand, -5.0);

        let mut negative = init.clone();
        negative.k_prior = vec![1.0, -0.5];
        let mut full = init.flatten();
        full[3] = -0.5;

        assert_eq!(
            ParamLayout::new(&negative, &grid, &[]),
            Err(ObserverError::InvalidConcentration { name: "k_prior", value: -0.5 })
        );
        assert_eq!(
            layout.free_from(&full),
            Err(ObserverError::InvalidConcentration { name: "k_prior", value: -0.5 })
        );
    }

    #[test]
    fn param_group_names_parse_back() {
        for g in ParamGroup::ALL {
            assert_eq!(g.name().parse::<ParamGroup>().unwrap(), g);
        }
        assert!("k_x".parse::<ParamGroup>().is_err());
    }
}
