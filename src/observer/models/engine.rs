//! LikelihoodEngine — trial-level objective of the Bayesian observer.
//!
//! Purpose
//! -------
//! Turn a parameter set into the probability the model assigns to every
//! observed estimate and reduce it to a negative log-likelihood and AIC.
//!
//! Key behaviors
//! -------------
//! - Build lookup tables for every occupied `(stim_std, prior_std)` condition
//!   and gather each trial's column into a `(percept × trial)` matrix of
//!   `P(percept | Bayesian inference)`.
//! - Mix with uniform guessing:
//!   `(1 − p_rand) · P_BI + p_rand / 360`, then require unit column sums.
//! - Convolve each column with the motor density (`k_m`, centred at 360) on
//!   the circle.
//! - Replace non-positive cells with [`PROBABILITY_FLOOR`] and renormalize.
//!   Flooring is a stabilization step and is only traced.
//! - Gather each trial's probability at its observed estimate; any value that
//!   is `<= 0` or not finite aborts the evaluation.
//!
//! Invariants & assumptions
//! ------------------------
//! - Estimates were canonicalized when the dataset was built, so `0` and
//!   `360` give identical results.
//! - `neg_log_likelihood` is finite and non-negative for well-formed input.
//!
//! Conventions
//! -----------
//! - `AIC = 2 · (n_free_params − Σ log p)`; the free-parameter count comes
//!   from the fit's [`ParamLayout`](crate::observer::core::params::ParamLayout).
//!
//! Testing notes
//! -------------
//! - Unit tests cover the estimate wrap, lapse mixing, and motor smoothing.
//!   End-to-end fits live under `tests/`.
use ndarray::{Array1, Array2, Axis};
use tracing::{debug, trace};

use crate::{
    observer::{
        core::{
            convolution::{CircularConvolver, offset_kernel},
            data::{ConditionGrid, TrialData},
            density::von_mises,
            options::ModelFixedParams,
            params::ObserverParams,
            space::{CircularSpace, DOMAIN_SIZE},
            validation::check_column_sums,
        },
        errors::{ObserverError, ObserverResult},
        models::lookup::ConditionLookup,
    },
    optimization::numerical_stability::{PROBABILITY_FLOOR, floor_non_positive, normalize_columns},
};

/// Result of one objective evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub neg_log_likelihood: f64,
    pub aic: f64,
    pub n_free_params: usize,
    /// `log p(estimate_t | θ)` per trial, in dataset order.
    pub log_likelihood_per_trial: Array1<f64>,
}

impl Evaluation {
    pub fn log_likelihood(&self) -> f64 {
        -self.neg_log_likelihood
    }
}

/// Objective evaluator bound to one dataset and one set of fixed settings.
#[derive(Debug)]
pub struct LikelihoodEngine {
    data: TrialData,
    grid: ConditionGrid,
    fixed: ModelFixedParams,
    n_free_params: usize,
    convolver: CircularConvolver,
}

impl LikelihoodEngine {
    /// Bind the engine to a validated dataset.
    ///
    /// # Errors
    /// - `InvalidDegree` / `InvalidPrecision` from
    ///   [`ModelFixedParams::validate`].
    pub fn new(
        data: TrialData, fixed: ModelFixedParams, n_free_params: usize,
    ) -> ObserverResult<Self> {
        fixed.validate()?;
        let grid = ConditionGrid::from_data(&data);
        Ok(Self { data, grid, fixed, n_free_params, convolver: CircularConvolver::new(DOMAIN_SIZE) })
    }

    pub fn data(&self) -> &TrialData {
        &self.data
    }

    pub fn grid(&self) -> &ConditionGrid {
        &self.grid
    }

    pub fn fixed(&self) -> &ModelFixedParams {
        &self.fixed
    }

    /// Score the dataset under `params`.
    ///
    /// # Errors
    /// - Any stage error from [`LikelihoodEngine::predictive_density`].
    /// - `NonPositiveLikelihood` / `NonFiniteLikelihood` at the gather step.
    pub fn evaluate(&self, params: &ObserverParams) -> ObserverResult<Evaluation> {
        let predictive = self.predictive_density(params)?;

        let mut log_lik = Array1::<f64>::zeros(self.data.len());
        for (trial, (&estimate, ll)) in self.data.estimate.iter().zip(log_lik.iter_mut()).enumerate()
        {
            let value = predictive[[CircularSpace::index_of(estimate), trial]];
            if !value.is_finite() {
                return Err(ObserverError::NonFiniteLikelihood { trial, value });
            }
            if value <= 0.0 {
                return Err(ObserverError::NonPositiveLikelihood { trial, value });
            }
            *ll = value.ln();
        }

        let sum_log = log_lik.sum();
        let neg_log_likelihood = -sum_log;
        let aic = 2.0 * (self.n_free_params as f64 - sum_log);
        debug!(
            nll = neg_log_likelihood,
            aic,
            k_llh = ?params.k_llh,
            k_prior = ?params.k_prior,
            p_rand = params.p_rand,
            k_m = params.k_m,
            "observer objective evaluated"
        );
        Ok(Evaluation {
            neg_log_likelihood,
            aic,
            n_free_params: self.n_free_params,
            log_likelihood_per_trial: log_lik,
        })
    }

    /// Final `(360 × n_trials)` distribution over estimates.
    pub fn predictive_density(&self, params: &ObserverParams) -> ObserverResult<Array2<f64>> {
        let lookup = ConditionLookup::build(&self.grid, &self.fixed, params)?;

        let n_trials = self.data.len();
        let mut bi = Array2::<f64>::zeros((DOMAIN_SIZE, n_trials));
        for (trial, mut dst) in bi.axis_iter_mut(Axis(1)).enumerate() {
            let condition = self.grid.trial_condition[trial];
            let table = lookup.for_trial(trial, condition)?;
            dst.assign(&table.column(self.grid.trial_column[trial]));
        }
        normalize_columns(&mut bi);

        let p_rand = params.p_rand;
        let guess = 1.0 / DOMAIN_SIZE as f64;
        let mixed = bi.mapv(|p| (1.0 - p_rand) * p + p_rand * guess);
        check_column_sums("lapse_mixture", &mixed)?;

        let motor = von_mises(&CircularSpace.points().to_vec(), &[DOMAIN_SIZE as f64], &[params.k_m])?;
        let kernel = offset_kernel(&motor.column(0).to_owned());
        let mut predictive = self.convolver.convolve_columns(&mixed, &kernel);

        let n_floored = floor_non_positive(&mut predictive, PROBABILITY_FLOOR);
        if n_floored > 0 {
            trace!(n_floored, floor = PROBABILITY_FLOOR, "floored non-positive predictive cells");
        }
        normalize_columns(&mut predictive);
        Ok(predictive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::core::{options::Readout, prior::PriorShape};
    use approx::assert_abs_diff_eq;

    fn params(k_llh: f64, k_prior: f64, p_rand: f64, k_m: f64) -> ObserverParams {
        ObserverParams {
            k_llh: vec![k_llh],
            k_prior: vec![k_prior],
            k_card: f64::NAN,
            prior_tail: f64::NAN,
            p_rand,
            k_m,
        }
    }

    fn engine(estimates: &[f64]) -> LikelihoodEngine {
        let n = estimates.len();
        let stim: Vec<f64> = (0..n).map(|i| 200.0 + 10.0 * i as f64).collect();
        let data = TrialData::new(
            &stim,
            &vec![0.66; n],
            &vec![225.0; n],
            &vec![80.0; n],
            &vec!["vonMisesPrior"; n],
            estimates,
        )
        .unwrap();
        let fixed = ModelFixedParams::new(PriorShape::VonMises, 225.0, Readout::Map).unwrap();
        LikelihoodEngine::new(data, fixed, 2).unwrap()
    }

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Estimate wrap-around (0 ≡ 360).
    // - Predictive columns after mixing, convolution, flooring.
    // - AIC bookkeeping.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify an estimate of 0 scores exactly like 360.
    //
    // Given
    // -----
    // - Two otherwise identical engines with estimates (0, 205) and (360, 205).
    //
    // Expect
    // ------
    // - Identical negative log-likelihoods and per-trial values.
    fn estimate_zero_matches_360() {
        let p = params(3.0, 2.0, 0.05, 20.0);

        let a = engine(&[0.0, 205.0]).evaluate(&p).unwrap();
        let b = engine(&[360.0, 205.0]).evaluate(&p).unwrap();

        assert_eq!(a.neg_log_likelihood, b.neg_log_likelihood);
        assert_eq!(a.log_likelihood_per_trial, b.log_likelihood_per_trial);
    }

    #[test]
    // Purpose
    // -------
    // Check predictive columns are normalized and strictly positive.
    //
    // Given
    // -----
    // - Sharp observer (k_llh = 50), no lapse, and a point-mass motor kernel,
    //   so most cells are zero (or FFT round-off) before flooring.
    //
    // Expect
    // ------
    // - Every column sums to one; every cell is > 0.
    // - NLL is finite and non-negative; AIC = 2·(2 + NLL).
    fn predictive_columns_are_positive_and_normalized() {
        let eng = engine(&[200.0, 90.0]);
        let p = params(50.0, 1.0, 0.0, f64::INFINITY);

        let pred = eng.predictive_density(&p).unwrap();
        let eval = eng.evaluate(&p).unwrap();

        for s in pred.sum_axis(Axis(0)).iter() {
            assert_abs_diff_eq!(*s, 1.0, epsilon = 1e-9);
        }
        assert!(pred.iter().all(|&v| v > 0.0));
        assert!(eval.neg_log_likelihood.is_finite());
        assert!(eval.neg_log_likelihood >= 0.0);
        assert_abs_diff_eq!(eval.aic, 2.0 * (2.0 + eval.neg_log_likelihood), epsilon = 1e-9);
    }

    #[test]
    // Purpose
    // -------
    // Ensure a full lapse rate reduces the model to uniform guessing.
    //
    // Given
    // -----
    // - p_rand = 1 with three trials.
    //
    // Expect
    // ------
    // - NLL = 3 · ln(360).
    fn full_lapse_is_uniform_guessing() {
        let eng = engine(&[10.0, 100.0, 300.0]);

        let eval = eng.evaluate(&params(4.0, 4.0, 1.0, 10.0)).unwrap();

        assert_abs_diff_eq!(eval.neg_log_likelihood, 3.0 * (360f64).ln(), epsilon = 1e-9);
    }

    #[test]
    fn negative_motor_concentration_is_rejected() {
        let eng = engine(&[200.0]);

        let err = eng.evaluate(&params(4.0, 4.0, 0.0, -1.0)).unwrap_err();

        assert!(matches!(err, ObserverError::InvalidConcentration { .. }));
    }
}
