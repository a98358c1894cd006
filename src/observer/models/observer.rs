//! Bayesian observer: `LogLikelihood` implementation and fit entry points.
//!
//! This module wires the [`LikelihoodEngine`] to the `LogLikelihood` trait so
//! the simplex search in `loglik_optimizer` can drive it. The optimizer sees
//! only the free subvector `θ`; [`ParamLayout`] expands it into the six named
//! groups before every evaluation.
//!
//! Key ideas:
//! - `ℓ(θ) = Σ_t log p(estimate_t | θ)`, so maximizing `ℓ` minimizes the
//!   negative log-likelihood reported in [`FitResult`].
//! - Model errors raised mid-search travel through the optimizer as
//!   `OptError::Model` and come back out of [`BayesianObserver::fit`] as the
//!   original [`ObserverError`].
//! - Free concentrations are searched on the softplus scale, so a simplex
//!   step can never propose a negative `k`. The fitted free vector is
//!   expanded back into the full, group-ordered vector in natural units
//!   (`best_fit_params`); fixed and unused entries keep their initial values.
use ndarray::Array1;
use tracing::info;

use crate::{
    observer::{
        core::{
            data::{ConditionGrid, TrialData},
            options::{FitConfig, ModelFixedParams, OptimizerConfig, Readout},
            params::{InitParams, ObserverParams, ParamGroup, ParamLayout},
            prior::PriorShape,
        },
        errors::{ObserverError, ObserverResult},
        models::engine::{Evaluation, LikelihoodEngine},
    },
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{LogLikelihood, MLEOptions, OptimOutcome, Theta, maximize},
    },
};

/// Summary of a completed fit.
#[derive(Debug, Clone, PartialEq)]
pub struct FitResult {
    /// Best negative log-likelihood after initialisation and after every
    /// simplex iteration.
    pub neg_log_likelihood_trace: Vec<f64>,
    /// Full parameter vector in [`ParamGroup::ALL`] order.
    pub best_fit_params: Array1<f64>,
    pub neg_log_likelihood: f64,
    pub aic: f64,
    pub iterations: usize,
    /// Objective evaluations spent by the search.
    pub fn_evals: u64,
    pub converged: bool,
    pub status: String,
}

impl FitResult {
    fn from_outcome(outcome: &OptimOutcome, layout: &ParamLayout) -> ObserverResult<Self> {
        let neg_log_likelihood = -outcome.value;
        Ok(Self {
            neg_log_likelihood_trace: outcome.cost_trace.clone(),
            best_fit_params: layout.expand(&outcome.theta_hat)?,
            neg_log_likelihood,
            aic: 2.0 * (layout.n_free() as f64 + neg_log_likelihood),
            iterations: outcome.iterations,
            fn_evals: outcome.cost_evals(),
            converged: outcome.converged,
            status: outcome.status.clone(),
        })
    }
}

/// Bayesian observer bound to one dataset.
///
/// Holds the likelihood engine, the parameter layout derived from the initial
/// configuration, and the optimizer budget. After [`fit`](Self::fit), the
/// last outcome is cached in `results`.
#[derive(Debug)]
pub struct BayesianObserver {
    engine: LikelihoodEngine,
    layout: ParamLayout,
    /// Optimizer budget used by [`fit`](Self::fit).
    pub options: MLEOptions,
    /// Fit results (populated after `fit`).
    pub results: Option<FitResult>,
}

impl BayesianObserver {
    /// Build an observer and derive its parameter layout.
    ///
    /// `init = None` starts from [`InitParams::default_for`] the dataset's
    /// condition grid. Groups listed in `fixed_groups` stay at their initial
    /// values.
    ///
    /// # Errors
    /// - Fixed-setting errors from [`ModelFixedParams::validate`].
    /// - Layout errors from [`ParamLayout::new`] (`GroupLengthMismatch`,
    ///   `MissingParameter`, `NoFreeParameters`).
    pub fn new(
        data: TrialData, fixed: ModelFixedParams, init: Option<InitParams>,
        fixed_groups: &[ParamGroup], options: MLEOptions,
    ) -> ObserverResult<Self> {
        let grid = ConditionGrid::from_data(&data);
        let init = init.unwrap_or_else(|| InitParams::default_for(&grid));
        let layout = ParamLayout::new(&init, &grid, fixed_groups)?;
        let engine = LikelihoodEngine::new(data, fixed, layout.n_free())?;
        Ok(Self { engine, layout, options, results: None })
    }

    /// Build an observer from a deserialized [`FitConfig`].
    pub fn from_config(data: TrialData, config: &FitConfig) -> ObserverResult<Self> {
        config.validate()?;
        Self::new(
            data,
            config.model.fixed_params,
            config.model.init_params.clone(),
            &config.model.fixed_groups,
            config.optimizer.to_mle_options()?,
        )
    }

    pub fn engine(&self) -> &LikelihoodEngine {
        &self.engine
    }

    pub fn layout(&self) -> &ParamLayout {
        &self.layout
    }

    /// Typed parameters for a free subvector on the search scale.
    pub fn params(&self, free: &Theta) -> ObserverResult<ObserverParams> {
        let full = self.layout.expand(free)?;
        self.layout.unpack(&full)
    }

    /// Score the dataset at a free subvector on the search scale (see
    /// [`ParamLayout::free_from`] to start from natural units).
    pub fn evaluate(&self, free: &Theta) -> ObserverResult<Evaluation> {
        self.engine.evaluate(&self.params(free)?)
    }

    /// Fit the free parameters by maximum likelihood and cache the result.
    ///
    /// ## Steps
    /// 1. Take the initial free subvector from the layout.
    /// 2. Run the simplex search per `self.options`.
    /// 3. Expand `θ̂` into the full vector and compute AIC from the best
    ///    negative log-likelihood.
    ///
    /// # Errors
    /// - The first model error raised by any evaluation, unchanged.
    /// - `ObserverError::Optimization` for solver/back-end failures.
    pub fn fit(&mut self) -> ObserverResult<FitResult> {
        let theta0 = self.layout.initial_free();
        info!(
            n_free = self.layout.n_free(),
            n_trials = self.engine.data().len(),
            n_conditions = self.engine.grid().occupied().iter().filter(|&&o| o).count(),
            "fitting Bayesian observer"
        );
        let outcome = maximize(&*self, theta0, &(), &self.options)?;
        let result = FitResult::from_outcome(&outcome, &self.layout)?;
        info!(
            nll = result.neg_log_likelihood,
            aic = result.aic,
            iterations = result.iterations,
            converged = result.converged,
            status = %result.status,
            "Bayesian observer fit finished"
        );
        self.results = Some(result.clone());
        Ok(result)
    }
}

impl LogLikelihood for BayesianObserver {
    /// The engine owns its dataset.
    type Data = ();

    fn value(&self, theta: &Theta, _data: &()) -> OptResult<f64> {
        let eval = self.evaluate(theta).map_err(OptError::Model)?;
        Ok(eval.log_likelihood())
    }

    fn check(&self, theta: &Theta, _data: &()) -> OptResult<()> {
        if theta.len() != self.layout.n_free() {
            return Err(OptError::Model(ObserverError::ParamLengthMismatch {
                expected: self.layout.n_free(),
                actual: theta.len(),
            }));
        }
        Ok(())
    }
}

/// Fit with default starting values and the default optimizer budget.
///
/// `prior_shape` and `prior_mode` are the fixed prior settings; `readout`
/// must be `"map"`.
///
/// # Errors
/// - `UnsupportedReadout` for any readout other than `"map"`.
/// - Every error [`BayesianObserver::new`] and [`BayesianObserver::fit`] raise.
pub fn fit_maxlogl(
    data: TrialData, prior_shape: PriorShape, prior_mode: f64, readout: &str,
) -> ObserverResult<FitResult> {
    let readout = readout.parse::<Readout>()?;
    let fixed = ModelFixedParams::new(prior_shape, prior_mode, readout)?;
    let options = OptimizerConfig::default().to_mle_options()?;
    let mut observer = BayesianObserver::new(data, fixed, None, &[], options)?;
    observer.fit()
}
