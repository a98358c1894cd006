//! Integration tests for the Bayesian observer model.
//!
//! Purpose
//! -------
//! - Validate the end-to-end observer pipeline: from validated trial data,
//!   through per-condition lookup tables and the trial likelihood, to a
//!   maximum-likelihood fit.
//! - Exercise the public API only, the way a downstream crate would.
//!
//! Coverage
//! --------
//! - `observer::models`:
//!   - Reference lookup table (stimulus 225, prior 225, k = 5).
//!   - Flat posteriors keeping every degree as a MAP candidate.
//!   - Estimate wrap-around (0 ≡ 360) through `BayesianObserver::evaluate`.
//!   - `BayesianObserver::fit` and `from_config`; `fit_maxlogl` from the
//!     default start and its input validation.
//! - `observer::core::options`:
//!   - `FitConfig` loaded from JSON with serde defaults.
//!
//! Exclusions
//! ----------
//! - Fine-grained checks of individual stages (rounding, tie splitting,
//!   convolution orientation); these are covered by unit tests.
//! - Python bindings.
use approx::assert_abs_diff_eq;
use circular_observer::{
    observer::{
        core::{
            CircularSpace, FitConfig, InitParams, LearnedPrior, ModelFixedParams, ParamGroup,
            PriorShape, Readout, TrialData, von_mises,
        },
        errors::ObserverError,
        models::{
            BayesCombiner, BayesianObserver, PerceptSelector, fit_maxlogl, percept_likelihood,
        },
    },
    optimization::loglik_optimizer::{MLEOptions, SimplexOptions, Tolerances},
};
use ndarray::ArrayView1;

/// Purpose
/// -------
/// Build a single-condition dataset whose estimates equal the stimuli, so a
/// sharper likelihood always explains the responses better.
///
/// Returns
/// -------
/// - 12 trials, stimuli spread over 160..=292, one stimulus and one prior
///   noise level, prior mode 225.
fn noiseless_data() -> TrialData {
    let stim: Vec<f64> = (0..12).map(|i| 160.0 + 12.0 * i as f64).collect();
    TrialData::new(&stim, &[0.33; 12], &[225.0; 12], &[80.0; 12], &["vonMisesPrior"; 12], &stim)
        .expect("TrialData::new should accept integral degrees")
}

fn fixed_225() -> ModelFixedParams {
    ModelFixedParams::new(PriorShape::VonMises, 225.0, Readout::Map)
        .expect("225 is a valid prior mode")
}

fn budget(max_iter: usize, max_fun_evals: usize) -> MLEOptions {
    let tols = Tolerances::new(Some(1e-6), Some(1e-6), Some(max_iter), Some(max_fun_evals))
        .expect("tolerances should be valid");
    MLEOptions::new(tols, SimplexOptions::default(), false).expect("options should be valid")
}

/// Route `tracing` events to the test harness; `RUST_LOG=debug` shows every
/// evaluation.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn argmax(col: ArrayView1<f64>) -> usize {
    col.iter().enumerate().fold((0, f64::MIN), |acc, (i, &v)| if v > acc.1 { (i, v) } else { acc }).0
}

#[test]
// Purpose
// -------
// Verify the reference lookup: stimulus 225, k_llh = k_prior = 5, prior 225.
//
// Given
// -----
// - Von Mises prior at 225 with k = 5, MAP readout, default precision.
//
// Expect
// ------
// - A (360 × 1) table whose column sums to one.
// - The most likely percept lies within one degree of 225.
fn reference_lookup_peaks_at_225() {
    let prior = LearnedPrior::new(PriorShape::VonMises, 225.0, 5.0).unwrap();

    let table = percept_likelihood(&[225.0], 5.0, &prior, &fixed_225()).unwrap();

    assert_eq!(table.dim(), (360, 1));
    assert_abs_diff_eq!(table.column(0).sum(), 1.0, epsilon = 1e-9);
    let percept = (argmax(table.column(0)) + 1) as f64;
    assert!((percept - 225.0).abs() <= 1.0, "percept = {percept}");
}

#[test]
// Purpose
// -------
// Ensure flat likelihoods and priors tie every degree under MAP.
//
// Given
// -----
// - k_llh = k_prior = 0 over the full space.
//
// Expect
// ------
// - Every measurement keeps all 360 degrees as candidates.
fn flat_posterior_keeps_every_degree() {
    let space = CircularSpace.points().to_vec();
    let llh = von_mises(&space, &space, &[0.0]).unwrap();
    let prior = LearnedPrior::new(PriorShape::VonMises, 225.0, 0.0).unwrap().tiled(space.len());

    let posterior =
        BayesCombiner::new(1e-6).unwrap().combine(&llh, &prior, 0.0, 0.0, 225.0, &space).unwrap();
    let candidates = PerceptSelector::new(Readout::Map).select(&posterior, &space).unwrap();

    assert_eq!(candidates.n_measurements(), 360);
    assert!(candidates.counts.iter().all(|&c| c == 360));
}

#[test]
// Purpose
// -------
// Verify 0 and 360 are the same estimate end to end, and that the caller's
// buffers are left untouched.
//
// Given
// -----
// - Two datasets differing only in one estimate (0 vs 360).
//
// Expect
// ------
// - Identical, finite, non-negative NLL at the same parameters.
// - The caller's estimate buffer still holds 0.
fn estimate_wrap_is_invisible_to_the_likelihood() {
    let estimates_zero = [0.0, 210.0, 230.0];
    let build = |estimates: &[f64]| {
        let data = TrialData::new(
            &[350.0, 200.0, 240.0],
            &[0.5; 3],
            &[225.0; 3],
            &[40.0; 3],
            &["vonMisesPrior"; 3],
            estimates,
        )
        .unwrap();
        BayesianObserver::new(data, fixed_225(), None, &[], budget(10, 10)).unwrap()
    };
    let init = InitParams {
        k_llh: vec![4.0],
        k_prior: vec![2.0],
        k_card: vec![1.0],
        prior_tail: vec![0.0],
        p_rand: vec![0.02],
        k_m: vec![15.0],
    }
    .flatten();

    let a = build(&estimates_zero);
    let b = build(&[360.0, 210.0, 230.0]);
    let free = a.layout().free_from(&init).unwrap();
    let ea = a.evaluate(&free).unwrap();
    let eb = b.evaluate(&free).unwrap();

    assert_eq!(ea.neg_log_likelihood, eb.neg_log_likelihood);
    assert!(ea.neg_log_likelihood.is_finite());
    assert!(ea.neg_log_likelihood >= 0.0);
    assert_eq!(estimates_zero[0], 0.0);
}

#[test]
// Purpose
// -------
// Check the fit beats a mis-specified guess with small concentrations and
// drives both concentration groups up on noiseless data.
//
// Given
// -----
// - Noiseless data (estimate = stimulus).
// - k_llh and k_prior free, both starting at 1; p_rand = 0 and k_m = 50
//   fixed; k_card and prior_tail unused (NaN).
// - 100 iterations / 100 evaluations.
//
// Expect
// ------
// - Final NLL strictly below the NLL at the starting point.
// - Fitted k_llh and k_prior above their starting values; fixed groups
//   unchanged.
// - AIC counts exactly two free parameters; the trace never increases.
fn noiseless_fit_sharpens_likelihood_and_prior() {
    init_tracing();
    let init = InitParams {
        k_llh: vec![1.0],
        k_prior: vec![1.0],
        k_card: vec![f64::NAN],
        prior_tail: vec![f64::NAN],
        p_rand: vec![0.0],
        k_m: vec![50.0],
    };
    let mut model = BayesianObserver::new(
        noiseless_data(),
        fixed_225(),
        Some(init),
        &[ParamGroup::PRand, ParamGroup::KM],
        budget(100, 100),
    )
    .unwrap();
    let nll0 = model.evaluate(&model.layout().initial_free()).unwrap().neg_log_likelihood;

    let fit = model.fit().unwrap();

    assert_eq!(model.layout().n_free(), 2);
    assert!(fit.neg_log_likelihood < nll0, "{} !< {nll0}", fit.neg_log_likelihood);
    assert!(fit.best_fit_params[0] > 1.0, "k_llh = {}", fit.best_fit_params[0]);
    assert!(fit.best_fit_params[1] > 1.0, "k_prior = {}", fit.best_fit_params[1]);
    assert_eq!(fit.best_fit_params[4], 0.0);
    assert_eq!(fit.best_fit_params[5], 50.0);
    assert_abs_diff_eq!(fit.aic, 2.0 * (2.0 + fit.neg_log_likelihood), epsilon = 1e-9);
    assert!(fit.neg_log_likelihood_trace.windows(2).all(|w| w[1] <= w[0]));
}

#[test]
// Purpose
// -------
// Verify the default-settings entry point fits end to end from the default
// start, where k_m = 0 sits on the boundary of the concentration range.
//
// Given
// -----
// - Noiseless data, von Mises prior at 225, MAP readout, default budget.
//
// Expect
// ------
// - `Ok` with a finite NLL no worse than the default start.
// - Every fitted concentration (k_llh, k_prior, k_m) is `>= 0`.
// - All six groups count as free in the AIC.
fn fit_maxlogl_succeeds_from_default_start() {
    init_tracing();
    let data = noiseless_data();
    let start = BayesianObserver::new(data.clone(), fixed_225(), None, &[], budget(1, 1)).unwrap();
    let nll0 = start.evaluate(&start.layout().initial_free()).unwrap().neg_log_likelihood;

    let fit = fit_maxlogl(data, PriorShape::VonMises, 225.0, "map").unwrap();

    assert!(fit.neg_log_likelihood.is_finite());
    assert!(fit.neg_log_likelihood <= nll0);
    for idx in [0, 1, 5] {
        assert!(fit.best_fit_params[idx] >= 0.0, "param {idx} = {}", fit.best_fit_params[idx]);
    }
    assert_abs_diff_eq!(fit.aic, 2.0 * (6.0 + fit.neg_log_likelihood), epsilon = 1e-9);
}

#[test]
// Purpose
// -------
// Ensure a JSON configuration drives the same fit surface, with serde
// defaults filling the optimizer section.
//
// Given
// -----
// - A config with fixed params, explicit init values, `k_card`,
//   `prior_tail` and `k_m` fixed, and a five-iteration budget.
//
// Expect
// ------
// - Omitted fields take their defaults (evaluation cap, precision).
// - 3 free parameters; the fit respects the budget and keeps k_m = 30.
fn fit_config_from_json() {
    let json = r#"{
        "model": {
            "init_params": {
                "k_llh": [2.0], "k_prior": [1.0], "k_card": [1.0],
                "prior_tail": [0.0], "p_rand": [0.05], "k_m": [30.0]
            },
            "fixed_params": { "prior_shape": "vonMisesPrior", "prior_mode": 225.0, "readout": "map" },
            "fixed_groups": ["k_card", "prior_tail", "k_m"]
        },
        "optimizer": { "max_iter": 5 }
    }"#;

    init_tracing();
    let config: FitConfig = serde_json::from_str(json).expect("config should deserialize");
    let mut model = BayesianObserver::from_config(noiseless_data(), &config).unwrap();
    let fit = model.fit().unwrap();

    assert_eq!(config.optimizer.max_fun_evals, 100);
    assert_eq!(config.model.fixed_params.posterior_precision, 1e-6);
    assert_eq!(model.layout().n_free(), 3);
    assert!(fit.iterations <= 5);
    assert_eq!(fit.neg_log_likelihood_trace.len(), fit.iterations + 1);
    assert_eq!(fit.best_fit_params[5], 30.0);
}

#[test]
// Purpose
// -------
// Verify the default-settings entry point validates its settings before
// fitting.
//
// Given
// -----
// - An unsupported readout, then an out-of-range prior mode.
//
// Expect
// ------
// - `UnsupportedReadout` for "mean" and `InvalidDegree` for 400.
fn fit_maxlogl_validates_settings() {
    let data = noiseless_data();

    let readout = fit_maxlogl(data.clone(), PriorShape::VonMises, 225.0, "mean").unwrap_err();
    let mode = fit_maxlogl(data, PriorShape::VonMises, 400.0, "map").unwrap_err();

    assert_eq!(readout, ObserverError::UnsupportedReadout { name: "mean".into() });
    assert!(matches!(mode, ObserverError::InvalidDegree { column: "prior_mode", .. }));
}
