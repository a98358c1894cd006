//! Public API surface for log-likelihood maximization.
//!
//! - [`LogLikelihood`]: trait users implement for their model.
//! - [`MLEOptions`], [`Tolerances`] and [`SimplexOptions`]: configuration for
//!   the optimizer.
//! - [`OptimOutcome`]: normalized result returned by the high-level `maximize` API.
//!
//! Convention: we *maximize* a user log-likelihood `ℓ(θ)` by minimizing the cost
//! `c(θ) = -ℓ(θ)`. The search is derivative-free, so only `ℓ` itself is needed.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        Cost, FnEvalMap, Theta,
        types::{DEFAULT_NONZERO_DELTA, DEFAULT_ZERO_DELTA},
        validation::{
            validate_theta_hat, validate_value, verify_max_fun_evals, verify_max_iter,
            verify_simplex_delta, verify_tol_f, verify_tol_x,
        },
    },
};
use argmin::core::{TerminationReason, TerminationStatus};

/// User-implemented log-likelihood interface.
///
/// You maximize `ℓ(θ)`; internally we minimize the cost `c(θ) = -ℓ(θ)`.
///
/// - `type Data`: per-model data carried into `value`/`check`.
///
/// Required:
/// - `value(&Theta, &Data) -> OptResult<Cost>`: evaluate `ℓ(θ)`.
///   - Errors: return a descriptive `OptError` for invalid inputs or model
///     failures. Any error aborts the search and is returned unchanged.
/// - `check(&Theta, &Data) -> OptResult<()>`: validation hook to reject
///   obviously invalid `θ`/`data` pairs. Called once before optimization.
pub trait LogLikelihood {
    type Data: 'static;

    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<Cost>;
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()>;
}

/// Initial-simplex construction.
///
/// - `nonzero_delta`: relative step for non-zero coordinates (`x · (1 + δ)`).
/// - `zero_delta`: absolute value used for coordinates that start at zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimplexOptions {
    pub nonzero_delta: f64,
    pub zero_delta: f64,
}

impl SimplexOptions {
    pub fn new(nonzero_delta: f64, zero_delta: f64) -> OptResult<Self> {
        verify_simplex_delta(nonzero_delta)?;
        verify_simplex_delta(zero_delta)?;
        Ok(Self { nonzero_delta, zero_delta })
    }
}

impl Default for SimplexOptions {
    fn default() -> Self {
        Self { nonzero_delta: DEFAULT_NONZERO_DELTA, zero_delta: DEFAULT_ZERO_DELTA }
    }
}

/// Optimizer-level configuration.
///
/// Fields:
/// - `tols: Tolerances` — convergence tolerances and evaluation budget.
/// - `simplex: SimplexOptions` — initial-simplex perturbations.
/// - `verbose: bool` — if `true`, attaches an observer (behind the `obs_slog`
///   feature) and prints progress.
///
/// Default:
/// - `tols`: `tol_f = 1e-4`, `tol_x = 1e-4`, `max_iter = 100`,
///   `max_fun_evals = 100`
/// - `simplex`: `nonzero_delta = 0.05`, `zero_delta = 0.00025`
/// - `verbose`: `false`
#[derive(Debug, Clone, PartialEq)]
pub struct MLEOptions {
    pub tols: Tolerances,
    pub simplex: SimplexOptions,
    pub verbose: bool,
}

impl MLEOptions {
    /// Create a new set of optimizer options.
    ///
    /// Numeric fields are validated by [`Tolerances::new`] and
    /// [`SimplexOptions::new`]; this re-checks the simplex deltas in case the
    /// struct was built literally.
    pub fn new(tols: Tolerances, simplex: SimplexOptions, verbose: bool) -> OptResult<Self> {
        verify_simplex_delta(simplex.nonzero_delta)?;
        verify_simplex_delta(simplex.zero_delta)?;
        Ok(Self { tols, simplex, verbose })
    }
}

impl Default for MLEOptions {
    fn default() -> Self {
        Self { tols: Tolerances::default(), simplex: SimplexOptions::default(), verbose: false }
    }
}

/// Convergence tolerances and evaluation budget used by the simplex search.
///
/// - `tol_f`: converged when every vertex cost is within `tol_f` of the best.
/// - `tol_x`: converged when every vertex is within `tol_x` (max-norm) of the best.
/// - `max_iter`: hard cap on the number of iterations.
/// - `max_fun_evals`: hard cap on the number of objective evaluations.
///
/// Convergence requires both tolerances; an absent tolerance is treated as
/// satisfied. At least one field must be provided (see [`Tolerances::new`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_f: Option<f64>,
    pub tol_x: Option<f64>,
    pub max_iter: Option<usize>,
    pub max_fun_evals: Option<usize>,
}

impl Tolerances {
    /// Construct validated tolerances.
    ///
    /// # Rules
    /// - At least one field must be `Some`.
    /// - If provided, tolerances must be **finite and strictly positive**.
    /// - If provided, `max_iter` and `max_fun_evals` must be `> 0`.
    ///
    /// # Errors
    /// - [`OptError::NoTolerancesProvided`] if all four are `None`.
    /// - [`OptError::InvalidTolF`] / [`OptError::InvalidTolX`] for non-finite
    ///   or non-positive tolerances.
    /// - [`OptError::InvalidMaxIter`] / [`OptError::InvalidMaxFunEvals`] for zero caps.
    pub fn new(
        tol_f: Option<f64>, tol_x: Option<f64>, max_iter: Option<usize>,
        max_fun_evals: Option<usize>,
    ) -> OptResult<Self> {
        if tol_f.is_none() && tol_x.is_none() && max_iter.is_none() && max_fun_evals.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_tol_f(tol_f)?;
        verify_tol_x(tol_x)?;
        verify_max_iter(max_iter)?;
        verify_max_fun_evals(max_fun_evals)?;
        Ok(Self { tol_f, tol_x, max_iter, max_fun_evals })
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Self { tol_f: Some(1e-4), tol_x: Some(1e-4), max_iter: Some(100), max_fun_evals: Some(100) }
    }
}

/// Canonical result returned by `maximize`.
///
/// - `theta_hat`: best parameter vector found.
/// - `value`: best **log-likelihood** value `ℓ(θ)` (not the cost).
/// - `converged`: `true` only if the simplex met both tolerances.
/// - `status`: human-readable termination status string.
/// - `iterations`: number of optimizer iterations performed.
/// - `fn_evals`: function-evaluation counters reported by `argmin`
///   (key `"cost_count"`).
/// - `cost_trace`: best cost after initialization and after every iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimOutcome {
    pub theta_hat: Theta,
    pub value: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
    pub cost_trace: Vec<Cost>,
}

impl OptimOutcome {
    /// Build a validated [`OptimOutcome`] from raw solver state.
    ///
    /// # Errors
    /// - Propagates any validation errors for `theta_hat` or `value`.
    pub fn new(
        theta_hat_opt: Option<Theta>, value: f64, termination: TerminationStatus, iterations: u64,
        fn_evals: FnEvalMap, cost_trace: Vec<Cost>,
    ) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(theta_hat_opt)?;
        validate_value(value)?;
        let (converged, status) = match &termination {
            TerminationStatus::NotTerminated => (false, "Not terminated".to_string()),
            TerminationStatus::Terminated(reason) => {
                (matches!(reason, TerminationReason::SolverConverged), format!("{termination:?}"))
            }
        };
        Ok(Self {
            theta_hat,
            value,
            converged,
            status,
            iterations: iterations as usize,
            fn_evals,
            cost_trace,
        })
    }

    /// Number of objective evaluations, if argmin reported them.
    pub fn cost_evals(&self) -> u64 {
        self.fn_evals.get("cost_count").copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Verify defaults match the documented budget.
    //
    // Given
    // -----
    // - `MLEOptions::default()`.
    //
    // Expect
    // ------
    // - 100 iterations, 100 evaluations, both tolerances 1e-4, deltas 0.05 / 0.00025.
    fn defaults_match_documented_budget() {
        let opts = MLEOptions::default();

        assert_eq!(opts.tols.max_iter, Some(100));
        assert_eq!(opts.tols.max_fun_evals, Some(100));
        assert_eq!(opts.tols.tol_f, Some(1e-4));
        assert_eq!(opts.tols.tol_x, Some(1e-4));
        assert_eq!(opts.simplex, SimplexOptions::new(0.05, 0.00025).unwrap());
        assert!(!opts.verbose);
    }

    #[test]
    fn tolerances_require_at_least_one_rule() {
        assert_eq!(Tolerances::new(None, None, None, None), Err(OptError::NoTolerancesProvided));
        assert!(Tolerances::new(None, None, Some(5), None).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Ensure only a solver-converged termination counts as converged.
    //
    // Given
    // -----
    // - Outcomes terminated by `SolverConverged` and `MaxItersReached`.
    //
    // Expect
    // ------
    // - `converged` true and false respectively; status strings mention the reason.
    fn outcome_converged_flag_tracks_termination_reason() {
        let done = OptimOutcome::new(
            Some(array![1.0]),
            -2.0,
            TerminationStatus::Terminated(TerminationReason::SolverConverged),
            3,
            FnEvalMap::new(),
            vec![3.0, 2.0],
        )
        .unwrap();
        let capped = OptimOutcome::new(
            Some(array![1.0]),
            -2.0,
            TerminationStatus::Terminated(TerminationReason::MaxItersReached),
            100,
            FnEvalMap::new(),
            vec![],
        )
        .unwrap();

        assert!(done.converged);
        assert!(done.status.contains("SolverConverged"));
        assert!(!capped.converged);
        assert!(capped.status.contains("MaxItersReached"));
        assert_eq!(done.cost_evals(), 0);
    }

    #[test]
    fn outcome_rejects_non_finite_value() {
        let err = OptimOutcome::new(
            Some(array![1.0]),
            f64::NAN,
            TerminationStatus::NotTerminated,
            0,
            FnEvalMap::new(),
            vec![],
        );
        assert!(matches!(err, Err(OptError::NonFiniteCost { .. })));
    }
}
