//! High-level entry point for maximizing a user-provided `LogLikelihood`.
//!
//! This builds a downhill simplex around the starting point, wraps the model
//! in an `ArgMinAdapter` (which *minimizes* `-ℓ(θ)`), and delegates the run
//! to `run_simplex`.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        OptimOutcome, Theta,
        adapter::ArgMinAdapter,
        builders::build_simplex_solver,
        run::run_simplex,
        traits::{LogLikelihood, MLEOptions},
    },
};

/// Maximize a log-likelihood `ℓ(θ)` with a derivative-free simplex search.
///
/// # Behavior
/// - Validates the initial guess via `f.check(theta0, data)`.
/// - Builds the initial simplex from `opts.simplex`.
/// - Wraps `(f, data)` in an `ArgMinAdapter` that exposes a *minimization*
///   problem `c(θ) = -ℓ(θ)` to `argmin`.
/// - Calls `run_simplex`, which configures the executor (initial params,
///   max iters, optional observers) and returns an `OptimOutcome`.
///
/// # Errors
/// - Propagates any error from `f.check` or from `f.value` during the search;
///   the first error aborts the run.
/// - Propagates builder errors for empty or non-finite `theta0`.
///
/// # Example
/// ```no_run
/// use ndarray::array;
/// use circular_observer::optimization::errors::OptResult;
/// use circular_observer::optimization::loglik_optimizer::{
///     maximize, LogLikelihood, MLEOptions, Theta,
/// };
///
/// struct MyLL;
/// impl LogLikelihood for MyLL {
///     type Data = ();
///     fn value(&self, theta: &Theta, _: &()) -> OptResult<f64> {
///         Ok(-theta.dot(theta))
///     }
///     fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
///         Ok(())
///     }
/// }
///
/// let out = maximize(&MyLL, array![0.1, -0.2, 0.3], &(), &MLEOptions::default())?;
/// println!("θ̂ = {:?}", out.theta_hat);
/// # Ok::<(), circular_observer::optimization::errors::OptError>(())
/// ```
pub fn maximize<F: LogLikelihood>(
    f: &F, theta0: Theta, data: &F::Data, opts: &MLEOptions,
) -> OptResult<OptimOutcome> {
    f.check(&theta0, data)?;
    let solver = build_simplex_solver(&theta0, opts)?;
    let problem = ArgMinAdapter::new(f, data);
    run_simplex(theta0, opts, problem, solver)
}
