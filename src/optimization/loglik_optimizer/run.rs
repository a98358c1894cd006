//! Execution helper that runs the simplex solver on a log-likelihood problem
//! and returns a crate-friendly [`OptimOutcome`].
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        LogLikelihood, MLEOptions, OptimOutcome, Theta, adapter::ArgMinAdapter,
        simplex::SimplexSearch,
    },
};
#[cfg(feature = "obs_slog")]
use argmin::core::CostFunction;
use argmin::core::{Executor, State};
use tracing::info;

/// Run a [`SimplexSearch`] for a log-likelihood problem.
///
/// Wires up:
/// - the user model via [`ArgMinAdapter`],
/// - the prepared solver and the initial parameter `theta0`,
/// - optional observers (behind the `obs_slog` feature),
/// - optional `max_iters`,
///
/// then executes the solver and converts the result into [`OptimOutcome`].
///
/// # Feature flags
/// If the `obs_slog` feature is enabled and `opts.verbose == true`, a terminal
/// slog observer is attached with `ObserverMode::Always` and a one-time
/// pre-iteration line logs ℓ(θ₀).
///
/// # Returns
/// An [`OptimOutcome`] containing the best parameter found, best
/// log-likelihood value ℓ(θ̂), termination status, iteration count,
/// function-evaluation counts, and the per-iteration best-cost trace.
///
/// # Errors
/// - Any cost error raised by the model, restored through
///   `From<argmin::core::Error>`.
/// - Validation errors encountered when constructing [`OptimOutcome`].
pub fn run_simplex<'a, F>(
    theta0: Theta, opts: &MLEOptions, problem: ArgMinAdapter<'a, F>, solver: SimplexSearch,
) -> OptResult<OptimOutcome>
where
    F: LogLikelihood,
{
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        log_initial_state(&theta0, &problem)?;
    }
    let n_params = theta0.len();
    let mut optimizer = Executor::new(problem, solver);
    optimizer = optimizer.configure(|state| state.param(theta0));
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        optimizer = optimizer.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }
    if let Some(max_iter) = opts.tols.max_iter {
        optimizer = optimizer.configure(|state| state.max_iters(max_iter as u64));
    }

    let result = optimizer.run()?;
    let cost_trace = result.solver.cost_trace().to_vec();
    let mut state = result.state;
    let iterations = state.get_iter();
    let function_counts = state.get_func_counts().clone();
    let termination = state.get_termination_status().clone();
    let best_cost = state.get_best_cost();
    info!(
        n_params,
        iterations,
        best_cost,
        status = ?termination,
        "simplex search finished"
    );
    OptimOutcome::new(
        state.take_best_param(),
        -best_cost,
        termination,
        iterations,
        function_counts,
        cost_trace,
    )
}

// ---- Helper Methods ----

#[cfg(feature = "obs_slog")]
fn log_initial_state<F>(theta0: &Theta, problem: &ArgMinAdapter<'_, F>) -> OptResult<()>
where
    F: LogLikelihood,
{
    let ll0 = -problem.cost(theta0)?;
    eprintln!("init: ell(theta0) = {:.6}", ll0);
    Ok(())
}
