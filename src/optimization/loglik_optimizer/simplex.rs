//! loglik_optimizer::simplex — derivative-free downhill simplex on argmin.
//!
//! Purpose
//! -------
//! Minimize a cost `c(θ)` without gradients using the Nelder–Mead downhill
//! simplex, with the fixed evaluation budget and convergence rules the
//! observer fit expects. argmin's bundled Nelder–Mead cannot surface cost
//! errors raised during initialization, so the search is implemented here as
//! an argmin [`Solver`] and driven by the regular `Executor`.
//!
//! Key behaviors
//! -------------
//! - Each iteration reflects the worst vertex through the centroid of the
//!   others and then expands, contracts (outside or inside) or shrinks
//!   toward the best vertex. Coefficients: reflection 1, expansion 2,
//!   contraction 0.5, shrink 0.5.
//! - Converged when `max_i |c_i − c_0| ≤ tol_f` and
//!   `max_i ‖x_i − x_0‖_∞ ≤ tol_x`, with vertex 0 the best.
//! - Stops with `SolverExit` once the number of cost evaluations reaches
//!   `max_fun_evals`. The iteration cap is enforced by argmin via
//!   `max_iters`.
//! - Records the best cost after initialization and after each iteration in
//!   [`SimplexSearch::cost_trace`].
//!
//! Invariants & assumptions
//! ------------------------
//! - The simplex has `n + 1` vertices of equal length `n ≥ 1`.
//! - Any cost error aborts the run; nothing is retried.
//!
//! Testing notes
//! -------------
//! - Unit tests run the solver through argmin's `Executor` on smooth toy
//!   costs and check convergence, the evaluation cap, the trace, and error
//!   propagation.
use std::cmp::Ordering;

use argmin::core::{CostFunction, Error, KV, Problem, Solver, TerminationReason, TerminationStatus};
use argmin_math::{ArgminAdd, ArgminMul, ArgminSub};

use crate::optimization::{
    errors::OptError,
    loglik_optimizer::types::{Cost, SimplexState, Theta},
};

const RHO: f64 = 1.0;
const CHI: f64 = 2.0;
const PSI: f64 = 0.5;
const SIGMA: f64 = 0.5;

#[derive(Debug, Clone, Copy)]
enum Step {
    Reflection,
    Expansion,
    ContractionOutside,
    ContractionInside,
    Shrink,
}

impl Step {
    fn as_str(self) -> &'static str {
        match self {
            Step::Reflection => "reflection",
            Step::Expansion => "expansion",
            Step::ContractionOutside => "contraction_outside",
            Step::ContractionInside => "contraction_inside",
            Step::Shrink => "shrink",
        }
    }
}

/// Downhill simplex search with explicit tolerances and evaluation cap.
#[derive(Debug, Clone)]
pub struct SimplexSearch {
    vertices: Vec<(Theta, Cost)>,
    tol_f: Option<f64>,
    tol_x: Option<f64>,
    max_fun_evals: Option<u64>,
    n_evals: u64,
    cost_trace: Vec<Cost>,
}

impl SimplexSearch {
    /// Build a search from `n + 1` starting vertices.
    ///
    /// # Errors
    /// - `OptError::MalformedSimplex` unless there are `n + 1` vertices of
    ///   one length `n >= 1`.
    pub fn new(
        vertices: Vec<Theta>, tol_f: Option<f64>, tol_x: Option<f64>, max_fun_evals: Option<usize>,
    ) -> Result<Self, OptError> {
        let dim = vertices.first().map_or(0, |v| v.len());
        if dim == 0 || vertices.len() != dim + 1 || vertices.iter().any(|v| v.len() != dim) {
            return Err(OptError::MalformedSimplex { n_vertices: vertices.len(), dim });
        }
        Ok(Self {
            vertices: vertices.into_iter().map(|v| (v, Cost::NAN)).collect(),
            tol_f,
            tol_x,
            max_fun_evals: max_fun_evals.map(|m| m as u64),
            n_evals: 0,
            cost_trace: Vec::new(),
        })
    }

    /// Best cost after initialization and after every completed iteration.
    pub fn cost_trace(&self) -> &[Cost] {
        &self.cost_trace
    }

    pub fn n_evals(&self) -> u64 {
        self.n_evals
    }

    fn sort(&mut self) {
        self.vertices.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
    }

    fn best(&self) -> &(Theta, Cost) {
        &self.vertices[0]
    }

    fn centroid(&self) -> Theta {
        let n = self.vertices.len() - 1;
        let sum = self.vertices[1..n]
            .iter()
            .fold(self.vertices[0].0.clone(), |acc, (x, _)| acc.add(x));
        sum.mul(&(1.0 / n as f64))
    }

    fn cost<O>(&mut self, problem: &mut Problem<O>, x: &Theta) -> Result<Cost, Error>
    where
        O: CostFunction<Param = Theta, Output = Cost>,
    {
        self.n_evals += 1;
        problem.cost(x)
    }

    fn spreads(&self) -> (f64, f64) {
        let (x0, c0) = self.best();
        let mut f_spread: f64 = 0.0;
        let mut x_spread: f64 = 0.0;
        for (x, c) in &self.vertices[1..] {
            f_spread = f_spread.max((c - c0).abs());
            let d = x.sub(x0);
            x_spread = d.iter().fold(x_spread, |m, v| m.max(v.abs()));
        }
        (f_spread, x_spread)
    }

    fn shrink<O>(&mut self, problem: &mut Problem<O>) -> Result<(), Error>
    where
        O: CostFunction<Param = Theta, Output = Cost>,
    {
        let x0 = self.vertices[0].0.clone();
        for j in 1..self.vertices.len() {
            let x = x0.add(&self.vertices[j].0.sub(&x0).mul(&SIGMA));
            let c = self.cost(problem, &x)?;
            self.vertices[j] = (x, c);
        }
        Ok(())
    }
}

impl<O> Solver<O, SimplexState> for SimplexSearch
where
    O: CostFunction<Param = Theta, Output = Cost>,
{
    const NAME: &'static str = "Downhill simplex";

    fn init(
        &mut self, problem: &mut Problem<O>, state: SimplexState,
    ) -> Result<(SimplexState, Option<KV>), Error> {
        for j in 0..self.vertices.len() {
            let x = self.vertices[j].0.clone();
            let c = self.cost(problem, &x)?;
            self.vertices[j].1 = c;
        }
        self.sort();
        let (x0, c0) = self.best().clone();
        self.cost_trace.push(c0);
        Ok((state.param(x0).cost(c0), None))
    }

    fn next_iter(
        &mut self, problem: &mut Problem<O>, state: SimplexState,
    ) -> Result<(SimplexState, Option<KV>), Error> {
        let n = self.vertices.len() - 1;
        let xbar = self.centroid();
        let (x_worst, c_worst) = self.vertices[n].clone();
        let c_best = self.vertices[0].1;
        let c_second_worst = self.vertices[n - 1].1;

        let xr = xbar.mul(&(1.0 + RHO)).sub(&x_worst.mul(&RHO));
        let cr = self.cost(problem, &xr)?;

        let step = if cr < c_best {
            let xe = xbar.mul(&(1.0 + RHO * CHI)).sub(&x_worst.mul(&(RHO * CHI)));
            let ce = self.cost(problem, &xe)?;
            self.vertices[n] = if ce < cr { (xe, ce) } else { (xr, cr) };
            Step::Expansion
        } else if cr < c_second_worst {
            self.vertices[n] = (xr, cr);
            Step::Reflection
        } else if cr < c_worst {
            let xc = xbar.mul(&(1.0 + PSI * RHO)).sub(&x_worst.mul(&(PSI * RHO)));
            let cc = self.cost(problem, &xc)?;
            if cc <= cr {
                self.vertices[n] = (xc, cc);
                Step::ContractionOutside
            } else {
                self.shrink(problem)?;
                Step::Shrink
            }
        } else {
            let xcc = xbar.mul(&(1.0 - PSI)).add(&x_worst.mul(&PSI));
            let ccc = self.cost(problem, &xcc)?;
            if ccc < c_worst {
                self.vertices[n] = (xcc, ccc);
                Step::ContractionInside
            } else {
                self.shrink(problem)?;
                Step::Shrink
            }
        };

        self.sort();
        let (x0, c0) = self.best().clone();
        self.cost_trace.push(c0);
        let mut kv = KV::new();
        kv.insert("action", step.as_str().into());
        Ok((state.param(x0).cost(c0), Some(kv)))
    }

    fn terminate(&mut self, _state: &SimplexState) -> TerminationStatus {
        let (f_spread, x_spread) = self.spreads();
        let f_ok = self.tol_f.is_none_or(|tol| f_spread <= tol);
        let x_ok = self.tol_x.is_none_or(|tol| x_spread <= tol);
        if (self.tol_f.is_some() || self.tol_x.is_some()) && f_ok && x_ok {
            return TerminationStatus::Terminated(TerminationReason::SolverConverged);
        }
        if let Some(max) = self.max_fun_evals {
            if self.n_evals >= max {
                return TerminationStatus::Terminated(TerminationReason::SolverExit(
                    "Maximum number of function evaluations reached".to_string(),
                ));
            }
        }
        TerminationStatus::NotTerminated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argmin::core::{Executor, State};
    use ndarray::array;

    struct Bowl;

    impl CostFunction for Bowl {
        type Param = Theta;
        type Output = Cost;

        fn cost(&self, x: &Theta) -> Result<Cost, Error> {
            Ok((x[0] - 1.0).powi(2) + 4.0 * (x[1] + 0.5).powi(2))
        }
    }

    struct Failing;

    impl CostFunction for Failing {
        type Param = Theta;
        type Output = Cost;

        fn cost(&self, x: &Theta) -> Result<Cost, Error> {
            if x[0] > 1.02 {
                return Err(OptError::InvalidThetaInput { index: 0, value: x[0] }.into());
            }
            Ok(x[0])
        }
    }

    fn start() -> Vec<Theta> {
        vec![array![0.0, 0.0], array![0.05, 0.0], array![0.0, 0.05]]
    }

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Convergence on a smooth bowl within a generous budget.
    // - Termination on the evaluation cap.
    // - Propagation of cost errors out of `Executor::run`.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify the simplex converges to the minimum of a quadratic bowl.
    //
    // Given
    // -----
    // - c(x) = (x₀ − 1)² + 4(x₁ + 0.5)², starting near the origin.
    // - tol_f = tol_x = 1e-8, generous caps.
    //
    // Expect
    // ------
    // - Termination reason `SolverConverged` and a best point within 1e-3 of
    //   (1, −0.5).
    // - A non-increasing trace starting with the initial best cost.
    fn converges_on_quadratic_bowl() {
        let solver = SimplexSearch::new(start(), Some(1e-8), Some(1e-8), Some(10_000)).unwrap();

        let res = Executor::new(Bowl, solver)
            .configure(|s| s.param(array![0.0, 0.0]).max_iters(5_000))
            .run()
            .unwrap();

        let best = res.state().get_best_param().unwrap();
        assert!((best[0] - 1.0).abs() < 1e-3);
        assert!((best[1] + 0.5).abs() < 1e-3);
        assert_eq!(
            res.state().get_termination_reason(),
            Some(&TerminationReason::SolverConverged)
        );
        let trace = res.solver.cost_trace();
        assert!((trace[0] - 1.9025).abs() < 1e-12);
        assert!(trace.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    // Purpose
    // -------
    // Ensure the evaluation cap stops the search.
    //
    // Given
    // -----
    // - max_fun_evals = 10 and very tight tolerances.
    //
    // Expect
    // ------
    // - `SolverExit` termination and between 10 and 13 evaluations (one
    //   iteration costs at most n + 2 evaluations before the check).
    fn stops_on_function_evaluation_cap() {
        let solver = SimplexSearch::new(start(), Some(1e-14), Some(1e-14), Some(10)).unwrap();

        let res = Executor::new(Bowl, solver)
            .configure(|s| s.param(array![0.0, 0.0]).max_iters(1_000))
            .run()
            .unwrap();

        assert!(matches!(
            res.state().get_termination_reason(),
            Some(TerminationReason::SolverExit(_))
        ));
        let evals = res.solver.n_evals();
        assert!((10..=13).contains(&evals), "evaluations: {evals}");
        assert_eq!(res.state().get_func_counts().get("cost_count"), Some(&evals));
    }

    #[test]
    fn cost_errors_abort_the_run() {
        let solver = SimplexSearch::new(
            vec![array![1.0], array![1.05]],
            Some(1e-8),
            Some(1e-8),
            Some(100),
        )
        .unwrap();

        let err = Executor::new(Failing, solver).configure(|s| s.max_iters(100)).run().err().unwrap();

        assert_eq!(OptError::from(err), OptError::InvalidThetaInput { index: 0, value: 1.05 });
    }

    #[test]
    fn new_rejects_malformed_simplex() {
        let short = SimplexSearch::new(vec![array![0.0, 0.0]], None, None, Some(5)).unwrap_err();
        let ragged =
            SimplexSearch::new(vec![array![0.0, 0.0], array![1.0], array![0.0, 1.0]], None, None, None)
                .unwrap_err();

        assert_eq!(short, OptError::MalformedSimplex { n_vertices: 1, dim: 2 });
        assert!(matches!(ragged, OptError::MalformedSimplex { n_vertices: 3, .. }));
    }
}
