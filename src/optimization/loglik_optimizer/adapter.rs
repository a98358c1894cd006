//! Adapter that exposes a user `LogLikelihood` as an `argmin` problem.
//!
//! We convert a *maximization* of a log-likelihood `ℓ(θ)` into a *minimization*
//! problem by defining the cost as `c(θ) = -ℓ(θ)`. Errors from the user's
//! `value` travel through argmin boxed as [`OptError`] so the run loop can
//! restore them unchanged.
use crate::optimization::{
    errors::OptError,
    loglik_optimizer::{
        traits::LogLikelihood,
        types::{Cost, Theta},
    },
};
use argmin::core::{CostFunction, Error};

/// Bridges a user `LogLikelihood` to `argmin`'s `CostFunction`.
///
/// `CostFunction::cost` returns `-ℓ(θ)` (negative log-likelihood).
#[derive(Debug, Clone)]
pub struct ArgMinAdapter<'a, F: LogLikelihood> {
    pub f: &'a F,
    pub data: &'a F::Data,
}

impl<'a, F: LogLikelihood> CostFunction for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Output = Cost;

    /// Evaluate the cost `c(θ) = -ℓ(θ)`.
    ///
    /// - Calls the user's `value(θ, data)` and checks the result is finite.
    /// - Returns `Error(NonFiniteCost)` if the value is not finite.
    ///
    /// # Errors
    /// Propagates any `OptError` from the user’s `value` via `?`.
    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let output = self.f.value(theta, self.data)?;
        if !output.is_finite() {
            return Err((OptError::NonFiniteCost { value: output }).into());
        }
        Ok(-output)
    }
}

impl<'a, F: LogLikelihood> ArgMinAdapter<'a, F> {
    /// Construct a new adapter over a user `LogLikelihood` and its data.
    pub fn new(f: &'a F, data: &'a F::Data) -> Self {
        Self { f, data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptResult;
    use ndarray::array;

    struct Quadratic;

    impl LogLikelihood for Quadratic {
        type Data = f64;

        fn value(&self, theta: &Theta, shift: &f64) -> OptResult<f64> {
            if theta[0] < 0.0 {
                return Err(OptError::InvalidThetaInput { index: 0, value: theta[0] });
            }
            Ok(-(theta[0] - shift).powi(2) + theta[0].ln())
        }

        fn check(&self, _theta: &Theta, _shift: &f64) -> OptResult<()> {
            Ok(())
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify the adapter negates ℓ and forwards user errors.
    //
    // Given
    // -----
    // - ℓ(θ) = -(θ - 2)² + ln θ; θ = 0.5 and θ = -1.
    //
    // Expect
    // ------
    // - cost(0.5) = -ℓ(0.5).
    // - cost(-1) fails and converts back to `InvalidThetaInput`.
    fn cost_negates_value_and_forwards_errors() {
        let model = Quadratic;
        let adapter = ArgMinAdapter::new(&model, &2.0);
        let theta = array![0.5];

        let c = adapter.cost(&theta).unwrap();
        let err = adapter.cost(&array![-1.0]).unwrap_err();

        assert_eq!(c, -model.value(&theta, &2.0).unwrap());
        assert_eq!(OptError::from(err), OptError::InvalidThetaInput { index: 0, value: -1.0 });
    }

    #[test]
    fn cost_rejects_non_finite_values() {
        let model = Quadratic;
        let adapter = ArgMinAdapter::new(&model, &2.0);

        // ln 0 = -inf
        let err = adapter.cost(&array![0.0]).unwrap_err();

        assert!(matches!(OptError::from(err), OptError::NonFiniteCost { .. }));
    }
}
