//! Problem definition trait.
//!
//! This module defines the `Problem` trait, which represents a nonlinear
//! least squares problem to be solved with the Levenberg-Marquardt algorithm.

use ndarray::{Array1, Array2};

use crate::error::Result;

/// A trait representing a nonlinear least squares problem.
///
/// Implementations must be `Sync`: Jacobian columns are evaluated in parallel
/// when the `parallel` feature is enabled.
pub trait Problem: Sync {
    /// Evaluate the residuals at the given parameters.
    ///
    /// # Arguments
    ///
    /// * `params` - The parameter values at which to evaluate the residuals
    ///
    /// # Returns
    ///
    /// * A vector of residuals, or an error if the evaluation fails
    fn eval(&self, params: &Array1<f64>) -> Result<Array1<f64>>;

    /// Get the number of parameters in the problem.
    fn parameter_count(&self) -> usize;

    /// Get the number of residuals in the problem.
    fn residual_count(&self) -> usize;

    /// Evaluate the Jacobian matrix at the given parameters.
    ///
    /// `residuals` are the residuals already evaluated at `params`. The
    /// default implementation uses forward finite differences with a
    /// relative step of `epsilon`; override it to supply an analytic
    /// Jacobian to the solver.
    fn jacobian(
        &self,
        params: &Array1<f64>,
        residuals: &Array1<f64>,
        epsilon: f64,
    ) -> Result<Array2<f64>> {
        crate::utils::finite_difference::jacobian_at(self, params, residuals, Some(epsilon))
    }

    /// Evaluate the sum of squared residuals at the given parameters.
    fn eval_cost(&self, params: &Array1<f64>) -> Result<f64> {
        let residuals = self.eval(params)?;
        Ok(residuals.iter().map(|r| r.powi(2)).sum())
    }
}
