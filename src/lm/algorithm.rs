//! Implementation of the Levenberg-Marquardt algorithm.
//!
//! Each iteration solves the damped normal equations
//!
//! (JᵀJ + λ·diag(JᵀJ)) δ = -Jᵀr
//!
//! with Marquardt's diagonal scaling, so the damping is invariant under
//! rescaling of individual parameters. Accepted steps shrink λ, rejected
//! steps grow it.

use nalgebra::DMatrix;
use ndarray::{Array1, Array2};
use std::fmt;
use tracing::{debug, trace};

use crate::error::{Result, TrmcError};
use crate::problem::Problem;
use crate::utils::matrix_convert::{
    nalgebra_vec_to_ndarray, ndarray_to_nalgebra, ndarray_vec_to_nalgebra,
};

use super::config::LmConfig;

/// Lower limit for the diagonal scale of a parameter the residuals do not
/// depend on.
const MIN_SCALE: f64 = 1e-300;

/// Result of the Levenberg-Marquardt optimization.
#[derive(Debug, Clone)]
pub struct LmResult {
    /// Optimized parameter values
    pub params: Array1<f64>,

    /// Residuals at the solution
    pub residuals: Array1<f64>,

    /// Sum of squared residuals
    pub cost: f64,

    /// Number of accepted steps
    pub iterations: usize,

    /// Number of function evaluations
    pub func_evals: usize,

    /// Whether the optimization succeeded
    pub success: bool,

    /// A message describing the result
    pub message: String,
}

impl fmt::Display for LmResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Optimization Result:")?;
        writeln!(f, "  Success: {}", self.success)?;
        writeln!(f, "  Message: {}", self.message)?;
        writeln!(f, "  Cost: {:.6e}", self.cost)?;
        writeln!(f, "  Iterations: {}", self.iterations)?;
        writeln!(f, "  Function evaluations: {}", self.func_evals)?;
        writeln!(f, "  Parameters: {:?}", self.params)?;
        Ok(())
    }
}

/// Status of the iteration.
enum IterationStatus {
    /// Continue iteration
    Continue,

    /// Converged successfully
    Converged(String),

    /// Failed to converge
    Failed(String),
}

/// The Levenberg-Marquardt optimizer.
#[derive(Debug, Clone, Default)]
pub struct LevenbergMarquardt {
    config: LmConfig,
}

impl LevenbergMarquardt {
    /// Create a new Levenberg-Marquardt optimizer with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new Levenberg-Marquardt optimizer with the given configuration.
    pub fn with_config(config: LmConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LmConfig {
        &self.config
    }

    /// Set the maximum number of iterations.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    /// Set the tolerance for change in residual norm.
    pub fn with_ftol(mut self, ftol: f64) -> Self {
        self.config.ftol = ftol;
        self
    }

    /// Set the tolerance for change in parameter values.
    pub fn with_xtol(mut self, xtol: f64) -> Self {
        self.config.xtol = xtol;
        self
    }

    /// Set the tolerance for gradient norm.
    pub fn with_gtol(mut self, gtol: f64) -> Self {
        self.config.gtol = gtol;
        self
    }

    /// Set the initial value for the damping parameter.
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.config.initial_lambda = lambda;
        self
    }

    /// Set the factor by which to increase lambda.
    pub fn with_lambda_up_factor(mut self, factor: f64) -> Self {
        self.config.lambda_up_factor = factor;
        self
    }

    /// Set the factor by which to decrease lambda.
    pub fn with_lambda_down_factor(mut self, factor: f64) -> Self {
        self.config.lambda_down_factor = factor;
        self
    }

    /// Set the minimum value for lambda.
    pub fn with_min_lambda(mut self, min_lambda: f64) -> Self {
        self.config.min_lambda = min_lambda;
        self
    }

    /// Set the maximum value for lambda.
    pub fn with_max_lambda(mut self, max_lambda: f64) -> Self {
        self.config.max_lambda = max_lambda;
        self
    }

    /// Set the relative finite-difference step.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.config.epsilon = epsilon;
        self
    }

    /// Minimize the sum of squared residuals for the given problem.
    ///
    /// Evaluation errors of the problem are propagated. Running out of
    /// iterations, a damping parameter beyond `max_lambda` or non-finite
    /// residuals are reported through `success == false` in the returned
    /// [`LmResult`], with the best parameters found so far.
    ///
    /// # Arguments
    ///
    /// * `problem` - The problem to solve
    /// * `initial_params` - Initial guess for the parameter values
    ///
    /// # Returns
    ///
    /// * `Result<LmResult>` - The result of the optimization
    pub fn minimize<P: Problem>(&self, problem: &P, initial_params: Array1<f64>) -> Result<LmResult> {
        let n_params = problem.parameter_count();
        if initial_params.len() != n_params {
            return Err(TrmcError::DimensionMismatch(format!(
                "Expected {} parameters, got {}",
                n_params,
                initial_params.len()
            )));
        }
        if n_params == 0 {
            return Err(TrmcError::InvalidInput(
                "nothing to optimize: the problem has no parameters".to_string(),
            ));
        }

        let cfg = &self.config;
        let mut params = initial_params;
        let mut residuals = problem.eval(&params)?;
        let mut cost = sum_of_squares(&residuals);
        let mut func_evals = 1;
        let mut iterations = 0;
        let mut lambda = cfg.initial_lambda;

        let status = if cost.is_finite() {
            'outer: loop {
                if iterations >= cfg.max_iterations {
                    break IterationStatus::Failed(format!(
                        "Maximum iterations ({}) reached",
                        cfg.max_iterations
                    ));
                }

                let jac = problem.jacobian(&params, &residuals, cfg.epsilon)?;
                func_evals += n_params;
                if jac.iter().any(|v| !v.is_finite()) {
                    break IterationStatus::Failed("Jacobian contains non-finite values".to_string());
                }

                let jtj = jac.t().dot(&jac);
                let gradient = jac.t().dot(&residuals);
                let scale = jtj.diag().mapv(|v| v.max(MIN_SCALE));

                let gnorm = scaled_gradient_norm(&gradient, &scale, cost.sqrt());
                debug!(iterations, cost, lambda, gnorm, "levenberg-marquardt iteration");
                if gnorm <= cfg.gtol {
                    break IterationStatus::Converged(format!(
                        "Gradient convergence: |g| = {:.2e} <= {:.2e}",
                        gnorm, cfg.gtol
                    ));
                }

                let pnorm = scaled_norm(&params, &scale);
                let inner = loop {
                    let step = match solve_damped(&jtj, &gradient, &scale, lambda) {
                        Some(step) => step,
                        None => {
                            lambda *= cfg.lambda_up_factor;
                            if lambda > cfg.max_lambda {
                                break IterationStatus::Failed(
                                    "Failed to calculate step, and lambda reached maximum"
                                        .to_string(),
                                );
                            }
                            continue;
                        }
                    };

                    let small_step = scaled_norm(&step, &scale) <= cfg.xtol * (pnorm + cfg.xtol);
                    let new_params = &params + &step;
                    let new_residuals = problem.eval(&new_params)?;
                    func_evals += 1;
                    let new_cost = sum_of_squares(&new_residuals);

                    if new_cost.is_finite() && new_cost < cost {
                        let reduction = (cost - new_cost) / cost;
                        params = new_params;
                        residuals = new_residuals;
                        cost = new_cost;
                        lambda = (lambda * cfg.lambda_down_factor).max(cfg.min_lambda);
                        iterations += 1;

                        if reduction < cfg.ftol {
                            break IterationStatus::Converged(format!(
                                "Cost convergence: |df|/f = {:.2e} < {:.2e}",
                                reduction, cfg.ftol
                            ));
                        }
                        if small_step {
                            break IterationStatus::Converged(
                                "Parameter convergence: step below xtol".to_string(),
                            );
                        }
                        break IterationStatus::Continue;
                    }

                    trace!(lambda, new_cost, "step rejected");
                    lambda *= cfg.lambda_up_factor;
                    if small_step {
                        break IterationStatus::Converged(
                            "Parameter convergence: step below xtol".to_string(),
                        );
                    }
                    if lambda > cfg.max_lambda {
                        break IterationStatus::Failed(
                            "Failed to decrease cost, and lambda reached maximum".to_string(),
                        );
                    }
                };

                match inner {
                    IterationStatus::Continue => continue 'outer,
                    done => break done,
                }
            }
        } else {
            IterationStatus::Failed("Residuals are not finite at the initial parameters".to_string())
        };

        let (success, message) = match status {
            IterationStatus::Converged(message) => (true, message),
            IterationStatus::Failed(message) => (false, message),
            IterationStatus::Continue => (false, "Iteration stopped unexpectedly".to_string()),
        };
        debug!(success, iterations, func_evals, cost, %message, "levenberg-marquardt finished");

        Ok(LmResult {
            params,
            residuals,
            cost,
            iterations,
            func_evals,
            success,
            message,
        })
    }
}

fn sum_of_squares(residuals: &Array1<f64>) -> f64 {
    residuals.iter().map(|r| r * r).sum()
}

/// `max_j |g_j| / (sqrt(D_j) |r|)`, the cosine between the residual vector
/// and the Jacobian columns. Zero residuals count as converged.
fn scaled_gradient_norm(gradient: &Array1<f64>, scale: &Array1<f64>, rnorm: f64) -> f64 {
    if rnorm == 0.0 {
        return 0.0;
    }
    gradient
        .iter()
        .zip(scale.iter())
        .map(|(g, d)| g.abs() / (d.sqrt() * rnorm))
        .fold(0.0, f64::max)
}

/// `|D^½ v|`
fn scaled_norm(v: &Array1<f64>, scale: &Array1<f64>) -> f64 {
    v.iter()
        .zip(scale.iter())
        .map(|(x, d)| d * x * x)
        .sum::<f64>()
        .sqrt()
}

/// Solve `(A + λ·diag(D)) δ = -g`.
///
/// Cholesky first, LU if the damped matrix is not numerically positive
/// definite. `None` if both fail or the step is not finite.
fn solve_damped(
    jtj: &Array2<f64>,
    gradient: &Array1<f64>,
    scale: &Array1<f64>,
    lambda: f64,
) -> Option<Array1<f64>> {
    let mut a: DMatrix<f64> = ndarray_to_nalgebra(jtj);
    for (i, d) in scale.iter().enumerate() {
        a[(i, i)] += lambda * d;
    }
    let rhs = ndarray_vec_to_nalgebra(&gradient.mapv(|g| -g));

    let step = match a.clone().cholesky() {
        Some(chol) => chol.solve(&rhs),
        None => a.lu().solve(&rhs)?,
    };

    let step = nalgebra_vec_to_ndarray(&step);
    if step.iter().all(|v| v.is_finite()) {
        Some(step)
    } else {
        None
    }
}
