//! Finite difference methods for numerical differentiation.
//!
//! This module provides functions for computing Jacobians using forward
//! finite difference approximations.

use ndarray::{Array1, Array2};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{Result, TrmcError};
use crate::problem::Problem;

/// Default relative step size, the square root of machine epsilon.
pub const DEFAULT_EPSILON: f64 = 1.490_116_119_384_765_6e-8;

/// Step used for parameter `value`: relative to the value, absolute near zero.
fn step_size(value: f64, eps: f64) -> f64 {
    if value.abs() > eps {
        eps * value.abs()
    } else {
        eps
    }
}

/// One Jacobian column: the forward difference in parameter `j`.
fn column<P: Problem + ?Sized>(
    problem: &P,
    params: &Array1<f64>,
    residuals: &Array1<f64>,
    j: usize,
    eps: f64,
) -> Result<Array1<f64>> {
    let h = step_size(params[j], eps);
    let mut perturbed = params.clone();
    perturbed[j] += h;
    // the step actually taken after rounding
    let h = perturbed[j] - params[j];

    let shifted = problem.eval(&perturbed)?;
    if shifted.len() != residuals.len() {
        return Err(TrmcError::DimensionMismatch(format!(
            "Expected {} residuals, got {}",
            residuals.len(),
            shifted.len()
        )));
    }
    Ok((&shifted - residuals) / h)
}

/// Compute the Jacobian matrix using forward finite differences.
///
/// The Jacobian is the matrix of partial derivatives of the residuals with
/// respect to the parameters: J[i,j] = ∂residual[i]/∂param[j].
///
/// # Arguments
///
/// * `problem` - The problem to evaluate
/// * `params` - The parameter values at which to evaluate the Jacobian
/// * `epsilon` - The relative step size (optional)
///
/// # Returns
///
/// * `Result<Array2<f64>>` - The Jacobian matrix
pub fn jacobian<P: Problem + ?Sized>(
    problem: &P,
    params: &Array1<f64>,
    epsilon: Option<f64>,
) -> Result<Array2<f64>> {
    let residuals = problem.eval(params)?;
    jacobian_at(problem, params, &residuals, epsilon)
}

/// Same as [`jacobian`], reusing residuals already evaluated at `params`.
pub fn jacobian_at<P: Problem + ?Sized>(
    problem: &P,
    params: &Array1<f64>,
    residuals: &Array1<f64>,
    epsilon: Option<f64>,
) -> Result<Array2<f64>> {
    let eps = epsilon.unwrap_or(DEFAULT_EPSILON);
    let n_residuals = problem.residual_count();
    if residuals.len() != n_residuals {
        return Err(TrmcError::DimensionMismatch(format!(
            "Expected {} residuals, got {}",
            n_residuals,
            residuals.len()
        )));
    }

    let columns = columns(problem, params, residuals, eps)?;

    let mut jac = Array2::zeros((n_residuals, params.len()));
    for (j, col) in columns.into_iter().enumerate() {
        jac.column_mut(j).assign(&col);
    }
    Ok(jac)
}

#[cfg(feature = "parallel")]
fn columns<P: Problem + ?Sized>(
    problem: &P,
    params: &Array1<f64>,
    residuals: &Array1<f64>,
    eps: f64,
) -> Result<Vec<Array1<f64>>> {
    (0..params.len())
        .into_par_iter()
        .map(|j| column(problem, params, residuals, j, eps))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn columns<P: Problem + ?Sized>(
    problem: &P,
    params: &Array1<f64>,
    residuals: &Array1<f64>,
    eps: f64,
) -> Result<Vec<Array1<f64>>> {
    (0..params.len())
        .map(|j| column(problem, params, residuals, j, eps))
        .collect()
}
