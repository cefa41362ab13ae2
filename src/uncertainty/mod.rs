//! # Uncertainty Calculation
//!
//! Covariance, correlation and standard errors of fitted parameters,
//! estimated from the Jacobian at the solution and the reduced chi-square.

mod covariance;

pub use covariance::{
    calculate_correlation, calculate_covariance, fit_covariance, standard_errors_from_covariance,
};
