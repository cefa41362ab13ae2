//! # trmc-rs
//!
//! `trmc-rs` models the microwave reflection of a rectangular waveguide
//! cavity loaded with a thin conductive layer on a dielectric substrate, as
//! used in time-resolved microwave conductivity (TRMC) experiments, and fits
//! the model to measured reflection spectra.
//!
//! The library provides:
//! - A transmission-line model of the cavity (`|S11|²` versus frequency)
//! - The k-factor that converts reflected-power changes into conductance changes
//! - Named model parameters that can be fixed or freed between fits
//! - A Levenberg-Marquardt least-squares fit with standard errors
//! - Reading of tabulated measurement data and export of model curves
//!
//! ## Basic Usage
//!
//! ```
//! use ndarray::Array1;
//! use trmc_rs::cavity::CavityConfig;
//!
//! let cavity = CavityConfig::x_band();
//! let f = Array1::range(8.1, 9.2, 0.001);
//! let (f_min, r_min) = cavity.resonance(&f).unwrap();
//! assert!(f_min > 8.1 && f_min < 9.2);
//! assert!(r_min < cavity.reflectance(8.1));
//! ```

pub mod cavity;
pub mod error;
pub mod fit;
pub mod io;
pub mod lm;
pub mod model;
pub mod models;
pub mod parameters;
pub mod problem;
pub mod session;
pub mod uncertainty;

mod utils;

// Re-exports for convenience
pub use cavity::{CavityConfig, CavityModel, CavityPreset, KFactorStep};
pub use error::{Result, TrmcError};
pub use fit::{CurveFit, FitOptions, FitResult};
pub use lm::LevenbergMarquardt;
pub use model::Model;
pub use parameters::{Parameter, ParameterAdapter, ParameterList};
pub use problem::Problem;
pub use session::AnalysisSession;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
