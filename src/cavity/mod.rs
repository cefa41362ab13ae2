//! # Microwave cavity network model
//!
//! Reflection of a rectangular waveguide cavity that holds a thin conductive
//! layer on a dielectric substrate, as used for time-resolved microwave
//! conductivity (TRMC) measurements.
//!
//! - [`CavityConfig`]: geometry and material stack, with X-band and Ka-band presets
//! - [`CavityConfig::s11`] and the sweep variants: complex reflection and reflected power
//! - [`CavityModel`]: the cavity as a [`Model`](crate::model::Model) with eleven named arguments
//! - [`CavityConfig::kfactor`] and [`kfactor_analytic`]: conductivity sensitivity
//!
//! ## Example
//!
//! ```rust
//! use ndarray::Array1;
//! use trmc_rs::cavity::CavityConfig;
//!
//! let cavity = CavityConfig::x_band();
//! let f = Array1::range(8.1, 9.2, 0.001);
//! let (f0, r0) = cavity.resonance(&f).unwrap();
//! assert!(f0 > 8.1 && f0 < 9.2);
//! assert!(r0 < 0.5);
//! ```

mod config;
mod model;
mod network;
mod sensitivity;

pub use config::{CavityConfig, CavityPreset, Layer};
pub use model::CavityModel;
pub use sensitivity::{kfactor_analytic, CavityDimensions, KFactorStep};

pub(crate) use network::argmin;

/// Vacuum permeability in H/m
pub const MU0: f64 = 4.0e-7 * std::f64::consts::PI;

/// Vacuum permittivity in F/m, as calibrated for the cavity model
pub const EPS0: f64 = 8.842e-12;

/// Speed of light consistent with [`MU0`] and [`EPS0`]
pub const C_LIGHT: f64 = 299_999_003.892_540_04;
