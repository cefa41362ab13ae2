//! Reference line-shape models.
//!
//! The cavity network model lives in [`crate::cavity`]; this module holds the
//! simple analytic shapes used to sanity-check fits and to seed them.

mod resonance;

pub use resonance::{add_gaussian_noise, lorentzian, ResonanceDipModel};
