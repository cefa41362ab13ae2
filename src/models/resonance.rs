//! Lorentzian resonance dip.
//!
//! Near resonance the power reflected by a lightly loaded cavity follows an
//! inverted Lorentzian:
//!
//! R(f) = 1 - (1 - r0) * L(f; f0, fwhm)
//!
//! where `L` has unit height at `f0` and full width `fwhm` at half maximum.

use ndarray::Array1;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::error::{Result, TrmcError};
use crate::model::Model;

/// Unit-height Lorentzian line shape.
pub fn lorentzian(x: f64, x0: f64, fwhm: f64) -> f64 {
    let u = 2.0 * (x - x0) / fwhm;
    1.0 / (1.0 + u * u)
}

/// Inverted Lorentzian with arguments `f0`, `fwhm`, `r0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResonanceDipModel;

impl ResonanceDipModel {
    pub const PARAMETERS: [&'static str; 3] = ["f0", "fwhm", "r0"];

    pub fn new() -> Self {
        Self
    }

    /// Rough starting values `[f0, fwhm, r0]` read off a measured dip.
    ///
    /// `f0` and `r0` come from the lowest sample. The width is the distance
    /// between the outermost samples below half depth, with the sample spacing
    /// as a lower limit.
    pub fn guess(x: &Array1<f64>, y: &Array1<f64>) -> Result<[f64; 3]> {
        if x.len() != y.len() {
            return Err(TrmcError::DimensionMismatch(format!(
                "x has {} values, y has {}",
                x.len(),
                y.len()
            )));
        }
        if x.len() < 2 {
            return Err(TrmcError::InsufficientData {
                needed: 2,
                got: x.len(),
            });
        }

        let (imin, r0) = y
            .iter()
            .copied()
            .enumerate()
            .fold((0, f64::INFINITY), |best, (i, v)| if v < best.1 { (i, v) } else { best });
        let baseline = y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let half = r0 + 0.5 * (baseline - r0);

        let below: Vec<f64> = x
            .iter()
            .zip(y.iter())
            .filter(|(_, &v)| v <= half)
            .map(|(&f, _)| f)
            .collect();
        let spacing = (x[x.len() - 1] - x[0]).abs() / (x.len() - 1) as f64;
        let width = match (below.first(), below.last()) {
            (Some(lo), Some(hi)) => (hi - lo).abs().max(spacing),
            _ => spacing,
        };

        Ok([x[imin], width, r0])
    }
}

impl Model for ResonanceDipModel {
    fn independent_name(&self) -> &str {
        "freq_ghz"
    }

    fn parameter_names(&self) -> Vec<String> {
        Self::PARAMETERS.iter().map(|s| s.to_string()).collect()
    }

    fn eval(&self, x: &Array1<f64>, args: &[f64]) -> Result<Array1<f64>> {
        match *args {
            [f0, fwhm, r0] => Ok(x.mapv(|f| 1.0 - (1.0 - r0) * lorentzian(f, f0, fwhm))),
            _ => Err(TrmcError::ArityMismatch {
                expected: 3,
                got: args.len(),
            }),
        }
    }
}

/// Add zero-mean Gaussian noise with standard deviation `sigma`.
pub fn add_gaussian_noise<R: Rng + ?Sized>(
    y: &Array1<f64>,
    sigma: f64,
    rng: &mut R,
) -> Result<Array1<f64>> {
    let normal = Normal::new(0.0, sigma)
        .map_err(|e| TrmcError::InvalidInput(format!("noise level {}: {}", sigma, e)))?;
    Ok(y.mapv(|v| v + normal.sample(rng)))
}
