//! Conductivity sensitivity (k-factor) of the loaded cavity.
//!
//! The k-factor relates a small change of the layer sheet conductance to the
//! relative change of reflected power:
//!
//! ΔR/R = -K · β · Δσ · t
//!
//! with `β = a / b`. It is obtained here by a forward difference of the
//! network model in the layer conductivity.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use super::config::CavityConfig;
use crate::error::{Result, TrmcError};

/// How the layer conductivity is perturbed for the forward difference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum KFactorStep {
    /// Fractional change of the current conductivity. A layer without
    /// conductivity is referenced to 1 S/m.
    Relative(f64),
    /// Conductivity change in S/m.
    Absolute(f64),
}

impl Default for KFactorStep {
    fn default() -> Self {
        KFactorStep::Relative(0.01)
    }
}

impl KFactorStep {
    /// Conductivity change for a layer currently at `sigma`.
    fn delta(self, sigma: f64) -> f64 {
        match self {
            KFactorStep::Relative(rel) if sigma == 0.0 => rel,
            KFactorStep::Relative(rel) => sigma.abs() * rel,
            KFactorStep::Absolute(delta) => delta,
        }
    }
}

impl CavityConfig {
    /// k-factor at `freq_ghz` by forward difference in the layer conductivity.
    ///
    /// The perturbation is applied to a copy; `self` is left as it is.
    ///
    /// # Arguments
    ///
    /// * `freq_ghz` - Frequency in GHz, usually the resonance minimum
    /// * `step` - Size of the conductivity perturbation
    ///
    /// # Returns
    ///
    /// * The k-factor, or `InvalidInput` if the layer has no
    ///   thickness, the step is zero or the result is not finite
    pub fn kfactor(&self, freq_ghz: f64, step: KFactorStep) -> Result<f64> {
        let t_m = self.layer.thickness * 1e-3;
        if t_m <= 0.0 {
            return Err(TrmcError::InvalidInput(format!(
                "k-factor needs a layer with positive thickness, got {} mm",
                self.layer.thickness
            )));
        }

        let sigma = self.layer.sigma.abs();
        let delta = step.delta(sigma);
        if delta == 0.0 || !delta.is_finite() {
            return Err(TrmcError::InvalidInput(format!(
                "conductivity step must be finite and non-zero, got {}",
                delta
            )));
        }

        let r0 = self.reflectance(freq_ghz);
        let mut perturbed = *self;
        perturbed.layer.sigma = sigma + delta;
        let r1 = perturbed.reflectance(freq_ghz);

        let k = (r1 - r0) / (r0 * delta * t_m * self.beta());
        if !k.is_finite() {
            return Err(TrmcError::InvalidInput(format!(
                "k-factor is not finite at {} GHz (R = {})",
                freq_ghz, r0
            )));
        }
        Ok(k)
    }
}

/// Inner cavity dimensions in meters for the analytic k-factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CavityDimensions {
    /// Length
    pub d: f64,
    /// Width
    pub a: f64,
    /// Height
    pub b: f64,
}

impl Default for CavityDimensions {
    fn default() -> Self {
        Self {
            d: 0.048,
            a: 0.0229,
            b: 0.0102,
        }
    }
}

/// Analytic k-factor from the resonance quality.
///
/// `K = 2Q(1 + 1/√R0) / (π f0 ε0 εr d a / b)` with `Q = f0 / fwhm`, all in SI
/// units (Hz, m).
pub fn kfactor_analytic(f0_hz: f64, fwhm_hz: f64, r0: f64, dims: CavityDimensions) -> f64 {
    const EPS0: f64 = 8.854e-12;
    let epsr = 1.0;
    let q = f0_hz / fwhm_hz;
    2.0 * q * (1.0 + 1.0 / r0.sqrt()) / (PI * f0_hz * EPS0 * epsr * dims.d * dims.a / dims.b)
}
