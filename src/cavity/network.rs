//! Transmission-line network of the loaded cavity.
//!
//! The normalized admittance is propagated from the shorted cavity end through
//! each section of the stack towards the iris. Each section of length `d` with
//! propagation constant `γ` transforms the admittance as
//!
//! Y' = (tanh(γd) + Y) / (1 + Y·tanh(γd))
//!
//! after rescaling `Y` by the ratio of the adjacent propagation constants. The
//! iris adds a shunt susceptance, and the reflection coefficient follows from
//! the admittance seen at the iris.

use ndarray::Array1;
use num_complex::Complex64;
use std::f64::consts::PI;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::config::CavityConfig;
use super::{EPS0, MU0};

const J: Complex64 = Complex64 { re: 0.0, im: 1.0 };

fn propagate(y: Complex64, gd: Complex64) -> Complex64 {
    let t = gd.tanh();
    (t + y) / (Complex64::new(1.0, 0.0) + y * t)
}

/// Propagation constant of a filled waveguide section, without wall loss.
fn gamma(kc2: f64, k2: f64, epsr: f64, sigma: f64, omega: f64) -> Complex64 {
    Complex64::new(kc2 - epsr * k2, sigma.abs() * omega * MU0).sqrt()
}

impl CavityConfig {
    /// Complex reflection coefficient S11 at `freq_ghz`.
    ///
    /// # Examples
    ///
    /// ```
    /// use trmc_rs::cavity::CavityConfig;
    ///
    /// let cavity = CavityConfig::x_band();
    /// let s = cavity.s11(8.5);
    /// assert!(s.norm() <= 1.0);
    /// ```
    pub fn s11(&self, freq_ghz: f64) -> Complex64 {
        let a = self.a * 1e-3;
        let c = super::C_LIGHT;
        let omega = 2e9 * PI * freq_ghz;
        let k2 = (omega / c).powi(2);
        let kc2 = (PI / a).powi(2);

        let d_iris = self.d_iris * 1e-3;
        let b_iris = 1.5 * a * a / d_iris.powi(3) / Complex64::new(k2 - kc2, 0.0).sqrt();

        let tau = Complex64::new((PI * c / a / omega).powi(2), 0.0);
        let loss = self.loss_fac * (2.0 * EPS0 * omega * self.copper_s.abs()).sqrt() / a
            * (1.0 + tau)
            / (1.0 - tau).sqrt();

        // shorted cavity end
        let g_air = Complex64::new(kc2 - k2, 0.0).sqrt() + loss;
        let mut y = Complex64::new(1.0, 0.0) / (g_air * (self.d1 * 1e-3)).tanh();

        let g_layer = gamma(kc2, k2, self.layer.epsr, self.layer.sigma, omega) + loss;
        y *= g_air / g_layer;
        y = propagate(y, g_layer * (self.layer.thickness * 1e-3));

        let g_sub = gamma(kc2, k2, self.substrate.epsr, self.substrate.sigma, omega) + loss;
        y *= g_layer / g_sub;
        y = propagate(y, g_sub * (self.substrate.thickness * 1e-3));

        y *= g_sub / g_air;
        y = propagate(y, g_air * (self.d2 * 1e-3));

        y -= J * b_iris;
        (1.0 - y) / (1.0 + y)
    }

    /// Reflected power `|S11|²` at `freq_ghz`.
    pub fn reflectance(&self, freq_ghz: f64) -> f64 {
        self.s11(freq_ghz).norm_sqr()
    }

    pub fn s11_sweep(&self, freqs: &Array1<f64>) -> Array1<Complex64> {
        freqs.mapv(|f| self.s11(f))
    }

    pub fn reflectance_sweep(&self, freqs: &Array1<f64>) -> Array1<f64> {
        freqs.mapv(|f| self.reflectance(f))
    }

    /// Same as [`CavityConfig::reflectance_sweep`], spread over the rayon pool.
    #[cfg(feature = "parallel")]
    pub fn reflectance_sweep_par(&self, freqs: &Array1<f64>) -> Array1<f64> {
        let values: Vec<f64> = freqs
            .as_slice()
            .map(|s| s.par_iter().map(|&f| self.reflectance(f)).collect::<Vec<f64>>())
            .unwrap_or_else(|| freqs.iter().map(|&f| self.reflectance(f)).collect());
        Array1::from(values)
    }

    /// Frequency and reflectance of the deepest point of a sweep.
    ///
    /// Returns `None` for an empty sweep. Ties resolve to the lowest frequency
    /// index; NaN samples are skipped.
    pub fn resonance(&self, freqs: &Array1<f64>) -> Option<(f64, f64)> {
        let r = self.reflectance_sweep(freqs);
        argmin(&r).map(|i| (freqs[i], r[i]))
    }
}

/// Index of the first minimum, ignoring NaN.
pub(crate) fn argmin(values: &Array1<f64>) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| !v.is_nan())
        .fold(None, |best: Option<(usize, f64)>, (i, &v)| match best {
            Some((_, b)) if b <= v => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}
