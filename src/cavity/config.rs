//! Cavity geometry and material stack.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TrmcError;

/// A dielectric slab inside the cavity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Thickness in mm
    pub thickness: f64,
    /// Relative permittivity
    pub epsr: f64,
    /// Conductivity in S/m
    pub sigma: f64,
}

impl Layer {
    pub fn new(thickness: f64, epsr: f64, sigma: f64) -> Self {
        Self {
            thickness,
            epsr,
            sigma,
        }
    }
}

/// Rectangular waveguide cavity loaded with a thin layer on a substrate.
///
/// Seen from the cavity end the stack is: air (`d1`), layer, substrate,
/// air (`d2`), iris. All lengths are in mm. The total cavity length is
/// `d1 + d2 + layer.thickness + substrate.thickness`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CavityConfig {
    /// Broad side of the waveguide
    pub a: f64,
    /// Narrow side of the waveguide
    pub b: f64,
    /// Distance between sample and cavity end
    pub d1: f64,
    /// Distance between sample and iris
    pub d2: f64,
    /// Iris diameter. Very large values practically remove the iris.
    pub d_iris: f64,
    /// Wall conductivity in S/m
    #[serde(rename = "copper_S")]
    pub copper_s: f64,
    /// Empirical scale factor on the wall loss
    pub loss_fac: f64,
    pub layer: Layer,
    pub substrate: Layer,
}

impl Default for CavityConfig {
    fn default() -> Self {
        Self::x_band()
    }
}

impl CavityConfig {
    /// X-band (WR-90) cavity with a 1 µm layer on 1 mm quartz.
    pub fn x_band() -> Self {
        Self {
            a: 22.86,
            b: 10.16,
            d1: 36.0,
            d2: 12.0,
            d_iris: 9.6,
            copper_s: 5.5e7,
            loss_fac: 1e-7,
            layer: Layer::new(0.001, 1.0, 0.0),
            substrate: Layer::new(1.0, 3.6, 0.0),
        }
    }

    /// Ka-band (WR-28) cavity, 21 to 42 GHz.
    pub fn ka_band() -> Self {
        Self {
            a: 7.112,
            b: 3.556,
            d1: 1.0,
            d2: 25.0,
            d_iris: 3.5,
            ..Self::x_band()
        }
    }

    /// Aspect ratio `a / b` of the waveguide cross-section.
    pub fn beta(&self) -> f64 {
        self.a / self.b
    }

    /// Total cavity length in mm.
    pub fn total_length(&self) -> f64 {
        self.d1 + self.d2 + self.layer.thickness + self.substrate.thickness
    }

    /// TE10 cutoff frequency of the waveguide in GHz.
    pub fn cutoff_ghz(&self) -> f64 {
        super::C_LIGHT / (2.0 * self.a * 1e-3) * 1e-9
    }
}

/// Named cavity presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CavityPreset {
    #[default]
    XBand,
    KaBand,
}

impl CavityPreset {
    pub fn config(self) -> CavityConfig {
        match self {
            CavityPreset::XBand => CavityConfig::x_band(),
            CavityPreset::KaBand => CavityConfig::ka_band(),
        }
    }
}

impl fmt::Display for CavityPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CavityPreset::XBand => write!(f, "x-band"),
            CavityPreset::KaBand => write!(f, "ka-band"),
        }
    }
}

impl FromStr for CavityPreset {
    type Err = TrmcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x-band" | "x" | "wr90" | "wr-90" => Ok(CavityPreset::XBand),
            "ka-band" | "ka" | "wr28" | "wr-28" => Ok(CavityPreset::KaBand),
            other => Err(TrmcError::InvalidInput(format!(
                "unknown cavity preset '{}', expected x-band or ka-band",
                other
            ))),
        }
    }
}
