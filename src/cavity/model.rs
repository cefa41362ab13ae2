//! The cavity as a fit model.

use ndarray::Array1;

use super::config::{CavityConfig, Layer};
use crate::error::{Result, TrmcError};
use crate::model::Model;

/// Power reflection of a cavity as a function of frequency and eleven named
/// stack parameters.
///
/// The waveguide cross-section (`a`, `b`) is taken from the base configuration;
/// everything else comes from the arguments. Every evaluation builds its own
/// configuration, the base is never modified.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CavityModel {
    base: CavityConfig,
}

impl CavityModel {
    /// Argument names in declaration order.
    pub const PARAMETERS: [&'static str; 11] = [
        "d1",
        "d2",
        "d_iris",
        "loss_fac",
        "copper_S",
        "layer_t",
        "layer_epsr",
        "layer_sig",
        "sub_t",
        "sub_epsr",
        "sub_sig",
    ];

    pub fn new(base: CavityConfig) -> Self {
        Self { base }
    }

    pub fn base(&self) -> &CavityConfig {
        &self.base
    }

    /// Configuration described by a full argument vector.
    pub fn config_for(&self, args: &[f64]) -> Result<CavityConfig> {
        match *args {
            [d1, d2, d_iris, loss_fac, copper_s, layer_t, layer_epsr, layer_sig, sub_t, sub_epsr, sub_sig] => {
                Ok(CavityConfig {
                    d1,
                    d2,
                    d_iris,
                    loss_fac,
                    copper_s,
                    layer: Layer::new(layer_t, layer_epsr, layer_sig),
                    substrate: Layer::new(sub_t, sub_epsr, sub_sig),
                    ..self.base
                })
            }
            _ => Err(TrmcError::ArityMismatch {
                expected: Self::PARAMETERS.len(),
                got: args.len(),
            }),
        }
    }

    /// Argument vector describing `config`, inverse of [`CavityModel::config_for`].
    pub fn args_for(config: &CavityConfig) -> [f64; 11] {
        [
            config.d1,
            config.d2,
            config.d_iris,
            config.loss_fac,
            config.copper_s,
            config.layer.thickness,
            config.layer.epsr,
            config.layer.sigma,
            config.substrate.thickness,
            config.substrate.epsr,
            config.substrate.sigma,
        ]
    }
}

impl Model for CavityModel {
    fn independent_name(&self) -> &str {
        "freq_ghz"
    }

    fn parameter_names(&self) -> Vec<String> {
        Self::PARAMETERS.iter().map(|s| s.to_string()).collect()
    }

    fn eval(&self, x: &Array1<f64>, args: &[f64]) -> Result<Array1<f64>> {
        Ok(self.config_for(args)?.reflectance_sweep(x))
    }
}
