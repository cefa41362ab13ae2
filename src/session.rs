//! Interactive analysis workflow without a user interface.
//!
//! An [`AnalysisSession`] holds the state an operator works with: the cavity
//! parameters and which of them are free, the frequency sweep used to draw the
//! model, measured data and the result of the last fit.

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::cavity::{argmin, CavityConfig, CavityModel, KFactorStep, Layer};
use crate::error::{Result, TrmcError};
use crate::fit::{CurveFit, FitOptions, FitResult, MIN_SAMPLES};
use crate::io::{export_text, read_textdata_file, TextDataOptions};
use crate::parameters::{Parameter, ParameterAdapter, ParameterList};

/// Parameters that are free in a new session.
pub const FREE_BY_DEFAULT: [&str; 3] = ["d_iris", "loss_fac", "sub_epsr"];

/// Unit of the frequency column of measured data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FrequencyUnit {
    #[default]
    GHz,
    MHz,
    Hz,
}

impl FrequencyUnit {
    pub fn to_ghz(self, value: f64) -> f64 {
        match self {
            FrequencyUnit::GHz => value,
            FrequencyUnit::MHz => value / 1e3,
            FrequencyUnit::Hz => value / 1e9,
        }
    }
}

impl fmt::Display for FrequencyUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrequencyUnit::GHz => write!(f, "GHz"),
            FrequencyUnit::MHz => write!(f, "MHz"),
            FrequencyUnit::Hz => write!(f, "Hz"),
        }
    }
}

impl FromStr for FrequencyUnit {
    type Err = TrmcError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ghz" => Ok(FrequencyUnit::GHz),
            "mhz" => Ok(FrequencyUnit::MHz),
            "hz" => Ok(FrequencyUnit::Hz),
            other => Err(TrmcError::InvalidInput(format!(
                "unknown frequency unit '{}', expected GHz, MHz or Hz",
                other
            ))),
        }
    }
}

/// Frequency grid of the model curve in GHz. `fmax` is excluded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepSettings {
    pub fmin: f64,
    pub fmax: f64,
    pub step: f64,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            fmin: 8.4,
            fmax: 9.2,
            step: 0.001,
        }
    }
}

impl SweepSettings {
    pub fn new(fmin: f64, fmax: f64, step: f64) -> Self {
        Self { fmin, fmax, step }
    }

    /// The frequencies `fmin, fmin + step, ...` below `fmax`.
    pub fn frequencies(&self) -> Result<Array1<f64>> {
        let finite = self.fmin.is_finite() && self.fmax.is_finite() && self.step.is_finite();
        if !finite || self.step <= 0.0 || self.fmax <= self.fmin {
            return Err(TrmcError::InvalidInput(format!(
                "invalid sweep {} to {} GHz in steps of {}",
                self.fmin, self.fmax, self.step
            )));
        }
        Ok(Array1::range(self.fmin, self.fmax, self.step))
    }
}

/// Measured reflection spectrum, frequencies in GHz.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredData {
    pub freq_ghz: Array1<f64>,
    pub reflectance: Array1<f64>,
}

impl MeasuredData {
    pub fn len(&self) -> usize {
        self.freq_ghz.len()
    }

    pub fn is_empty(&self) -> bool {
        self.freq_ghz.is_empty()
    }
}

/// Where the k-factor is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum KFactorAt {
    /// Frequency of the minimum of the current model curve
    #[default]
    Minimum,
    /// Explicit frequency in GHz
    Frequency(f64),
}

/// Last successful fit of measured data.
#[derive(Debug, Clone)]
pub struct FitSummary {
    pub result: FitResult,

    /// Model at the measured frequencies after the fit
    pub fitted: Array1<f64>,

    /// Sum of squared deviations between `fitted` and the measurement
    pub chisqr: f64,
}

/// Parameter list of a new session for a cavity described by `config`.
pub fn default_parameters(config: &CavityConfig) -> Result<ParameterList> {
    let params: Vec<Parameter> = CavityModel::PARAMETERS
        .iter()
        .zip(CavityModel::args_for(config))
        .map(|(name, value)| Parameter::new(name, value, !FREE_BY_DEFAULT.contains(name)))
        .collect();
    ParameterList::try_from(params)
}

/// The analysis state of one operator.
///
/// # Examples
///
/// ```
/// use trmc_rs::session::AnalysisSession;
///
/// let session = AnalysisSession::new().unwrap();
/// let (f, r) = session.curve().unwrap();
/// assert_eq!(f.len(), r.len());
/// assert!(r.iter().all(|v| (0.0..=1.0).contains(v)));
/// ```
#[derive(Debug, Clone)]
pub struct AnalysisSession {
    fit: CurveFit<CavityModel>,
    defaults: ParameterList,
    sweep: SweepSettings,
    default_sweep: SweepSettings,
    options: FitOptions,
    measured: Option<MeasuredData>,
    last_fit: Option<FitSummary>,
}

impl AnalysisSession {
    /// X-band session with the usual starting values: sample 35.825 mm from
    /// the cavity end, 11 mm to the iris, no substrate dielectric.
    pub fn new() -> Result<Self> {
        let config = CavityConfig {
            d1: 35.825,
            d2: 11.0,
            substrate: Layer::new(1.0, 1.0, 0.0),
            ..CavityConfig::x_band()
        };
        Ok(Self::from_parts(
            config,
            default_parameters(&config)?,
            SweepSettings::default(),
        ))
    }

    /// Session for an arbitrary cavity. The starting values are taken from
    /// `config`.
    pub fn with_config(config: CavityConfig, sweep: SweepSettings) -> Result<Self> {
        Ok(Self::from_parts(config, default_parameters(&config)?, sweep))
    }

    fn from_parts(config: CavityConfig, defaults: ParameterList, sweep: SweepSettings) -> Self {
        let adapter = ParameterAdapter::with_parameters(CavityModel::new(config), defaults.clone());
        let fit = CurveFit::from_adapter(adapter);
        Self {
            fit,
            defaults,
            sweep,
            default_sweep: sweep,
            options: FitOptions::default(),
            measured: None,
            last_fit: None,
        }
    }

    pub fn parameters(&self) -> &ParameterList {
        self.fit.parameters()
    }

    pub fn parameters_mut(&mut self) -> &mut ParameterList {
        self.fit.parameters_mut()
    }

    pub fn set(&mut self, name: &str, value: f64, fixed: Option<bool>) -> Result<()> {
        self.fit.set(name, value, fixed)
    }

    pub fn curve_fit(&self) -> &CurveFit<CavityModel> {
        &self.fit
    }

    pub fn sweep(&self) -> &SweepSettings {
        &self.sweep
    }

    pub fn set_sweep(&mut self, sweep: SweepSettings) {
        self.sweep = sweep;
    }

    pub fn fit_options_mut(&mut self) -> &mut FitOptions {
        &mut self.options
    }

    pub fn measured(&self) -> Option<&MeasuredData> {
        self.measured.as_ref()
    }

    pub fn last_fit(&self) -> Option<&FitSummary> {
        self.last_fit.as_ref()
    }

    /// Cavity configuration described by the current parameter values.
    pub fn config(&self) -> Result<CavityConfig> {
        self.fit.model().config_for(&self.parameters().values())
    }

    /// Model curve over the sweep as `(frequency, reflectance)`.
    pub fn curve(&self) -> Result<(Array1<f64>, Array1<f64>)> {
        let f = self.sweep.frequencies()?;
        let r = self.fit.calc(&f)?;
        Ok((f, r))
    }

    /// Store a measured spectrum. The frequencies are converted to GHz.
    pub fn set_measured(
        &mut self,
        freq: Array1<f64>,
        reflectance: Array1<f64>,
        unit: FrequencyUnit,
    ) -> Result<()> {
        if freq.len() != reflectance.len() {
            return Err(TrmcError::DimensionMismatch(format!(
                "{} frequencies, {} reflectance values",
                freq.len(),
                reflectance.len()
            )));
        }
        let freq_ghz = freq.mapv(|f| unit.to_ghz(f));
        debug!(samples = freq_ghz.len(), %unit, "measured data set");
        self.measured = Some(MeasuredData {
            freq_ghz,
            reflectance,
        });
        self.last_fit = None;
        Ok(())
    }

    /// Read the first two columns of a text file as measured data.
    pub fn load_measured<P: AsRef<Path>>(
        &mut self,
        path: P,
        options: &TextDataOptions,
        unit: FrequencyUnit,
    ) -> Result<()> {
        let (freq, reflectance) = read_textdata_file(path, options)?.xy()?;
        self.set_measured(freq, reflectance, unit)
    }

    /// Fit the free parameters to the measured data.
    ///
    /// Returns `Ok(None)` without touching anything when there are fewer than
    /// two measured samples.
    pub fn fit_measured(&mut self) -> Result<Option<FitSummary>> {
        let data = match &self.measured {
            Some(data) if data.len() >= MIN_SAMPLES => data,
            _ => {
                warn!(
                    samples = self.measured.as_ref().map_or(0, MeasuredData::len),
                    "not enough measured data, fit skipped"
                );
                return Ok(None);
            }
        };

        let result = self
            .fit
            .fit_with(&data.freq_ghz, &data.reflectance, &self.options)?;
        let fitted = self.fit.calc(&data.freq_ghz)?;
        let chisqr = (&fitted - &data.reflectance).mapv(|d| d * d).sum();

        let summary = FitSummary {
            result,
            fitted,
            chisqr,
        };
        self.last_fit = Some(summary.clone());
        Ok(Some(summary))
    }

    /// k-factor with the layer conductivity set to `layer_sigma` (S/m).
    ///
    /// Returns `(frequency in GHz, k)`.
    pub fn kfactor(&self, at: KFactorAt, layer_sigma: f64) -> Result<(f64, f64)> {
        let freq = match at {
            KFactorAt::Frequency(f) => f,
            KFactorAt::Minimum => {
                let (f, r) = self.curve()?;
                let k = argmin(&r).ok_or_else(|| {
                    TrmcError::InvalidInput("model curve has no finite values".to_string())
                })?;
                f[k]
            }
        };

        let mut config = self.config()?;
        config.layer.sigma = layer_sigma;
        let k = config.kfactor(freq, KFactorStep::default())?;
        Ok((freq, k))
    }

    /// Export text of the current model curve.
    pub fn export_curve(&self) -> Result<String> {
        let (f, r) = self.curve()?;
        export_text(self.parameters(), &f, &r)
    }

    /// Restore the starting parameters and sweep. Measured data is kept.
    pub fn reset(&mut self) {
        *self.fit.parameters_mut() = self.defaults.clone();
        self.sweep = self.default_sweep;
        self.last_fit = None;
    }
}
