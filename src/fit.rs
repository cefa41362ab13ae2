//! Curve fitting with named, fixable parameters.
//!
//! [`CurveFit`] owns a [`ParameterAdapter`] around a [`Model`]. Only the free
//! parameters are handed to the Levenberg-Marquardt solver; fixed ones keep
//! their stored values. A successful fit writes the optimized values and
//! their standard errors back into the parameter list, a failed fit leaves
//! the list exactly as it was.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

use crate::error::{Result, TrmcError};
use crate::lm::{LevenbergMarquardt, LmConfig};
use crate::model::Model;
use crate::parameters::{Bounds, BoundsTransform, Parameter, ParameterAdapter, ParameterList};
use crate::problem::Problem;
use crate::uncertainty::{calculate_correlation, fit_covariance, standard_errors_from_covariance};
use crate::utils::finite_difference::jacobian;

/// Minimum number of samples a fit needs.
pub const MIN_SAMPLES: usize = 2;

/// Options for [`CurveFit::fit_with`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitOptions {
    /// Bounds applied to every free parameter instead of the per-parameter
    /// bounds. `None` uses the bounds stored with each parameter.
    pub bounds: Option<Bounds>,

    /// Maximum number of solver iterations. Default: 600
    pub max_iterations: usize,

    /// Remaining solver settings. Its `max_iterations` is replaced by the
    /// field above.
    pub lm: LmConfig,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            bounds: None,
            max_iterations: 600,
            lm: LmConfig::default(),
        }
    }
}

/// Value and standard error of one free parameter after a fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedParameter {
    pub name: String,
    pub value: f64,
    pub stderr: f64,
}

/// Outcome of a successful fit.
#[derive(Debug, Clone)]
pub struct FitResult {
    /// Free parameters in list order
    pub params: Vec<FittedParameter>,

    /// Covariance of the free parameters, `+inf` where it could not be estimated
    pub covariance: Array2<f64>,

    /// Sum of squared residuals at the solution
    pub chisqr: f64,

    /// Number of data points
    pub ndata: usize,

    /// Number of solver iterations
    pub iterations: usize,

    /// Number of model evaluations
    pub nfev: usize,

    /// Solver termination message
    pub message: String,
}

impl FitResult {
    /// Number of free parameters.
    pub fn nvarys(&self) -> usize {
        self.params.len()
    }

    /// Chi-square per degree of freedom; infinite without degrees of freedom.
    pub fn redchi(&self) -> f64 {
        if self.ndata > self.nvarys() {
            self.chisqr / (self.ndata - self.nvarys()) as f64
        } else {
            f64::INFINITY
        }
    }

    /// Correlation matrix of the free parameters.
    pub fn correlation(&self) -> Array2<f64> {
        calculate_correlation(&self.covariance)
    }

    pub fn get(&self, name: &str) -> Option<&FittedParameter> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn values(&self) -> Vec<f64> {
        self.params.iter().map(|p| p.value).collect()
    }

    pub fn stderrs(&self) -> Vec<f64> {
        self.params.iter().map(|p| p.stderr).collect()
    }
}

impl fmt::Display for FitResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[[Fit Statistics]]")?;
        writeln!(f, "    data points      = {}", self.ndata)?;
        writeln!(f, "    variables        = {}", self.nvarys())?;
        writeln!(f, "    iterations       = {}", self.iterations)?;
        writeln!(f, "    chi-square       = {:.6e}", self.chisqr)?;
        writeln!(f, "    reduced chi-sqr  = {:.6e}", self.redchi())?;
        writeln!(f, "    message          = {}", self.message)?;
        writeln!(f, "[[Variables]]")?;
        for p in &self.params {
            writeln!(f, "    {:<12} = {:.6e} +/- {:.3e}", p.name, p.value, p.stderr)?;
        }
        Ok(())
    }
}

/// The least-squares problem seen by the solver: residuals of the model as a
/// function of the internal (unbounded) free-parameter coordinates.
struct FitProblem<'a, M: Model> {
    adapter: &'a ParameterAdapter<M>,
    x: &'a Array1<f64>,
    y: &'a Array1<f64>,
    transforms: Vec<BoundsTransform>,
}

impl<'a, M: Model> FitProblem<'a, M> {
    fn to_external(&self, internal: &Array1<f64>) -> Vec<f64> {
        internal
            .iter()
            .zip(&self.transforms)
            .map(|(&v, t)| t.to_external(v))
            .collect()
    }
}

impl<'a, M: Model> Problem for FitProblem<'a, M> {
    fn eval(&self, params: &Array1<f64>) -> Result<Array1<f64>> {
        let external = self.to_external(params);
        let y_pred = self.adapter.invoke_model(self.x, &external)?;
        if y_pred.len() != self.y.len() {
            return Err(TrmcError::DimensionMismatch(format!(
                "model returned {} values for {} observations",
                y_pred.len(),
                self.y.len()
            )));
        }
        Ok(self.y - &y_pred)
    }

    fn parameter_count(&self) -> usize {
        self.transforms.len()
    }

    fn residual_count(&self) -> usize {
        self.y.len()
    }
}

/// Least-squares fit of a [`Model`] with fixable named parameters.
///
/// # Examples
///
/// ```
/// use ndarray::Array1;
/// use trmc_rs::fit::CurveFit;
/// use trmc_rs::models::ResonanceDipModel;
///
/// let mut fit = CurveFit::new(ResonanceDipModel::new()).unwrap();
/// fit.set("f0", 8.5, None).unwrap();
/// fit.set("fwhm", 0.05, Some(true)).unwrap();
/// fit.set("r0", 0.6, None).unwrap();
///
/// let f = Array1::range(8.0, 9.0, 0.002);
/// let y = fit.calc(&f).unwrap();
///
/// fit.set("f0", 8.47, None).unwrap();
/// fit.set("r0", 0.4, None).unwrap();
/// let result = fit.fit(&f, &y).unwrap();
/// assert!((fit.value("f0").unwrap() - 8.5).abs() < 1e-6);
/// assert_eq!(result.params.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct CurveFit<M> {
    adapter: ParameterAdapter<M>,
}

impl<M: Model> CurveFit<M> {
    /// One free, zero-valued parameter per model argument.
    pub fn new(model: M) -> Result<Self> {
        Ok(Self {
            adapter: ParameterAdapter::for_model(model)?,
        })
    }

    /// Use an existing parameter list. Its names must match the model's
    /// arguments in order.
    pub fn with_parameters(model: M, params: ParameterList) -> Result<Self> {
        let expected = model.parameter_names();
        let names = params.names();
        if names.len() != expected.len() || names.iter().zip(&expected).any(|(a, b)| a != b) {
            return Err(TrmcError::InvalidInput(format!(
                "parameters {:?} do not match model arguments {:?}",
                names, expected
            )));
        }
        Ok(Self {
            adapter: ParameterAdapter::with_parameters(model, params),
        })
    }

    /// Wrap an adapter whose list is known to follow the model arguments.
    pub(crate) fn from_adapter(adapter: ParameterAdapter<M>) -> Self {
        Self { adapter }
    }

    pub fn model(&self) -> &M {
        self.adapter.func()
    }

    /// Name of the independent variable. It is never part of the fitted list.
    pub fn independent_name(&self) -> &str {
        self.adapter.func().independent_name()
    }

    pub fn adapter(&self) -> &ParameterAdapter<M> {
        &self.adapter
    }

    pub fn parameters(&self) -> &ParameterList {
        self.adapter.parameters()
    }

    pub fn parameters_mut(&mut self) -> &mut ParameterList {
        self.adapter.parameters_mut()
    }

    pub fn get(&self, name: &str) -> Result<&Parameter> {
        self.adapter.get(name)
    }

    pub fn value(&self, name: &str) -> Result<f64> {
        self.adapter.value(name)
    }

    pub fn set(&mut self, name: &str, value: f64, fixed: Option<bool>) -> Result<()> {
        self.adapter.set(name, value, fixed)
    }

    pub fn fix(&mut self, name: &str) -> Result<()> {
        self.adapter.fix(name)
    }

    pub fn unfix(&mut self, name: &str) -> Result<()> {
        self.adapter.unfix(name)
    }

    pub fn set_bounds(&mut self, name: &str, bounds: Bounds) -> Result<()> {
        Ok(self.adapter.parameters_mut().get_mut(name)?.set_bounds(bounds)?)
    }

    pub fn reduced_values(&self) -> Vec<f64> {
        self.adapter.reduced_values()
    }

    /// Evaluate the model at `x` with the stored parameter values.
    pub fn calc(&self, x: &Array1<f64>) -> Result<Array1<f64>> {
        self.adapter.calc(x)
    }

    /// Fit with default options.
    pub fn fit(&mut self, x: &Array1<f64>, y: &Array1<f64>) -> Result<FitResult> {
        self.fit_with(x, y, &FitOptions::default())
    }

    /// Fit the free parameters to `(x, y)`.
    ///
    /// # Arguments
    ///
    /// * `x` - The independent variable values
    /// * `y` - The observed values
    /// * `options` - Bounds and solver settings
    ///
    /// # Returns
    ///
    /// * The fit result. On any error the stored parameters are unchanged:
    ///   `DimensionMismatch` for `x`/`y` of different length,
    ///   `InsufficientData` for fewer than two samples, `InvalidInput` if no
    ///   parameter is free, `FitDidNotConverge` if the solver gives up.
    pub fn fit_with(
        &mut self,
        x: &Array1<f64>,
        y: &Array1<f64>,
        options: &FitOptions,
    ) -> Result<FitResult> {
        if x.len() != y.len() {
            return Err(TrmcError::DimensionMismatch(format!(
                "x has {} values, y has {}",
                x.len(),
                y.len()
            )));
        }
        if x.len() < MIN_SAMPLES {
            return Err(TrmcError::InsufficientData {
                needed: MIN_SAMPLES,
                got: x.len(),
            });
        }

        let free: Vec<&Parameter> = self.adapter.parameters().free().collect();
        if free.is_empty() {
            return Err(TrmcError::InvalidInput(
                "all parameters are fixed, nothing to fit".to_string(),
            ));
        }
        let names: Vec<String> = free.iter().map(|p| p.name().to_string()).collect();
        let transforms: Vec<BoundsTransform> = free
            .iter()
            .map(|p| BoundsTransform::new(options.bounds.unwrap_or_else(|| p.bounds())))
            .collect();
        let initial = free
            .iter()
            .zip(&transforms)
            .map(|(p, t)| t.to_internal(p.value()))
            .collect::<std::result::Result<Array1<f64>, _>>()?;

        let problem = FitProblem {
            adapter: &self.adapter,
            x,
            y,
            transforms,
        };

        let mut config = options.lm.clone();
        config.max_iterations = options.max_iterations;
        debug!(ndata = x.len(), nvarys = names.len(), ?names, "starting fit");
        let result = LevenbergMarquardt::with_config(config).minimize(&problem, initial)?;
        if !result.success {
            return Err(TrmcError::FitDidNotConverge(result.message));
        }

        let values = problem.to_external(&result.params);
        if values.iter().any(|v| !v.is_finite()) {
            return Err(TrmcError::FitDidNotConverge(
                "solution contains non-finite values".to_string(),
            ));
        }

        // uncertainties refer to the external parameters
        let external = FitProblem {
            adapter: &self.adapter,
            x,
            y,
            transforms: vec![BoundsTransform::new(Bounds::unbounded()); values.len()],
        };
        let jac = jacobian(&external, &Array1::from(values.clone()), Some(options.lm.epsilon))?;
        let covariance = fit_covariance(&jac, result.cost);
        let stderrs = standard_errors_from_covariance(&covariance);

        self.adapter.update_reduced(&values)?;
        let params_mut = self.adapter.parameters_mut();
        for (name, &stderr) in names.iter().zip(stderrs.iter()) {
            params_mut.get_mut(name)?.stderr = Some(stderr);
        }

        let params: Vec<FittedParameter> = names
            .into_iter()
            .zip(values)
            .zip(stderrs.iter())
            .map(|((name, value), &stderr)| FittedParameter {
                name,
                value,
                stderr,
            })
            .collect();

        info!(
            chisqr = result.cost,
            iterations = result.iterations,
            message = %result.message,
            "fit converged"
        );

        Ok(FitResult {
            params,
            covariance,
            chisqr: result.cost,
            ndata: x.len(),
            iterations: result.iterations,
            nfev: result.func_evals,
            message: result.message,
        })
    }
}
