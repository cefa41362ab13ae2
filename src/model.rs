//! Model trait and a closure-backed model.
//!
//! A model is a function `f(x, p1, .., pn)` of an independent variable array
//! `x` and `n` named scalar arguments. Fitting code never looks inside a model:
//! it only relies on the argument names (which define the argument order) and
//! on [`Model::eval`].

use ndarray::Array1;
use std::fmt;
use std::sync::Arc;

use crate::error::{Result, TrmcError};

/// A trait representing a model that can be fit to data.
///
/// Evaluation takes `&self` and must not mutate shared state, so a model can
/// be evaluated from several threads at once.
pub trait Model: Sync {
    /// Name of the independent variable (the first formal argument).
    fn independent_name(&self) -> &str {
        "x"
    }

    /// Names of the scalar arguments, in declaration order.
    fn parameter_names(&self) -> Vec<String>;

    /// Evaluates the model at the given x values.
    ///
    /// # Arguments
    ///
    /// * `x` - The independent variable values
    /// * `args` - One value per entry of [`Model::parameter_names`], in order
    ///
    /// # Returns
    ///
    /// * The model's predicted values at the given x values
    fn eval(&self, x: &Array1<f64>, args: &[f64]) -> Result<Array1<f64>>;

    /// Calculates the residuals (y_obs - y_pred).
    fn residuals(&self, x: &Array1<f64>, args: &[f64], y: &Array1<f64>) -> Result<Array1<f64>> {
        let y_pred = self.eval(x, args)?;

        if y.len() != y_pred.len() {
            return Err(TrmcError::DimensionMismatch(format!(
                "Expected {} observed values, got {}",
                y_pred.len(),
                y.len()
            )));
        }

        Ok(y - &y_pred)
    }
}

type EvalFn = dyn Fn(&Array1<f64>, &[f64]) -> Result<Array1<f64>> + Send + Sync;

/// A model defined by a closure and a list of argument names.
///
/// # Examples
///
/// ```
/// use ndarray::array;
/// use trmc_rs::model::{FnModel, Model};
///
/// let line = FnModel::new("x", &["slope", "offset"], |x, p| Ok(x.mapv(|v| p[0] * v + p[1])));
/// let y = line.eval(&array![0.0, 1.0, 2.0], &[2.0, 1.0]).unwrap();
/// assert_eq!(y, array![1.0, 3.0, 5.0]);
/// ```
#[derive(Clone)]
pub struct FnModel {
    independent: String,
    names: Vec<String>,
    eval_func: Arc<EvalFn>,
}

impl FnModel {
    pub fn new<F>(independent: &str, names: &[&str], eval_func: F) -> Self
    where
        F: Fn(&Array1<f64>, &[f64]) -> Result<Array1<f64>> + Send + Sync + 'static,
    {
        Self {
            independent: independent.to_string(),
            names: names.iter().map(|s| s.to_string()).collect(),
            eval_func: Arc::new(eval_func),
        }
    }
}

impl fmt::Debug for FnModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnModel")
            .field("independent", &self.independent)
            .field("names", &self.names)
            .finish()
    }
}

impl Model for FnModel {
    fn independent_name(&self) -> &str {
        &self.independent
    }

    fn parameter_names(&self) -> Vec<String> {
        self.names.clone()
    }

    fn eval(&self, x: &Array1<f64>, args: &[f64]) -> Result<Array1<f64>> {
        if args.len() != self.names.len() {
            return Err(TrmcError::ArityMismatch {
                expected: self.names.len(),
                got: args.len(),
            });
        }
        (self.eval_func)(x, args)
    }
}
