//! Fixed/free parameter adapter
//!
//! [`ParameterAdapter`] wraps a function of `n` named scalar arguments together
//! with a [`ParameterList`]. A solver only ever sees the *reduced* vector of
//! free values; the adapter merges it with the stored fixed values before
//! calling the wrapped function.

use ndarray::Array1;

use crate::error::{Result, TrmcError};
use crate::model::Model;
use crate::parameters::list::ParameterList;
use crate::parameters::parameter::Parameter;

/// A function plus the named parameter list that feeds it.
#[derive(Debug, Clone)]
pub struct ParameterAdapter<F> {
    func: F,
    params: ParameterList,
}

impl<F> ParameterAdapter<F> {
    /// Wrap `func` with an empty parameter list.
    pub fn new(func: F) -> Self {
        Self {
            func,
            params: ParameterList::new(),
        }
    }

    /// Wrap `func` with an existing parameter list.
    pub fn with_parameters(func: F, params: ParameterList) -> Self {
        Self { func, params }
    }

    /// Wrap `func` and create one free, zero-valued parameter per formal argument.
    ///
    /// # Arguments
    ///
    /// * `func` - The function to wrap
    /// * `names` - The names of the function's arguments, in order
    ///
    /// # Returns
    ///
    /// * The adapter, or `DuplicateName` if a name repeats
    pub fn from_names<S: AsRef<str>>(func: F, names: &[S]) -> Result<Self> {
        Ok(Self {
            func,
            params: ParameterList::from_names(names)?,
        })
    }

    pub fn func(&self) -> &F {
        &self.func
    }

    pub fn parameters(&self) -> &ParameterList {
        &self.params
    }

    pub fn parameters_mut(&mut self) -> &mut ParameterList {
        &mut self.params
    }

    pub fn add(&mut self, name: &str, value: f64, fixed: bool) -> Result<()> {
        self.params.add(name, value, fixed)
    }

    pub fn push(&mut self, param: Parameter) -> Result<()> {
        self.params.push(param)
    }

    pub fn set(&mut self, name: &str, value: f64, fixed: Option<bool>) -> Result<()> {
        self.params.set(name, value, fixed)
    }

    pub fn fix(&mut self, name: &str) -> Result<()> {
        self.params.fix(name)
    }

    pub fn unfix(&mut self, name: &str) -> Result<()> {
        self.params.unfix(name)
    }

    pub fn get(&self, name: &str) -> Result<&Parameter> {
        self.params.get(name)
    }

    pub fn value(&self, name: &str) -> Result<f64> {
        self.params.value(name)
    }

    pub fn reduced_count(&self) -> usize {
        self.params.reduced_count()
    }

    pub fn reduced_values(&self) -> Vec<f64> {
        self.params.reduced_values()
    }

    pub fn expand(&self, reduced: &[f64]) -> Result<Vec<f64>> {
        self.params.expand(reduced)
    }

    pub fn update_reduced(&mut self, reduced: &[f64]) -> Result<()> {
        self.params.update_reduced(reduced)
    }

    /// Call the wrapped scalar function with the free values in `reduced`.
    ///
    /// # Examples
    ///
    /// ```
    /// use trmc_rs::parameters::ParameterAdapter;
    ///
    /// let ftest = |x: &[f64]| x[0] + x[1] + x[2];
    /// let mut adapter = ParameterAdapter::from_names(ftest, &["x1", "x2", "x3"]).unwrap();
    /// adapter.set("x2", 2.0, Some(true)).unwrap();
    ///
    /// assert_eq!(adapter.invoke(&[1.0, 3.0]).unwrap(), 6.0);
    /// assert!(adapter.invoke(&[1.0]).is_err());
    /// ```
    pub fn invoke<T>(&self, reduced: &[f64]) -> Result<T>
    where
        F: Fn(&[f64]) -> T,
    {
        let full = self.expand(reduced)?;
        Ok((self.func)(&full))
    }
}

impl<M: Model> ParameterAdapter<M> {
    /// Adapter for a [`Model`], with one free entry per model argument.
    pub fn for_model(model: M) -> Result<Self> {
        let names = model.parameter_names();
        Self::from_names(model, &names)
    }

    /// Evaluate the model at `x` with free values `reduced` merged into the
    /// stored fixed values.
    pub fn invoke_model(&self, x: &Array1<f64>, reduced: &[f64]) -> Result<Array1<f64>> {
        let full = self.expand(reduced)?;
        let expected = self.func.parameter_names().len();
        if full.len() != expected {
            return Err(TrmcError::ArityMismatch {
                expected,
                got: full.len(),
            });
        }
        self.func.eval(x, &full)
    }

    /// Evaluate the model with the stored values.
    pub fn calc(&self, x: &Array1<f64>) -> Result<Array1<f64>> {
        self.invoke_model(x, &self.reduced_values())
    }
}
