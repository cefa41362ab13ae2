//! Ordered collection of named parameters
//!
//! A [`ParameterList`] keeps its entries in declaration order (the order of a
//! model function's formal arguments) and an explicit name→index map for
//! lookup. The entries that are not fixed form the *reduced* vector that a
//! least-squares solver manipulates.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

use crate::error::{Result, TrmcError};
use crate::parameters::parameter::Parameter;

/// Ordered parameter collection with full/reduced vector mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterList {
    params: Vec<Parameter>,
    index: HashMap<String, usize>,
}

impl ParameterList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list with one free, zero-valued entry per name.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let mut list = Self::new();
        for name in names {
            list.add(name.as_ref(), 0.0, false)?;
        }
        Ok(list)
    }

    /// Append a new parameter.
    ///
    /// # Examples
    ///
    /// ```
    /// use trmc_rs::parameters::ParameterList;
    ///
    /// let mut list = ParameterList::new();
    /// list.add("x1", 1.0, false).unwrap();
    /// assert!(list.add("x1", 2.0, false).is_err());
    /// ```
    pub fn add(&mut self, name: &str, value: f64, fixed: bool) -> Result<()> {
        self.push(Parameter::new(name, value, fixed))
    }

    /// Append a fully configured parameter.
    pub fn push(&mut self, param: Parameter) -> Result<()> {
        if self.index.contains_key(param.name()) {
            return Err(TrmcError::DuplicateName(param.name().to_string()));
        }
        self.index.insert(param.name().to_string(), self.params.len());
        self.params.push(param);
        Ok(())
    }

    /// Update the value and, if given, the fixed flag of an existing parameter.
    pub fn set(&mut self, name: &str, value: f64, fixed: Option<bool>) -> Result<()> {
        let param = self.get_mut(name)?;
        param.set_value(value)?;
        if let Some(fixed) = fixed {
            param.fixed = fixed;
        }
        Ok(())
    }

    /// Hold a parameter at its current value during fits.
    pub fn fix(&mut self, name: &str) -> Result<()> {
        self.get_mut(name)?.fixed = true;
        Ok(())
    }

    /// Let the solver vary a parameter.
    pub fn unfix(&mut self, name: &str) -> Result<()> {
        self.get_mut(name)?.fixed = false;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&Parameter> {
        self.index
            .get(name)
            .map(|&i| &self.params[i])
            .ok_or_else(|| TrmcError::ParameterNotFound(name.to_string()))
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut Parameter> {
        match self.index.get(name) {
            Some(&i) => Ok(&mut self.params[i]),
            None => Err(TrmcError::ParameterNotFound(name.to_string())),
        }
    }

    /// Shorthand for `get(name)?.value()`.
    pub fn value(&self, name: &str) -> Result<f64> {
        Ok(self.get(name)?.value())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Position of `name` in declaration order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.params.iter().map(|p| p.name()).collect()
    }

    /// All values in declaration order.
    pub fn values(&self) -> Vec<f64> {
        self.params.iter().map(|p| p.value()).collect()
    }

    /// Number of entries that are not fixed.
    pub fn reduced_count(&self) -> usize {
        self.params.iter().filter(|p| !p.fixed).count()
    }

    /// Values of the free entries, in declaration order.
    pub fn reduced_values(&self) -> Vec<f64> {
        self.free().map(|p| p.value()).collect()
    }

    /// The free entries, in declaration order.
    pub fn free(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter().filter(|p| !p.fixed)
    }

    /// Rebuild the full argument vector from a reduced one.
    ///
    /// Fixed entries contribute their stored value, free entries take the
    /// supplied values in order. The reduced vector has to contain exactly one
    /// value per free entry.
    pub fn expand(&self, reduced: &[f64]) -> Result<Vec<f64>> {
        let expected = self.reduced_count();
        if reduced.len() != expected {
            return Err(TrmcError::ArityMismatch {
                expected,
                got: reduced.len(),
            });
        }

        let mut supplied = reduced.iter();
        Ok(self
            .params
            .iter()
            .map(|p| {
                if p.fixed {
                    p.value()
                } else {
                    // length checked above
                    supplied.next().copied().unwrap_or(f64::NAN)
                }
            })
            .collect())
    }

    /// Write a reduced vector back into the free entries.
    ///
    /// Either all values are stored or none: a value outside its bounds leaves
    /// the list untouched.
    pub fn update_reduced(&mut self, reduced: &[f64]) -> Result<()> {
        let expected = self.reduced_count();
        if reduced.len() != expected {
            return Err(TrmcError::ArityMismatch {
                expected,
                got: reduced.len(),
            });
        }

        let mut updated = self.clone();
        for (param, &value) in updated.params.iter_mut().filter(|p| !p.fixed).zip(reduced) {
            param.set_value(value)?;
        }
        *self = updated;
        Ok(())
    }

    /// Serialize as a JSON array of parameters.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a JSON array of parameters; duplicate names are rejected.
    pub fn from_json(json: &str) -> Result<Self> {
        let params: Vec<Parameter> = serde_json::from_str(json)?;
        Self::try_from(params)
    }
}

impl TryFrom<Vec<Parameter>> for ParameterList {
    type Error = TrmcError;

    fn try_from(params: Vec<Parameter>) -> Result<Self> {
        let mut list = Self::new();
        for param in params {
            if !param.bounds().contains(param.value()) {
                return Err(TrmcError::InvalidInput(format!(
                    "value {} of parameter '{}' lies outside its bounds",
                    param.value(),
                    param.name()
                )));
            }
            list.push(param)?;
        }
        Ok(list)
    }
}

impl Serialize for ParameterList {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.params.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ParameterList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let params = Vec::<Parameter>::deserialize(deserializer)?;
        ParameterList::try_from(params).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for ParameterList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for param in &self.params {
            writeln!(f, "{}", param)?;
            writeln!(f)?;
        }
        Ok(())
    }
}
