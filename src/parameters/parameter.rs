//! A single named fit parameter.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::parameters::bounds::{Bounds, BoundsError};

/// A named value that is either held fixed or varied by the solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    name: String,

    value: f64,

    /// Excluded from the free-variable set handed to the solver
    pub fixed: bool,

    #[serde(default)]
    bounds: Bounds,

    /// Standard error of the parameter (set after fitting)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<f64>,
}

impl Parameter {
    /// Create an unbounded parameter.
    ///
    /// # Examples
    ///
    /// ```
    /// use trmc_rs::parameters::Parameter;
    ///
    /// let param = Parameter::new("d_iris", 9.6, false);
    /// assert_eq!(param.name(), "d_iris");
    /// assert_eq!(param.value(), 9.6);
    /// assert!(!param.is_fixed());
    /// ```
    pub fn new(name: &str, value: f64, fixed: bool) -> Self {
        Self {
            name: name.to_string(),
            value,
            fixed,
            bounds: Bounds::default(),
            stderr: None,
        }
    }

    /// Create a parameter restricted to `bounds`.
    ///
    /// The value must already lie inside the bounds.
    pub fn with_bounds(
        name: &str,
        value: f64,
        fixed: bool,
        bounds: Bounds,
    ) -> Result<Self, BoundsError> {
        if !bounds.contains(value) {
            return Err(BoundsError::ValueOutsideBounds {
                value,
                min: bounds.min,
                max: bounds.max,
            });
        }

        Ok(Self {
            name: name.to_string(),
            value,
            fixed,
            bounds,
            stderr: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Set the value. Values outside the bounds are rejected.
    pub fn set_value(&mut self, value: f64) -> Result<(), BoundsError> {
        if !self.bounds.contains(value) {
            return Err(BoundsError::ValueOutsideBounds {
                value,
                min: self.bounds.min,
                max: self.bounds.max,
            });
        }
        self.value = value;
        self.stderr = None;
        Ok(())
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Replace the bounds. The current value must lie inside the new interval.
    pub fn set_bounds(&mut self, bounds: Bounds) -> Result<(), BoundsError> {
        if !bounds.contains(self.value) {
            return Err(BoundsError::ValueOutsideBounds {
                value: self.value,
                min: bounds.min,
                max: bounds.max,
            });
        }
        self.bounds = bounds;
        Ok(())
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:5} = {}", "name", self.name)?;
        writeln!(f, "{:5} = {}", "val", self.value)?;
        write!(f, "{:5} = {}", "fixed", self.fixed)?;
        if let Some(stderr) = self.stderr {
            write!(f, "\n{:5} = {}", "err", stderr)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_value_respects_bounds() {
        let mut p = Parameter::with_bounds("layer_sig", 1.0, true, Bounds::non_negative()).unwrap();
        assert!(p.set_value(-1.0).is_err());
        assert_eq!(p.value(), 1.0);
        p.set_value(2.5).unwrap();
        assert_eq!(p.value(), 2.5);
    }

    #[test]
    fn test_with_bounds_rejects_value_outside() {
        let result = Parameter::with_bounds("x", -1.0, false, Bounds::non_negative());
        assert!(result.is_err());
    }

    #[test]
    fn test_set_value_clears_stderr() {
        let mut p = Parameter::new("f0", 8.5, false);
        p.stderr = Some(0.01);
        p.set_value(8.6).unwrap();
        assert_eq!(p.stderr, None);
    }

    #[test]
    fn test_display() {
        let p = Parameter::new("d1", 36.0, true);
        let s = format!("{}", p);
        assert!(s.contains("name  = d1"));
        assert!(s.contains("fixed = true"));
    }
}
