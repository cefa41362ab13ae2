//! Parameter bounds
//!
//! Fit parameters may carry a `[min, max]` interval. The solver never sees the
//! interval directly: [`BoundsTransform`] maps each bounded parameter onto an
//! unbounded internal coordinate (Minuit-style), so Levenberg-Marquardt steps
//! can never leave the allowed range.

use serde::{Deserialize, Serialize};
use std::f64::{INFINITY, NEG_INFINITY};
use thiserror::Error;

/// Errors that can occur when working with parameter bounds
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoundsError {
    #[error("Invalid bounds: min ({min}) must not be greater than max ({max})")]
    InvalidBounds { min: f64, max: f64 },

    #[error("Parameter value {value} is outside bounds: [{min}, {max}]")]
    ValueOutsideBounds { value: f64, min: f64, max: f64 },

    #[error("Infinite parameter value is not allowed")]
    InfiniteValue,
}

/// Closed interval a parameter value has to stay in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

// Infinite limits are written as `null` since JSON has no infinity.
impl Serialize for Bounds {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Bounds", 2)?;
        let min = if self.min.is_finite() {
            Some(self.min)
        } else {
            None
        };
        let max = if self.max.is_finite() {
            Some(self.max)
        } else {
            None
        };
        state.serialize_field("min", &min)?;
        state.serialize_field("max", &max)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for Bounds {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct BoundsHelper {
            #[serde(default)]
            min: Option<f64>,

            #[serde(default)]
            max: Option<f64>,
        }

        let helper = BoundsHelper::deserialize(deserializer)?;
        let min = helper.min.unwrap_or(NEG_INFINITY);
        let max = helper.max.unwrap_or(INFINITY);
        Bounds::new(min, max).map_err(serde::de::Error::custom)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: NEG_INFINITY,
            max: INFINITY,
        }
    }
}

impl Bounds {
    /// Create bounds `[min, max]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use trmc_rs::parameters::Bounds;
    ///
    /// let bounds = Bounds::new(0.0, 10.0).unwrap();
    /// assert!(bounds.contains(5.0));
    /// assert!(Bounds::new(1.0, 0.0).is_err());
    /// ```
    pub fn new(min: f64, max: f64) -> Result<Self, BoundsError> {
        if min.is_nan() || max.is_nan() || min > max {
            return Err(BoundsError::InvalidBounds { min, max });
        }

        Ok(Self { min, max })
    }

    /// `(-inf, +inf)`
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// `[min, +inf)`, e.g. for conductivities and thicknesses.
    pub fn non_negative() -> Self {
        Self {
            min: 0.0,
            max: INFINITY,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn is_unbounded(&self) -> bool {
        !self.has_lower_bound() && !self.has_upper_bound()
    }

    pub fn has_lower_bound(&self) -> bool {
        self.min.is_finite()
    }

    pub fn has_upper_bound(&self) -> bool {
        self.max.is_finite()
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Maps between the bounded external value and the unbounded internal value
/// the optimizer works on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsTransform {
    bounds: Bounds,
}

impl BoundsTransform {
    pub fn new(bounds: Bounds) -> Self {
        Self { bounds }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Internal (optimizer) coordinate to external (model) value.
    pub fn to_external(&self, internal_value: f64) -> f64 {
        let b = &self.bounds;
        let external = match (b.has_lower_bound(), b.has_upper_bound()) {
            (false, false) => return internal_value,
            (true, false) => b.min - 1.0 + (internal_value * internal_value + 1.0).sqrt(),
            (false, true) => b.max + 1.0 - (internal_value * internal_value + 1.0).sqrt(),
            (true, true) => b.min + (internal_value.sin() + 1.0) * (b.max - b.min) / 2.0,
        };
        // rounding at the edges can land one ulp outside
        b.clamp(external)
    }

    /// External value to internal coordinate.
    ///
    /// Fails if the value is not finite or lies outside the bounds.
    pub fn to_internal(&self, external_value: f64) -> Result<f64, BoundsError> {
        let b = &self.bounds;
        if !external_value.is_finite() {
            return Err(BoundsError::InfiniteValue);
        }
        if !b.contains(external_value) {
            return Err(BoundsError::ValueOutsideBounds {
                value: external_value,
                min: b.min,
                max: b.max,
            });
        }

        let internal = match (b.has_lower_bound(), b.has_upper_bound()) {
            (false, false) => external_value,
            (true, false) => ((external_value - b.min + 1.0).powi(2) - 1.0).sqrt(),
            (false, true) => ((b.max - external_value + 1.0).powi(2) - 1.0).sqrt(),
            (true, true) => {
                let scaled = 2.0 * (external_value - b.min) / (b.max - b.min) - 1.0;
                scaled.clamp(-1.0, 1.0).asin()
            }
        };
        Ok(internal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_invalid_bounds() {
        assert_eq!(
            Bounds::new(2.0, 1.0),
            Err(BoundsError::InvalidBounds { min: 2.0, max: 1.0 })
        );
        assert!(Bounds::new(f64::NAN, 1.0).is_err());
        assert!(Bounds::new(1.0, 1.0).is_ok());
    }

    #[test]
    fn test_unbounded_transform_is_identity() {
        let t = BoundsTransform::new(Bounds::unbounded());
        assert_eq!(t.to_external(-3.25), -3.25);
        assert_eq!(t.to_internal(7.5).unwrap(), 7.5);
    }

    #[test]
    fn test_transform_stays_within_bounds() {
        let transforms = [
            BoundsTransform::new(Bounds::new(0.0, 10.0).unwrap()),
            BoundsTransform::new(Bounds::non_negative()),
            BoundsTransform::new(Bounds::new(NEG_INFINITY, 2.0).unwrap()),
        ];
        for t in transforms.iter() {
            for &internal in &[-1e3, -2.0, -0.1, 0.0, 0.3, 5.0, 1e3] {
                assert!(t.bounds().contains(t.to_external(internal)));
            }
        }
    }

    #[test]
    fn test_transform_edges_are_inside() {
        let two_sided = BoundsTransform::new(Bounds::new(0.15, 0.45).unwrap());
        let upper = two_sided.to_external(std::f64::consts::FRAC_PI_2);
        assert!(two_sided.bounds().contains(upper), "{}", upper);
        assert_eq!(upper, 0.45);
        let lower = two_sided.to_external(-std::f64::consts::FRAC_PI_2);
        assert!(two_sided.bounds().contains(lower), "{}", lower);

        let lower_only = BoundsTransform::new(Bounds::new(0.1, INFINITY).unwrap());
        assert_eq!(lower_only.to_external(0.0), 0.1);
        let upper_only = BoundsTransform::new(Bounds::new(NEG_INFINITY, 0.3).unwrap());
        assert!(upper_only.bounds().contains(upper_only.to_external(0.0)));
    }

    #[test]
    fn test_unbounded_flags() {
        assert!(Bounds::unbounded().is_unbounded());
        assert!(!Bounds::non_negative().is_unbounded());
        assert!(!Bounds::new(NEG_INFINITY, 2.0).unwrap().is_unbounded());
    }

    #[test]
    fn test_transform_inverse() {
        let t = BoundsTransform::new(Bounds::new(1.0, 3.0).unwrap());
        let internal = t.to_internal(2.5).unwrap();
        assert_relative_eq!(t.to_external(internal), 2.5, epsilon = 1e-12);

        let t = BoundsTransform::new(Bounds::non_negative());
        let internal = t.to_internal(4.0).unwrap();
        assert_relative_eq!(t.to_external(internal), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_to_internal_rejects_outside_values() {
        let t = BoundsTransform::new(Bounds::non_negative());
        assert!(matches!(
            t.to_internal(-1.0),
            Err(BoundsError::ValueOutsideBounds { .. })
        ));
        assert_eq!(t.to_internal(f64::INFINITY), Err(BoundsError::InfiniteValue));
    }

    #[test]
    fn test_bounds_json_uses_null_for_infinity() {
        let json = serde_json::to_string(&Bounds::non_negative()).unwrap();
        assert_eq!(json, r#"{"min":0.0,"max":null}"#);
        let back: Bounds = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Bounds::non_negative());
    }
}
