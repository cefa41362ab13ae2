//! # Parameter System
//!
//! Named fit parameters and the machinery that maps them between the *full*
//! argument vector of a model function and the *reduced* vector of free
//! values that the least-squares solver works on.
//!
//! ## Core Components
//!
//! - [`Parameter`]: a named value with a fixed flag, optional bounds and a
//!   standard error filled in after fitting
//! - [`ParameterList`]: ordered parameters with name lookup and full/reduced mapping
//! - [`ParameterAdapter`]: a function bundled with its parameter list
//! - [`Bounds`] and [`BoundsTransform`]: keep bounded parameters inside their
//!   interval during optimization
//!
//! ## Example Usage
//!
//! ```rust
//! use trmc_rs::parameters::ParameterAdapter;
//!
//! let sum = |x: &[f64]| x.iter().sum::<f64>();
//! let mut adapter = ParameterAdapter::from_names(sum, &["x1", "x2", "x3"]).unwrap();
//! adapter.set("x1", 1.0, None).unwrap();
//! adapter.set("x2", 2.0, Some(true)).unwrap();
//! adapter.set("x3", 3.0, None).unwrap();
//!
//! // Only x1 and x3 are handed to the solver
//! assert_eq!(adapter.reduced_values(), vec![1.0, 3.0]);
//! assert_eq!(adapter.invoke(&[1.0, 3.0]).unwrap(), 6.0);
//! ```

pub mod adapter;
pub mod bounds;
pub mod list;
pub mod parameter;


pub use adapter::ParameterAdapter;
pub use bounds::{Bounds, BoundsError, BoundsTransform};
pub use list::ParameterList;
pub use parameter::Parameter;
