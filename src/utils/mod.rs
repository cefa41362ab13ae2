//! Utility functions and helpers for the trmc-rs library.

pub mod finite_difference;
pub mod matrix_convert;
