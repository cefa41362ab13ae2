//! Integration tests for the parameter system
//!
//! These tests verify the fixed/free mapping seen by a solver.

// Tests for the adapter around the cavity model
mod adapter_tests;
