//! Integration tests for the cavity network model

// Reflection spectra, presets and configuration
mod network_tests;

// k-factor
mod sensitivity_tests;
