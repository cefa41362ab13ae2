//! Integration tests that exercise the library end to end

// Lorentzian and cavity fits on synthetic data
mod fitting;

// Measurement files and exported curves
mod data_files;

// The analysis session workflow
mod session_workflow;
