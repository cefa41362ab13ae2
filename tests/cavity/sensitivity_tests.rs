//! Tests for the conductivity sensitivity

use approx::assert_relative_eq;
use trmc_rs::cavity::{kfactor_analytic, CavityConfig, CavityDimensions, KFactorStep};

use crate::test_helpers::x_band_sweep;

#[test]
fn test_kfactor_at_resonance() {
    let cavity = CavityConfig::x_band();
    let (f_min, _) = cavity.resonance(&x_band_sweep()).unwrap();
    let k = cavity.kfactor(f_min, KFactorStep::Absolute(0.01)).unwrap();
    assert_relative_eq!(k, -68570.0, max_relative = 5e-3);
}

#[test]
fn test_kfactor_is_repeatable() {
    let mut cavity = CavityConfig::x_band();
    cavity.layer.sigma = 1.0;
    let snapshot = cavity;

    let ks: Vec<f64> = (0..3)
        .map(|_| cavity.kfactor(8.487, KFactorStep::default()).unwrap())
        .collect();
    assert!(ks.iter().all(|k| *k == ks[0]));
    assert_eq!(cavity, snapshot);
    assert_eq!(cavity.reflectance(8.487), snapshot.reflectance(8.487));
}

#[test]
fn test_kfactor_step_sign_does_not_matter_for_sigma() {
    let mut pos = CavityConfig::x_band();
    pos.layer.sigma = 2.0;
    let mut neg = pos;
    neg.layer.sigma = -2.0;
    assert_eq!(
        pos.kfactor(8.487, KFactorStep::default()).unwrap(),
        neg.kfactor(8.487, KFactorStep::default()).unwrap()
    );
}

#[test]
fn test_kfactor_analytic_scales_with_q() {
    let dims = CavityDimensions::default();
    let narrow = kfactor_analytic(8.5e9, 5e6, 0.3, dims);
    let wide = kfactor_analytic(8.5e9, 10e6, 0.3, dims);
    assert_relative_eq!(narrow, 2.0 * wide, max_relative = 1e-12);
}
