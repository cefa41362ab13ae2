//! Tests for the cavity reflection model

use approx::assert_relative_eq;
use ndarray::Array1;
use trmc_rs::cavity::{CavityConfig, CavityPreset, Layer};

use crate::test_helpers::{array_rel_eq, x_band_sweep};

#[test]
fn test_x_band_interior_minimum() {
    let cavity = CavityConfig::x_band();
    let f = x_band_sweep();
    let r = cavity.reflectance_sweep(&f);

    let (f_min, r_min) = cavity.resonance(&f).unwrap();
    assert_relative_eq!(f_min, 8.487, epsilon = 1e-6);
    assert_relative_eq!(r_min, 0.2694, epsilon = 1e-3);
    assert!(r_min < r[0] && r_min < r[r.len() - 1]);
}

#[test]
fn test_reflectance_is_physical() {
    let f = x_band_sweep();
    let mut cavity = CavityConfig::x_band();
    for sigma in [0.0, 1.0, 1e3, 1e6] {
        cavity.layer.sigma = sigma;
        cavity.substrate.sigma = sigma / 1e3;
        let r = cavity.reflectance_sweep(&f);
        assert!(r.iter().all(|v| v.is_finite() && *v >= 0.0 && *v <= 1.0 + 1e-12));
    }
}

#[test]
fn test_sweep_matches_scalar_evaluation() {
    let cavity = CavityConfig::x_band();
    let f = Array1::range(8.1, 9.2, 0.013);
    let scalar: Array1<f64> = f.iter().map(|&x| cavity.reflectance(x)).collect();
    assert!(array_rel_eq(&cavity.reflectance_sweep(&f), &scalar, 1e-9));

    let s11 = cavity.s11_sweep(&f);
    for (s, x) in s11.iter().zip(f.iter()) {
        assert_eq!(*s, cavity.s11(*x));
    }
}

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_sweep_matches_sequential() {
    let cavity = CavityConfig::ka_band();
    let f = Array1::range(25.0, 40.0, 0.01);
    assert_eq!(cavity.reflectance_sweep_par(&f), cavity.reflectance_sweep(&f));
}

#[test]
fn test_zero_thickness_layer_is_transparent() {
    let mut a = CavityConfig::x_band();
    a.layer = Layer::new(0.0, 1.0, 0.0);
    let mut b = a;
    b.layer = Layer::new(0.0, 10.0, 1e4);

    for f in [8.2, 8.487, 8.7, 9.1] {
        let (sa, sb) = (a.s11(f), b.s11(f));
        assert!((sa - sb).norm() <= 1e-12 * sa.norm());
    }
}

#[test]
fn test_ka_band_preset() {
    let cavity = CavityPreset::KaBand.config();
    assert_eq!(cavity, CavityConfig::ka_band());
    assert!(cavity.cutoff_ghz() > 21.0 && cavity.cutoff_ghz() < 21.2);

    let f = Array1::range(25.0, 40.0, 0.01);
    let (f_min, r_min) = cavity.resonance(&f).unwrap();
    assert_relative_eq!(f_min, 25.41, epsilon = 1e-6);
    assert_relative_eq!(r_min, 0.0745, epsilon = 1e-3);
}

#[test]
fn test_preset_names() {
    assert_eq!("x-band".parse::<CavityPreset>().unwrap(), CavityPreset::XBand);
    assert_eq!("WR28".parse::<CavityPreset>().unwrap(), CavityPreset::KaBand);
    assert_eq!(CavityPreset::KaBand.to_string(), "ka-band");
    assert!("k-band".parse::<CavityPreset>().is_err());
    assert_eq!(CavityPreset::default().config(), CavityConfig::default());
}

#[test]
fn test_config_json() {
    let cavity = CavityConfig::x_band();
    let json = serde_json::to_string(&cavity).unwrap();
    assert!(json.contains("\"copper_S\""));
    let restored: CavityConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, cavity);
    assert_relative_eq!(cavity.total_length(), 36.0 + 12.0 + 0.001 + 1.0);
}
