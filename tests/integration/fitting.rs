//! Fits of synthetic spectra

use approx::assert_relative_eq;
use ndarray::Array1;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use trmc_rs::cavity::{CavityConfig, CavityModel};
use trmc_rs::models::{add_gaussian_noise, ResonanceDipModel};
use trmc_rs::parameters::{Bounds, ParameterList};
use trmc_rs::session::default_parameters;
use trmc_rs::{CurveFit, FitOptions, TrmcError};

use crate::test_helpers::cavity_spectrum;

fn dip_fit(f0: f64, r0: f64) -> CurveFit<ResonanceDipModel> {
    let mut fit = CurveFit::new(ResonanceDipModel::new()).unwrap();
    fit.set("f0", f0, None).unwrap();
    fit.set("fwhm", 0.05, Some(true)).unwrap();
    fit.set("r0", r0, None).unwrap();
    fit
}

#[test]
fn test_noisy_lorentzian_dip() {
    let f = Array1::range(8.0, 9.0, 0.002);
    let truth = dip_fit(8.5, 0.6).calc(&f).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let y = add_gaussian_noise(&truth, 0.01, &mut rng).unwrap();

    for (f0, r0) in [(8.48, 0.3), (8.45, 0.2)] {
        let mut fit = dip_fit(f0, r0);
        let result = fit.fit(&f, &y).unwrap();

        let f0_fit = fit.value("f0").unwrap();
        assert!((f0_fit - 8.5).abs() / 8.5 < 0.01, "f0 = {}", f0_fit);
        assert_relative_eq!(f0_fit, 8.5, epsilon = 2e-3);
        assert_relative_eq!(fit.value("r0").unwrap(), 0.6, epsilon = 2e-2);
        assert_eq!(fit.value("fwhm").unwrap(), 0.05);

        let f0_err = result.get("f0").unwrap().stderr;
        assert!(f0_err > 0.0 && f0_err < 1e-2);
        // residual noise of 0.01 per point
        assert_relative_eq!(result.redchi().sqrt(), 0.01, max_relative = 0.2);
    }
}

#[test]
fn test_single_point_is_rejected() {
    let mut fit = dip_fit(8.5, 0.6);
    let before = fit.parameters().clone();
    let err = fit.fit(&Array1::from(vec![8.5]), &Array1::from(vec![0.6]));
    assert!(matches!(
        err,
        Err(TrmcError::InsufficientData { needed: 2, got: 1 })
    ));
    assert_eq!(fit.parameters(), &before);
}

#[test]
fn test_guess_then_fit() {
    let f = Array1::range(8.0, 9.0, 0.002);
    let y = dip_fit(8.5, 0.6).calc(&f).unwrap();
    let [f0, fwhm, r0] = ResonanceDipModel::guess(&f, &y).unwrap();

    let mut fit = CurveFit::new(ResonanceDipModel::new()).unwrap();
    fit.set("f0", f0, None).unwrap();
    fit.set("fwhm", fwhm, None).unwrap();
    fit.set("r0", r0, None).unwrap();
    fit.fit(&f, &y).unwrap();

    assert_relative_eq!(fit.value("f0").unwrap(), 8.5, epsilon = 1e-6);
    assert_relative_eq!(fit.value("fwhm").unwrap(), 0.05, epsilon = 1e-6);
    assert_relative_eq!(fit.value("r0").unwrap(), 0.6, epsilon = 1e-6);
}

fn cavity_fit(d_iris: f64, sub_epsr: f64) -> CurveFit<CavityModel> {
    let config = CavityConfig::x_band();
    let mut params: ParameterList = default_parameters(&config).unwrap();
    params.fix("loss_fac").unwrap();
    params.set("d_iris", d_iris, None).unwrap();
    params.set("sub_epsr", sub_epsr, None).unwrap();
    CurveFit::with_parameters(CavityModel::new(config), params).unwrap()
}

#[test]
fn test_cavity_fit_recovers_iris_and_substrate() {
    let f = Array1::range(8.3, 8.9, 0.002);
    let y = cavity_spectrum(&CavityConfig::x_band(), &f);

    for (d_iris, sub_epsr) in [(9.3, 3.45), (9.9, 3.7), (9.0, 3.3)] {
        let mut fit = cavity_fit(d_iris, sub_epsr);
        let result = fit.fit(&f, &y).unwrap();

        assert_relative_eq!(fit.value("d_iris").unwrap(), 9.6, epsilon = 1e-4);
        assert_relative_eq!(fit.value("sub_epsr").unwrap(), 3.6, epsilon = 1e-4);
        assert_eq!(fit.value("d1").unwrap(), 36.0);
        assert_eq!(fit.value("loss_fac").unwrap(), 1e-7);
        assert_eq!(result.nvarys(), 2);
        assert!(result.chisqr < 1e-12);
    }
}

#[test]
fn test_cavity_fit_with_common_bounds() {
    let f = Array1::range(8.3, 8.9, 0.002);
    let y = cavity_spectrum(&CavityConfig::x_band(), &f);

    let mut fit = cavity_fit(9.3, 3.45);
    let options = FitOptions {
        bounds: Some(Bounds::new(1.0, 20.0).unwrap()),
        ..FitOptions::default()
    };
    fit.fit_with(&f, &y, &options).unwrap();
    assert_relative_eq!(fit.value("d_iris").unwrap(), 9.6, epsilon = 1e-4);
    assert_relative_eq!(fit.value("sub_epsr").unwrap(), 3.6, epsilon = 1e-4);
}

#[test]
fn test_zero_thickness_layer_parameters_do_not_move() {
    let config = CavityConfig::x_band();
    let f = Array1::range(8.3, 8.9, 0.01);
    let mut params = default_parameters(&config).unwrap();
    params.set("layer_t", 0.0, None).unwrap();
    let fit = CurveFit::with_parameters(CavityModel::new(config), params.clone()).unwrap();
    let base = fit.calc(&f).unwrap();

    params.set("layer_epsr", 8.0, None).unwrap();
    params.set("layer_sig", 500.0, None).unwrap();
    let moved = CurveFit::with_parameters(CavityModel::new(config), params)
        .unwrap()
        .calc(&f)
        .unwrap();
    for (a, b) in base.iter().zip(moved.iter()) {
        assert_relative_eq!(a, b, max_relative = 1e-12);
    }
}
