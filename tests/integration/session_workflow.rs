//! The analysis workflow: model, measured data, fit, k-factor, export

use approx::assert_relative_eq;
use ndarray::Array1;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::fs;
use trmc_rs::cavity::CavityConfig;
use trmc_rs::io::TextDataOptions;
use trmc_rs::models::add_gaussian_noise;
use trmc_rs::session::{AnalysisSession, FrequencyUnit, KFactorAt, SweepSettings};

#[test]
fn test_fit_measured_file_in_mhz() {
    let sweep = SweepSettings::new(8.3, 8.9, 0.002);
    let truth = CavityConfig::x_band();
    let f = sweep.frequencies().unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let r = add_gaussian_noise(&truth.reflectance_sweep(&f), 1e-4, &mut rng).unwrap();

    let mut text = String::from("f/MHz R\n");
    for (fv, rv) in f.iter().zip(r.iter()) {
        text.push_str(&format!("{:.3} {:.8}\n", fv * 1e3, rv));
    }
    let path = std::env::temp_dir().join(format!("trmc-rs-{}-mhz.txt", std::process::id()));
    fs::write(&path, text).unwrap();

    let mut session = AnalysisSession::with_config(truth, sweep).unwrap();
    session
        .load_measured(&path, &TextDataOptions::default(), FrequencyUnit::MHz)
        .unwrap();
    fs::remove_file(&path).unwrap();
    assert_eq!(session.measured().unwrap().len(), f.len());
    assert_relative_eq!(session.measured().unwrap().freq_ghz[0], 8.3, epsilon = 1e-9);

    session.parameters_mut().fix("loss_fac").unwrap();
    session.set("d_iris", 9.3, None).unwrap();
    session.set("sub_epsr", 3.45, None).unwrap();

    let summary = session.fit_measured().unwrap().unwrap();
    assert_relative_eq!(session.parameters().value("d_iris").unwrap(), 9.6, epsilon = 1e-2);
    assert_relative_eq!(session.parameters().value("sub_epsr").unwrap(), 3.6, epsilon = 1e-2);
    assert_relative_eq!(summary.chisqr, summary.result.chisqr, max_relative = 1e-9);
    assert!(summary.result.get("d_iris").unwrap().stderr.is_finite());
}

#[test]
fn test_kfactor_at_curve_minimum() {
    let session = AnalysisSession::with_config(
        CavityConfig::x_band(),
        SweepSettings::new(8.1, 9.2, 0.001),
    )
    .unwrap();
    let (f, k) = session.kfactor(KFactorAt::Minimum, 0.0).unwrap();
    assert_relative_eq!(f, 8.487, epsilon = 1e-6);
    // a zero conductivity is stepped by 1% of 1 S/m
    assert_relative_eq!(k, -68570.0, max_relative = 5e-3);
}

#[test]
fn test_session_defaults_and_reset() {
    let mut session = AnalysisSession::new().unwrap();
    let initial = session.export_curve().unwrap();

    session.set("d2", 11.5, Some(false)).unwrap();
    session
        .set_measured(
            Array1::from(vec![8.5, 8.6]),
            Array1::from(vec![0.5, 0.6]),
            FrequencyUnit::GHz,
        )
        .unwrap();
    assert_ne!(session.export_curve().unwrap(), initial);

    session.reset();
    assert_eq!(session.export_curve().unwrap(), initial);
    assert!(session.measured().is_some());
}
