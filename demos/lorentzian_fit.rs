//! Fitting a resonance dip and a cavity spectrum.
//!
//! A noisy Lorentzian dip is fitted with the width held fixed, then the iris
//! and substrate of the X-band cavity are recovered from a synthetic spectrum.

use ndarray::Array1;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use trmc_rs::cavity::{CavityConfig, KFactorStep};
use trmc_rs::models::{add_gaussian_noise, ResonanceDipModel};
use trmc_rs::session::{AnalysisSession, FrequencyUnit, SweepSettings};
use trmc_rs::CurveFit;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Resonance dip");
    println!("=============\n");

    let f = Array1::range(8.0, 9.0, 0.002);
    let mut fit = CurveFit::new(ResonanceDipModel::new())?;
    fit.set("f0", 8.5, None)?;
    fit.set("fwhm", 0.05, Some(true))?;
    fit.set("r0", 0.6, None)?;

    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let y = add_gaussian_noise(&fit.calc(&f)?, 0.01, &mut rng)?;

    fit.set("f0", 8.48, None)?;
    fit.set("r0", 0.3, None)?;
    let result = fit.fit(&f, &y)?;
    println!("{}", result);

    println!("Cavity");
    println!("======\n");

    let truth = CavityConfig::x_band();
    let sweep = SweepSettings::new(8.3, 8.9, 0.002);
    let freqs = sweep.frequencies()?;

    let mut session = AnalysisSession::with_config(truth, sweep)?;
    session.set_measured(freqs.clone(), truth.reflectance_sweep(&freqs), FrequencyUnit::GHz)?;
    session.parameters_mut().fix("loss_fac")?;
    session.set("d_iris", 9.3, None)?;
    session.set("sub_epsr", 3.45, None)?;

    if let Some(summary) = session.fit_measured()? {
        println!("{}", summary.result);
    }

    let (f0, r0) = truth
        .resonance(&freqs)
        .ok_or("empty sweep")?;
    let k = truth.kfactor(f0, KFactorStep::Absolute(0.01))?;
    println!("resonance at {:.3} GHz, R = {:.4}, k-factor = {:.4e}", f0, r0, k);

    Ok(())
}
