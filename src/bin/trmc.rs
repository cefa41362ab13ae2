//! trmc command line tool

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use trmc_rs::cavity::{CavityConfig, CavityPreset};
use trmc_rs::io::TextDataOptions;
use trmc_rs::session::{AnalysisSession, FrequencyUnit, KFactorAt, SweepSettings};

#[derive(Parser)]
#[command(name = "trmc")]
#[command(about = "Microwave cavity reflection model and fitting for TRMC")]
#[command(version)]
struct Cli {
    /// Cavity preset (x-band, ka-band). Without preset or config the X-band
    /// starting values of an analysis session are used.
    #[arg(long, global = true)]
    preset: Option<CavityPreset>,

    /// Cavity configuration as JSON
    #[arg(long, global = true, conflicts_with = "preset")]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace). RUST_LOG is used otherwise.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the model curve over a frequency sweep
    Sweep {
        #[command(flatten)]
        sweep: SweepArgs,

        #[command(flatten)]
        params: ParamArgs,

        /// Output file. Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fit the free parameters to measured data and export the model curve
    Fit {
        /// Two-column text file (frequency, reflected power)
        input: PathBuf,

        /// Unit of the frequency column (GHz, MHz, Hz)
        #[arg(long, default_value = "GHz")]
        unit: FrequencyUnit,

        /// The file uses ',' as decimal separator
        #[arg(long)]
        decimal_comma: bool,

        /// Maximum number of solver iterations
        #[arg(long, default_value = "600")]
        max_iter: usize,

        #[command(flatten)]
        sweep: SweepArgs,

        #[command(flatten)]
        params: ParamArgs,

        /// Output file. Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Conductivity sensitivity (k-factor) of the layer
    Kfactor {
        /// Layer conductivity in S/m
        #[arg(long, default_value = "0")]
        sigma: f64,

        /// Frequency in GHz. Defaults to the minimum of the model curve.
        #[arg(long)]
        freq: Option<f64>,

        #[command(flatten)]
        sweep: SweepArgs,

        #[command(flatten)]
        params: ParamArgs,
    },
}

#[derive(Args)]
struct SweepArgs {
    /// Start of the sweep in GHz
    #[arg(long)]
    fmin: Option<f64>,

    /// End of the sweep in GHz (excluded)
    #[arg(long)]
    fmax: Option<f64>,

    /// Sweep step in GHz
    #[arg(long)]
    step: Option<f64>,
}

#[derive(Args)]
struct ParamArgs {
    /// Set a parameter value, e.g. --set d_iris=9.5
    #[arg(long = "set", value_parser = parse_assignment)]
    set: Vec<(String, f64)>,

    /// Keep a parameter fixed during the fit
    #[arg(long)]
    fix: Vec<String>,

    /// Let a parameter vary during the fit
    #[arg(long)]
    free: Vec<String>,
}

fn parse_assignment(s: &str) -> std::result::Result<(String, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", s))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid value for {}: {}", name, e))?;
    Ok((name.trim().to_string(), value))
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let base = Base::from_cli(cli.preset, cli.config.as_deref())?;

    match cli.command {
        Commands::Sweep {
            sweep,
            params,
            output,
        } => {
            let session = base.session(&sweep, &params)?;
            write_output(output.as_deref(), &session.export_curve()?)
        }
        Commands::Fit {
            input,
            unit,
            decimal_comma,
            max_iter,
            sweep,
            params,
            output,
        } => {
            let mut session = base.session(&sweep, &params)?;
            session.fit_options_mut().max_iterations = max_iter;
            session
                .load_measured(&input, &TextDataOptions { decimal_comma }, unit)
                .with_context(|| format!("failed to read {}", input.display()))?;

            match session.fit_measured().context("fit failed")? {
                Some(summary) => {
                    eprint!("{}", summary.result);
                    info!(chisqr = summary.chisqr, "fitted");
                }
                None => warn!("no fit performed"),
            }
            write_output(output.as_deref(), &session.export_curve()?)
        }
        Commands::Kfactor {
            sigma,
            freq,
            sweep,
            params,
        } => {
            let session = base.session(&sweep, &params)?;
            let at = freq.map_or(KFactorAt::Minimum, KFactorAt::Frequency);
            let (f, k) = session.kfactor(at, sigma)?;
            println!("frequency_ghz = {}", f);
            println!("kfactor = {:e}", k);
            Ok(())
        }
    }
}

/// Cavity selected on the command line.
enum Base {
    Session,
    Preset(CavityPreset),
    Config(CavityConfig),
}

impl Base {
    fn from_cli(preset: Option<CavityPreset>, config: Option<&Path>) -> Result<Self> {
        if let Some(path) = config {
            let file = File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            let config: CavityConfig = serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("invalid cavity configuration in {}", path.display()))?;
            return Ok(Base::Config(config));
        }
        Ok(preset.map_or(Base::Session, Base::Preset))
    }

    fn default_sweep(&self) -> SweepSettings {
        match self {
            Base::Preset(CavityPreset::KaBand) => SweepSettings::new(25.0, 40.0, 0.01),
            _ => SweepSettings::default(),
        }
    }

    fn session(&self, sweep: &SweepArgs, params: &ParamArgs) -> Result<AnalysisSession> {
        let defaults = self.default_sweep();
        let sweep = SweepSettings::new(
            sweep.fmin.unwrap_or(defaults.fmin),
            sweep.fmax.unwrap_or(defaults.fmax),
            sweep.step.unwrap_or(defaults.step),
        );

        let mut session = match self {
            Base::Session => {
                let mut session = AnalysisSession::new()?;
                session.set_sweep(sweep);
                session
            }
            Base::Preset(preset) => AnalysisSession::with_config(preset.config(), sweep)?,
            Base::Config(config) => AnalysisSession::with_config(*config, sweep)?,
        };

        for (name, value) in &params.set {
            session.set(name, *value, None)?;
        }
        for name in &params.fix {
            session.parameters_mut().fix(name)?;
        }
        for name in &params.free {
            if params.fix.contains(name) {
                bail!("parameter {} is both fixed and free", name);
            }
            session.parameters_mut().unfix(name)?;
        }
        Ok(session)
    }
}

fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => {
            let mut file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            file.write_all(text.as_bytes())?;
            info!(path = %path.display(), "curve written");
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            lock.write_all(text.as_bytes())?;
            lock.flush()?;
        }
    }
    Ok(())
}
