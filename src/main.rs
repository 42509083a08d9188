//! Raster Salt CLI
//!
//! Command-line front end: sizes a run, executes the pipeline and
//! reports where the image and salt list were written.

use clap::{Parser, ValueEnum};
use raster_salt::{
    codec::DecodePolicy,
    generation::IterationPolicy,
    pipeline::{self, FileConfig, RunConfig, SizePreset},
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "raster-salt", version, about = "Render secure random bits and extract hex salts")]
struct Cli {
    /// Square size preset: 1=256 2=512 3=1024 4=2048 5=4096 6=8192 7=16384 8=32768 9=65534
    #[arg(short, long)]
    preset: Option<u8>,

    /// Number of rows (image height); overrides the preset
    #[arg(short, long)]
    amount: Option<usize>,

    /// Digits per row (image width); overrides the preset
    #[arg(short, long)]
    length: Option<usize>,

    /// Root directory for the `images/` and `salts/` outputs
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Loop count rule for the bit transform
    #[arg(long, value_enum)]
    iterations: Option<IterationsArg>,

    /// Fail on any pixel that is neither pure black nor pure white
    #[arg(long)]
    strict_decode: bool,

    /// Print every extracted salt
    #[arg(long)]
    print_salts: bool,

    /// Re-read the salt file and check it against the generated rows
    #[arg(long)]
    verify: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum IterationsArg {
    BatchLength,
    DigitValue,
}

impl From<IterationsArg> for IterationPolicy {
    fn from(arg: IterationsArg) -> Self {
        match arg {
            IterationsArg::BatchLength => IterationPolicy::BatchLength,
            IterationsArg::DigitValue => IterationPolicy::DigitValue,
        }
    }
}

fn resolve_config(cli: &Cli) -> Result<RunConfig, pipeline::ConfigError> {
    let mut config = match &cli.config {
        Some(path) => FileConfig::from_file(path)?.to_run_config(),
        None => RunConfig::default(),
    };

    if let Some(selection) = cli.preset {
        let preset = SizePreset::new(selection);
        config.amount = preset.size();
        config.length = preset.size();
        info!("Selected preset {}: {}", preset.selection(), preset.size());
    }
    if let Some(amount) = cli.amount {
        config.amount = amount;
    }
    if let Some(length) = cli.length {
        config.length = length;
    }
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(iterations) = cli.iterations {
        config.iteration_policy = iterations.into();
    }
    if cli.strict_decode {
        config.decode_policy = DecodePolicy::Strict;
    }

    config.validate()?;
    Ok(config)
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    info!("Raster Salt v{}", raster_salt::VERSION);

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!(kind = %e.kind(), "Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let report = match pipeline::run(&config) {
        Ok(report) => report,
        Err(e) => {
            error!(kind = %e.kind(), "Run failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if cli.verify {
        if let Err(e) = pipeline::verify(&report) {
            error!(kind = %e.kind(), "Verification failed: {}", e);
            return ExitCode::FAILURE;
        }
    }

    if cli.print_salts {
        for (i, salt) in report.salts.iter().enumerate() {
            println!("Salt {}: {}", i + 1, salt);
        }
    }

    info!(
        "Image: {} ({} ms)",
        report.image_path.display(),
        report.timings.encoding.as_millis()
    );
    info!(
        "Salts: {} ({} ms)",
        report.salt_path.display(),
        report.timings.salt_write.as_millis()
    );
    info!("Runtime: {} ms", report.timings.total().as_millis());

    ExitCode::SUCCESS
}
