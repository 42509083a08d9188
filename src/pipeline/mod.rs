//! End-to-end run: generate, render, persist, read back, extract.
//!
//! Extraction always works on the image re-read from disk, never on the
//! in-memory grid, so every run also checks that the codec reads back
//! what it wrote.

mod config;

pub use config::{
    ConfigError, FileConfig, OutputSection, RunConfig, RunSection, SizePreset, DEFAULT_PRESET,
    PRESET_SIZES,
};

use crate::analysis::BitStatistics;
use crate::codec::{self, CodecError, MonochromeGrid};
use crate::error::ErrorKind;
use crate::generation::{GenerationError, RandomBatch};
use crate::salt::{self, SaltError, SaltExtractor, SaltToken};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),
    #[error("image export failed: {0}")]
    Codec(#[from] CodecError),
    #[error("salt extraction failed: {0}")]
    Salt(#[from] SaltError),
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to remove stale salt file {}: {source}", path.display())]
    RemoveStale {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("salt file {} differs from the generated rows at line {line}", path.display())]
    VerifyMismatch { path: PathBuf, line: usize },
}

impl PipelineError {
    /// Classifies the failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Config(e) => e.kind(),
            PipelineError::Generation(e) => e.kind(),
            PipelineError::Codec(e) => e.kind(),
            PipelineError::Salt(e) => e.kind(),
            PipelineError::CreateDir { .. } | PipelineError::RemoveStale { .. } => {
                ErrorKind::IoFailure
            }
            PipelineError::VerifyMismatch { .. } => ErrorKind::DecodeFailure,
        }
    }
}

/// Wall-clock time spent in each stage. For display only.
#[derive(Debug, Clone, Copy, Default)]
pub struct StageTimings {
    /// Digit generation and bit transformation.
    pub generation: Duration,
    /// Rendering and writing the image.
    pub encoding: Duration,
    /// Reading the image back and extracting salts.
    pub extraction: Duration,
    /// Writing the salt list.
    pub salt_write: Duration,
}

impl StageTimings {
    /// Sum of all stages.
    pub fn total(&self) -> Duration {
        self.generation + self.encoding + self.extraction + self.salt_write
    }
}

/// Everything a completed run produced.
#[derive(Debug)]
pub struct RunReport {
    /// The generated rows.
    pub batch: RandomBatch,
    /// Where the image was written.
    pub image_path: PathBuf,
    /// Where the salt list was written.
    pub salt_path: PathBuf,
    /// Salts in scan order.
    pub salts: Vec<SaltToken>,
    /// Bit statistics of the rendered grid.
    pub statistics: BitStatistics,
    /// Per-stage elapsed time.
    pub timings: StageTimings,
}

/// Runs the whole pipeline with default settings in the current directory.
pub fn generate_and_export(amount: usize, length: usize) -> Result<RunReport, PipelineError> {
    run(&RunConfig::with_dimensions(amount, length))
}

/// Runs the whole pipeline for `config`.
///
/// Arguments are validated before anything touches the filesystem. A salt
/// file left by an earlier run with the same tag is removed before the
/// image is written. If a stage after image export fails, the image is
/// removed again so no half-finished run is left behind.
pub fn run(config: &RunConfig) -> Result<RunReport, PipelineError> {
    config.validate()?;
    let mut timings = StageTimings::default();

    tracing::info!(amount = config.amount, length = config.length, "Starting run");

    let started = Instant::now();
    let batch = RandomBatch::generate(config.amount, config.length, config.iteration_policy)?;
    let grid = MonochromeGrid::from_batch(&batch)?;
    timings.generation = started.elapsed();

    let statistics = BitStatistics::analyze(&grid);
    tracing::info!(
        elapsed_ms = timings.generation.as_millis() as u64,
        ones_ratio = statistics.ones_ratio,
        autocorrelation = statistics.autocorrelation,
        "Batch generated"
    );
    if !statistics.looks_reasonable() {
        tracing::warn!(
            bias = statistics.bias,
            autocorrelation = statistics.autocorrelation,
            "Batch statistics look unusual"
        );
    }

    let image_path = config.image_path();
    let salt_path = config.salt_path();
    create_dir(&config.image_dir())?;
    create_dir(&config.salt_dir())?;
    remove_stale(&salt_path)?;

    let started = Instant::now();
    codec::encode(&grid, &image_path)?;
    timings.encoding = started.elapsed();
    tracing::info!(
        path = %image_path.display(),
        elapsed_ms = timings.encoding.as_millis() as u64,
        "Image saved"
    );

    let salts = match export_salts(config, &image_path, &salt_path, &mut timings) {
        Ok(salts) => salts,
        Err(e) => {
            if let Err(cleanup) = std::fs::remove_file(&image_path) {
                tracing::warn!(
                    path = %image_path.display(),
                    error = %cleanup,
                    "Failed to remove image after aborted run"
                );
            }
            return Err(e);
        }
    };

    tracing::info!(
        salts = salts.len(),
        total_ms = timings.total().as_millis() as u64,
        "Run complete"
    );

    Ok(RunReport {
        batch,
        image_path,
        salt_path,
        salts,
        statistics,
        timings,
    })
}

fn export_salts(
    config: &RunConfig,
    image_path: &Path,
    salt_path: &Path,
    timings: &mut StageTimings,
) -> Result<Vec<SaltToken>, PipelineError> {
    let started = Instant::now();
    let salts = SaltExtractor::with_policy(config.decode_policy).extract_all(image_path)?;
    timings.extraction = started.elapsed();
    tracing::info!(
        count = salts.len(),
        elapsed_ms = timings.extraction.as_millis() as u64,
        "Salts extracted"
    );

    let started = Instant::now();
    salt::write_salts(&salts, salt_path)?;
    timings.salt_write = started.elapsed();
    tracing::info!(
        path = %salt_path.display(),
        elapsed_ms = timings.salt_write.as_millis() as u64,
        "Salts saved"
    );

    Ok(salts)
}

/// Re-reads the salt file of a finished run and checks it against the
/// tokens of the generated rows.
pub fn verify(report: &RunReport) -> Result<(), PipelineError> {
    let stored = salt::read_salts(&report.salt_path)?;
    let expected = salt::extract_from_grid(&MonochromeGrid::from_batch(&report.batch)?);

    let mismatch = stored
        .iter()
        .zip(&expected)
        .position(|(s, e)| s != e)
        .or_else(|| (stored.len() != expected.len()).then(|| stored.len().min(expected.len())));
    if let Some(index) = mismatch {
        return Err(PipelineError::VerifyMismatch {
            path: report.salt_path.clone(),
            line: index + 1,
        });
    }

    tracing::info!(
        path = %report.salt_path.display(),
        count = stored.len(),
        "Salt file verified"
    );
    Ok(())
}

fn remove_stale(path: &Path) -> Result<(), PipelineError> {
    if !path.is_file() {
        return Ok(());
    }
    std::fs::remove_file(path).map_err(|source| PipelineError::RemoveStale {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "Stale salt file removed");
    Ok(())
}

fn create_dir(path: &Path) -> Result<(), PipelineError> {
    std::fs::create_dir_all(path).map_err(|source| PipelineError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::salt::{extract_from_grid, read_salts, write_salts};
    use image::GenericImageView;

    fn config_in(dir: &Path, amount: usize, length: usize) -> RunConfig {
        let mut config = RunConfig::with_dimensions(amount, length);
        config.output_dir = dir.to_path_buf();
        config
    }

    #[test]
    fn test_full_run() {
        let dir = tempfile::tempdir().unwrap();
        let report = run(&config_in(dir.path(), 12, 10)).unwrap();

        assert!(report.image_path.exists());
        assert!(report.salt_path.exists());
        assert_eq!(report.batch.amount(), 12);
        assert_eq!(report.salts.len(), 12);
        assert!(report.salts.iter().all(|s| s.len() == 3));

        // Salts read back from disk match the in-memory rows
        let grid = MonochromeGrid::from_batch(&report.batch).unwrap();
        assert_eq!(extract_from_grid(&grid), report.salts);
        assert_eq!(read_salts(&report.salt_path).unwrap(), report.salts);
    }

    #[test]
    fn test_one_by_one_run() {
        let dir = tempfile::tempdir().unwrap();
        let report = run(&config_in(dir.path(), 1, 1)).unwrap();

        let image = image::open(&report.image_path).unwrap();
        assert_eq!(image.dimensions(), (1, 1));
        assert_eq!(report.salts.len(), 1);
        assert_eq!(report.salts[0].len(), 1);
        assert!(matches!(report.salts[0].as_str(), "0" | "8"));
    }

    #[test]
    fn test_zero_amount_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(&config_in(dir.path(), 0, 4)).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(!dir.path().join("images").exists());
        assert!(!dir.path().join("salts").exists());
    }

    #[test]
    fn test_zero_length_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(&config_in(dir.path(), 4, 0)).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_failed_salt_write_removes_image() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), 2, 4);
        // A directory squatting on the salt file path makes the final rename fail
        std::fs::create_dir_all(config.salt_path()).unwrap();

        let err = run(&config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IoFailure);
        assert!(!config.image_path().exists());
    }

    #[test]
    fn test_failed_rerun_leaves_no_stale_salts() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), 3, 5);
        run(&config).unwrap();
        assert!(config.salt_path().exists());

        // Replace the image with a directory so the rerun cannot encode
        std::fs::remove_file(config.image_path()).unwrap();
        std::fs::create_dir(config.image_path()).unwrap();

        let err = run(&config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IoFailure);
        assert!(!config.salt_path().exists());
    }

    #[test]
    fn test_verify_accepts_fresh_run() {
        let dir = tempfile::tempdir().unwrap();
        let report = run(&config_in(dir.path(), 6, 9)).unwrap();

        verify(&report).unwrap();
    }

    #[test]
    fn test_verify_reports_first_differing_line() {
        let dir = tempfile::tempdir().unwrap();
        let report = run(&config_in(dir.path(), 4, 8)).unwrap();

        let mut salts = report.salts.clone();
        let flipped = if salts[2].as_str() == "00" { "ff" } else { "00" };
        salts[2] = SaltToken::new(flipped).unwrap();
        write_salts(&salts, &report.salt_path).unwrap();

        let err = verify(&report).unwrap_err();
        assert!(matches!(err, PipelineError::VerifyMismatch { line: 3, .. }));
        assert_eq!(err.kind(), ErrorKind::DecodeFailure);
    }

    #[test]
    fn test_verify_detects_truncated_file() {
        let dir = tempfile::tempdir().unwrap();
        let report = run(&config_in(dir.path(), 5, 4)).unwrap();
        write_salts(&report.salts[..3], &report.salt_path).unwrap();

        assert!(matches!(
            verify(&report),
            Err(PipelineError::VerifyMismatch { line: 4, .. })
        ));
    }
}
