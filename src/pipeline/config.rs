//! Run configuration.
//!
//! A run is sized by two positive integers: how many rows to generate
//! (amount) and how many digits each row holds (length). Presets set
//! both to the same value.

use crate::codec::DecodePolicy;
use crate::error::ErrorKind;
use crate::generation::IterationPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Square run sizes selectable by number.
pub const PRESET_SIZES: [usize; 9] = [256, 512, 1024, 2048, 4096, 8192, 16384, 32768, 65534];

/// Selection used when none is given (1024).
///
/// Under [`IterationPolicy::BatchLength`] a square run of side `n` costs
/// `n³` walk steps, so the default stays small; larger presets are opt-in.
pub const DEFAULT_PRESET: u8 = 3;

/// A numbered square size, `1..=9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizePreset(u8);

impl SizePreset {
    /// Picks a preset. Out-of-range selections are clamped into `1..=9`.
    pub fn new(selection: u8) -> Self {
        Self(selection.clamp(1, PRESET_SIZES.len() as u8))
    }

    /// Returns the selection number.
    pub fn selection(self) -> u8 {
        self.0
    }

    /// Returns the side length this preset stands for.
    pub fn size(self) -> usize {
        PRESET_SIZES[usize::from(self.0) - 1]
    }
}

impl Default for SizePreset {
    fn default() -> Self {
        Self(DEFAULT_PRESET)
    }
}

/// Parameters of a single generate-and-export run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of rows (image height).
    pub amount: usize,
    /// Digits per row (image width).
    pub length: usize,
    /// Loop count rule for the bit transform.
    #[serde(default)]
    pub iteration_policy: IterationPolicy,
    /// Pixel acceptance rule when reading the image back.
    #[serde(default)]
    pub decode_policy: DecodePolicy,
    /// Root directory; images and salts go into subdirectories.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::from_preset(SizePreset::default())
    }
}

impl RunConfig {
    /// Creates a configuration with the given dimensions.
    pub fn with_dimensions(amount: usize, length: usize) -> Self {
        Self {
            amount,
            length,
            iteration_policy: IterationPolicy::default(),
            decode_policy: DecodePolicy::default(),
            output_dir: default_output_dir(),
        }
    }

    /// Creates a square configuration from a preset.
    pub fn from_preset(preset: SizePreset) -> Self {
        Self::with_dimensions(preset.size(), preset.size())
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.amount == 0 {
            return Err(ConfigError::InvalidAmount(self.amount));
        }
        if self.length == 0 {
            return Err(ConfigError::InvalidLength(self.length));
        }
        Ok(())
    }

    /// Tag used in output file names: the side for square runs,
    /// `<amount>x<length>` otherwise.
    pub fn tag(&self) -> String {
        if self.amount == self.length {
            self.amount.to_string()
        } else {
            format!("{}x{}", self.amount, self.length)
        }
    }

    /// Directory holding rendered images.
    pub fn image_dir(&self) -> PathBuf {
        self.output_dir.join("images")
    }

    /// Directory holding salt lists.
    pub fn salt_dir(&self) -> PathBuf {
        self.output_dir.join("salts")
    }

    /// Destination of the rendered image.
    pub fn image_path(&self) -> PathBuf {
        self.image_dir().join(format!("random_output_{}.png", self.tag()))
    }

    /// Destination of the salt list.
    pub fn salt_path(&self) -> PathBuf {
        self.salt_dir().join(format!("salts_{}.txt", self.tag()))
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("amount must be positive, got {0}")]
    InvalidAmount(usize),
    #[error("length must be positive, got {0}")]
    InvalidLength(usize),
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

impl ConfigError {
    /// Classifies the failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::InvalidAmount(_)
            | ConfigError::InvalidLength(_)
            | ConfigError::ParseError(_) => ErrorKind::InvalidArgument,
            ConfigError::FileReadError(_) => ErrorKind::IoFailure,
        }
    }
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Sizing and transform settings.
    #[serde(default)]
    pub run: RunSection,
    /// Output location and decode settings.
    #[serde(default)]
    pub output: OutputSection,
}

/// `[run]` table. Missing dimensions fall back to the selected preset.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RunSection {
    /// Preset selection, `1..=9`.
    pub preset: Option<u8>,
    /// Explicit row count, overrides the preset.
    pub amount: Option<usize>,
    /// Explicit row length, overrides the preset.
    pub length: Option<usize>,
    /// Loop count rule for the bit transform.
    #[serde(default)]
    pub iterations: IterationPolicy,
}

/// `[output]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    /// Root directory for images and salts.
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    /// Pixel acceptance rule when reading the image back.
    #[serde(default)]
    pub decode_policy: DecodePolicy,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            decode_policy: DecodePolicy::default(),
        }
    }
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.to_run_config().validate()?;
        Ok(config)
    }

    /// Resolves the file into a run configuration.
    pub fn to_run_config(&self) -> RunConfig {
        let preset = self.run.preset.map(SizePreset::new).unwrap_or_default();
        RunConfig {
            amount: self.run.amount.unwrap_or(preset.size()),
            length: self.run.length.unwrap_or(preset.size()),
            iteration_policy: self.run.iterations,
            decode_policy: self.output.decode_policy,
            output_dir: self.output.dir.clone(),
        }
    }
}
