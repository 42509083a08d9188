//! Binary-to-pixel image codec.
//!
//! Processed bit rows become a monochrome raster (black = 0, white = 1)
//! and are read back from the persisted file for extraction. The grid is
//! the canonical form on both sides of the file.

mod grid;
mod raster;

pub use grid::MonochromeGrid;
pub use raster::{decode, encode, DecodePolicy};

use crate::error::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while encoding or decoding a grid.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("grid has no rows or no columns")]
    EmptyGrid,
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("grid of {width}x{height} exceeds image format limits")]
    DimensionsTooLarge { width: usize, height: usize },
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to encode image {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("failed to decode image {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("pixel ({x}, {y}) in {} is neither black nor white", path.display())]
    NonMonochromePixel { path: PathBuf, x: u32, y: u32 },
}

impl CodecError {
    /// Classifies the failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CodecError::EmptyGrid
            | CodecError::RaggedRows { .. }
            | CodecError::DimensionsTooLarge { .. } => ErrorKind::InvalidArgument,
            CodecError::Io { .. } | CodecError::Encode { .. } => ErrorKind::IoFailure,
            CodecError::Decode { .. } | CodecError::NonMonochromePixel { .. } => {
                ErrorKind::DecodeFailure
            }
        }
    }
}
