//! Salt extraction and persistence.
//!
//! Reads a persisted monochrome image back and turns each row into a
//! hexadecimal token, then writes the token list as plain text.

mod extractor;
mod store;
mod token;

pub use extractor::{extract_from_grid, row_token, SaltExtractor};
pub use store::{read_salts, write_salts, LINE_ENDING};
pub use token::SaltToken;

use crate::codec::CodecError;
use crate::error::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while extracting or storing salts.
#[derive(Debug, Error)]
pub enum SaltError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("I/O error on salt file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("line {line} of {} is not a hex token", path.display())]
    MalformedLine { path: PathBuf, line: usize },
}

impl SaltError {
    /// Classifies the failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SaltError::Codec(e) => e.kind(),
            SaltError::Io { .. } => ErrorKind::IoFailure,
            SaltError::MalformedLine { .. } => ErrorKind::DecodeFailure,
        }
    }
}
