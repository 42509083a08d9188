//! Salt extraction from a decoded grid.
//!
//! Convention: every row yields exactly one token. The row is cut into
//! 4-pixel windows from the left; within a window the leftmost pixel is
//! the most significant bit, white is 1 and black is 0. A trailing
//! partial window is padded with 0 bits on the right. A row of width `w`
//! therefore yields `ceil(w / 4)` lowercase hex characters.

use super::{SaltError, SaltToken};
use crate::codec::{self, DecodePolicy, MonochromeGrid};
use std::path::Path;

/// Scans persisted images for salt tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct SaltExtractor {
    policy: DecodePolicy,
}

impl SaltExtractor {
    /// Creates an extractor using the default permissive decode policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an extractor with an explicit decode policy.
    pub fn with_policy(policy: DecodePolicy) -> Self {
        Self { policy }
    }

    /// Decodes the image at `path` and extracts one token per row,
    /// top to bottom.
    pub fn extract_all(&self, path: impl AsRef<Path>) -> Result<Vec<SaltToken>, SaltError> {
        let path = path.as_ref();
        let grid = codec::decode(path, self.policy)?;
        let tokens = extract_from_grid(&grid);

        tracing::debug!(
            path = %path.display(),
            tokens = tokens.len(),
            "Salts extracted"
        );
        Ok(tokens)
    }
}

/// Extracts one token per row of an in-memory grid.
pub fn extract_from_grid(grid: &MonochromeGrid) -> Vec<SaltToken> {
    grid.rows()
        .enumerate()
        .map(|(row, cells)| {
            let token = row_token(cells);
            tracing::trace!(row, token = token.as_str(), "Row extracted");
            token
        })
        .collect()
}

/// Converts one row into its token.
pub fn row_token(row: &[bool]) -> SaltToken {
    let nibbles = row.len().div_ceil(4);

    // Pack MSB-first into bytes; unset trailing bits are the zero padding.
    let mut bytes = vec![0u8; row.len().div_ceil(8)];
    for (i, &set) in row.iter().enumerate() {
        if set {
            bytes[i / 8] |= 0x80 >> (i % 8);
        }
    }

    let mut hex = hex::encode(bytes);
    hex.truncate(nibbles);
    SaltToken::from_hex_unchecked(hex)
}
