//! Random digit generation and bit transformation.
//!
//! This module produces the raw material of a run: secure random digit
//! strings and, position for position, the bits derived from them.

mod batch;
mod digits;
mod transform;

pub use batch::RandomBatch;
pub use digits::{generate, DigitString, MAX_DIGIT, MIN_DIGIT};
pub use transform::{
    transform, transform_digits, transform_with, Bit, BitSource, BitString, IterationPolicy,
};

use crate::error::ErrorKind;
use thiserror::Error;

/// Errors that can occur while generating a batch.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("digit string length must be positive, got {0}")]
    InvalidLength(usize),
    #[error("batch amount must be positive, got {0}")]
    InvalidAmount(usize),
    #[error("iteration count must be positive, got {0}")]
    InvalidIterations(usize),
    #[error("digit {0} is outside the accepted range")]
    DigitOutOfRange(u8),
}

impl GenerationError {
    /// Every generation failure is a bad argument.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidArgument
    }
}
