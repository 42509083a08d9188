//! Batch generation.
//!
//! Both passes are index-parallel: every row owns its own slot and no
//! row reads another. The transform pass starts only after all digit
//! strings exist, since `collect` joins every worker first.

use super::{transform_digits, BitString, DigitString, GenerationError, IterationPolicy};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Original digit strings and their transformed bit strings.
///
/// `original.len() == processed.len() == amount`, and every element has
/// exactly `length` characters.
#[derive(Debug, Clone)]
pub struct RandomBatch {
    original: Vec<DigitString>,
    processed: Vec<BitString>,
    length: usize,
}

impl RandomBatch {
    /// Generates `amount` digit strings of `length` digits and transforms them.
    pub fn generate(
        amount: usize,
        length: usize,
        policy: IterationPolicy,
    ) -> Result<Self, GenerationError> {
        if amount == 0 {
            return Err(GenerationError::InvalidAmount(amount));
        }
        if length == 0 {
            return Err(GenerationError::InvalidLength(length));
        }

        let original = generate_rows(amount, length)?;
        tracing::debug!(amount, length, "Digit strings generated");

        let processed = transform_rows(&original, length, policy)?;
        tracing::debug!(amount, length, ?policy, "Digit strings transformed");

        Ok(Self {
            original,
            processed,
            length,
        })
    }

    /// Returns the raw digit strings.
    #[inline]
    pub fn original(&self) -> &[DigitString] {
        &self.original
    }

    /// Returns the transformed bit strings.
    #[inline]
    pub fn processed(&self) -> &[BitString] {
        &self.processed
    }

    /// Number of rows.
    #[inline]
    pub fn amount(&self) -> usize {
        self.processed.len()
    }

    /// Characters per row.
    #[inline]
    pub fn length(&self) -> usize {
        self.length
    }
}

#[cfg(feature = "parallel")]
fn generate_rows(amount: usize, length: usize) -> Result<Vec<DigitString>, GenerationError> {
    (0..amount)
        .into_par_iter()
        .map(|_| super::generate(length))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn generate_rows(amount: usize, length: usize) -> Result<Vec<DigitString>, GenerationError> {
    (0..amount).map(|_| super::generate(length)).collect()
}

#[cfg(feature = "parallel")]
fn transform_rows(
    original: &[DigitString],
    length: usize,
    policy: IterationPolicy,
) -> Result<Vec<BitString>, GenerationError> {
    original
        .par_iter()
        .map(|digits| transform_digits(digits, length, policy))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn transform_rows(
    original: &[DigitString],
    length: usize,
    policy: IterationPolicy,
) -> Result<Vec<BitString>, GenerationError> {
    original
        .iter()
        .map(|digits| transform_digits(digits, length, policy))
        .collect()
}
