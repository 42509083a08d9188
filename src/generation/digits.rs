//! Secure digit source.
//!
//! Digits are drawn from the operating system's CSPRNG. `OsRng` is a
//! zero-sized handle, so every call is self-contained and safe to run
//! from any number of worker threads at once.

use super::GenerationError;
use rand::Rng;
use rand_core::OsRng;
use std::fmt;

/// Smallest digit ever produced.
pub const MIN_DIGIT: u8 = 1;
/// Largest digit ever produced.
pub const MAX_DIGIT: u8 = 9;

/// A fixed-length string of decimal digits in `'1'..='9'`.
///
/// Immutable once generated. The digit `'0'` never appears.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct DigitString {
    digits: Vec<u8>,
}

impl DigitString {
    /// Wraps digit values that must lie in `1..=9`.
    #[cfg(test)]
    pub(crate) fn from_digits(digits: Vec<u8>) -> Result<Self, GenerationError> {
        if digits.is_empty() {
            return Err(GenerationError::InvalidLength(0));
        }
        if let Some(&bad) = digits.iter().find(|d| !(MIN_DIGIT..=MAX_DIGIT).contains(*d)) {
            return Err(GenerationError::DigitOutOfRange(bad));
        }
        Ok(Self { digits })
    }

    /// Returns the numeric digit values.
    #[inline]
    pub fn digits(&self) -> &[u8] {
        &self.digits
    }

    /// Returns the number of digits.
    #[inline]
    pub fn len(&self) -> usize {
        self.digits.len()
    }

    /// Always false for a generated string; kept for API symmetry.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }
}

impl fmt::Display for DigitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &d in &self.digits {
            write!(f, "{}", char::from(b'0' + d))?;
        }
        Ok(())
    }
}

impl fmt::Debug for DigitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DigitString").field(&self.to_string()).finish()
    }
}

/// Generates `length` digits, each uniform over `1..=9`.
pub fn generate(length: usize) -> Result<DigitString, GenerationError> {
    if length == 0 {
        return Err(GenerationError::InvalidLength(length));
    }

    let digits = (0..length)
        .map(|_| OsRng.gen_range(MIN_DIGIT..=MAX_DIGIT))
        .collect();

    Ok(DigitString { digits })
}
