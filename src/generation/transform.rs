//! Value-dependent bit transformation.
//!
//! Each digit is run through a short random walk:
//!
//! - even working value (including 0): redraw uniformly from `{0, 1}`
//! - odd working value: draw `r` uniformly from `{-1, 0}` and keep `-r`
//!
//! Keeping the negated draw means the working value is `0` or `1` after
//! every step, so the final value is always a valid bit. Each step consumes
//! exactly one uniform bit, so bits are pulled from the OS generator in
//! blocks through a [`BitSource`] owned by the caller; nothing is shared
//! between workers.

use super::{DigitString, GenerationError};
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single transformed bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bit {
    /// Rendered as `'0'`, a black pixel.
    Zero,
    /// Rendered as `'1'`, a white pixel.
    One,
}

impl Bit {
    /// Returns the rendered character, `'0'` or `'1'`.
    #[inline]
    pub fn as_char(self) -> char {
        match self {
            Bit::Zero => '0',
            Bit::One => '1',
        }
    }

    /// Returns true for [`Bit::One`].
    #[inline]
    pub fn is_set(self) -> bool {
        self == Bit::One
    }
}

impl From<bool> for Bit {
    fn from(set: bool) -> Self {
        if set {
            Bit::One
        } else {
            Bit::Zero
        }
    }
}

/// How many iterations each digit's walk runs for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IterationPolicy {
    /// Every digit uses the run's length parameter.
    #[default]
    BatchLength,
    /// Every digit uses its own value (1 to 9 iterations).
    DigitValue,
}

impl IterationPolicy {
    /// Resolves the iteration count for `digit` in a run of `length`.
    #[inline]
    pub fn iterations(self, digit: u8, length: usize) -> usize {
        match self {
            IterationPolicy::BatchLength => length,
            IterationPolicy::DigitValue => usize::from(digit),
        }
    }
}

/// An ordered string of bits, positionally aligned with its source digits.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BitString {
    bits: Vec<Bit>,
}

impl BitString {
    /// Builds a bit string from already-transformed bits.
    pub fn from_bits(bits: Vec<Bit>) -> Self {
        Self { bits }
    }

    /// Parses a `'0'`/`'1'` string. Returns `None` on any other character.
    #[cfg(test)]
    pub(crate) fn parse(text: &str) -> Option<Self> {
        text.chars()
            .map(|c| match c {
                '0' => Some(Bit::Zero),
                '1' => Some(Bit::One),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .map(Self::from_bits)
    }

    /// Returns the bits.
    #[inline]
    pub fn bits(&self) -> &[Bit] {
        &self.bits
    }

    /// Returns the number of bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Returns true if there are no bits.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }
}

impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in &self.bits {
            write!(f, "{}", bit.as_char())?;
        }
        Ok(())
    }
}

impl fmt::Debug for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BitString").field(&self.to_string()).finish()
    }
}

/// Bytes fetched from the OS generator per refill.
const BLOCK_BYTES: usize = 512;
const BLOCK_BITS: usize = BLOCK_BYTES * 8;

/// Uniform bits read from the OS generator one block at a time.
///
/// Each refill is a single `fill_bytes` call yielding 4096 bits.
pub struct BitSource {
    block: [u8; BLOCK_BYTES],
    position: usize,
    refills: u64,
}

impl BitSource {
    /// Creates an empty source; the first bit triggers a refill.
    pub fn new() -> Self {
        Self {
            block: [0; BLOCK_BYTES],
            position: BLOCK_BITS,
            refills: 0,
        }
    }

    /// Returns the next uniform bit.
    #[inline]
    pub fn next_bit(&mut self) -> bool {
        if self.position == BLOCK_BITS {
            OsRng.fill_bytes(&mut self.block);
            self.position = 0;
            self.refills += 1;
        }
        let bit = (self.block[self.position / 8] >> (self.position % 8)) & 1 == 1;
        self.position += 1;
        bit
    }

    /// Number of times the OS generator has been called.
    pub fn refills(&self) -> u64 {
        self.refills
    }
}

impl Default for BitSource {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BitSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitSource")
            .field("remaining", &(BLOCK_BITS - self.position))
            .field("refills", &self.refills)
            .finish()
    }
}

/// One walk over `iterations` steps, one bit from `next_bit` per step.
fn walk(digit: u8, iterations: usize, mut next_bit: impl FnMut() -> bool) -> Bit {
    let mut value = i32::from(digit);
    for _ in 0..iterations {
        let bit = i32::from(next_bit());
        value = if value % 2 == 0 {
            // uniform over {0, 1}
            bit
        } else {
            // r uniform over {-1, 0}, keep -r
            let r = -bit;
            -r
        };
    }

    debug_assert!(value == 0 || value == 1);
    Bit::from(value == 1)
}

/// Runs the walk for `iterations` steps starting from `digit`.
///
/// `digit` may be any value in `0..=9`; zero counts as even.
pub fn transform(digit: u8, iterations: usize) -> Result<Bit, GenerationError> {
    transform_with(digit, iterations, &mut BitSource::new())
}

/// Like [`transform`], drawing from a caller-owned [`BitSource`].
pub fn transform_with(
    digit: u8,
    iterations: usize,
    source: &mut BitSource,
) -> Result<Bit, GenerationError> {
    if iterations == 0 {
        return Err(GenerationError::InvalidIterations(iterations));
    }
    if digit > 9 {
        return Err(GenerationError::DigitOutOfRange(digit));
    }

    Ok(walk(digit, iterations, || source.next_bit()))
}

/// Transforms every digit of `digits`, preserving position.
///
/// One [`BitSource`] serves the whole row.
pub fn transform_digits(
    digits: &DigitString,
    length: usize,
    policy: IterationPolicy,
) -> Result<BitString, GenerationError> {
    let mut source = BitSource::new();
    let bits = digits
        .digits()
        .iter()
        .map(|&d| transform_with(d, policy.iterations(d, length), &mut source))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::trace!(
        length = digits.len(),
        refills = source.refills(),
        "Row transformed"
    );
    Ok(BitString::from_bits(bits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zero_iterations_rejected() {
        assert!(matches!(
            transform(3, 0),
            Err(GenerationError::InvalidIterations(0))
        ));
    }

    #[test]
    fn test_out_of_range_digit_rejected() {
        assert!(matches!(
            transform(10, 1),
            Err(GenerationError::DigitOutOfRange(10))
        ));
    }

    #[test]
    fn test_zero_digit_is_even() {
        // One step from an even value draws from {0, 1}; both outcomes appear
        let draws: Vec<Bit> = (0..512).map(|_| transform(0, 1).unwrap()).collect();
        assert!(draws.contains(&Bit::Zero));
        assert!(draws.contains(&Bit::One));
    }

    #[test]
    fn test_odd_digit_single_step_is_bit() {
        for _ in 0..512 {
            let bit = transform(7, 1).unwrap();
            assert!(matches!(bit, Bit::Zero | Bit::One));
        }
    }

    #[test]
    fn test_rendered_characters_only_zero_or_one() {
        let digits = DigitString::from_digits((1..=9).cycle().take(900).collect()).unwrap();
        let bits = transform_digits(&digits, 5, IterationPolicy::BatchLength).unwrap();

        assert_eq!(bits.len(), 900);
        assert!(bits.to_string().chars().all(|c| c == '0' || c == '1'));
    }

    #[test]
    fn test_digit_value_policy() {
        assert_eq!(IterationPolicy::DigitValue.iterations(7, 4096), 7);
        assert_eq!(IterationPolicy::BatchLength.iterations(7, 4096), 4096);
    }

    #[test]
    fn test_parse_rejects_other_characters() {
        assert!(BitString::parse("0110").is_some());
        assert!(BitString::parse("01/0").is_none());
    }

    #[test]
    fn test_walk_parity_transitions() {
        // Odd start: draw 1 keeps it odd (1), draw 0 makes it even (0)
        let mut bits = [true, false, true].into_iter();
        assert_eq!(walk(7, 1, || bits.next().unwrap()), Bit::One);
        assert_eq!(walk(7, 1, || bits.next().unwrap()), Bit::Zero);
        // Even start (zero included) takes the drawn bit
        assert_eq!(walk(0, 1, || bits.next().unwrap()), Bit::One);

        // The final value is the last drawn bit, whatever the path
        let sequence = [true, true, false, true, false, false, true];
        let mut iter = sequence.into_iter();
        assert_eq!(walk(3, sequence.len(), || iter.next().unwrap()), Bit::One);
    }

    #[test]
    fn test_walk_consumes_one_bit_per_step() {
        let mut consumed = 0;
        walk(5, 37, || {
            consumed += 1;
            false
        });
        assert_eq!(consumed, 37);
    }

    #[test]
    fn test_source_refills_once_per_block() {
        let mut source = BitSource::new();
        assert_eq!(source.refills(), 0);

        transform_with(4, BLOCK_BITS, &mut source).unwrap();
        assert_eq!(source.refills(), 1);

        transform_with(4, 1, &mut source).unwrap();
        assert_eq!(source.refills(), 2);

        transform_with(4, 3 * BLOCK_BITS - 1, &mut source).unwrap();
        assert_eq!(source.refills(), 4);
    }

    #[test]
    fn test_source_bits_are_balanced() {
        let mut source = BitSource::new();
        let ones = (0..BLOCK_BITS * 4).filter(|_| source.next_bit()).count();

        // Mean 8192, sd 64; 10 sd either side
        assert!((7552..=8832).contains(&ones), "ones = {}", ones);
    }

    proptest! {
        #[test]
        fn prop_transform_always_bit(digit in 0u8..=9, iterations in 1usize..64) {
            let bit = transform(digit, iterations).unwrap();
            prop_assert!(bit.as_char() == '0' || bit.as_char() == '1');
        }
    }
}
