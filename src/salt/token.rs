//! Hexadecimal salt token.

use std::fmt;

/// A lowercase hexadecimal string recovered from one grid row.
///
/// Not a key-derivation output; just the row's bits written as hex.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SaltToken(String);

impl SaltToken {
    /// Wraps a hex string. Returns `None` if any character is not a hex digit.
    pub fn new(hex: impl Into<String>) -> Option<Self> {
        let hex = hex.into();
        if hex.chars().all(|c| c.is_ascii_hexdigit()) {
            Some(Self(hex.to_ascii_lowercase()))
        } else {
            None
        }
    }

    pub(crate) fn from_hex_unchecked(hex: String) -> Self {
        Self(hex)
    }

    /// Returns the token as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of hex characters (nibbles).
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true for a token with no characters.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SaltToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for SaltToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SaltToken").field(&self.0).finish()
    }
}

impl AsRef<str> for SaltToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
