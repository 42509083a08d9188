//! Failure classification shared by every stage.
//!
//! Each module owns its own error enum; all of them map onto one of
//! three kinds so a caller can decide how to report a failed run.

use std::fmt;

/// Coarse classification of a failure.
///
/// Every kind is terminal for the current run. Nothing is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Non-positive amount, length or iteration count, or a ragged grid.
    InvalidArgument,
    /// A file or directory could not be created, written or read.
    IoFailure,
    /// A persisted image is corrupt or not in the expected format.
    DecodeFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::IoFailure => "I/O failure",
            ErrorKind::DecodeFailure => "decode failure",
        };
        f.write_str(name)
    }
}
