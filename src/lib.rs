//! Raster Salt Library
//!
//! Generates secure random digit batches, turns every digit into a bit
//! through a short random walk, renders the bits as a black-and-white
//! raster, and scans the persisted raster back into hexadecimal salts.
//!
//! # Architecture
//!
//! The system follows an explicit data flow:
//!
//! ```text
//! generation → codec::encode → (PNG on disk) → codec::decode → salt
//!      ↓
//!   analysis (bit statistics)
//! ```
//!
//! # Design Principles
//!
//! - **OS randomness only**: every draw comes from the operating system CSPRNG
//! - **Round trip through storage**: salts are read from the written file,
//!   never from the in-memory grid
//! - **No partial output**: files appear only once fully written
//! - **Not a KDF**: a salt is a row's bits in hex, nothing more
//!
//! # Example
//!
//! ```no_run
//! use raster_salt::{
//!     codec::{self, DecodePolicy, MonochromeGrid},
//!     generation::{IterationPolicy, RandomBatch},
//!     salt::{self, SaltExtractor},
//! };
//!
//! let batch = RandomBatch::generate(256, 256, IterationPolicy::BatchLength).unwrap();
//! let grid = MonochromeGrid::from_batch(&batch).unwrap();
//! codec::encode(&grid, "random_output_256.png").unwrap();
//!
//! let salts = SaltExtractor::with_policy(DecodePolicy::Permissive)
//!     .extract_all("random_output_256.png")
//!     .unwrap();
//! salt::write_salts(&salts, "salts_256.txt").unwrap();
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod analysis;
pub mod codec;
pub mod error;
pub mod generation;
pub mod pipeline;
pub mod salt;

// Re-export commonly used types at crate root
pub use analysis::BitStatistics;
pub use codec::{CodecError, DecodePolicy, MonochromeGrid};
pub use error::ErrorKind;
pub use generation::{BitString, DigitString, GenerationError, IterationPolicy, RandomBatch};
pub use pipeline::{generate_and_export, PipelineError, RunConfig, RunReport, StageTimings};
pub use salt::{SaltError, SaltExtractor, SaltToken};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
