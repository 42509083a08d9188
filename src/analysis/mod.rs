//! Quality statistics for generated batches.
//!
//! The numbers are reported alongside a run as sanity checks. They
//! never gate output.

mod statistics;

pub use statistics::BitStatistics;
