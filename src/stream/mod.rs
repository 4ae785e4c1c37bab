// src/stream/mod.rs

//! Measurement stream reading: frame synchronization and the bounded
//! acquisition loop that drives it.

pub mod acquisition;
pub mod reader;

pub use acquisition::{AcquisitionPlan, RunSummary, StopReason};
pub use reader::{ScanState, StreamReader};

/// What an iteration slot does when its frame is dropped.
///
/// The instrument sends exactly `points × cycles` frames, but nothing in its
/// documentation says a dropped frame is never resent, so both behaviours are
/// offered.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "snake_case"))]
pub enum IterationPolicy {
    /// The slot is consumed anyway; a bad frame means one sample fewer.
    #[default]
    DropAndAdvance,
    /// The slot is kept and the read re-attempted.
    DropAndRetry,
}
