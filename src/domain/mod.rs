//! Domain types for tubehabit.
//!
//! This module contains the core data structures:
//! - Video: identifiers, resolved details, targets, date windows
//! - Acquisition: accepted videos grouped per target
//! - Outcome: storage results and the run summary

pub mod acquisition;
pub mod outcome;
pub mod video;

// Re-export commonly used types
pub use acquisition::AcquisitionResult;
pub use outcome::{ExitStatus, RunSummary, StoreOutcome, StoreResult};
pub use video::{DateRange, Target, VideoDetail, VideoId};
