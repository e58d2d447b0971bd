//! Acquisition and storage pipeline.
//!
//! This module contains:
//! - Extractor: video identifiers from listing pages
//! - Resolver: per-video details with explicit failures
//! - Filter: date window, ordinal rename, selection
//! - Orchestrator: drives the above across targets
//! - Storage: idempotent writes into the output directory
//! - Progress: observers of the storage phase

pub mod extractor;
pub mod filter;
pub mod naming;
pub mod orchestrator;
pub mod progress;
pub mod resolver;
pub mod storage;

// Re-export commonly used types
pub use extractor::{DiscoveryError, IdentifierExtractor};
pub use filter::{AcceptAll, Selector};
pub use naming::{file_name_for, sanitize_filename, VIDEO_EXTENSION};
pub use orchestrator::{AcquisitionRequest, Orchestrator};
pub use progress::{ConsoleReporter, Position, ProgressReporter, RecordingReporter};
pub use resolver::{DetailError, DetailResolver, Resolution};
pub use storage::{StorageError, StorageWriter};
