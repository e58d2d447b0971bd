//! tubehabit - keep a local copy of what your channels publish
//!
//! Discovers videos on channels, playlists or single video pages, resolves
//! their details, filters them by upload date and streams the accepted ones
//! into an output directory.
//!
//! # Architecture
//!
//! The output directory is the only state:
//! - A file under a video's final name means that video is done
//! - Content is written to a hidden temp file and renamed into place
//! - Re-running a window skips everything already stored
//!
//! # Modules
//!
//! - `adapters`: Platform access (YouTube over HTTPS)
//! - `core`: Extractor, Resolver, Filter, Orchestrator, Storage, Progress
//! - `domain`: Data structures (VideoDetail, Target, AcquisitionResult)
//! - `config`: Config file discovery, date window, channel file
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Yesterday's uploads of every channel in ./channels.json
//! tubehabit
//!
//! # A date window into a custom directory
//! tubehabit -f 2024-01-01 -t 2024-01-10 -o ~/videos
//!
//! # A whole playlist, numbered in playlist order
//! tubehabit -p PLxxxxxxxx
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use config::{FetchSettings, RunConfig};
pub use core::{Orchestrator, StorageWriter};
pub use domain::{AcquisitionResult, DateRange, ExitStatus, RunSummary, Target, VideoDetail, VideoId};

pub use adapters::{VideoSource, YouTubeClient};
