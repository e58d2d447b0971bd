//! Adapter interfaces for the video platform.
//!
//! Adapters are the only code that performs network I/O. The core talks to
//! them through [`VideoSource`], which keeps extraction, resolution and
//! storage testable against in-memory fakes.

pub mod markup;
pub mod youtube;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::domain::{Target, VideoId};

// Re-export the YouTube adapter
pub use youtube::YouTubeClient;

/// Stream of media chunks for one video
pub type ContentStream = BoxStream<'static, Result<Bytes>>;

/// Trait for video platforms
#[async_trait]
pub trait VideoSource: Send + Sync {
    /// Human-readable adapter name
    fn name(&self) -> &str;

    /// Fetch the raw markup of a channel or playlist listing page
    async fn listing_page(&self, target: &Target) -> Result<String>;

    /// Fetch the raw markup of a video's watch page
    async fn watch_page(&self, video_id: &VideoId) -> Result<String>;

    /// Open the media byte stream for a video
    async fn content_stream(&self, video_id: &VideoId) -> Result<ContentStream>;
}
