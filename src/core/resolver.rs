//! Per-video metadata resolution.
//!
//! Resolution failures are routine: deleted, private and age-restricted
//! videos all show up in listings. Every failure is returned as a
//! [`DetailError`] so callers decide explicitly what to drop.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use futures::stream::{self, StreamExt};
use thiserror::Error;
use tokio::time::timeout;
use tracing::debug;

use crate::adapters::markup::{MarkupError, PlayerResponse};
use crate::adapters::VideoSource;
use crate::domain::{VideoDetail, VideoId};

/// Why a video's details could not be resolved
#[derive(Debug, Error)]
pub enum DetailError {
    #[error("Failed to fetch watch page: {0}")]
    Fetch(String),

    #[error("Watch page request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Unreadable player response: {0}")]
    Payload(#[from] MarkupError),

    #[error("Video is not playable: {0}")]
    Unplayable(String),

    #[error("Player response has no {0}")]
    MissingField(&'static str),

    #[error("Unrecognized upload date '{0}'")]
    InvalidDate(String),
}

/// Outcome of resolving one video
pub type Resolution = Result<VideoDetail, DetailError>;

/// Resolves video details through a bounded pool of concurrent requests
pub struct DetailResolver {
    source: Arc<dyn VideoSource>,
    /// Maximum in-flight requests
    concurrency: usize,
    /// Limit for each watch page request
    request_timeout: Duration,
}

impl DetailResolver {
    pub fn new(source: Arc<dyn VideoSource>, concurrency: usize, request_timeout: Duration) -> Self {
        Self {
            source,
            concurrency: concurrency.max(1),
            request_timeout,
        }
    }

    /// Resolve a single video
    pub async fn resolve(&self, video_id: &VideoId) -> Resolution {
        let page = match timeout(self.request_timeout, self.source.watch_page(video_id)).await {
            Err(_) => return Err(DetailError::Timeout(self.request_timeout)),
            Ok(Err(e)) => return Err(DetailError::Fetch(format!("{:#}", e))),
            Ok(Ok(page)) => page,
        };

        detail_from_watch_page(video_id, &page)
    }

    /// Resolve many videos concurrently, returning results in input order.
    ///
    /// Completes only once every request has settled.
    pub async fn resolve_all(&self, video_ids: &[VideoId]) -> Vec<(VideoId, Resolution)> {
        stream::iter(video_ids.iter().cloned())
            .map(|video_id| async move {
                let resolution = self.resolve(&video_id).await;
                if let Err(ref e) = resolution {
                    debug!(%video_id, error = %e, "Could not resolve video");
                }
                (video_id, resolution)
            })
            .buffered(self.concurrency)
            .collect()
            .await
    }
}

/// Build a video detail from watch page markup
pub fn detail_from_watch_page(video_id: &VideoId, markup: &str) -> Resolution {
    let player = PlayerResponse::from_watch_page(markup)?;

    if let Some(reason) = player.unplayable_reason() {
        return Err(DetailError::Unplayable(reason));
    }

    let title = player
        .title()
        .ok_or(DetailError::MissingField("title"))?
        .to_string();
    let raw_date = player
        .upload_date()
        .ok_or(DetailError::MissingField("upload date"))?;
    let upload_date =
        parse_upload_date(raw_date).ok_or_else(|| DetailError::InvalidDate(raw_date.to_string()))?;

    Ok(VideoDetail {
        video_id: video_id.clone(),
        title,
        upload_date,
    })
}

/// Parse an upload date given either as RFC 3339 or as a bare `yyyy-mm-dd`
/// (taken as UTC midnight)
pub fn parse_upload_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
