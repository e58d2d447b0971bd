//! Acquisition orchestrator.
//!
//! Coordinates identifier discovery, detail resolution, filtering and
//! selection across targets. Targets are handled one at a time; within a
//! target, resolution fans out through the resolver's bounded pool.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::adapters::VideoSource;
use crate::config::FetchSettings;
use crate::domain::{AcquisitionResult, DateRange, Target, VideoDetail, VideoId};

use super::extractor::{DiscoveryError, IdentifierExtractor};
use super::filter::{apply_ordinal_rename, drop_unresolved, filter_by_date, Selector};
use super::resolver::DetailResolver;

/// What a run should acquire
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionRequest {
    /// One video, no listing page involved
    Video(VideoId),

    /// Every video in a playlist, numbered in playlist order
    Playlist(String),

    /// Recent uploads of each channel inside a date window
    Channels {
        channels: Vec<String>,
        range: DateRange,
    },
}

impl AcquisitionRequest {
    /// Choose the request by precedence: video, then playlist, then channels
    pub fn from_overrides(
        video_id: Option<String>,
        playlist_id: Option<String>,
        channels: Vec<String>,
        range: DateRange,
    ) -> Self {
        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        if let Some(video_id) = non_empty(video_id) {
            AcquisitionRequest::Video(VideoId::new(video_id))
        } else if let Some(playlist_id) = non_empty(playlist_id) {
            AcquisitionRequest::Playlist(playlist_id)
        } else {
            AcquisitionRequest::Channels { channels, range }
        }
    }

    /// Targets in processing order
    pub fn targets(&self) -> Vec<Target> {
        match self {
            AcquisitionRequest::Video(id) => vec![Target::Video(id.clone())],
            AcquisitionRequest::Playlist(id) => vec![Target::Playlist(id.clone())],
            AcquisitionRequest::Channels { channels, .. } => {
                channels.iter().cloned().map(Target::Channel).collect()
            }
        }
    }

    /// Date window, only present in channel-batch mode
    pub fn range(&self) -> Option<&DateRange> {
        match self {
            AcquisitionRequest::Channels { range, .. } => Some(range),
            _ => None,
        }
    }
}

/// Main acquisition orchestrator
pub struct Orchestrator {
    source_name: String,
    extractor: IdentifierExtractor,
    resolver: DetailResolver,
}

impl Orchestrator {
    /// Create an orchestrator over a video source
    pub fn new(source: Arc<dyn VideoSource>, settings: &FetchSettings) -> Self {
        Self {
            source_name: source.name().to_string(),
            extractor: IdentifierExtractor::new(Arc::clone(&source)),
            resolver: DetailResolver::new(source, settings.concurrency, settings.request_timeout()),
        }
    }

    /// Acquire accepted videos for every target of the request.
    ///
    /// Discovery failures never abort the run: the target is recorded as
    /// failed and treated as empty.
    #[instrument(skip_all)]
    pub async fn acquire(
        &self,
        request: &AcquisitionRequest,
        selector: &dyn Selector,
    ) -> AcquisitionResult {
        let targets = request.targets();
        let total = targets.len();
        let mut result = AcquisitionResult::new();

        if let Some(range) = request.range() {
            debug!(from = %range.from, to = %range.to, "Date window");
        }
        info!("Fetching video ids for {} target(s) from {}", total, self.source_name);

        for (idx, target) in targets.into_iter().enumerate() {
            let label = format!("[({}/{}){}]", idx + 1, total, target);

            let accepted = match self.acquire_target(&target, request.range()).await {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!(error = %e, "{} discovery failed, skipping", label);
                    result.record_discovery_failure(target, e.to_string());
                    continue;
                }
            };

            let accepted = if accepted.is_empty() {
                accepted
            } else {
                selector.select(&target, accepted)
            };

            info!("{} fetched {} video(s)", label, accepted.len());
            result.insert(target, accepted);
        }

        result
    }

    /// Discover, resolve and filter a single target
    async fn acquire_target(
        &self,
        target: &Target,
        range: Option<&DateRange>,
    ) -> Result<Vec<VideoDetail>, DiscoveryError> {
        let video_ids = match target {
            Target::Video(id) => vec![id.clone()],
            Target::Channel(_) | Target::Playlist(_) => self.extractor.extract(target).await?,
        };
        debug!(listing = %target, count = video_ids.len(), "Resolving details");

        let resolved = drop_unresolved(self.resolver.resolve_all(&video_ids).await);
        debug!(
            listing = %target,
            resolved = resolved.len(),
            dropped = video_ids.len() - resolved.len(),
            "Resolution finished"
        );

        let accepted = if target.is_ordered() {
            apply_ordinal_rename(resolved)
        } else if let Some(range) = range {
            filter_by_date(resolved, range)
        } else {
            resolved
        };

        Ok(accepted)
    }
}
