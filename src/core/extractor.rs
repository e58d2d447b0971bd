//! Video identifier discovery from listing pages.
//!
//! Channel and playlist pages embed their contents in the `ytInitialData`
//! payload. The payload layout is undocumented and changes between site
//! revisions, so rather than following a fixed path the whole tree is walked
//! and every `videoId` string is collected.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::adapters::markup::{embedded_json, MarkupError, INITIAL_DATA_MARKER};
use crate::adapters::VideoSource;
use crate::domain::{Target, VideoId};

/// Key under which identifiers appear in the listing payload
const VIDEO_ID_KEY: &str = "videoId";

/// Reasons a target's listing could not be discovered
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Failed to fetch listing for '{target}': {reason}")]
    Fetch { target: String, reason: String },

    #[error("Listing for '{target}' has no embedded data (page layout changed?)")]
    MarkerNotFound { target: String },

    #[error("Listing for '{target}' has an unreadable payload: {source}")]
    MalformedPayload {
        target: String,
        #[source]
        source: MarkupError,
    },
}

/// Extracts unique video identifiers from a target's listing page
pub struct IdentifierExtractor {
    source: Arc<dyn VideoSource>,
}

impl IdentifierExtractor {
    pub fn new(source: Arc<dyn VideoSource>) -> Self {
        Self { source }
    }

    /// Fetch the listing page and return its identifiers in first-seen order
    #[instrument(skip_all, fields(listing = %target))]
    pub async fn extract(&self, target: &Target) -> Result<Vec<VideoId>, DiscoveryError> {
        let markup = self
            .source
            .listing_page(target)
            .await
            .map_err(|e| DiscoveryError::Fetch {
                target: target.to_string(),
                reason: format!("{:#}", e),
            })?;

        let ids = ids_from_markup(&markup).map_err(|e| match e {
            MarkupError::MarkerNotFound(_) => DiscoveryError::MarkerNotFound {
                target: target.to_string(),
            },
            other => DiscoveryError::MalformedPayload {
                target: target.to_string(),
                source: other,
            },
        })?;

        debug!(count = ids.len(), "Extracted video ids");
        Ok(ids)
    }
}

/// Parse the listing payload out of raw markup and collect its identifiers
pub fn ids_from_markup(markup: &str) -> Result<Vec<VideoId>, MarkupError> {
    let payload = embedded_json(markup, INITIAL_DATA_MARKER)?;
    Ok(collect_video_ids(&payload))
}

/// Walk a payload depth-first and collect every `videoId` string, deduplicated
pub fn collect_video_ids(payload: &Value) -> Vec<VideoId> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    walk(payload, &mut seen, &mut ids);
    ids
}

fn walk(value: &Value, seen: &mut HashSet<String>, ids: &mut Vec<VideoId>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if key == VIDEO_ID_KEY {
                    if let Value::String(id) = child {
                        if !id.is_empty() && seen.insert(id.clone()) {
                            ids.push(VideoId::new(id.clone()));
                        }
                        continue;
                    }
                }
                walk(child, seen, ids);
            }
        }
        Value::Array(items) => {
            for item in items {
                walk(item, seen, ids);
            }
        }
        _ => {}
    }
}
