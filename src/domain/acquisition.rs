//! Output of the acquisition phase.

use super::video::{Target, VideoDetail};

/// Accepted videos per target, in processing order.
///
/// Targets that ended up with no accepted videos are never stored here.
#[derive(Debug, Clone, Default)]
pub struct AcquisitionResult {
    entries: Vec<(Target, Vec<VideoDetail>)>,

    /// Targets whose listing could not be discovered, with the reason
    pub discovery_failures: Vec<(Target, String)>,
}

impl AcquisitionResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the accepted videos for a target; empty lists are dropped
    pub fn insert(&mut self, target: Target, videos: Vec<VideoDetail>) {
        if videos.is_empty() {
            return;
        }

        match self.entries.iter_mut().find(|(t, _)| *t == target) {
            Some((_, existing)) => *existing = videos,
            None => self.entries.push((target, videos)),
        }
    }

    pub fn record_discovery_failure(&mut self, target: Target, reason: impl Into<String>) {
        self.discovery_failures.push((target, reason.into()));
    }

    pub fn get(&self, target: &Target) -> Option<&[VideoDetail]> {
        self.entries
            .iter()
            .find(|(t, _)| t == target)
            .map(|(_, videos)| videos.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Target, &[VideoDetail])> {
        self.entries.iter().map(|(t, v)| (t, v.as_slice()))
    }

    /// Number of targets with at least one accepted video
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total accepted videos across all targets
    pub fn video_count(&self) -> usize {
        self.entries.iter().map(|(_, v)| v.len()).sum()
    }
}
