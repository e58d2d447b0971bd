//! Filtering, ordering and selection over resolved details.
//!
//! Everything here is pure except [`Selector`], which lets an interactive
//! front end narrow the accepted set.

use crate::domain::{DateRange, Target, VideoDetail, VideoId};

use super::resolver::Resolution;

/// Drop failed resolutions, keeping the order of the rest
pub fn drop_unresolved(resolutions: Vec<(VideoId, Resolution)>) -> Vec<VideoDetail> {
    resolutions
        .into_iter()
        .filter_map(|(_, resolution)| resolution.ok())
        .collect()
}

/// Keep videos uploaded inside the window (`from` exclusive, `to` inclusive)
pub fn filter_by_date(details: Vec<VideoDetail>, range: &DateRange) -> Vec<VideoDetail> {
    details
        .into_iter()
        .filter(|detail| range.contains(detail.upload_date))
        .collect()
}

/// Prefix each title with its 1-based position: `"<n> - <title>"`
pub fn apply_ordinal_rename(mut details: Vec<VideoDetail>) -> Vec<VideoDetail> {
    for (index, detail) in details.iter_mut().enumerate() {
        detail.title = format!("{} - {}", index + 1, detail.title);
    }
    details
}

/// Final say over which accepted videos of a target get downloaded
pub trait Selector: Send + Sync {
    fn select(&self, target: &Target, candidates: Vec<VideoDetail>) -> Vec<VideoDetail>;
}

/// Batch mode: everything that survived filtering is accepted
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAll;

impl Selector for AcceptAll {
    fn select(&self, _target: &Target, candidates: Vec<VideoDetail>) -> Vec<VideoDetail> {
        candidates
    }
}
