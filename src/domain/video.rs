//! Videos, targets and the date window used to select them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Platform-unique video identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VideoId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for VideoId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Resolved metadata for a single video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoDetail {
    /// Video identifier
    pub video_id: VideoId,

    /// Display title (playlist mode prefixes it with the position)
    pub title: String,

    /// When the video was uploaded
    pub upload_date: DateTime<Utc>,
}

impl VideoDetail {
    pub fn new(video_id: impl Into<VideoId>, title: impl Into<String>, upload_date: DateTime<Utc>) -> Self {
        Self {
            video_id: video_id.into(),
            title: title.into(),
            upload_date,
        }
    }
}

/// Something selected for acquisition
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Target {
    /// Channel handle or path, e.g. `@someone` or `channel/UC...`
    Channel(String),

    /// Playlist id (`list=` parameter)
    Playlist(String),

    /// A single video
    Video(VideoId),
}

impl Target {
    /// Identifier as shown in progress output
    pub fn id(&self) -> &str {
        match self {
            Target::Channel(id) | Target::Playlist(id) => id,
            Target::Video(id) => id.as_str(),
        }
    }

    /// Whether accepted titles get an ordinal prefix
    pub fn is_ordered(&self) -> bool {
        matches!(self, Target::Playlist(_) | Target::Video(_))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Upload-date window: `from < upload_date <= to`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl DateRange {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    /// Check whether an upload date falls inside the window
    pub fn contains(&self, upload_date: DateTime<Utc>) -> bool {
        self.to >= upload_date && upload_date > self.from
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_date_range_bounds() {
        let from = Utc.with_ymd_and_hms(2024, 1, 9, 7, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 1, 10, 7, 0, 0).unwrap();
        let range = DateRange::new(from, to);

        assert!(!range.contains(from));
        assert!(range.contains(to));
        assert!(range.contains(Utc.with_ymd_and_hms(2024, 1, 9, 12, 0, 0).unwrap()));
        assert!(!range.contains(from - chrono::Duration::seconds(1)));
        assert!(!range.contains(to + chrono::Duration::seconds(1)));
    }

    #[test]
    fn test_target_ordering_mode() {
        assert!(!Target::Channel("@someone".into()).is_ordered());
        assert!(Target::Playlist("PL123".into()).is_ordered());
        assert!(Target::Video("abc".into()).is_ordered());
    }

    #[test]
    fn test_target_display() {
        assert_eq!(Target::Channel("@someone".into()).to_string(), "@someone");
        assert_eq!(Target::Video(VideoId::new("xyz")).to_string(), "xyz");
    }
}
