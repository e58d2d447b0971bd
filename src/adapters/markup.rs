//! Structured data embedded in YouTube page markup.
//!
//! Listing and watch pages carry their state as JavaScript assignments,
//! e.g. `var ytInitialData = {...};</script>`. The object literal is valid
//! JSON, so it is parsed as such instead of pattern-matching raw text.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Marker preceding the listing payload on channel and playlist pages
pub const INITIAL_DATA_MARKER: &str = "ytInitialData = ";

/// Marker preceding the player payload on watch pages
pub const PLAYER_RESPONSE_MARKER: &str = "ytInitialPlayerResponse = ";

/// Progressive 360p video with audio
pub const PROGRESSIVE_ITAG: u32 = 18;

/// Errors locating or decoding an embedded payload
#[derive(Debug, Error)]
pub enum MarkupError {
    #[error("Marker '{0}' not found in page")]
    MarkerNotFound(&'static str),

    #[error("Embedded payload is empty")]
    EmptyPayload,

    #[error("Embedded payload is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Parse the first JSON value following `marker`.
///
/// Only the first occurrence of the marker is considered. Anything after the
/// closing brace (the `;</script>` terminator) is ignored.
pub fn embedded_json(markup: &str, marker: &'static str) -> Result<Value, MarkupError> {
    let start = markup
        .find(marker)
        .ok_or(MarkupError::MarkerNotFound(marker))?;
    let rest = &markup[start + marker.len()..];

    serde_json::Deserializer::from_str(rest)
        .into_iter::<Value>()
        .next()
        .ok_or(MarkupError::EmptyPayload)?
        .map_err(MarkupError::from)
}

/// Subset of the watch page player response we rely on
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResponse {
    #[serde(default)]
    pub video_details: Option<PlayerVideoDetails>,
    #[serde(default)]
    pub microformat: Option<Microformat>,
    #[serde(default)]
    pub streaming_data: Option<StreamingData>,
    #[serde(default)]
    pub playability_status: Option<PlayabilityStatus>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerVideoDetails {
    pub video_id: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Microformat {
    pub player_microformat_renderer: Option<MicroformatRenderer>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MicroformatRenderer {
    pub upload_date: Option<String>,
    pub publish_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamingData {
    #[serde(default)]
    pub formats: Vec<StreamFormat>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamFormat {
    pub itag: u32,
    pub url: Option<String>,
    pub signature_cipher: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayabilityStatus {
    pub status: Option<String>,
    pub reason: Option<String>,
}

impl PlayerResponse {
    /// Parse the player response embedded in a watch page
    pub fn from_watch_page(markup: &str) -> Result<Self, MarkupError> {
        let value = embedded_json(markup, PLAYER_RESPONSE_MARKER)?;
        Ok(serde_json::from_value(value)?)
    }

    pub fn title(&self) -> Option<&str> {
        self.video_details.as_ref()?.title.as_deref()
    }

    /// Upload date string, falling back to the publish date
    pub fn upload_date(&self) -> Option<&str> {
        let renderer = self.microformat.as_ref()?.player_microformat_renderer.as_ref()?;
        renderer
            .upload_date
            .as_deref()
            .or(renderer.publish_date.as_deref())
    }

    /// Playability problem reported by the page, if any (`OK` means none)
    pub fn unplayable_reason(&self) -> Option<String> {
        let status = self.playability_status.as_ref()?;
        match status.status.as_deref() {
            None | Some("OK") => None,
            Some(code) => Some(match &status.reason {
                Some(reason) => format!("{}: {}", code, reason),
                None => code.to_string(),
            }),
        }
    }

    pub fn format(&self, itag: u32) -> Option<&StreamFormat> {
        self.streaming_data
            .as_ref()?
            .formats
            .iter()
            .find(|f| f.itag == itag)
    }
}
