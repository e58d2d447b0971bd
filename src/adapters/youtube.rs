//! YouTube adapter over plain HTTPS.
//!
//! Listing and watch pages are fetched as HTML; media is streamed from the
//! progressive format URL found in the watch page's player response.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};

use super::markup::{PlayerResponse, PROGRESSIVE_ITAG};
use super::{ContentStream, VideoSource};
use crate::domain::{Target, VideoId};

/// Default site root
pub const DEFAULT_BASE_URL: &str = "https://www.youtube.com";

/// YouTube client backed by reqwest
pub struct YouTubeClient {
    /// Site root, without trailing slash
    base_url: String,
    /// HTTP client
    client: reqwest::Client,
}

impl YouTubeClient {
    /// Create a new client
    ///
    /// `connect_timeout` bounds connection setup only; whole-request limits
    /// are applied by callers since media streams may run for minutes.
    pub fn new(user_agent: &str, connect_timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .connect_timeout(connect_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            client,
        })
    }

    /// Point the client at a different site root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Build the listing URL for a target (single videos have none)
    fn listing_url(&self, target: &Target) -> Option<String> {
        match target {
            Target::Channel(channel) => Some(format!(
                "{}/{}/videos",
                self.base_url,
                channel.trim_matches('/')
            )),
            Target::Playlist(playlist_id) => {
                Some(format!("{}/playlist?list={}", self.base_url, playlist_id))
            }
            Target::Video(_) => None,
        }
    }

    /// Build the watch URL for a video
    fn watch_url(&self, video_id: &VideoId) -> String {
        format!("{}/watch?v={}", self.base_url, video_id)
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?
            .error_for_status()
            .with_context(|| format!("Request to {} was rejected", url))?;

        response
            .text()
            .await
            .with_context(|| format!("Failed to read body of {}", url))
    }
}

#[async_trait]
impl VideoSource for YouTubeClient {
    fn name(&self) -> &str {
        "youtube"
    }

    async fn listing_page(&self, target: &Target) -> Result<String> {
        let url = self
            .listing_url(target)
            .with_context(|| format!("Target '{}' has no listing page", target))?;
        self.get_text(&url).await
    }

    async fn watch_page(&self, video_id: &VideoId) -> Result<String> {
        self.get_text(&self.watch_url(video_id)).await
    }

    async fn content_stream(&self, video_id: &VideoId) -> Result<ContentStream> {
        let page = self.watch_page(video_id).await?;
        let player = PlayerResponse::from_watch_page(&page)
            .with_context(|| format!("No player response for {}", video_id))?;

        if let Some(reason) = player.unplayable_reason() {
            anyhow::bail!("Video {} is not playable: {}", video_id, reason);
        }

        let format = player
            .format(PROGRESSIVE_ITAG)
            .with_context(|| format!("Video {} has no itag {} format", video_id, PROGRESSIVE_ITAG))?;

        let media_url = match (&format.url, &format.signature_cipher) {
            (Some(url), _) => url.clone(),
            (None, Some(_)) => anyhow::bail!(
                "Video {} only offers a ciphered itag {} URL",
                video_id,
                PROGRESSIVE_ITAG
            ),
            (None, None) => anyhow::bail!("Video {} has an empty itag {} format", video_id, PROGRESSIVE_ITAG),
        };

        let response = self
            .client
            .get(&media_url)
            .send()
            .await
            .with_context(|| format!("Failed to open media stream for {}", video_id))?
            .error_for_status()
            .with_context(|| format!("Media stream for {} was rejected", video_id))?;

        Ok(response.bytes_stream().map_err(anyhow::Error::from).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> YouTubeClient {
        YouTubeClient::new("tubehabit-test", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_listing_urls() {
        let client = client();
        assert_eq!(
            client.listing_url(&Target::Channel("@someone".into())).unwrap(),
            "https://www.youtube.com/@someone/videos"
        );
        assert_eq!(
            client.listing_url(&Target::Playlist("PL123".into())).unwrap(),
            "https://www.youtube.com/playlist?list=PL123"
        );
        assert!(client.listing_url(&Target::Video("abc".into())).is_none());
    }

    #[test]
    fn test_custom_base_url() {
        let client = client().with_base_url("http://localhost:8080/");
        assert_eq!(
            client.watch_url(&VideoId::new("abc")),
            "http://localhost:8080/watch?v=abc"
        );
    }

    #[test]
    fn test_adapter_name() {
        assert_eq!(client().name(), "youtube");
    }
}
