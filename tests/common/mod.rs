//! In-memory video source shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;

use tubehabit::adapters::{ContentStream, VideoSource};
use tubehabit::domain::{Target, VideoId};

/// What the content stream of a video yields
#[derive(Clone)]
enum Content {
    Complete(Vec<Vec<u8>>),
    BreaksAfter(Vec<Vec<u8>>, String),
    StallsAfter(Vec<Vec<u8>>),
}

/// Fake platform: pages and streams are registered up front
#[derive(Default)]
pub struct FakeSource {
    listings: HashMap<String, String>,
    watch_pages: HashMap<String, String>,
    contents: HashMap<String, Content>,
    hanging_watch_pages: HashSet<String>,
    watch_delay: Duration,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    listing_requests: Mutex<Vec<String>>,
    content_requests: Mutex<Vec<String>>,
}

/// Counts a watch page request as in flight until dropped, cancellation included
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize, peak: &AtomicUsize) -> Self {
        let now = counter.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Listing markup carrying the given ids inside `ytInitialData`
pub fn listing_markup(ids: &[&str]) -> String {
    let items: Vec<String> = ids
        .iter()
        .map(|id| format!(r#"{{"richItemRenderer":{{"content":{{"videoRenderer":{{"videoId":"{}"}}}}}}}}"#, id))
        .collect();

    format!(
        "<html><script>var ytInitialData = {{\"contents\":[{}]}};</script></html>",
        items.join(",")
    )
}

/// Watch page markup with a playable player response
pub fn watch_markup(title: &str, upload_date: &str) -> String {
    format!(
        r#"<script>var ytInitialPlayerResponse = {{"playabilityStatus":{{"status":"OK"}},"videoDetails":{{"title":"{}"}},"microformat":{{"playerMicroformatRenderer":{{"uploadDate":"{}"}}}}}};</script>"#,
        title, upload_date
    )
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listing(mut self, target_id: &str, ids: &[&str]) -> Self {
        self.listings.insert(target_id.to_string(), listing_markup(ids));
        self
    }

    pub fn with_raw_listing(mut self, target_id: &str, markup: &str) -> Self {
        self.listings.insert(target_id.to_string(), markup.to_string());
        self
    }

    /// A resolvable video whose content arrives in one chunk
    pub fn with_video(mut self, id: &str, title: &str, upload_date: &str, content: &[u8]) -> Self {
        self.watch_pages
            .insert(id.to_string(), watch_markup(title, upload_date));
        self.contents
            .insert(id.to_string(), Content::Complete(vec![content.to_vec()]));
        self
    }

    /// A resolvable video whose stream fails after `sent` bytes
    pub fn with_broken_video(mut self, id: &str, title: &str, upload_date: &str, sent: &[u8]) -> Self {
        self.watch_pages
            .insert(id.to_string(), watch_markup(title, upload_date));
        self.contents.insert(
            id.to_string(),
            Content::BreaksAfter(vec![sent.to_vec()], "connection reset".to_string()),
        );
        self
    }

    /// A video whose stream sends `sent` and then never yields again
    pub fn with_stalled_video(mut self, id: &str, title: &str, upload_date: &str, sent: &[u8]) -> Self {
        self.watch_pages
            .insert(id.to_string(), watch_markup(title, upload_date));
        self.contents
            .insert(id.to_string(), Content::StallsAfter(vec![sent.to_vec()]));
        self
    }

    /// A video whose watch page request never completes
    pub fn with_hanging_watch_page(mut self, id: &str) -> Self {
        self.hanging_watch_pages.insert(id.to_string());
        self
    }

    /// Every watch page request takes at least this long
    pub fn with_watch_delay(mut self, delay: Duration) -> Self {
        self.watch_delay = delay;
        self
    }

    /// Most watch page requests that were ever in flight at once
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    pub fn listing_requests(&self) -> Vec<String> {
        self.listing_requests.lock().unwrap().clone()
    }

    pub fn content_requests(&self) -> Vec<String> {
        self.content_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl VideoSource for FakeSource {
    fn name(&self) -> &str {
        "fake"
    }

    async fn listing_page(&self, target: &Target) -> Result<String> {
        self.listing_requests
            .lock()
            .unwrap()
            .push(target.id().to_string());

        match self.listings.get(target.id()) {
            Some(markup) => Ok(markup.clone()),
            None => anyhow::bail!("404 Not Found"),
        }
    }

    async fn watch_page(&self, video_id: &VideoId) -> Result<String> {
        let _in_flight = InFlight::enter(&self.in_flight, &self.peak_in_flight);

        if self.hanging_watch_pages.contains(video_id.as_str()) {
            futures::future::pending::<()>().await;
        }
        if !self.watch_delay.is_zero() {
            tokio::time::sleep(self.watch_delay).await;
        }

        match self.watch_pages.get(video_id.as_str()) {
            Some(markup) => Ok(markup.clone()),
            None => anyhow::bail!("404 Not Found"),
        }
    }

    async fn content_stream(&self, video_id: &VideoId) -> Result<ContentStream> {
        self.content_requests
            .lock()
            .unwrap()
            .push(video_id.to_string());

        let content = match self.contents.get(video_id.as_str()) {
            Some(content) => content.clone(),
            None => anyhow::bail!("no such video"),
        };

        let to_bytes = |chunks: Vec<Vec<u8>>| {
            chunks
                .into_iter()
                .map(|c| Ok::<_, anyhow::Error>(Bytes::from(c)))
        };

        let stream: ContentStream = match content {
            Content::Complete(chunks) => futures::stream::iter(to_bytes(chunks)).boxed(),
            Content::BreaksAfter(chunks, reason) => {
                let items: Vec<Result<Bytes>> = to_bytes(chunks)
                    .chain(std::iter::once(Err(anyhow::anyhow!(reason))))
                    .collect();
                futures::stream::iter(items).boxed()
            }
            Content::StallsAfter(chunks) => futures::stream::iter(to_bytes(chunks))
                .chain(futures::stream::pending())
                .boxed(),
        };

        Ok(stream)
    }
}
