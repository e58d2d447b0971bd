//! Idempotent download-to-disk.
//!
//! The output directory is the only durable state: a file under a video's
//! final name means that video is done. Content is streamed into a hidden
//! `.part` sibling and renamed into place only after the stream completes,
//! so a final name never points at partial content.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use thiserror::Error;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

use crate::adapters::VideoSource;
use crate::config::FetchSettings;
use crate::domain::{AcquisitionResult, RunSummary, StoreOutcome, StoreResult, VideoDetail};

use super::naming::{file_name_for, partial_name_for};
use super::progress::{Position, ProgressReporter};

/// Errors that can occur while storing a video
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to open content stream: {0}")]
    Open(String),

    #[error("Opening content stream timed out after {0:?}")]
    OpenTimeout(Duration),

    #[error("Content stream failed after {bytes} bytes: {reason}")]
    Stream { bytes: u64, reason: String },

    #[error("Content stream stalled for {timeout:?} after {bytes} bytes")]
    Stalled { bytes: u64, timeout: Duration },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes videos into the output directory
pub struct StorageWriter {
    source: Arc<dyn VideoSource>,
    output_dir: PathBuf,
    /// Limit for opening a content stream
    request_timeout: Duration,
    /// Longest wait for the next chunk of an open stream
    chunk_timeout: Duration,
}

impl StorageWriter {
    pub fn new(source: Arc<dyn VideoSource>, output_dir: impl Into<PathBuf>, settings: &FetchSettings) -> Self {
        Self {
            source,
            output_dir: output_dir.into(),
            request_timeout: settings.request_timeout(),
            chunk_timeout: settings.chunk_timeout(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Create the output directory if it does not exist
    pub async fn ensure_output_dir(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.output_dir).await?;
        Ok(())
    }

    /// Hidden sibling that receives content while streaming
    pub fn temp_path(&self, filename: &str) -> PathBuf {
        self.output_dir.join(partial_name_for(filename))
    }

    /// Store one video, skipping it if its final file already exists
    #[instrument(skip_all, fields(video_id = %detail.video_id))]
    pub async fn store(&self, detail: &VideoDetail) -> StoreResult {
        let filename = file_name_for(detail);
        let path = self.output_dir.join(&filename);

        if fs::try_exists(&path).await.unwrap_or(false) {
            debug!(path = %path.display(), "Already present, skipping");
            return StoreResult {
                filename,
                path,
                outcome: StoreOutcome::Skipped,
            };
        }

        let outcome = match self.stream_to_disk(detail, &filename, &path).await {
            Ok(bytes) => StoreOutcome::Stored { bytes },
            Err(e) => {
                warn!(video_id = %detail.video_id, error = %e, "Storing video failed");
                StoreOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };

        StoreResult {
            filename,
            path,
            outcome,
        }
    }

    /// Store every accepted video, target by target, one at a time
    pub async fn store_all(&self, result: &AcquisitionResult, reporter: &dyn ProgressReporter) -> RunSummary {
        let mut summary = RunSummary {
            discovery_failures: result.discovery_failures.len(),
            ..Default::default()
        };
        let total_targets = result.len();

        for (target_idx, (target, videos)) in result.iter().enumerate() {
            let position = Position::new(target_idx + 1, total_targets);
            reporter.target_started(position, target, videos.len());

            let mut stored = 0;
            for (video_idx, detail) in videos.iter().enumerate() {
                let outcome = self.store(detail).await;
                if outcome.is_stored() {
                    stored += 1;
                }
                summary.record(&outcome);

                reporter.video_finished(
                    position,
                    target,
                    Position::new(video_idx + 1, videos.len()),
                    detail,
                    &outcome,
                );
            }

            reporter.target_finished(position, target, stored, videos.len());
        }

        reporter.run_finished(&summary);
        summary
    }

    /// Stream into the temp path, then rename onto the final path
    async fn stream_to_disk(
        &self,
        detail: &VideoDetail,
        filename: &str,
        final_path: &Path,
    ) -> Result<u64, StorageError> {
        let temp_path = self.temp_path(filename);

        let written = match self.write_temp(detail, &temp_path).await {
            Ok(bytes) => fs::rename(&temp_path, final_path)
                .await
                .map(|_| bytes)
                .map_err(StorageError::from),
            Err(e) => Err(e),
        };

        if written.is_err() {
            remove_partial(&temp_path).await;
        }

        written
    }

    async fn write_temp(&self, detail: &VideoDetail, temp_path: &Path) -> Result<u64, StorageError> {
        let mut stream = timeout(self.request_timeout, self.source.content_stream(&detail.video_id))
            .await
            .map_err(|_| StorageError::OpenTimeout(self.request_timeout))?
            .map_err(|e| StorageError::Open(format!("{:#}", e)))?;

        // Truncates anything left by a run that was killed mid-stream
        let mut file = File::create(temp_path).await?;
        let mut bytes = 0u64;

        loop {
            let next = timeout(self.chunk_timeout, stream.next())
                .await
                .map_err(|_| StorageError::Stalled {
                    bytes,
                    timeout: self.chunk_timeout,
                })?;

            match next {
                None => break,
                Some(Ok(chunk)) => {
                    file.write_all(&chunk).await?;
                    bytes += chunk.len() as u64;
                }
                Some(Err(e)) => {
                    return Err(StorageError::Stream {
                        bytes,
                        reason: format!("{:#}", e),
                    })
                }
            }
        }

        file.flush().await?;
        file.sync_all().await?;
        debug!(bytes, "Stream complete");

        Ok(bytes)
    }
}

/// Best-effort removal of a partial download
async fn remove_partial(path: &Path) {
    if !fs::try_exists(path).await.unwrap_or(false) {
        return;
    }

    if let Err(e) = fs::remove_file(path).await {
        warn!(path = %path.display(), error = %e, "Failed to remove partial download");
    }
}
