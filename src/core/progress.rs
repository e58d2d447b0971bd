//! Progress reporting for the storage phase.
//!
//! Reporters only observe; nothing they do feeds back into control flow.

use std::sync::Mutex;

use tracing::debug;

use crate::domain::{RunSummary, StoreOutcome, StoreResult, Target, VideoDetail};

/// Position of an item inside its enclosing list (1-based index)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub index: usize,
    pub total: usize,
}

impl Position {
    pub fn new(index: usize, total: usize) -> Self {
        Self { index, total }
    }
}

/// Observer of per-target and per-video storage progress
pub trait ProgressReporter: Send + Sync {
    fn target_started(&self, position: Position, target: &Target, videos: usize);

    fn video_finished(
        &self,
        position: Position,
        target: &Target,
        video: Position,
        detail: &VideoDetail,
        result: &StoreResult,
    );

    fn target_finished(&self, position: Position, target: &Target, stored: usize, videos: usize);

    fn run_finished(&self, summary: &RunSummary);
}

/// `[(i/n)<target>]`
pub fn target_label(position: Position, target: &Target) -> String {
    format!("[({}/{}){}]", position.index, position.total, target)
}

pub fn target_started_line(position: Position, target: &Target, videos: usize) -> String {
    format!("{}: fetching {} videos...", target_label(position, target), videos)
}

pub fn video_line(
    position: Position,
    target: &Target,
    video: Position,
    detail: &VideoDetail,
    result: &StoreResult,
) -> String {
    let label = target_label(position, target);
    let display = format!("({}/{}) {}", video.index, video.total, result.filename);

    match &result.outcome {
        StoreOutcome::Stored { .. } => format!("{}: completed {}", label, display),
        StoreOutcome::Skipped => format!("{}: skipped {}", label, display),
        StoreOutcome::Failed { reason } => {
            format!("{}: failed {}({}) - {}", label, display, detail.video_id, reason)
        }
    }
}

pub fn target_finished_line(position: Position, target: &Target, stored: usize, videos: usize) -> String {
    format!(
        "{}: completed {}/{} videos",
        target_label(position, target),
        stored,
        videos
    )
}

pub fn run_finished_line(summary: &RunSummary) -> String {
    format!(
        "Finished. completed {} videos for all targets ({} skipped, {} failed)",
        summary.stored, summary.skipped, summary.failed
    )
}

/// Prints status lines to stdout
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn target_started(&self, position: Position, target: &Target, videos: usize) {
        println!("{}", target_started_line(position, target, videos));
    }

    fn video_finished(
        &self,
        position: Position,
        target: &Target,
        video: Position,
        detail: &VideoDetail,
        result: &StoreResult,
    ) {
        debug!(video_id = %detail.video_id, path = %result.path.display(), "Video finished");
        println!("{}", video_line(position, target, video, detail, result));
    }

    fn target_finished(&self, position: Position, target: &Target, stored: usize, videos: usize) {
        println!("{}", target_finished_line(position, target, stored, videos));
    }

    fn run_finished(&self, summary: &RunSummary) {
        println!("{}", run_finished_line(summary));
        if summary.discovery_failures > 0 {
            println!("{} target(s) could not be discovered", summary.discovery_failures);
        }
    }
}

/// Keeps every line in memory instead of printing it
#[derive(Debug, Default)]
pub struct RecordingReporter {
    lines: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    fn push(&self, line: String) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line);
        }
    }
}

impl ProgressReporter for RecordingReporter {
    fn target_started(&self, position: Position, target: &Target, videos: usize) {
        self.push(target_started_line(position, target, videos));
    }

    fn video_finished(
        &self,
        position: Position,
        target: &Target,
        video: Position,
        detail: &VideoDetail,
        result: &StoreResult,
    ) {
        self.push(video_line(position, target, video, detail, result));
    }

    fn target_finished(&self, position: Position, target: &Target, stored: usize, videos: usize) {
        self.push(target_finished_line(position, target, stored, videos));
    }

    fn run_finished(&self, summary: &RunSummary) {
        self.push(run_finished_line(summary));
    }
}
