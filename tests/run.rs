//! End-to-end Run Tests
//!
//! A whole run from channel file to output directory, repeated to check
//! that the directory listing alone makes reruns safe.

mod common;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use common::FakeSource;
use tempfile::TempDir;
use tubehabit::cli::run;
use tubehabit::config::{FetchSettings, RunConfig};
use tubehabit::core::{AcceptAll, RecordingReporter};
use tubehabit::domain::{DateRange, ExitStatus};

fn config(channel_file: PathBuf, output_dir: PathBuf) -> RunConfig {
    RunConfig {
        channel_file,
        output_dir,
        range: DateRange::new(
            Utc.with_ymd_and_hms(2024, 1, 9, 7, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 10, 7, 0, 0).unwrap(),
        ),
        playlist_id: None,
        video_id: None,
        category: None,
        fetch: FetchSettings::default(),
    }
}

fn source() -> Arc<FakeSource> {
    Arc::new(
        FakeSource::new()
            .with_listing("@music", &["m1"])
            .with_video("m1", "New single", "2024-01-09T18:00:00+00:00", b"song")
            .with_listing("@news", &["n1"])
            .with_video("n1", "Evening news", "2024-01-09T20:00:00+00:00", b"news"),
    )
}

fn write_channels(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("channels.json");
    std::fs::write(
        &path,
        r#"[{"id": "@music", "types": ["Music"]}, "@news", "@missing"]"#,
    )
    .unwrap();
    path
}

#[tokio::test]
async fn test_rerun_skips_everything() {
    let temp = TempDir::new().unwrap();
    let output_dir = temp.path().join("outputs");
    let config = config(write_channels(&temp), output_dir.clone());

    let first = run(source(), &config, &AcceptAll, &RecordingReporter::new())
        .await
        .unwrap();
    assert_eq!(first.stored, 2);
    assert_eq!(first.discovery_failures, 1);
    assert_eq!(first.exit_status(), ExitStatus::CompletedWithFailures);
    assert_eq!(std::fs::read(output_dir.join("New single.mp4")).unwrap(), b"song");

    let reporter = RecordingReporter::new();
    let second = run(source(), &config, &AcceptAll, &reporter).await.unwrap();
    assert_eq!(second.stored, 0);
    assert_eq!(second.skipped, 2);
    assert!(reporter
        .lines()
        .contains(&"[(1/2)@music]: skipped (1/1) New single.mp4".to_string()));
}

#[tokio::test]
async fn test_category_limits_channels() {
    let temp = TempDir::new().unwrap();
    let config = RunConfig {
        category: Some("music".into()),
        ..config(write_channels(&temp), temp.path().join("outputs"))
    };

    let summary = run(source(), &config, &AcceptAll, &RecordingReporter::new())
        .await
        .unwrap();

    assert_eq!(summary.stored, 1);
    assert_eq!(summary.discovery_failures, 0);
    assert_eq!(summary.exit_status(), ExitStatus::Success);
}

#[tokio::test]
async fn test_video_mode_ignores_channel_file() {
    let temp = TempDir::new().unwrap();
    let config = RunConfig {
        video_id: Some("n1".into()),
        ..config(temp.path().join("does-not-exist.json"), temp.path().join("outputs"))
    };

    let summary = run(source(), &config, &AcceptAll, &RecordingReporter::new())
        .await
        .unwrap();

    assert_eq!(summary.stored, 1);
    assert!(temp.path().join("outputs").join("1 - Evening news.mp4").exists());
}

#[tokio::test]
async fn test_missing_channel_file_is_fatal() {
    let temp = TempDir::new().unwrap();
    let config = config(temp.path().join("nope.json"), temp.path().join("outputs"));

    let result = run(source(), &config, &AcceptAll, &RecordingReporter::new()).await;

    assert!(result.is_err());
}
