//! Command-line interface for tubehabit.
//!
//! Flags and environment are parsed by clap, folded together with the
//! config file into one [`RunConfig`], and handed to [`run`].

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use tracing::{debug, info, warn};

use crate::adapters::{VideoSource, YouTubeClient};
use crate::config::{self, FetchSettings, ResolvedConfig, RunConfig};
use crate::core::{AcceptAll, AcquisitionRequest, ConsoleReporter, Orchestrator, ProgressReporter, Selector, StorageWriter};
use crate::domain::{ExitStatus, RunSummary};

pub mod prompt;

/// tubehabit - download recent uploads of the channels you follow
#[derive(Parser, Debug)]
#[command(name = "tubehabit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// JSON array of channel ids
    #[arg(short = 'c', long = "channel-filepath", env = "TUBEHABIT_CHANNELS")]
    pub channel_filepath: Option<PathBuf>,

    /// Oldest upload date, exclusive (yyyy-mm-dd, default yesterday)
    #[arg(short = 'f', long)]
    pub from_date: Option<String>,

    /// Newest upload date, inclusive (yyyy-mm-dd, default today)
    #[arg(short = 't', long)]
    pub to_date: Option<String>,

    /// Where videos are stored (created if absent)
    #[arg(short = 'o', long, env = "TUBEHABIT_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Prompt for inputs and for which videos to download
    #[arg(short = 'i', long)]
    pub interactive: bool,

    /// Download a whole playlist instead of the channel list
    #[arg(short = 'p', long, conflicts_with = "video_id")]
    pub playlist_id: Option<String>,

    /// Download a single video instead of the channel list
    #[arg(short = 'v', long)]
    pub video_id: Option<String>,

    /// Only channels tagged with this category
    #[arg(long)]
    pub category: Option<String>,

    /// Concurrent detail requests per target
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// The values the interactive flow may change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunInputs {
    pub channel_file: PathBuf,
    pub output_dir: PathBuf,
    pub from_date: String,
    pub to_date: String,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<ExitStatus> {
        let resolved = config::load_config()?;
        if let Some(ref path) = resolved.config_file {
            debug!(path = %path.display(), "Using config file");
        }

        let today = Local::now().date_naive();
        let mut inputs = self.inputs(&resolved, today);

        if self.is_prompted() {
            let stdin = std::io::stdin();
            let mut input = stdin.lock();
            let mut output = std::io::stdout();
            inputs = prompt::prompt_inputs(&mut input, &mut output, inputs)?;
        }

        let run_config = self.run_config(inputs, resolved.fetch, today)?;

        let selector: Box<dyn Selector> = if self.is_prompted() {
            Box::new(prompt::InteractiveSelector::stdio())
        } else {
            Box::new(AcceptAll)
        };

        let client = YouTubeClient::new(&run_config.fetch.user_agent, run_config.fetch.request_timeout())?;
        let source: Arc<dyn VideoSource> = Arc::new(client);

        let summary = run(source, &run_config, selector.as_ref(), &ConsoleReporter).await?;
        Ok(summary.exit_status())
    }

    /// Interactive mode only applies to channel runs; a playlist or video
    /// id skips every prompt
    fn is_prompted(&self) -> bool {
        let set = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        self.interactive && !set(&self.playlist_id) && !set(&self.video_id)
    }

    /// Flag and environment values layered over the config file
    fn inputs(&self, resolved: &ResolvedConfig, today: NaiveDate) -> RunInputs {
        let yesterday = today.pred_opt().unwrap_or(today);

        RunInputs {
            channel_file: self
                .channel_filepath
                .clone()
                .unwrap_or_else(|| resolved.channel_file.clone()),
            output_dir: self
                .output_dir
                .clone()
                .unwrap_or_else(|| resolved.output_dir.clone()),
            from_date: self
                .from_date
                .clone()
                .unwrap_or_else(|| yesterday.format("%Y-%m-%d").to_string()),
            to_date: self
                .to_date
                .clone()
                .unwrap_or_else(|| today.format("%Y-%m-%d").to_string()),
        }
    }

    fn run_config(&self, inputs: RunInputs, fetch: FetchSettings, today: NaiveDate) -> Result<RunConfig> {
        let range = config::date_range(Some(&inputs.from_date), Some(&inputs.to_date), today)?;

        let mut fetch = fetch;
        if let Some(concurrency) = self.concurrency {
            fetch.concurrency = concurrency.max(1);
        }
        if let Some(timeout) = self.timeout {
            fetch.request_timeout_seconds = timeout;
        }

        Ok(RunConfig {
            channel_file: inputs.channel_file,
            output_dir: inputs.output_dir,
            range,
            playlist_id: self.playlist_id.clone(),
            video_id: self.video_id.clone(),
            category: self.category.clone(),
            fetch,
        })
    }
}

/// Acquire and store everything a run asks for.
///
/// Errors returned here are fatal; per-target and per-video failures end
/// up in the summary instead.
pub async fn run(
    source: Arc<dyn VideoSource>,
    config: &RunConfig,
    selector: &dyn Selector,
    reporter: &dyn ProgressReporter,
) -> Result<RunSummary> {
    let channels = if config.has_designated_target() {
        Vec::new()
    } else {
        let channels = config::load_channels(&config.channel_file, config.category.as_deref())?;
        if channels.is_empty() {
            warn!(path = %config.channel_file.display(), "Channel file lists no channels");
        }
        channels
    };

    let request = AcquisitionRequest::from_overrides(
        config.video_id.clone(),
        config.playlist_id.clone(),
        channels,
        config.range,
    );

    let writer = StorageWriter::new(Arc::clone(&source), &config.output_dir, &config.fetch);
    writer
        .ensure_output_dir()
        .await
        .with_context(|| format!("Failed to create output directory: {}", config.output_dir.display()))?;

    let orchestrator = Orchestrator::new(source, &config.fetch);
    let acquired = orchestrator.acquire(&request, selector).await;
    info!(
        "Acquired {} video(s) across {} target(s)",
        acquired.video_count(),
        acquired.len()
    );

    Ok(writer.store_all(&acquired, reporter).await)
}
