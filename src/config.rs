//! Configuration for tubehabit runs.
//!
//! Configuration sources (highest priority first):
//! 1. Command-line flags
//! 2. Environment variables (TUBEHABIT_CHANNELS, TUBEHABIT_OUTPUT_DIR)
//! 3. Config file (.tubehabit/config.yaml)
//! 4. Defaults (./channels.json, ./outputs)
//!
//! Config file discovery:
//! - Searches current directory and parents for .tubehabit/config.yaml,
//!   then falls back to ~/.tubehabit/config.yaml
//! - Paths in config file are relative to the directory holding .tubehabit/
//!
//! Flags and environment are handled by clap in the CLI; this module
//! resolves the file and defaults, then everything is folded into one
//! [`RunConfig`] that is passed explicitly to the pipeline.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::domain::DateRange;

/// Default channel list location
pub const DEFAULT_CHANNEL_FILE: &str = "./channels.json";

/// Default output directory
pub const DEFAULT_OUTPUT_DIR: &str = "./outputs";

/// Local hour every date flag is pinned to
pub const STANDARD_HOUR: u32 = 7;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors in user-supplied configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid date '{0}' (expected yyyy-mm-dd)")]
    InvalidDate(String),

    #[error("Date window is empty: from {from} is after to {to}")]
    EmptyRange { from: String, to: String },

    #[error("Failed to read channel file {path}: {source}")]
    ChannelFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Channel file {path} is not a JSON array of channels: {source}")]
    ChannelFileFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub fetch: Option<FetchConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Channel list (relative to the project root)
    pub channels: Option<String>,
    /// Output directory (relative to the project root)
    pub output_dir: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    pub concurrency: Option<usize>,
    pub timeout_seconds: Option<u64>,
    pub chunk_timeout_seconds: Option<u64>,
    pub user_agent: Option<String>,
}

/// Network behaviour shared by the resolver and the storage writer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    /// Maximum concurrent detail requests per target
    pub concurrency: usize,
    /// Per-request timeout in seconds
    pub request_timeout_seconds: u64,
    /// Maximum wait for the next media chunk in seconds
    pub chunk_timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            concurrency: 8,
            request_timeout_seconds: 30,
            chunk_timeout_seconds: 60,
            user_agent: format!("tubehabit/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl FetchSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn chunk_timeout(&self) -> Duration {
        Duration::from_secs(self.chunk_timeout_seconds)
    }

    fn merge(mut self, file: Option<&FetchConfig>) -> Self {
        if let Some(file) = file {
            if let Some(concurrency) = file.concurrency {
                self.concurrency = concurrency.max(1);
            }
            if let Some(seconds) = file.timeout_seconds {
                self.request_timeout_seconds = seconds;
            }
            if let Some(seconds) = file.chunk_timeout_seconds {
                self.chunk_timeout_seconds = seconds;
            }
            if let Some(ref agent) = file.user_agent {
                self.user_agent = agent.clone();
            }
        }
        self
    }
}

/// File-and-default layer of the configuration
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub channel_file: PathBuf,
    pub output_dir: PathBuf,
    pub fetch: FetchSettings,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            channel_file: PathBuf::from(DEFAULT_CHANNEL_FILE),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            fetch: FetchSettings::default(),
            config_file: None,
        }
    }
}

/// Everything a run needs, built once and passed down explicitly
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub channel_file: PathBuf,
    pub output_dir: PathBuf,
    pub range: DateRange,
    pub playlist_id: Option<String>,
    pub video_id: Option<String>,
    /// Only channels tagged with this category
    pub category: Option<String>,
    pub fetch: FetchSettings,
}

impl RunConfig {
    /// Whether a playlist or video override replaces the channel list
    pub fn has_designated_target(&self) -> bool {
        let set = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        set(&self.playlist_id) || set(&self.video_id)
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".tubehabit").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    let home_config = dirs::home_dir()?.join(".tubehabit").join("config.yaml");
    home_config.exists().then_some(home_config)
}

/// Load and parse config file
pub fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the project root
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

/// Apply a parsed config file found at `config_path` on top of the defaults
pub fn resolve_config(config_path: &Path, file: &ConfigFile) -> ResolvedConfig {
    // Project root is the parent of .tubehabit/
    let base_dir = config_path
        .parent()
        .and_then(|p| p.parent())
        .unwrap_or(Path::new("."));

    let defaults = ResolvedConfig::default();

    ResolvedConfig {
        channel_file: file
            .paths
            .channels
            .as_deref()
            .map(|p| resolve_path(base_dir, p))
            .unwrap_or(defaults.channel_file),
        output_dir: file
            .paths
            .output_dir
            .as_deref()
            .map(|p| resolve_path(base_dir, p))
            .unwrap_or(defaults.output_dir),
        fetch: defaults.fetch.merge(file.fetch.as_ref()),
        config_file: Some(config_path.to_path_buf()),
    }
}

/// Load the file-and-default layer
pub fn load_config() -> Result<ResolvedConfig> {
    match find_config_file() {
        Some(path) => {
            let file = load_config_file(&path)?;
            Ok(resolve_config(&path, &file))
        }
        None => Ok(ResolvedConfig::default()),
    }
}

/// Parse a `yyyy-mm-dd` flag value
pub fn parse_date(value: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| ConfigError::InvalidDate(value.to_string()))
}

/// Pin a calendar date to the standard local hour
pub fn at_standard_time(date: NaiveDate) -> DateTime<Utc> {
    let time = NaiveTime::from_hms_opt(STANDARD_HOUR, 0, 0).unwrap_or_default();
    let naive = date.and_time(time);

    match Local.from_local_datetime(&naive).earliest() {
        Some(local) => local.with_timezone(&Utc),
        None => naive.and_utc(),
    }
}

/// Build the date window from optional flag values; defaults are
/// yesterday..today relative to `today`
pub fn date_range(
    from: Option<&str>,
    to: Option<&str>,
    today: NaiveDate,
) -> Result<DateRange, ConfigError> {
    fn non_empty(value: Option<&str>) -> Option<&str> {
        value.map(str::trim).filter(|s| !s.is_empty())
    }

    let from_date = match non_empty(from) {
        Some(value) => parse_date(value)?,
        None => today.pred_opt().unwrap_or(today),
    };
    let to_date = match non_empty(to) {
        Some(value) => parse_date(value)?,
        None => today,
    };

    if from_date > to_date {
        return Err(ConfigError::EmptyRange {
            from: from_date.format(DATE_FORMAT).to_string(),
            to: to_date.format(DATE_FORMAT).to_string(),
        });
    }

    Ok(DateRange::new(
        at_standard_time(from_date),
        at_standard_time(to_date),
    ))
}

/// One entry of the channel file: a bare id or an id with categories
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ChannelEntry {
    Id(String),
    Tagged {
        id: String,
        #[serde(default)]
        types: Vec<String>,
    },
}

impl ChannelEntry {
    pub fn id(&self) -> &str {
        match self {
            ChannelEntry::Id(id) | ChannelEntry::Tagged { id, .. } => id,
        }
    }

    /// Case-insensitive category match; untagged entries match nothing
    pub fn has_type(&self, category: &str) -> bool {
        match self {
            ChannelEntry::Id(_) => false,
            ChannelEntry::Tagged { types, .. } => types.iter().any(|t| t.eq_ignore_ascii_case(category)),
        }
    }
}

/// Parse channel file content, optionally keeping only one category
pub fn parse_channels(
    path: &Path,
    content: &str,
    category: Option<&str>,
) -> Result<Vec<String>, ConfigError> {
    let entries: Vec<ChannelEntry> =
        serde_json::from_str(content).map_err(|source| ConfigError::ChannelFileFormat {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(entries
        .into_iter()
        .filter(|entry| category.map_or(true, |c| entry.has_type(c)))
        .map(|entry| entry.id().trim().to_string())
        .filter(|id| !id.is_empty())
        .collect())
}

/// Read the channel file from disk
pub fn load_channels(path: &Path, category: Option<&str>) -> Result<Vec<String>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ChannelFileRead {
        path: path.to_path_buf(),
        source,
    })?;

    parse_channels(path, &content, category)
}
