//! Per-video storage outcomes and the run-level summary.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Terminal state of one storage attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StoreOutcome {
    /// Content streamed and renamed onto its final name
    Stored { bytes: u64 },

    /// A file with the final name already existed
    Skipped,

    /// Streaming failed; nothing was left behind
    Failed { reason: String },
}

/// Result of storing a single video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreResult {
    /// Final file name (sanitized title + extension)
    pub filename: String,

    /// Full path of the final file
    pub path: PathBuf,

    pub outcome: StoreOutcome,
}

impl StoreResult {
    pub fn is_stored(&self) -> bool {
        matches!(self.outcome, StoreOutcome::Stored { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.outcome, StoreOutcome::Skipped)
    }

    /// Failure reason, if the attempt failed
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            StoreOutcome::Failed { reason } => Some(reason),
            _ => None,
        }
    }
}

/// Process exit status for a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Every video was stored or already present
    Success,

    /// The run finished but some targets or videos failed
    CompletedWithFailures,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::CompletedWithFailures => 2,
        }
    }
}

/// Aggregate counts for a whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub stored: usize,
    pub skipped: usize,
    pub failed: usize,

    /// Targets whose listing could not be discovered
    pub discovery_failures: usize,
}

impl RunSummary {
    /// Count one storage result
    pub fn record(&mut self, result: &StoreResult) {
        match result.outcome {
            StoreOutcome::Stored { .. } => self.stored += 1,
            StoreOutcome::Skipped => self.skipped += 1,
            StoreOutcome::Failed { .. } => self.failed += 1,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.discovery_failures > 0
    }

    pub fn exit_status(&self) -> ExitStatus {
        if self.has_failures() {
            ExitStatus::CompletedWithFailures
        } else {
            ExitStatus::Success
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(outcome: StoreOutcome) -> StoreResult {
        StoreResult {
            filename: "a.mp4".to_string(),
            path: PathBuf::from("/tmp/a.mp4"),
            outcome,
        }
    }

    #[test]
    fn test_store_result_accessors() {
        let stored = result(StoreOutcome::Stored { bytes: 10 });
        assert!(stored.is_stored());
        assert!(!stored.is_skipped());
        assert_eq!(stored.error(), None);

        let failed = result(StoreOutcome::Failed {
            reason: "connection reset".to_string(),
        });
        assert!(!failed.is_stored());
        assert_eq!(failed.error(), Some("connection reset"));
    }

    #[test]
    fn test_summary_exit_status() {
        let mut summary = RunSummary::default();
        summary.record(&result(StoreOutcome::Stored { bytes: 1 }));
        summary.record(&result(StoreOutcome::Skipped));
        assert_eq!(summary.exit_status(), ExitStatus::Success);
        assert_eq!(summary.exit_status().code(), 0);

        summary.record(&result(StoreOutcome::Failed {
            reason: "boom".to_string(),
        }));
        assert_eq!(summary.stored, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.exit_status().code(), 2);
    }

    #[test]
    fn test_discovery_failure_counts_as_failure() {
        let summary = RunSummary {
            discovery_failures: 1,
            ..Default::default()
        };
        assert_eq!(summary.exit_status(), ExitStatus::CompletedWithFailures);
    }
}
