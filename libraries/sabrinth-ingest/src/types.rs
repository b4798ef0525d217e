//! Common types for the ingestion pipeline

use sabrinth_core::Track;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Configuration for ingestion runs
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Upper bound on a single track's metadata extraction
    pub hydration_timeout: Duration,

    /// How often progress events are emitted, in processed candidates
    pub progress_every: usize,

    /// Buffer size of the event channel handed to the caller
    pub channel_capacity: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            hydration_timeout: Duration::from_secs(7),
            progress_every: 25,
            channel_capacity: 100,
        }
    }
}

/// Cooperative cancellation flag shared with a running ingest
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a fresh token
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    ///
    /// The worker stops before its next candidate; the track it is working
    /// on finishes normally.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Progress events streamed during an ingestion run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum IngestEvent {
    /// A candidate was registered as a pending placeholder
    TrackDiscovered {
        /// The placeholder record
        track: Track,
    },
    /// A track's metadata extraction finished successfully
    TrackHydrated {
        /// The updated record
        track: Track,
    },
    /// Every metadata source failed; the record keeps filename metadata
    TrackFailed {
        /// The record, marked failed
        track: Track,
        /// Why hydration failed
        reason: String,
    },
    /// A source entry could not even be read
    EntryFailed {
        /// Entry the error belongs to
        path: PathBuf,
        /// Human-readable failure description
        reason: String,
    },
    /// Periodic progress marker
    Progress {
        /// Candidates processed so far
        processed: usize,
        /// Total candidates known
        total: usize,
        /// Candidate currently being worked on
        current: Option<PathBuf>,
    },
    /// The run finished (completed, failed over, or cancelled)
    Finished {
        /// Final tally
        summary: IngestSummary,
    },
    /// The run aborted before it could finish
    ///
    /// Sent exactly once, instead of `Finished`, when the source itself is
    /// unusable (missing folder, unreadable archive).
    Failed {
        /// Why the run aborted
        reason: String,
    },
}

/// Summary of an ingestion run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestSummary {
    /// Candidates registered in the store
    pub discovered: usize,

    /// Tracks whose metadata extraction succeeded
    pub hydrated: usize,

    /// Tracks left with filename metadata only
    pub failed: usize,

    /// Entries that could not be read at all
    pub entry_errors: Vec<(PathBuf, String)>,

    /// Whether the run was cancelled before finishing
    pub cancelled: bool,

    /// Duration of the run
    pub duration_seconds: u64,
}

impl IngestSummary {
    /// One-line human-readable summary
    pub fn summary_text(&self) -> String {
        format!(
            "Ingest complete: {} discovered, {} hydrated, {} failed, {} unreadable{}",
            self.discovered,
            self.hydrated,
            self.failed,
            self.entry_errors.len(),
            if self.cancelled { " (cancelled)" } else { "" }
        )
    }
}
