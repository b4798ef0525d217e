//! Pipeline orchestration - enumeration, placeholder insertion, hydration

use crate::{
    CancelToken, IngestConfig, IngestError, IngestEvent, IngestSummary, RawCandidate, Result,
    TrackSource,
};
use sabrinth_core::{SidecarReader, TagReader, Track, TrackId};
use sabrinth_metadata::MetadataStore;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Handle to a running ingestion
pub struct IngestHandle {
    /// Cancels the run before its next candidate
    pub cancel: CancelToken,
    /// Resolves to the final summary
    pub task: tokio::task::JoinHandle<Result<IngestSummary>>,
}

/// The ingestion pipeline
///
/// Owns the shared metadata store and the extraction seams. Each call to
/// [`IngestPipeline::run`] spawns an independent background worker; multiple
/// runs may be in flight at once and interleave freely in the store.
pub struct IngestPipeline {
    store: Arc<MetadataStore>,
    tags: Arc<dyn TagReader>,
    sidecars: Arc<dyn SidecarReader>,
    config: IngestConfig,
}

impl IngestPipeline {
    /// Create a pipeline
    pub fn new(
        store: Arc<MetadataStore>,
        tags: Arc<dyn TagReader>,
        sidecars: Arc<dyn SidecarReader>,
        config: IngestConfig,
    ) -> Self {
        Self {
            store,
            tags,
            sidecars,
            config,
        }
    }

    /// Shared metadata store
    pub fn store(&self) -> &Arc<MetadataStore> {
        &self.store
    }

    /// Start ingesting a source
    ///
    /// Returns a channel of progress events and a handle carrying the cancel
    /// token and the final summary.
    pub fn run(&self, source: TrackSource) -> (mpsc::Receiver<IngestEvent>, IngestHandle) {
        let (tx, rx) = mpsc::channel(self.config.channel_capacity);
        let cancel = CancelToken::new();

        let worker = Worker {
            store: self.store.clone(),
            tags: self.tags.clone(),
            sidecars: self.sidecars.clone(),
            config: self.config.clone(),
            cancel: cancel.clone(),
            tx,
        };
        let task = tokio::spawn(worker.run(source));

        (rx, IngestHandle { cancel, task })
    }
}

struct Worker {
    store: Arc<MetadataStore>,
    tags: Arc<dyn TagReader>,
    sidecars: Arc<dyn SidecarReader>,
    config: IngestConfig,
    cancel: CancelToken,
    tx: mpsc::Sender<IngestEvent>,
}

impl Worker {
    /// Drive a run to completion, reporting a fatal error exactly once
    ///
    /// Per-entry problems are folded into the summary; an error escaping
    /// `execute` means the source itself was unusable, so the terminal event
    /// is `Failed` instead of `Finished`.
    async fn run(self, source: TrackSource) -> Result<IngestSummary> {
        match self.execute(source).await {
            Ok(summary) => Ok(summary),
            Err(e) => {
                warn!(error = %e, "ingest run aborted");
                let _ = self
                    .tx
                    .send(IngestEvent::Failed {
                        reason: e.to_string(),
                    })
                    .await;
                Err(e)
            }
        }
    }

    async fn execute(&self, source: TrackSource) -> Result<IngestSummary> {
        let start = Instant::now();

        // Enumeration touches the filesystem (and may extract an archive),
        // so it runs on the blocking pool
        let enumeration = {
            let store = self.store.clone();
            let tx = self.tx.clone();
            tokio::task::spawn_blocking(move || {
                let mut on_extract = |done: usize, total: usize| {
                    let _ = tx.blocking_send(IngestEvent::Progress {
                        processed: done,
                        total,
                        current: None,
                    });
                };
                source.enumerate(&store, &mut on_extract)
            })
            .await
            .map_err(|e| IngestError::Worker(e.to_string()))??
        };

        let total = enumeration.candidates.len();
        info!(candidates = total, "ingest run starting");

        let mut summary = IngestSummary::default();
        let mut processed = 0usize;
        for candidate in enumeration.candidates {
            if self.cancel.is_cancelled() {
                summary.cancelled = true;
                info!("ingest run cancelled");
                break;
            }
            processed += 1;

            let current = match candidate {
                Ok(candidate) => {
                    let path = candidate.path.clone();
                    self.ingest_candidate(candidate, &mut summary).await?;
                    Some(path)
                }
                Err(e) => {
                    let (path, reason) = match e {
                        IngestError::Entry { path, reason } => (path, reason),
                        other => (std::path::PathBuf::new(), other.to_string()),
                    };
                    warn!(entry = %path.display(), reason = %reason, "unreadable entry");
                    summary.entry_errors.push((path.clone(), reason.clone()));
                    let _ = self.tx.send(IngestEvent::EntryFailed { path, reason }).await;
                    None
                }
            };

            if processed == 1 || processed % self.config.progress_every == 0 || processed == total
            {
                let _ = self
                    .tx
                    .send(IngestEvent::Progress {
                        processed,
                        total,
                        current,
                    })
                    .await;
            }
        }

        summary.duration_seconds = start.elapsed().as_secs();
        info!("{}", summary.summary_text());
        let _ = self
            .tx
            .send(IngestEvent::Finished {
                summary: summary.clone(),
            })
            .await;
        Ok(summary)
    }

    /// Register the placeholder, then hydrate it
    async fn ingest_candidate(
        &self,
        candidate: RawCandidate,
        summary: &mut IngestSummary,
    ) -> Result<()> {
        let placeholder = self
            .store
            .insert_pending(Track::pending(candidate.path.clone(), candidate.origin));
        let id = placeholder.id.clone();
        summary.discovered += 1;
        let _ = self
            .tx
            .send(IngestEvent::TrackDiscovered { track: placeholder })
            .await;

        match self.hydrate(&id, &candidate).await? {
            Hydration::Succeeded(track) => {
                summary.hydrated += 1;
                let _ = self.tx.send(IngestEvent::TrackHydrated { track }).await;
            }
            Hydration::Failed { track, reason } => {
                summary.failed += 1;
                let _ = self
                    .tx
                    .send(IngestEvent::TrackFailed { track, reason })
                    .await;
            }
        }
        Ok(())
    }

    /// Run the metadata fallback chain: embedded tags, then sidecar
    async fn hydrate(&self, id: &TrackId, candidate: &RawCandidate) -> Result<Hydration> {
        let tag_failure = match self.read_tags_with_timeout(candidate).await {
            Ok(metadata) if !metadata.is_empty() => {
                let track = self.store.put_or_merge(id, &metadata)?;
                return Ok(Hydration::Succeeded(track));
            }
            Ok(_) => "no embedded tags".to_string(),
            Err(reason) => reason,
        };
        debug!(track = %id, reason = %tag_failure, "tag read failed, trying sidecar");

        let sidecar_result = {
            let sidecars = self.sidecars.clone();
            let candidate = candidate.clone();
            tokio::task::spawn_blocking(move || match &candidate.sidecar {
                Some(doc) => sidecars.read_document(doc).map(Some),
                None => sidecars.read_sidecar(&candidate.path),
            })
            .await
            .map_err(|e| IngestError::Worker(e.to_string()))?
        };

        match sidecar_result {
            Ok(Some(metadata)) if !metadata.is_empty() => {
                let track = self.store.put_or_merge(id, &metadata)?;
                Ok(Hydration::Succeeded(track))
            }
            Ok(_) => {
                let track = self.store.mark_failed(id)?;
                Ok(Hydration::Failed {
                    track,
                    reason: tag_failure,
                })
            }
            Err(e) => {
                let track = self.store.mark_failed(id)?;
                Ok(Hydration::Failed {
                    track,
                    reason: format!("{tag_failure}; sidecar: {e}"),
                })
            }
        }
    }

    async fn read_tags_with_timeout(
        &self,
        candidate: &RawCandidate,
    ) -> std::result::Result<sabrinth_core::TrackMetadata, String> {
        let tags = self.tags.clone();
        let path = candidate.path.clone();
        let read = tokio::task::spawn_blocking(move || tags.read_tags(&path));
        match tokio::time::timeout(self.config.hydration_timeout, read).await {
            Ok(Ok(Ok(metadata))) => Ok(metadata),
            Ok(Ok(Err(e))) => Err(e.to_string()),
            Ok(Err(join)) => Err(format!("tag reader panicked: {join}")),
            Err(_) => Err(format!(
                "tag read timed out after {:?}",
                self.config.hydration_timeout
            )),
        }
    }
}

enum Hydration {
    Succeeded(Track),
    Failed { track: Track, reason: String },
}
