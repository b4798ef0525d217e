//! The session facade
//!
//! One process-scoped context object created at startup and torn down at
//! exit. It wires the metadata store, ingestion pipeline, playback
//! controller and persistent stores together, and funnels every background
//! notification through [`Session::pump`] so the host applies all state
//! changes on its own thread.

use crate::error::Result;
use crate::events::{RunId, SessionEvent};
use sabrinth_core::{
    AudioBackend, DownloadProvider, DownloadedFile, PlaybackState, SearchHit, SidecarReader,
    TagReader, Track, TrackId, TrackStats,
};
use sabrinth_ingest::{IngestConfig, IngestEvent, IngestHandle, IngestPipeline, TrackSource};
use sabrinth_metadata::{InfoJsonSidecarReader, LoftyTagReader, MetadataStore};
use sabrinth_playback::{PlayerConfig, PlayerController, StatsTracker};
use sabrinth_storage::{AppDirs, PlaylistStore, Settings, StatsStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// One in-flight ingestion run
struct IngestRun {
    id: RunId,
    rx: mpsc::Receiver<IngestEvent>,
    handle: IngestHandle,
}

/// The player session
///
/// Owns every engine component for the lifetime of the process. All methods
/// are called from the host's thread; ingestion workers hand their results
/// over through channels drained by [`Session::pump`].
pub struct Session<B: AudioBackend> {
    dirs: AppDirs,
    settings: Settings,
    store: Arc<MetadataStore>,
    tags: Arc<dyn TagReader>,
    pipeline: IngestPipeline,
    player: PlayerController<B>,
    playlists: PlaylistStore,
    runs: Vec<IngestRun>,
    next_run: u64,
}

impl<B: AudioBackend> Session<B> {
    /// Create a session with the default metadata readers
    pub fn new(backend: B, dirs: AppDirs, settings: Settings) -> Self {
        Self::with_components(
            backend,
            dirs,
            settings,
            Arc::new(LoftyTagReader::new()),
            Arc::new(InfoJsonSidecarReader::new()),
        )
    }

    /// Create a session with explicit metadata readers
    pub fn with_components(
        backend: B,
        dirs: AppDirs,
        settings: Settings,
        tags: Arc<dyn TagReader>,
        sidecars: Arc<dyn SidecarReader>,
    ) -> Self {
        let store = Arc::new(MetadataStore::new());
        let ingest_config = IngestConfig {
            hydration_timeout: Duration::from_secs(settings.hydration_timeout_secs),
            ..IngestConfig::default()
        };
        let pipeline = IngestPipeline::new(store.clone(), tags.clone(), sidecars, ingest_config);

        let stats = StatsTracker::new(StatsStore::open(dirs.stats_path()));
        let player_config = PlayerConfig {
            wrap: settings.wrap,
            played_threshold: settings.played_threshold,
            max_auto_skip: settings.max_auto_skip,
            initial_volume: settings.default_volume,
            auto_volume: sabrinth_playback::AutoVolumeConfig {
                enabled: settings.auto_adjust_enabled,
                ..sabrinth_playback::AutoVolumeConfig::default()
            },
            ..PlayerConfig::default()
        };
        let player = PlayerController::new(backend, stats, player_config);

        let playlists = PlaylistStore::open(dirs.playlists_path());

        Self {
            dirs,
            settings,
            store,
            tags,
            pipeline,
            player,
            playlists,
            runs: Vec::new(),
            next_run: 0,
        }
    }

    /// The playback controller
    pub fn player(&self) -> &PlayerController<B> {
        &self.player
    }

    /// Mutable access to the playback controller (transport commands)
    pub fn player_mut(&mut self) -> &mut PlayerController<B> {
        &mut self.player
    }

    /// The shared metadata store
    pub fn store(&self) -> &Arc<MetadataStore> {
        &self.store
    }

    /// Current settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Persist the current settings
    pub fn save_settings(&self) -> Result<()> {
        self.settings.save(&self.dirs.settings_path())?;
        Ok(())
    }

    // === Loading ===

    /// Import a folder into the queue
    ///
    /// Appends the folder's audio files to the queue as they are discovered;
    /// anything already queued stays put.
    pub fn import_folder(&mut self, path: impl Into<PathBuf>) -> RunId {
        let source = TrackSource::Folder {
            path: path.into(),
            recursive: self.settings.recursive_scan,
        };
        self.spawn_run(source)
    }

    /// Extract a zip archive into the staging area and load its audio
    pub fn import_zip(&mut self, archive: impl Into<PathBuf>) -> Result<RunId> {
        let source = TrackSource::Zip {
            archive: archive.into(),
            imports_dir: self.dirs.imports_dir()?,
        };
        Ok(self.spawn_run(source))
    }

    /// Load files produced by a download operation, in manifest order
    pub fn import_download(&mut self, files: Vec<DownloadedFile>) -> RunId {
        self.spawn_run(TrackSource::Download { files })
    }

    /// Search a remote catalog through a download provider
    pub async fn search_remote(
        &self,
        provider: &dyn DownloadProvider,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchHit>> {
        Ok(provider.search(query, limit).await?)
    }

    /// Download remote audio and load the resulting files into the queue
    ///
    /// The provider writes into the session's downloads directory; the
    /// manifest it returns is ingested like any other download, sidecars
    /// included.
    pub async fn download_and_import(
        &mut self,
        provider: &dyn DownloadProvider,
        url: &str,
    ) -> Result<RunId> {
        let dest = self.dirs.downloads_dir()?;
        let files = provider.download(url, &dest).await?;
        Ok(self.import_download(files))
    }

    /// Load a saved playlist into the queue, replacing its contents
    ///
    /// Loading is the one source that replaces rather than appends: the
    /// queue becomes the playlist. Entries whose track can no longer be
    /// resolved surface as unreadable entries rather than vanishing.
    pub fn load_saved_playlist(&mut self, name: &str) -> Result<RunId> {
        let entries = self.playlists.load(name)?;
        self.player.replace_queue(Vec::new());
        Ok(self.spawn_run(TrackSource::SavedPlaylist { entries }))
    }

    /// Request cancellation of a running ingest
    pub fn cancel_run(&mut self, id: RunId) -> bool {
        match self.runs.iter().find(|r| r.id == id) {
            Some(run) => {
                run.handle.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Whether any ingestion run is still in flight
    pub fn has_active_runs(&self) -> bool {
        !self.runs.is_empty()
    }

    fn spawn_run(&mut self, source: TrackSource) -> RunId {
        let (rx, handle) = self.pipeline.run(source);
        self.next_run += 1;
        let id = RunId(self.next_run);
        info!(%id, "ingestion run started");
        self.runs.push(IngestRun { id, rx, handle });
        id
    }

    // === Event pumping ===

    /// Drain all pending background events, without blocking
    ///
    /// Ingestion results are applied to the queue here, on the caller's
    /// thread; backend completions and the loudness adaptation clock are
    /// serviced in the same pass. Returns the batch of user-facing events.
    pub fn pump(&mut self) -> Vec<SessionEvent> {
        let mut out = Vec::new();

        let mut i = 0;
        while i < self.runs.len() {
            let run_id = self.runs[i].id;
            let mut done = false;
            loop {
                match self.runs[i].rx.try_recv() {
                    Ok(event) => {
                        self.apply_ingest(&event);
                        if matches!(
                            event,
                            IngestEvent::Finished { .. } | IngestEvent::Failed { .. }
                        ) {
                            done = true;
                        }
                        out.push(SessionEvent::Ingest { run: run_id, event });
                    }
                    Err(mpsc::error::TryRecvError::Empty) => break,
                    Err(mpsc::error::TryRecvError::Disconnected) => {
                        done = true;
                        break;
                    }
                }
            }
            if done {
                info!(%run_id, "ingestion run finished");
                self.runs.remove(i);
            } else {
                i += 1;
            }
        }

        self.player.poll_backend();
        self.player.tick_auto_volume(Instant::now());
        out.extend(self.player.take_events().into_iter().map(SessionEvent::Player));
        out
    }

    /// Pump until every ingestion run has finished
    ///
    /// Convenience for hosts without their own polling loop.
    pub async fn pump_until_settled(&mut self) -> Vec<SessionEvent> {
        let mut out = self.pump();
        while self.has_active_runs() {
            tokio::time::sleep(Duration::from_millis(5)).await;
            out.extend(self.pump());
        }
        out
    }

    fn apply_ingest(&mut self, event: &IngestEvent) {
        match event {
            IngestEvent::TrackDiscovered { track } => {
                self.player.enqueue(track.clone());
            }
            IngestEvent::TrackHydrated { track } | IngestEvent::TrackFailed { track, .. } => {
                self.player.refresh_track(track);
            }
            IngestEvent::Finished { summary } => {
                if summary.discovered == 0 {
                    return;
                }
                if self.settings.shuffle_on_load {
                    self.player.shuffle(None);
                }
                if self.settings.autoplay_on_load
                    && self.player.state() == PlaybackState::Idle
                    && !self.player.queue().is_empty()
                {
                    if let Err(e) = self.player.play() {
                        warn!(error = %e, "autoplay after load failed");
                    }
                }
            }
            IngestEvent::Failed { reason } => {
                warn!(reason = %reason, "ingestion run aborted");
            }
            IngestEvent::EntryFailed { .. } | IngestEvent::Progress { .. } => {}
        }
    }

    // === Playlists ===

    /// Snapshot the current queue under a name
    ///
    /// Returns the normalized name the playlist was stored under.
    pub fn save_playlist(&mut self, name: &str) -> Result<String> {
        let ids = self
            .player
            .queue()
            .entries()
            .iter()
            .map(|t| t.id.clone())
            .collect();
        Ok(self.playlists.save(name, ids)?)
    }

    /// Delete a saved playlist; absent names are not an error
    pub fn delete_playlist(&mut self, name: &str) -> Result<bool> {
        Ok(self.playlists.delete(name)?)
    }

    /// All saved playlist names, sorted
    pub fn playlists(&self) -> Vec<String> {
        self.playlists.names()
    }

    // === Queries ===

    /// Case-insensitive search over the queue; returns matching indices
    pub fn search_queue(&self, text: &str) -> Vec<usize> {
        self.player.search(text)
    }

    /// Play statistics for a track
    pub fn stats_for(&self, id: &TrackId) -> TrackStats {
        self.player.stats_for(id)
    }

    /// Re-read a track's embedded tags and refresh the queue
    pub fn refresh_metadata(&mut self, id: &TrackId) -> Result<Track> {
        let track = self.store.refresh(id, self.tags.as_ref())?;
        self.player.refresh_track(&track);
        Ok(track)
    }
}
