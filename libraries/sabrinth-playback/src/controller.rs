//! Playback controller state machine
//!
//! Drives an [`AudioBackend`] over the [`TrackQueue`]. All methods are
//! synchronous; asynchronous backend completions are folded in through
//! [`PlayerController::poll_backend`], which discards events whose handle no
//! longer matches the active play attempt. Statistics attribution happens on
//! departure from a track: every attempt records exactly one `started`, and
//! exactly one of `played`/`skipped` once the player moves on.

use crate::error::{PlaybackError, Result};
use crate::events::PlayerEvent;
use crate::queue::TrackQueue;
use crate::stats::StatsTracker;
use crate::volume::{AutoVolume, Volume};
use sabrinth_core::{
    AudioBackend, AudioBackendEvent, BackendHandle, PlaybackState, SeekOrigin, Track, TrackId,
    WrapMode,
};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub use crate::volume::AutoVolumeConfig;

/// Controller configuration
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    /// Queue navigation behavior at the ends
    pub wrap: WrapMode,
    /// Advance automatically when a track ends
    pub autoplay: bool,
    /// Fraction of a track that must play before departure counts as played
    pub played_threshold: f32,
    /// Consecutive playback failures tolerated before giving up
    pub max_auto_skip: u32,
    /// Volume level applied at startup (0-100)
    pub initial_volume: u8,
    /// Loudness adaptation settings
    pub auto_volume: AutoVolumeConfig,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            wrap: WrapMode::Loop,
            autoplay: true,
            played_threshold: 0.5,
            max_auto_skip: 3,
            initial_volume: 58,
            auto_volume: AutoVolumeConfig::default(),
        }
    }
}

/// One playback attempt: a single `open` on the backend
///
/// `resolved` flips once the attempt has been attributed to the played or
/// skipped counter; events referencing an older handle are stale.
struct Attempt {
    track_id: TrackId,
    handle: BackendHandle,
    resolved: bool,
}

/// The playback controller
pub struct PlayerController<B: AudioBackend> {
    backend: B,
    queue: TrackQueue,
    stats: StatsTracker,
    volume: Volume,
    auto_volume: AutoVolume,
    config: PlayerConfig,
    state: PlaybackState,
    attempt: Option<Attempt>,
    auto_skip_budget: u32,
    pending_events: Vec<PlayerEvent>,
}

impl<B: AudioBackend> PlayerController<B> {
    /// Create a controller over a backend
    pub fn new(mut backend: B, stats: StatsTracker, config: PlayerConfig) -> Self {
        let volume = Volume::new(config.initial_volume);
        backend.set_volume(volume.gain());
        let auto_volume = AutoVolume::new(config.auto_volume.clone());
        let auto_skip_budget = config.max_auto_skip;
        Self {
            backend,
            queue: TrackQueue::new(),
            stats,
            volume,
            auto_volume,
            config,
            state: PlaybackState::Idle,
            attempt: None,
            auto_skip_budget,
            pending_events: Vec::new(),
        }
    }

    /// Current playback state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Read access to the queue
    pub fn queue(&self) -> &TrackQueue {
        &self.queue
    }

    /// The current track
    pub fn current_track(&self) -> Option<&Track> {
        self.queue.current_track()
    }

    /// Current playback position
    pub fn position(&self) -> Duration {
        self.backend.position()
    }

    /// Drain accumulated events
    pub fn take_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // === Queue editing ===

    /// Append one track to the queue
    pub fn enqueue(&mut self, track: Track) {
        self.queue.push(track);
        self.push_queue_changed();
    }

    /// Append several tracks to the queue
    pub fn enqueue_all(&mut self, tracks: Vec<Track>) {
        if tracks.is_empty() {
            return;
        }
        self.queue.append(tracks);
        self.push_queue_changed();
    }

    /// Refresh a track in place (hydration updates)
    pub fn refresh_track(&mut self, track: &Track) {
        if self.queue.update(track) {
            self.push_queue_changed();
        }
    }

    /// Replace the whole queue, stopping playback
    pub fn replace_queue(&mut self, tracks: Vec<Track>) {
        if self.attempt.is_some() {
            self.resolve_departing(None);
            self.attempt = None;
            let _ = self.backend.stop();
        }
        self.queue.replace(tracks);
        self.set_state(PlaybackState::Idle);
        self.push_queue_changed();
    }

    /// Remove a track by index
    ///
    /// Removing the current track stops playback; the position re-clamps to
    /// the next surviving entry.
    pub fn remove_track(&mut self, index: usize) -> Result<Track> {
        let was_current = self.queue.current_index() == Some(index);
        if was_current && self.attempt.is_some() {
            self.resolve_departing(None);
            self.attempt = None;
            let _ = self.backend.stop();
        }
        let removed = self.queue.remove(index)?;
        if was_current {
            self.set_state(PlaybackState::Idle);
        }
        self.push_queue_changed();
        Ok(removed)
    }

    /// Move a track from one index to another
    pub fn move_track(&mut self, from: usize, to: usize) -> Result<()> {
        self.queue.move_track(from, to)?;
        self.push_queue_changed();
        Ok(())
    }

    /// Shuffle the queue; returns the effective seed
    pub fn shuffle(&mut self, seed: Option<&str>) -> String {
        let seed = self.queue.shuffle(seed);
        self.push_queue_changed();
        seed
    }

    /// Restore the natural queue order
    pub fn unshuffle(&mut self) {
        self.queue.unshuffle();
        self.push_queue_changed();
    }

    /// Case-insensitive queue search
    pub fn search(&self, text: &str) -> Vec<usize> {
        self.queue.search(text)
    }

    // === Transport ===

    /// Start or resume playback of the current track
    ///
    /// With no current selection the first track becomes current. Resuming
    /// from pause does not record a new play attempt.
    pub fn play(&mut self) -> Result<()> {
        if self.queue.is_empty() {
            return Err(PlaybackError::QueueEmpty);
        }
        if self.queue.current_index().is_none() {
            self.queue.set_current(0)?;
        }

        // Resume or no-op when the attempt already covers the current track
        if let (Some(attempt), Some(track)) = (&self.attempt, self.queue.current_track()) {
            if attempt.track_id == track.id {
                match self.state {
                    PlaybackState::Playing => return Ok(()),
                    PlaybackState::Paused => {
                        self.backend
                            .play()
                            .map_err(|e| PlaybackError::Backend(e.to_string()))?;
                        self.set_state(PlaybackState::Playing);
                        return Ok(());
                    }
                    _ => {}
                }
            }
        }

        self.resolve_departing(None);
        self.auto_skip_budget = self.config.max_auto_skip;
        self.start_current()
    }

    /// Select a track by index and play it
    pub fn play_index(&mut self, index: usize) -> Result<()> {
        self.resolve_departing(None);
        self.queue.set_current(index)?;
        self.auto_skip_budget = self.config.max_auto_skip;
        self.start_current()
    }

    /// Pause playback
    pub fn pause(&mut self) -> Result<()> {
        if self.state != PlaybackState::Playing {
            return Err(PlaybackError::InvalidOperation(format!(
                "cannot pause while {:?}",
                self.state
            )));
        }
        self.backend
            .pause()
            .map_err(|e| PlaybackError::Backend(e.to_string()))?;
        self.set_state(PlaybackState::Paused);
        Ok(())
    }

    /// Skip to the next track
    ///
    /// The departing attempt is attributed before moving: skipped when the
    /// played threshold was not reached (or the duration is unknown), played
    /// otherwise.
    pub fn next(&mut self) -> Result<()> {
        if self.queue.is_empty() {
            return Err(PlaybackError::QueueEmpty);
        }
        self.resolve_departing(None);
        self.auto_skip_budget = self.config.max_auto_skip;
        match self.queue.advance(self.config.wrap) {
            Some(_) => self.start_current(),
            None => {
                self.attempt = None;
                let _ = self.backend.stop();
                self.set_state(PlaybackState::Ended);
                Ok(())
            }
        }
    }

    /// Step back to the previous track
    ///
    /// At the first track with `StopAtEnd` the current track restarts.
    pub fn previous(&mut self) -> Result<()> {
        if self.queue.is_empty() {
            return Err(PlaybackError::QueueEmpty);
        }
        self.resolve_departing(None);
        self.auto_skip_budget = self.config.max_auto_skip;
        self.queue.retreat(self.config.wrap);
        self.start_current()
    }

    /// Stop playback and return to idle
    pub fn stop(&mut self) -> Result<()> {
        self.resolve_departing(None);
        self.attempt = None;
        self.backend
            .stop()
            .map_err(|e| PlaybackError::Backend(e.to_string()))?;
        self.set_state(PlaybackState::Idle);
        Ok(())
    }

    /// Seek within the current track
    ///
    /// Only valid while playing or paused; a track whose duration is still
    /// unknown (not yet hydrated, backend cannot tell) rejects the seek and
    /// playback continues unaffected.
    pub fn seek(&mut self, position: Duration) -> Result<()> {
        let origin = match self.state {
            PlaybackState::Playing => SeekOrigin::Playing,
            PlaybackState::Paused => SeekOrigin::Paused,
            _ => {
                return Err(PlaybackError::InvalidOperation(format!(
                    "cannot seek while {:?}",
                    self.state
                )))
            }
        };
        let duration = self
            .backend
            .duration()
            .or_else(|| self.queue.current_track().and_then(|t| t.duration));
        let Some(duration) = duration else {
            return Err(PlaybackError::DurationUnavailable);
        };

        self.set_state(PlaybackState::Seeking { from: origin });
        let result = self
            .backend
            .seek(position.min(duration))
            .map_err(|e| PlaybackError::Backend(e.to_string()));
        self.set_state(match origin {
            SeekOrigin::Playing => PlaybackState::Playing,
            SeekOrigin::Paused => PlaybackState::Paused,
        });
        result
    }

    // === Volume ===

    /// Current volume level (0-100)
    pub fn volume(&self) -> u8 {
        self.volume.level()
    }

    /// Set the volume level explicitly
    ///
    /// Re-anchors the loudness adaptation clock so the user's choice holds
    /// for at least one interval.
    pub fn set_volume(&mut self, level: u8) {
        self.volume.set_level(level);
        self.backend.set_volume(self.volume.gain());
        self.auto_volume.rearm(Instant::now());
        self.push_event(PlayerEvent::VolumeChanged {
            level: self.volume.level(),
        });
    }

    /// Enable or disable loudness adaptation
    pub fn set_auto_volume_enabled(&mut self, enabled: bool) {
        self.auto_volume.set_enabled(enabled);
    }

    /// Run one loudness adaptation step
    ///
    /// Called periodically by the host; does nothing unless audio is
    /// playing and the sampling interval has elapsed.
    pub fn tick_auto_volume(&mut self, now: Instant) {
        if self.state != PlaybackState::Playing {
            return;
        }
        let output_level = self.backend.output_level();
        if let Some(level) = self.auto_volume.tick(now, output_level, &self.volume) {
            debug!(from = self.volume.level(), to = level, "auto volume adjustment");
            self.volume.set_level(level);
            self.backend.set_volume(self.volume.gain());
            self.push_event(PlayerEvent::VolumeChanged { level });
        }
    }

    // === Backend events ===

    /// Drain and apply pending backend events
    ///
    /// Events carrying a handle other than the active attempt's are stale
    /// leftovers from a track the player already moved past and are dropped.
    pub fn poll_backend(&mut self) {
        for event in self.backend.poll_events() {
            match event {
                AudioBackendEvent::TrackEnded { handle } => {
                    if !self.is_current_attempt(handle) {
                        debug!(handle = handle.0, "ignoring stale track-ended event");
                        continue;
                    }
                    self.resolve_departing(Some(true));
                    self.attempt = None;
                    if self.config.autoplay {
                        self.auto_skip_budget = self.config.max_auto_skip;
                        match self.queue.advance(self.config.wrap) {
                            Some(_) => {
                                if let Err(e) = self.start_current() {
                                    warn!(error = %e, "failed to start next track");
                                }
                            }
                            None => {
                                let _ = self.backend.stop();
                                self.set_state(PlaybackState::Ended);
                            }
                        }
                    } else {
                        self.set_state(PlaybackState::Ended);
                    }
                }
                AudioBackendEvent::PlaybackFailed { handle, reason } => {
                    if !self.is_current_attempt(handle) {
                        debug!(handle = handle.0, "ignoring stale failure event");
                        continue;
                    }
                    self.resolve_departing(None);
                    let track_id = self.attempt.take().map(|a| a.track_id);
                    warn!(?track_id, reason = %reason, "playback failed");
                    self.push_event(PlayerEvent::PlaybackFailed {
                        track_id,
                        message: reason,
                    });
                    if self.auto_skip_budget > 0 {
                        self.auto_skip_budget -= 1;
                        if self.queue.advance(self.config.wrap).is_some() {
                            if let Err(e) = self.start_current() {
                                warn!(error = %e, "failed to start next track");
                            }
                        } else {
                            let _ = self.backend.stop();
                            self.set_state(PlaybackState::Ended);
                        }
                    } else {
                        self.set_state(PlaybackState::Error);
                    }
                }
            }
        }
    }

    /// Play statistics for a track
    pub fn stats_for(&self, id: &TrackId) -> sabrinth_core::TrackStats {
        self.stats.get(id)
    }

    // === Internals ===

    fn is_current_attempt(&self, handle: BackendHandle) -> bool {
        self.attempt.as_ref().is_some_and(|a| a.handle == handle)
    }

    /// Attribute the departing attempt to played or skipped, exactly once
    fn resolve_departing(&mut self, played_hint: Option<bool>) {
        let needs = self.attempt.as_ref().is_some_and(|a| !a.resolved);
        if !needs {
            return;
        }
        let played = played_hint.unwrap_or_else(|| self.position_past_threshold());
        if let Some(attempt) = &mut self.attempt {
            if played {
                self.stats.record_played(&attempt.track_id);
            } else {
                self.stats.record_skipped(&attempt.track_id);
            }
            attempt.resolved = true;
        }
    }

    fn position_past_threshold(&self) -> bool {
        let duration = self.backend.duration().or_else(|| {
            self.attempt
                .as_ref()
                .and_then(|a| self.queue.entries().iter().find(|t| t.id == a.track_id))
                .and_then(|t| t.duration)
        });
        match duration {
            Some(d) if !d.is_zero() => {
                self.backend.position().as_secs_f32() / d.as_secs_f32()
                    >= self.config.played_threshold
            }
            _ => false,
        }
    }

    /// Open and start the current track, auto-skipping over failures
    ///
    /// Each failed open consumes one unit of the auto-skip budget; once the
    /// budget is gone the controller settles in `Error`.
    fn start_current(&mut self) -> Result<()> {
        let mut previous = self.attempt.take().map(|a| a.track_id);
        loop {
            let Some(track) = self.queue.current_track().cloned() else {
                return Err(PlaybackError::NoCurrentTrack);
            };
            self.set_state(PlaybackState::Loading);
            match self.open_and_play(&track) {
                Ok(handle) => {
                    self.stats.record_started(&track.id);
                    self.attempt = Some(Attempt {
                        track_id: track.id.clone(),
                        handle,
                        resolved: false,
                    });
                    self.set_state(PlaybackState::Playing);
                    self.auto_volume.rearm(Instant::now());
                    self.push_event(PlayerEvent::TrackChanged {
                        track_id: track.id,
                        previous: previous.take(),
                    });
                    return Ok(());
                }
                Err(e) => {
                    warn!(track = %track.id, error = %e, "failed to start track");
                    self.push_event(PlayerEvent::PlaybackFailed {
                        track_id: Some(track.id),
                        message: e.to_string(),
                    });
                    if self.auto_skip_budget == 0 {
                        self.set_state(PlaybackState::Error);
                        return Ok(());
                    }
                    self.auto_skip_budget -= 1;
                    if self.queue.advance(self.config.wrap).is_none() {
                        let _ = self.backend.stop();
                        self.set_state(PlaybackState::Ended);
                        return Ok(());
                    }
                }
            }
        }
    }

    fn open_and_play(&mut self, track: &Track) -> Result<BackendHandle> {
        let handle = self
            .backend
            .open(&track.path)
            .map_err(|e| PlaybackError::Backend(e.to_string()))?;
        self.backend
            .play()
            .map_err(|e| PlaybackError::Backend(e.to_string()))?;
        Ok(handle)
    }

    fn set_state(&mut self, state: PlaybackState) {
        if self.state != state {
            self.state = state;
            self.push_event(PlayerEvent::StateChanged { state });
        }
    }

    fn push_queue_changed(&mut self) {
        self.push_event(PlayerEvent::QueueChanged {
            length: self.queue.len(),
        });
    }

    fn push_event(&mut self, event: PlayerEvent) {
        self.pending_events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sabrinth_core::{CoreError, SourceOrigin};
    use sabrinth_storage::StatsStore;
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex, MutexGuard};
    use tempfile::TempDir;

    #[derive(Default)]
    struct BackendState {
        opened: Vec<PathBuf>,
        next_handle: u64,
        current_handle: Option<BackendHandle>,
        playing: bool,
        position: Duration,
        duration: Option<Duration>,
        volume: f32,
        output_level: f32,
        fail_open_on: Option<&'static str>,
        events: Vec<AudioBackendEvent>,
    }

    /// Scripted backend; tests keep a clone to inject events and inspect calls
    #[derive(Clone, Default)]
    struct FakeBackend(Arc<Mutex<BackendState>>);

    impl FakeBackend {
        fn state(&self) -> MutexGuard<'_, BackendState> {
            self.0.lock().unwrap()
        }

        /// Simulate the current track reaching its natural end
        fn finish_track(&self) {
            let mut s = self.state();
            if let Some(handle) = s.current_handle {
                s.events.push(AudioBackendEvent::TrackEnded { handle });
            }
        }

        fn fail_current(&self, reason: &str) {
            let mut s = self.state();
            if let Some(handle) = s.current_handle {
                s.events.push(AudioBackendEvent::PlaybackFailed {
                    handle,
                    reason: reason.to_string(),
                });
            }
        }

        fn set_progress(&self, position: Duration, duration: Option<Duration>) {
            let mut s = self.state();
            s.position = position;
            s.duration = duration;
        }
    }

    impl AudioBackend for FakeBackend {
        fn open(&mut self, path: &Path) -> sabrinth_core::Result<BackendHandle> {
            let mut s = self.state();
            if let Some(substr) = s.fail_open_on {
                if path.to_string_lossy().contains(substr) {
                    return Err(CoreError::audio(format!("cannot decode {}", path.display())));
                }
            }
            s.next_handle += 1;
            let handle = BackendHandle(s.next_handle);
            s.current_handle = Some(handle);
            s.opened.push(path.to_path_buf());
            s.position = Duration::ZERO;
            s.duration = None;
            Ok(handle)
        }

        fn play(&mut self) -> sabrinth_core::Result<()> {
            self.state().playing = true;
            Ok(())
        }

        fn pause(&mut self) -> sabrinth_core::Result<()> {
            self.state().playing = false;
            Ok(())
        }

        fn stop(&mut self) -> sabrinth_core::Result<()> {
            let mut s = self.state();
            s.playing = false;
            s.current_handle = None;
            Ok(())
        }

        fn seek(&mut self, position: Duration) -> sabrinth_core::Result<()> {
            self.state().position = position;
            Ok(())
        }

        fn position(&self) -> Duration {
            self.state().position
        }

        fn duration(&self) -> Option<Duration> {
            self.state().duration
        }

        fn set_volume(&mut self, gain: f32) {
            self.state().volume = gain;
        }

        fn volume(&self) -> f32 {
            self.state().volume
        }

        fn output_level(&self) -> f32 {
            self.state().output_level
        }

        fn poll_events(&mut self) -> Vec<AudioBackendEvent> {
            std::mem::take(&mut self.state().events)
        }
    }

    fn track(name: &str) -> Track {
        Track::pending(format!("/music/{name}.mp3"), SourceOrigin::Folder)
    }

    fn controller_with(
        names: &[&str],
        config: PlayerConfig,
    ) -> (PlayerController<FakeBackend>, FakeBackend, TempDir) {
        let temp = TempDir::new().unwrap();
        let stats = StatsTracker::new(StatsStore::open(temp.path().join("stats.json")));
        let backend = FakeBackend::default();
        let mut controller = PlayerController::new(backend.clone(), stats, config);
        controller.enqueue_all(names.iter().map(|n| track(n)).collect());
        (controller, backend, temp)
    }

    #[test]
    fn play_starts_first_track_and_records_started() {
        let (mut c, backend, _tmp) = controller_with(&["a", "b"], PlayerConfig::default());
        c.play().unwrap();

        assert_eq!(c.state(), PlaybackState::Playing);
        assert_eq!(c.queue().current_index(), Some(0));
        assert!(backend.state().opened[0].ends_with("a.mp3"));

        let id = c.current_track().unwrap().id.clone();
        assert_eq!(c.stats_for(&id).started, 1);

        let events = c.take_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, PlayerEvent::TrackChanged { .. })));
        assert!(events.iter().any(|e| matches!(
            e,
            PlayerEvent::StateChanged {
                state: PlaybackState::Playing
            }
        )));
    }

    #[test]
    fn play_on_empty_queue_is_rejected() {
        let (mut c, _backend, _tmp) = controller_with(&[], PlayerConfig::default());
        assert!(matches!(c.play(), Err(PlaybackError::QueueEmpty)));
        assert_eq!(c.state(), PlaybackState::Idle);
    }

    #[test]
    fn resume_from_pause_does_not_rerecord_started() {
        let (mut c, _backend, _tmp) = controller_with(&["a"], PlayerConfig::default());
        c.play().unwrap();
        let id = c.current_track().unwrap().id.clone();

        c.pause().unwrap();
        assert_eq!(c.state(), PlaybackState::Paused);
        c.play().unwrap();
        assert_eq!(c.state(), PlaybackState::Playing);

        assert_eq!(c.stats_for(&id).started, 1);
    }

    #[test]
    fn pause_outside_playing_is_invalid() {
        let (mut c, _backend, _tmp) = controller_with(&["a"], PlayerConfig::default());
        assert!(matches!(
            c.pause(),
            Err(PlaybackError::InvalidOperation(_))
        ));
    }

    #[test]
    fn skip_before_threshold_records_skipped() {
        let (mut c, backend, _tmp) = controller_with(&["a", "b"], PlayerConfig::default());
        c.play().unwrap();
        let id = c.current_track().unwrap().id.clone();

        backend.set_progress(Duration::from_secs(10), Some(Duration::from_secs(200)));
        c.next().unwrap();

        let stats = c.stats_for(&id);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.played, 0);
        assert_eq!(c.queue().current_index(), Some(1));
    }

    #[test]
    fn departure_past_threshold_records_played() {
        let (mut c, backend, _tmp) = controller_with(&["a", "b"], PlayerConfig::default());
        c.play().unwrap();
        let id = c.current_track().unwrap().id.clone();

        backend.set_progress(Duration::from_secs(150), Some(Duration::from_secs(200)));
        c.next().unwrap();

        let stats = c.stats_for(&id);
        assert_eq!(stats.played, 1);
        assert_eq!(stats.skipped, 0);
    }

    #[test]
    fn unknown_duration_counts_departure_as_skipped() {
        let (mut c, backend, _tmp) = controller_with(&["a", "b"], PlayerConfig::default());
        c.play().unwrap();
        let id = c.current_track().unwrap().id.clone();

        backend.set_progress(Duration::from_secs(500), None);
        c.next().unwrap();

        assert_eq!(c.stats_for(&id).skipped, 1);
    }

    #[test]
    fn natural_end_records_played_and_advances() {
        let (mut c, backend, _tmp) = controller_with(&["a", "b"], PlayerConfig::default());
        c.play().unwrap();
        let id = c.current_track().unwrap().id.clone();

        backend.finish_track();
        c.poll_backend();

        assert_eq!(c.stats_for(&id).played, 1);
        assert_eq!(c.state(), PlaybackState::Playing);
        assert_eq!(c.queue().current_index(), Some(1));
        assert_eq!(backend.state().opened.len(), 2);
    }

    #[test]
    fn stale_end_event_is_ignored() {
        let (mut c, backend, _tmp) = controller_with(&["a", "b"], PlayerConfig::default());
        c.play().unwrap();
        let first_id = c.current_track().unwrap().id.clone();
        let stale_handle = backend.state().current_handle.unwrap();

        // User skips before the end event for the first track arrives
        c.next().unwrap();
        assert_eq!(c.queue().current_index(), Some(1));

        backend
            .state()
            .events
            .push(AudioBackendEvent::TrackEnded {
                handle: stale_handle,
            });
        c.poll_backend();

        // No double-count, no spurious advance
        let stats = c.stats_for(&first_id);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.played, 0);
        assert_eq!(c.state(), PlaybackState::Playing);
        assert_eq!(c.queue().current_index(), Some(1));
        assert_eq!(backend.state().opened.len(), 2);
    }

    #[test]
    fn loop_wrap_goes_back_to_the_start() {
        let (mut c, _backend, _tmp) = controller_with(&["a", "b"], PlayerConfig::default());
        c.play().unwrap();
        c.next().unwrap();
        c.next().unwrap();
        assert_eq!(c.queue().current_index(), Some(0));
        assert_eq!(c.state(), PlaybackState::Playing);
    }

    #[test]
    fn stop_at_end_finishes_the_queue() {
        let config = PlayerConfig {
            wrap: WrapMode::StopAtEnd,
            ..PlayerConfig::default()
        };
        let (mut c, backend, _tmp) = controller_with(&["a"], config);
        c.play().unwrap();
        let id = c.current_track().unwrap().id.clone();

        backend.finish_track();
        c.poll_backend();

        assert_eq!(c.state(), PlaybackState::Ended);
        assert_eq!(c.stats_for(&id).played, 1);
    }

    #[test]
    fn seek_with_unknown_duration_is_rejected() {
        let (mut c, backend, _tmp) = controller_with(&["a"], PlayerConfig::default());
        c.play().unwrap();

        // Neither backend nor queue knows a duration yet
        assert!(matches!(
            c.seek(Duration::from_secs(30)),
            Err(PlaybackError::DurationUnavailable)
        ));
        assert_eq!(c.state(), PlaybackState::Playing);
        assert_eq!(backend.state().position, Duration::ZERO);
    }

    #[test]
    fn seek_clamps_to_duration() {
        let (mut c, backend, _tmp) = controller_with(&["a"], PlayerConfig::default());
        c.play().unwrap();
        backend.set_progress(Duration::ZERO, Some(Duration::from_secs(100)));

        c.seek(Duration::from_secs(250)).unwrap();
        assert_eq!(backend.state().position, Duration::from_secs(100));
        assert_eq!(c.state(), PlaybackState::Playing);
    }

    #[test]
    fn seek_while_idle_is_invalid() {
        let (mut c, _backend, _tmp) = controller_with(&["a"], PlayerConfig::default());
        assert!(matches!(
            c.seek(Duration::from_secs(1)),
            Err(PlaybackError::InvalidOperation(_))
        ));
    }

    #[test]
    fn open_failures_auto_skip_until_the_budget_runs_out() {
        let config = PlayerConfig {
            max_auto_skip: 2,
            ..PlayerConfig::default()
        };
        let (mut c, backend, _tmp) = controller_with(&["a", "b", "c", "d", "e"], config);
        backend.state().fail_open_on = Some(".mp3");

        c.play().unwrap();
        assert_eq!(c.state(), PlaybackState::Error);

        let failures = c
            .take_events()
            .into_iter()
            .filter(|e| matches!(e, PlayerEvent::PlaybackFailed { .. }))
            .count();
        // Initial attempt plus two auto-skips
        assert_eq!(failures, 3);
    }

    #[test]
    fn mid_stream_failure_auto_skips_to_the_next_track() {
        let (mut c, backend, _tmp) = controller_with(&["a", "b"], PlayerConfig::default());
        c.play().unwrap();

        backend.fail_current("decoder choked");
        c.poll_backend();

        assert_eq!(c.state(), PlaybackState::Playing);
        assert_eq!(c.queue().current_index(), Some(1));
        assert!(c
            .take_events()
            .iter()
            .any(|e| matches!(e, PlayerEvent::PlaybackFailed { .. })));
    }

    #[test]
    fn auto_volume_nudges_toward_the_reference() {
        let config = PlayerConfig {
            auto_volume: AutoVolumeConfig {
                enabled: true,
                ..AutoVolumeConfig::default()
            },
            initial_volume: 50,
            ..PlayerConfig::default()
        };
        let (mut c, backend, _tmp) = controller_with(&["a"], config);
        c.play().unwrap();
        backend.state().output_level = 0.05;

        c.tick_auto_volume(Instant::now() + Duration::from_secs(5));
        assert_eq!(c.volume(), 52);
        assert!(c
            .take_events()
            .iter()
            .any(|e| matches!(e, PlayerEvent::VolumeChanged { level: 52 })));
    }

    #[test]
    fn explicit_volume_change_reanchors_adaptation() {
        let config = PlayerConfig {
            auto_volume: AutoVolumeConfig {
                enabled: true,
                ..AutoVolumeConfig::default()
            },
            ..PlayerConfig::default()
        };
        let (mut c, backend, _tmp) = controller_with(&["a"], config);
        c.play().unwrap();
        backend.state().output_level = 0.05;

        c.set_volume(30);
        // Inside the re-anchored interval nothing moves
        c.tick_auto_volume(Instant::now());
        assert_eq!(c.volume(), 30);
    }

    #[test]
    fn removing_the_current_track_stops_playback() {
        let (mut c, _backend, _tmp) = controller_with(&["a", "b"], PlayerConfig::default());
        c.play().unwrap();

        c.remove_track(0).unwrap();
        assert_eq!(c.state(), PlaybackState::Idle);
        assert_eq!(c.queue().len(), 1);
        assert_eq!(c.queue().current_index(), Some(0));
    }
}
