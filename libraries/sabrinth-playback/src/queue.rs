//! The playback queue
//!
//! One flat list of tracks plus a current index. Shuffle always starts from
//! the natural order (paths sorted case-insensitively), so the resulting
//! permutation depends only on the seed and the track set, never on prior
//! shuffle history. Edits that move tracks around keep the currently playing
//! track selected by identity.

use crate::error::{PlaybackError, Result};
use crate::shuffle;
use sabrinth_core::{Track, TrackId, WrapMode};

/// Ordered queue of tracks with an optional current position
#[derive(Debug, Clone, Default)]
pub struct TrackQueue {
    entries: Vec<Track>,
    current: Option<usize>,
    shuffle_seed: Option<String>,
}

impl TrackQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracks in the queue
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in display order
    pub fn entries(&self) -> &[Track] {
        &self.entries
    }

    /// Track at an index
    pub fn get(&self, index: usize) -> Option<&Track> {
        self.entries.get(index)
    }

    /// Index of the current track
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// The current track
    pub fn current_track(&self) -> Option<&Track> {
        self.current.and_then(|i| self.entries.get(i))
    }

    /// Seed of the active shuffle, `None` when in natural order
    pub fn shuffle_seed(&self) -> Option<&str> {
        self.shuffle_seed.as_deref()
    }

    /// Append one track to the end
    pub fn push(&mut self, track: Track) {
        self.entries.push(track);
    }

    /// Append several tracks to the end
    pub fn append(&mut self, tracks: Vec<Track>) {
        self.entries.extend(tracks);
    }

    /// Refresh a track in place by id (hydration updates)
    ///
    /// Returns `true` if a matching entry was found.
    pub fn update(&mut self, track: &Track) -> bool {
        let mut found = false;
        for entry in self.entries.iter_mut().filter(|e| e.id == track.id) {
            *entry = track.clone();
            found = true;
        }
        found
    }

    /// Replace the whole queue, clearing position and shuffle state
    pub fn replace(&mut self, tracks: Vec<Track>) {
        self.entries = tracks;
        self.current = None;
        self.shuffle_seed = None;
    }

    /// Clear the queue
    pub fn clear(&mut self) {
        self.entries.clear();
        self.current = None;
        self.shuffle_seed = None;
    }

    /// Select the current track by index
    pub fn set_current(&mut self, index: usize) -> Result<&Track> {
        if index >= self.entries.len() {
            return Err(PlaybackError::IndexOutOfBounds {
                index,
                len: self.entries.len(),
            });
        }
        self.current = Some(index);
        Ok(&self.entries[index])
    }

    /// Remove a track by index
    ///
    /// The current position follows the surviving entries: removing before
    /// it shifts it down, removing the current track re-clamps to the next
    /// entry (or clears on an empty queue).
    pub fn remove(&mut self, index: usize) -> Result<Track> {
        if index >= self.entries.len() {
            return Err(PlaybackError::IndexOutOfBounds {
                index,
                len: self.entries.len(),
            });
        }
        let removed = self.entries.remove(index);
        self.current = match self.current {
            Some(cur) if index < cur => Some(cur - 1),
            Some(cur) if index == cur => {
                if self.entries.is_empty() {
                    None
                } else {
                    Some(cur.min(self.entries.len() - 1))
                }
            }
            other => other,
        };
        Ok(removed)
    }

    /// Move a track from one index to another
    pub fn move_track(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.entries.len();
        if from >= len {
            return Err(PlaybackError::IndexOutOfBounds { index: from, len });
        }
        if to >= len {
            return Err(PlaybackError::IndexOutOfBounds { index: to, len });
        }
        if from == to {
            return Ok(());
        }
        let track = self.entries.remove(from);
        self.entries.insert(to, track);

        self.current = self.current.map(|cur| {
            if cur == from {
                to
            } else if from < cur && to >= cur {
                cur - 1
            } else if from > cur && to <= cur {
                cur + 1
            } else {
                cur
            }
        });
        Ok(())
    }

    /// Advance to the next index per the wrap policy
    ///
    /// Returns `None` when `StopAtEnd` runs off the end; the index is left
    /// unchanged in that case.
    pub fn advance(&mut self, wrap: WrapMode) -> Option<usize> {
        if self.entries.is_empty() {
            return None;
        }
        let next = match self.current {
            None => 0,
            Some(i) => match wrap {
                WrapMode::Loop => (i + 1) % self.entries.len(),
                WrapMode::StopAtEnd => {
                    if i + 1 >= self.entries.len() {
                        return None;
                    }
                    i + 1
                }
            },
        };
        self.current = Some(next);
        Some(next)
    }

    /// Step back to the previous index per the wrap policy
    ///
    /// Returns `None` when `StopAtEnd` is already at the first track.
    pub fn retreat(&mut self, wrap: WrapMode) -> Option<usize> {
        if self.entries.is_empty() {
            return None;
        }
        let prev = match self.current {
            None => 0,
            Some(0) => match wrap {
                WrapMode::Loop => self.entries.len() - 1,
                WrapMode::StopAtEnd => return None,
            },
            Some(i) => i - 1,
        };
        self.current = Some(prev);
        Some(prev)
    }

    /// Shuffle the queue with a seeded permutation
    ///
    /// The base order is always the natural order (paths sorted
    /// case-insensitively), so the same seed over the same track set yields
    /// the same display order no matter what came before. The currently
    /// selected track keeps its identity across the reorder. Returns the
    /// effective seed (generated when none was given).
    pub fn shuffle(&mut self, seed: Option<&str>) -> String {
        let seed = shuffle::normalize_seed(seed);
        let current_id = self.current_track().map(|t| t.id.clone());

        self.sort_natural();
        shuffle::shuffle_slice(&mut self.entries, &seed);

        self.relocate(current_id);
        self.shuffle_seed = Some(seed.clone());
        seed
    }

    /// Restore the natural order and clear the shuffle seed
    pub fn unshuffle(&mut self) {
        let current_id = self.current_track().map(|t| t.id.clone());
        self.sort_natural();
        self.relocate(current_id);
        self.shuffle_seed = None;
    }

    /// Case-insensitive search over titles, artists and file names
    ///
    /// Returns matching indices in display order.
    pub fn search(&self, text: &str) -> Vec<usize> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, track)| {
                track.title.to_lowercase().contains(&needle)
                    || track
                        .artist
                        .as_ref()
                        .is_some_and(|a| a.to_lowercase().contains(&needle))
                    || track
                        .path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_lowercase())
                        .is_some_and(|n| n.contains(&needle))
            })
            .map(|(i, _)| i)
            .collect()
    }

    fn sort_natural(&mut self) {
        self.entries
            .sort_by_key(|t| t.path.to_string_lossy().to_lowercase());
    }

    fn relocate(&mut self, id: Option<TrackId>) {
        if let Some(id) = id {
            self.current = self.entries.iter().position(|t| t.id == id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sabrinth_core::SourceOrigin;

    fn create_test_track(name: &str) -> Track {
        Track::pending(format!("/music/{name}.mp3"), SourceOrigin::Folder)
    }

    fn queue_of(names: &[&str]) -> TrackQueue {
        let mut queue = TrackQueue::new();
        queue.append(names.iter().map(|n| create_test_track(n)).collect());
        queue
    }

    fn order(queue: &TrackQueue) -> Vec<String> {
        queue.entries().iter().map(|t| t.title.clone()).collect()
    }

    #[test]
    fn create_empty_queue() {
        let queue = TrackQueue::new();
        assert_eq!(queue.len(), 0);
        assert!(queue.is_empty());
        assert!(queue.current_track().is_none());
    }

    #[test]
    fn same_seed_same_order() {
        let mut a = queue_of(&["delta", "alpha", "charlie", "bravo", "echo"]);
        let mut b = queue_of(&["delta", "alpha", "charlie", "bravo", "echo"]);
        a.shuffle(Some("road trip"));
        b.shuffle(Some("road trip"));
        assert_eq!(order(&a), order(&b));
    }

    #[test]
    fn shuffle_ignores_prior_history() {
        let names = ["delta", "alpha", "charlie", "bravo", "echo", "foxtrot"];
        let mut twice = queue_of(&names);
        twice.shuffle(Some("first"));
        twice.shuffle(Some("second"));

        let mut once = queue_of(&names);
        once.shuffle(Some("second"));

        assert_eq!(order(&twice), order(&once));
    }

    #[test]
    fn shuffle_keeps_current_by_identity() {
        let mut queue = queue_of(&["a", "b", "c", "d", "e"]);
        queue.set_current(2).unwrap();
        let id = queue.current_track().unwrap().id.clone();

        queue.shuffle(Some("seed"));
        assert_eq!(queue.current_track().unwrap().id, id);

        queue.unshuffle();
        assert_eq!(queue.current_track().unwrap().id, id);
        assert!(queue.shuffle_seed().is_none());
    }

    #[test]
    fn unshuffle_restores_natural_order() {
        let mut queue = queue_of(&["Charlie", "alpha", "Bravo"]);
        queue.shuffle(Some("mix"));
        queue.unshuffle();
        assert_eq!(order(&queue), vec!["alpha", "Bravo", "Charlie"]);
    }

    #[test]
    fn missing_seed_is_generated_and_returned() {
        let mut a = queue_of(&["a", "b", "c", "d", "e", "f", "g"]);
        let seed = a.shuffle(None);
        assert!(!seed.is_empty());
        assert_eq!(a.shuffle_seed(), Some(seed.as_str()));

        let mut b = queue_of(&["a", "b", "c", "d", "e", "f", "g"]);
        b.shuffle(Some(&seed));
        assert_eq!(order(&a), order(&b));
    }

    #[test]
    fn remove_adjusts_current_position() {
        let mut queue = queue_of(&["a", "b", "c", "d"]);
        queue.set_current(2).unwrap();

        // Removing before the current track shifts it down
        queue.remove(0).unwrap();
        assert_eq!(queue.current_index(), Some(1));
        assert_eq!(queue.current_track().unwrap().title, "c");

        // Removing the current track re-clamps to the next entry
        queue.remove(1).unwrap();
        assert_eq!(queue.current_index(), Some(1));
        assert_eq!(queue.current_track().unwrap().title, "d");

        // Draining the queue clears the position
        queue.remove(1).unwrap();
        queue.remove(0).unwrap();
        assert!(queue.current_index().is_none());
    }

    #[test]
    fn remove_out_of_bounds_is_an_error() {
        let mut queue = queue_of(&["a"]);
        assert!(matches!(
            queue.remove(5),
            Err(PlaybackError::IndexOutOfBounds { index: 5, len: 1 })
        ));
    }

    #[test]
    fn move_track_follows_current() {
        let mut queue = queue_of(&["a", "b", "c", "d"]);
        queue.set_current(1).unwrap();

        queue.move_track(1, 3).unwrap();
        assert_eq!(queue.current_index(), Some(3));
        assert_eq!(queue.current_track().unwrap().title, "b");

        queue.move_track(0, 3).unwrap();
        assert_eq!(queue.current_track().unwrap().title, "b");
        assert_eq!(order(&queue), vec!["c", "d", "b", "a"]);
    }

    #[test]
    fn update_refreshes_by_id() {
        let mut queue = queue_of(&["a", "b"]);
        let mut hydrated = queue.get(1).unwrap().clone();
        hydrated.title = "Hydrated".to_string();
        hydrated.duration = Some(std::time::Duration::from_secs(200));

        assert!(queue.update(&hydrated));
        assert_eq!(queue.get(1).unwrap().title, "Hydrated");

        let unknown = create_test_track("zzz");
        assert!(!queue.update(&unknown));
    }

    #[test]
    fn advance_and_retreat_wrap_modulo() {
        let mut queue = queue_of(&["a", "b", "c"]);
        queue.set_current(2).unwrap();
        assert_eq!(queue.advance(WrapMode::Loop), Some(0));
        assert_eq!(queue.retreat(WrapMode::Loop), Some(2));
    }

    #[test]
    fn stop_at_end_refuses_to_wrap() {
        let mut queue = queue_of(&["a", "b"]);
        queue.set_current(1).unwrap();
        assert_eq!(queue.advance(WrapMode::StopAtEnd), None);
        assert_eq!(queue.current_index(), Some(1));

        queue.set_current(0).unwrap();
        assert_eq!(queue.retreat(WrapMode::StopAtEnd), None);
        assert_eq!(queue.current_index(), Some(0));
    }

    #[test]
    fn search_matches_title_artist_and_filename() {
        let mut queue = queue_of(&["Daft Punk - Aerodynamic", "Queen - Bohemian Rhapsody"]);
        let mut other = create_test_track("untitled");
        other.title = "Harder Better".to_string();
        queue.push(other);

        assert_eq!(queue.search("aero"), vec![0]);
        assert_eq!(queue.search("QUEEN"), vec![1]);
        assert_eq!(queue.search("harder"), vec![2]);
        assert_eq!(queue.search("untitled"), vec![2]); // filename match
        assert!(queue.search("  ").is_empty());
    }
}
