//! Queue and shuffle behavior through the public API

use sabrinth_core::{SourceOrigin, Track, WrapMode};
use sabrinth_playback::TrackQueue;

fn track(name: &str) -> Track {
    Track::pending(format!("/library/{name}.mp3"), SourceOrigin::Folder)
}

fn filled(names: &[&str]) -> TrackQueue {
    let mut queue = TrackQueue::new();
    queue.append(names.iter().map(|n| track(n)).collect());
    queue
}

fn titles(queue: &TrackQueue) -> Vec<String> {
    queue.entries().iter().map(|t| t.title.clone()).collect()
}

#[test]
fn shuffle_is_deterministic_across_queue_instances() {
    let names = ["nocturne", "aria", "fugue", "prelude", "etude", "waltz"];
    let mut first = filled(&names);
    let mut second = filled(&names);

    first.shuffle(Some("friday night"));
    second.shuffle(Some("friday night"));
    assert_eq!(titles(&first), titles(&second));
}

#[test]
fn shuffle_result_is_a_permutation() {
    let names = ["a", "b", "c", "d", "e", "f", "g", "h"];
    let mut queue = filled(&names);
    queue.shuffle(Some("seed"));

    let mut shuffled = titles(&queue);
    shuffled.sort();
    let mut expected: Vec<String> = names.iter().map(|n| (*n).to_string()).collect();
    expected.sort();
    assert_eq!(shuffled, expected);
}

#[test]
fn reshuffling_matches_a_fresh_queue_with_the_same_seed() {
    let names = ["one", "two", "three", "four", "five"];
    let mut reshuffled = filled(&names);
    reshuffled.shuffle(Some("first pass"));
    reshuffled.shuffle(Some("final"));

    let mut fresh = filled(&names);
    fresh.shuffle(Some("final"));

    assert_eq!(titles(&reshuffled), titles(&fresh));
}

#[test]
fn edits_during_shuffle_keep_the_current_track() {
    let mut queue = filled(&["a", "b", "c", "d", "e"]);
    queue.set_current(2).unwrap();
    let current = queue.current_track().unwrap().id.clone();

    queue.shuffle(Some("mix"));
    let position = queue.current_index().unwrap();
    queue.move_track(position, 0).unwrap();
    assert_eq!(queue.current_track().unwrap().id, current);

    queue.push(track("latecomer"));
    queue.unshuffle();
    assert_eq!(queue.current_track().unwrap().id, current);
    assert_eq!(queue.len(), 6);
}

#[test]
fn wrap_modes_disagree_only_at_the_edges() {
    let mut queue = filled(&["a", "b", "c"]);
    queue.set_current(0).unwrap();

    assert_eq!(queue.advance(WrapMode::StopAtEnd), Some(1));
    assert_eq!(queue.advance(WrapMode::StopAtEnd), Some(2));
    assert_eq!(queue.advance(WrapMode::StopAtEnd), None);
    assert_eq!(queue.current_index(), Some(2));

    assert_eq!(queue.advance(WrapMode::Loop), Some(0));
    assert_eq!(queue.retreat(WrapMode::Loop), Some(2));
}
