//! Integration tests for queue timing and persistence
//!
//! These tests exercise the queue the way the playback engine uses it: build
//! a queue, lay it out on a timeline, and persist it.

use cadence_core::{AudioQueue, AudioTrack, QueueTiming, Segue};
use std::time::Duration;
use url::Url;

// ===== Test Helpers =====

fn secs(s: f64) -> Duration {
    Duration::from_secs_f64(s)
}

fn track(name: &str, duration: f64) -> AudioTrack {
    AudioTrack::new(
        Url::parse(&format!("file:///audio/{}.m4a", name)).unwrap(),
        secs(duration),
    )
}

// ===== Scenario Tests =====

#[test]
fn two_track_crossfade_scenario() {
    let a = track("a", 10.0).with_outro(Segue::Linear(secs(2.0)));
    let b = track("b", 8.0).with_intro(Segue::Linear(secs(2.0)));
    let queue = AudioQueue::from_tracks([a, b], false);
    let timing = QueueTiming::default();

    assert_eq!(queue.total_duration(&timing), secs(16.0));

    let schedule = queue.schedule(&timing);
    assert_eq!(schedule.len(), 2);

    // Transition at 10 - (2 + 2) / 2
    assert_eq!(schedule[0].transition_at, secs(8.0));
    assert_eq!(schedule[1].start, secs(8.0));

    // Outro of A and intro of B both run 8s..10s
    assert_eq!(schedule[0].end - schedule[0].outro, secs(8.0));
    assert_eq!(schedule[1].start + schedule[1].intro, secs(10.0));

    // B is the last track: it ends exactly at the total duration
    assert_eq!(schedule[1].end, queue.total_duration(&timing));
}

#[test]
fn equal_fades_transition_at_duration_minus_fade() {
    let d = secs(3.0);
    let a = track("a", 20.0).with_outro(Segue::ConstantPower(d));
    let b = track("b", 20.0).with_intro(Segue::ConstantPower(d));
    let queue = AudioQueue::from_tracks([a, b], false);

    assert_eq!(queue.transition_time(0, &QueueTiming::default()), secs(17.0));
}

#[test]
fn silence_occupies_queue_time() {
    let mut queue = AudioQueue::new();
    queue.push(track("a", 10.0));
    queue.push_silence(secs(5.0));
    queue.push(track("b", 10.0));

    let timing = QueueTiming::new(false, None, None);
    assert_eq!(queue.total_duration(&timing), secs(25.0));
    assert_eq!(queue.track_at(secs(12.0), &timing), Some((1, secs(2.0))));
    assert!(queue[1].is_silence());
}

#[test]
fn long_fades_are_clamped_in_timing() {
    // Requested 10s fades on 6s tracks clamp to 3s
    let fade = Segue::Linear(secs(10.0));
    let queue = AudioQueue::from_tracks(
        [
            track("a", 6.0).with_outro(fade),
            track("b", 6.0).with_intro(fade),
        ],
        false,
    );
    let timing = QueueTiming::default();

    assert_eq!(queue.transition_time(0, &timing), secs(3.0));
    assert_eq!(queue.total_duration(&timing), secs(9.0));
}

#[test]
fn ranged_repeats_are_not_folded() {
    let clip = track("clip", 30.0).with_range(cadence_core::PlayRange::new(secs(5.0), secs(15.0)));
    let mut queue = AudioQueue::looping();
    queue.push(clip.clone());
    queue.push(clip);

    assert_eq!(queue.len(), 2);
    for entry in queue.tracks() {
        assert_eq!(entry.duration(), secs(30.0));
        assert_eq!(entry.start_offset(), secs(5.0));
        assert_eq!(entry.effective_duration(), secs(10.0));
    }
}

// ===== Persistence Tests =====

#[test]
fn queue_survives_save_and_load() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("queue.json");

    let a = track("a", 12.5).with_intro(Segue::Exponential {
        duration: secs(1.5),
        floor: 0.1,
    });
    let b = track("b", 4.0).with_volume(0.4).with_name("Birds");
    let queue = AudioQueue::from_tracks([a.clone(), b.clone()], true);

    queue.save(&path).unwrap();
    let loaded = AudioQueue::load(&path).unwrap();

    assert!(loaded.use_loops());
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0], a);
    assert_eq!(loaded[0].duration(), secs(12.5));
    assert_eq!(
        loaded[0].intro(),
        Some(Segue::Exponential {
            duration: secs(1.5),
            floor: 0.1
        })
    );
    assert_eq!(loaded[1], b);
    assert_eq!(loaded[1].name(), "Birds");
    assert_eq!(loaded[1].volume(), 0.4);
}

#[test]
fn loading_folds_repeated_loop_entries() {
    let json = r#"{
        "use_loops": true,
        "tracks": [
            {"id": "8f6c3a52-6b7e-4c55-9d0e-1f2a3b4c5d6e", "url": "file:///audio/wave.wav", "duration": 3.0},
            {"id": "8f6c3a52-6b7e-4c55-9d0e-1f2a3b4c5d6e", "url": "file:///audio/wave.wav", "duration": 3.0}
        ]
    }"#;
    let queue = AudioQueue::from_json(json).unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].duration(), secs(6.0));
}

#[test]
fn missing_file_reports_io_error() {
    let temp_dir = tempfile::tempdir().unwrap();
    let result = AudioQueue::load(&temp_dir.path().join("absent.json"));
    assert!(matches!(result, Err(cadence_core::CoreError::Io(_))));
}
