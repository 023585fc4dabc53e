//! Property-based tests for channel scheduling
//!
//! Random queues are played through a manual clock. The channel must end at
//! the queue's total duration, report events in chronological order, and
//! shift the end by exactly the time spent paused.

use cadence_core::{AudioQueue, AudioTrack, QueueTiming, Segue, Transition};
use cadence_playback::{Channel, EngineEvent, ManualClock, VirtualBackend};
use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

// ===== Helpers =====

/// (duration, intro, outro) in milliseconds
fn arbitrary_entry() -> impl Strategy<Value = (u64, u64, u64)> {
    (4_000u64..30_000, 0u64..2_000, 0u64..2_000)
}

fn build(entries: &[(u64, u64, u64)]) -> (ManualClock, Channel, Duration) {
    let clock = ManualClock::new();
    let backend = VirtualBackend::new(clock.shared());
    let tracks: Vec<AudioTrack> = entries
        .iter()
        .enumerate()
        .map(|(i, (duration, intro, outro))| {
            let url = Url::parse(&format!("file:///virtual/{}.wav", i)).unwrap();
            let duration = Duration::from_millis(*duration);
            backend.register(url.clone(), duration);
            AudioTrack::new(url, duration)
                .with_intro(Segue::Linear(Duration::from_millis(*intro)))
                .with_outro(Segue::Linear(Duration::from_millis(*outro)))
        })
        .collect();

    let mut channel = Channel::new("prop", Arc::new(backend), clock.shared());
    let queue = AudioQueue::from_tracks(tracks, false);
    let total = queue.total_duration(&QueueTiming::new(true, None, None));
    channel.set_queue(queue);
    (clock, channel, total)
}

fn event_time(event: &EngineEvent) -> Option<Duration> {
    match event {
        EngineEvent::ChannelStarted { at, .. }
        | EngineEvent::TrackStarted { at, .. }
        | EngineEvent::CrossfadeStarted { at, .. }
        | EngineEvent::OutroStarted { at, .. }
        | EngineEvent::TrackFinished { at, .. }
        | EngineEvent::ChannelPaused { at, .. }
        | EngineEvent::ChannelEnded { at, .. } => Some(*at),
        _ => None,
    }
}

fn ended_at(events: &[EngineEvent]) -> Option<Duration> {
    events.iter().find_map(|event| match event {
        EngineEvent::ChannelEnded { at, .. } => Some(*at),
        _ => None,
    })
}

fn close(a: Duration, b: Duration) -> bool {
    let diff = if a > b { a - b } else { b - a };
    diff <= Duration::from_micros(1)
}

// ===== Properties =====

proptest! {
    #[test]
    fn channel_ends_at_total_duration(
        entries in prop::collection::vec(arbitrary_entry(), 1..6),
        tick_ms in 50u64..5_000,
    ) {
        let (clock, mut channel, total) = build(&entries);
        channel.play_track(None, Transition::ABRUPT, None);

        let mut events = channel.drain_events();
        let horizon = total + Duration::from_secs(1);
        let step = Duration::from_millis(tick_ms);
        let mut now = Duration::ZERO;
        while now < horizon {
            now = (now + step).min(horizon);
            clock.set(now);
            channel.tick();
            events.extend(channel.drain_events());
        }

        let end = ended_at(&events);
        prop_assert!(end.is_some());
        prop_assert!(close(end.unwrap(), total), "ended at {:?}, expected {:?}", end, total);

        let starts = events
            .iter()
            .filter(|e| matches!(e, EngineEvent::TrackStarted { .. }))
            .count();
        prop_assert_eq!(starts, entries.len());

        let times: Vec<Duration> = events.iter().filter_map(event_time).collect();
        prop_assert!(times.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn pause_delays_end_by_its_length(
        entries in prop::collection::vec(arbitrary_entry(), 1..5),
        pause_fraction in 0.0f64..0.99,
        pause_ms in 1u64..20_000,
    ) {
        let (clock, mut channel, total) = build(&entries);
        channel.play_track(None, Transition::ABRUPT, None);

        let paused_at = total.mul_f64(pause_fraction);
        clock.set(paused_at);
        channel.tick();
        channel.pause_at(Some(Segue::Abrupt), None, paused_at);

        let resumed_at = paused_at + Duration::from_millis(pause_ms);
        clock.set(resumed_at);
        channel.tick();
        channel.resume_at(Some(Segue::Abrupt), resumed_at);

        let horizon = total + Duration::from_millis(pause_ms) + Duration::from_secs(1);
        clock.set(horizon);
        channel.tick();

        let events = channel.drain_events();
        let end = ended_at(&events);
        prop_assert!(end.is_some());
        prop_assert!(close(end.unwrap(), total + Duration::from_millis(pause_ms)));
    }
}
