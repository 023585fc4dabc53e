//! Track queue and its timing model
//!
//! Fades are part of a track's duration. When cross-fading, each track starts
//! early enough that the midpoint of its intro lines up with the midpoint of the
//! previous track's outro:
//!
//! ```text
//! [--------------------------------------------------------]  total duration
//! A: [- in -][---- main ----][- out -]
//! B:                     [- in -][---- main ----][- out -]
//!                            ^ transition
//! ```
//!
//! Every entry therefore gives back half its intro (unless first) and half its
//! outro (unless last) to the overlap.

use crate::error::Result;
use crate::segue::Segue;
use crate::track::AudioTrack;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Fade used for timing when neither the track nor the caller names one
pub const TIMING_FALLBACK_SEGUE: Segue = Segue::Linear(Duration::from_secs(2));

/// Fade settings the queue is timed with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueueTiming {
    /// Overlap neighbouring tracks
    pub cross_fade: bool,

    /// Intro for tracks without their own
    pub default_intro: Option<Segue>,

    /// Outro for tracks without their own
    pub default_outro: Option<Segue>,
}

impl QueueTiming {
    /// Timing with the given inherited fades
    pub fn new(cross_fade: bool, default_intro: Option<Segue>, default_outro: Option<Segue>) -> Self {
        Self {
            cross_fade,
            default_intro,
            default_outro,
        }
    }

    /// Intro actually used for `track`
    pub fn intro_for(&self, track: &AudioTrack) -> Segue {
        track
            .intro()
            .or(self.default_intro)
            .unwrap_or(TIMING_FALLBACK_SEGUE)
    }

    /// Outro actually used for `track`
    pub fn outro_for(&self, track: &AudioTrack) -> Segue {
        track
            .outro()
            .or(self.default_outro)
            .unwrap_or(TIMING_FALLBACK_SEGUE)
    }

    /// Clamped intro length of `track`
    pub fn intro_duration(&self, track: &AudioTrack) -> Duration {
        track.duration_of(Some(&self.intro_for(track)))
    }

    /// Clamped outro length of `track`
    pub fn outro_duration(&self, track: &AudioTrack) -> Duration {
        track.duration_of(Some(&self.outro_for(track)))
    }
}

impl Default for QueueTiming {
    fn default() -> Self {
        Self::new(true, None, None)
    }
}

/// Where one queue entry sits on the queue timeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledTrack {
    /// Index into the queue
    pub index: usize,

    /// Offset at which the track starts
    pub start: Duration,

    /// Offset at which the next track takes over
    pub transition_at: Duration,

    /// Offset at which the track falls silent
    pub end: Duration,

    /// Clamped intro length
    pub intro: Duration,

    /// Clamped outro length
    pub outro: Duration,
}

impl ScheduledTrack {
    /// Whether the track is audible at `offset`
    pub fn covers(&self, offset: Duration) -> bool {
        offset >= self.start && offset < self.end
    }
}

/// Ordered list of tracks
///
/// With `use_loops` set, appending the track that is already last extends that
/// entry instead of adding a new one, so "loop this clip three times" becomes a
/// single entry three times as long.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AudioQueue {
    #[serde(default)]
    use_loops: bool,

    #[serde(default)]
    tracks: Vec<AudioTrack>,
}

impl AudioQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty queue that folds repeats and wraps around
    pub fn looping() -> Self {
        Self {
            use_loops: true,
            tracks: Vec::new(),
        }
    }

    /// Build a queue from tracks, folding repeats when `use_loops` is set
    pub fn from_tracks(tracks: impl IntoIterator<Item = AudioTrack>, use_loops: bool) -> Self {
        let mut queue = Self {
            use_loops,
            tracks: Vec::new(),
        };
        for track in tracks {
            queue.push(track);
        }
        queue
    }

    /// Queue holding a single track
    pub fn single(track: AudioTrack) -> Self {
        Self::from_tracks([track], false)
    }

    /// Append a track
    pub fn push(&mut self, track: AudioTrack) {
        if self.use_loops {
            if let Some(last) = self.tracks.last_mut() {
                // A looped range cannot be played as one native loop
                if last.id() == track.id() && last.range().is_none() && track.range().is_none() {
                    last.extend_by(&track);
                    tracing::debug!(
                        "Folded repeat of '{}' into loop entry ({:.1}s)",
                        last.name(),
                        last.duration().as_secs_f64()
                    );
                    return;
                }
            }
        }
        self.tracks.push(track);
    }

    /// Append a track with fade overrides (`None` keeps the track's own)
    pub fn push_with(&mut self, track: &AudioTrack, intro: Option<Segue>, outro: Option<Segue>) {
        self.push(track.adjusting_segues(intro, outro));
    }

    /// Append a stretch of silence
    pub fn push_silence(&mut self, duration: Duration) {
        self.push(AudioTrack::silence(duration));
    }

    /// Remove all tracks
    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&AudioTrack> {
        self.tracks.get(index)
    }

    pub fn tracks(&self) -> &[AudioTrack] {
        &self.tracks
    }

    pub fn last(&self) -> Option<&AudioTrack> {
        self.tracks.last()
    }

    /// Index of the entry with the same identity as `track`
    pub fn position(&self, track: &AudioTrack) -> Option<usize> {
        self.tracks.iter().position(|t| t == track)
    }

    pub fn use_loops(&self) -> bool {
        self.use_loops
    }

    /// Toggle looping (existing entries are not refolded)
    pub fn set_use_loops(&mut self, use_loops: bool) {
        self.use_loops = use_loops;
    }

    /// A loop queue with a single entry, looped natively by its player
    pub fn is_single_loop(&self) -> bool {
        self.use_loops && self.tracks.len() == 1
    }

    /// Index played after `current` (`None` = start of the queue)
    ///
    /// Wraps to the first entry when looping; otherwise `None` past the end.
    pub fn next_index(&self, current: Option<usize>) -> Option<usize> {
        if self.tracks.is_empty() {
            return None;
        }
        let next = current.map_or(0, |index| index + 1);
        if next < self.tracks.len() {
            Some(next)
        } else if self.use_loops {
            Some(0)
        } else {
            None
        }
    }

    /// Entry following `track`, without wrapping
    pub fn track_after(&self, track: &AudioTrack) -> Option<&AudioTrack> {
        let index = self.position(track)?;
        self.tracks.get(index + 1)
    }

    /// Total playback time of one pass
    ///
    /// Loop queues report one full cycle, including the overlap from the
    /// last entry back into the first.
    pub fn total_duration(&self, timing: &QueueTiming) -> Duration {
        if self.use_loops {
            return self.cycle_length(timing);
        }

        let last = self.tracks.len().saturating_sub(1);
        self.tracks
            .iter()
            .enumerate()
            .map(|(index, track)| {
                let mut duration = track.effective_duration();
                if timing.cross_fade && index != 0 {
                    duration = duration.saturating_sub(timing.intro_duration(track) / 2);
                }
                if timing.cross_fade && index != last {
                    duration = duration.saturating_sub(timing.outro_duration(track) / 2);
                }
                duration
            })
            .sum()
    }

    /// Offset (relative to the start of entry `index`) at which the next entry starts
    ///
    /// `eff − (outro + next_intro) / 2` when cross-fading into a following entry,
    /// the entry's full effective duration otherwise.
    pub fn transition_time(&self, index: usize, timing: &QueueTiming) -> Duration {
        let Some(track) = self.tracks.get(index) else {
            return Duration::ZERO;
        };
        let duration = track.effective_duration();
        if !timing.cross_fade || self.is_single_loop() {
            return duration;
        }
        let Some(next) = self
            .next_index(Some(index))
            .and_then(|next| self.tracks.get(next))
        else {
            return duration;
        };

        let overlap = (timing.outro_duration(track) + timing.intro_duration(next)) / 2;
        duration.saturating_sub(overlap)
    }

    /// Lay out one pass of the queue on a timeline starting at zero
    pub fn schedule(&self, timing: &QueueTiming) -> Vec<ScheduledTrack> {
        let mut start = Duration::ZERO;
        self.tracks
            .iter()
            .enumerate()
            .map(|(index, track)| {
                let transition = self.transition_time(index, timing);
                let entry = ScheduledTrack {
                    index,
                    start,
                    transition_at: start + transition,
                    end: start + track.effective_duration(),
                    intro: timing.intro_duration(track),
                    outro: timing.outro_duration(track),
                };
                start += transition;
                entry
            })
            .collect()
    }

    /// Length of one full cycle of a loop queue
    fn cycle_length(&self, timing: &QueueTiming) -> Duration {
        (0..self.tracks.len())
            .map(|index| self.transition_time(index, timing))
            .sum()
    }

    /// Entry playing at `offset` into the queue, with the offset into that entry
    ///
    /// During an overlap the incoming entry wins. Loop queues wrap the offset
    /// around one cycle.
    pub fn track_at(&self, offset: Duration, timing: &QueueTiming) -> Option<(usize, Duration)> {
        let schedule = self.schedule(timing);
        let offset = if self.use_loops {
            let cycle = self.cycle_length(timing);
            if cycle.is_zero() {
                return None;
            }
            Duration::from_nanos((offset.as_nanos() % cycle.as_nanos()) as u64)
        } else {
            offset
        };

        schedule
            .iter()
            .rev()
            .find(|entry| entry.covers(offset))
            .map(|entry| (entry.index, offset - entry.start))
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON, folding repeats and filling in missing names
    pub fn from_json(json: &str) -> Result<Self> {
        let parsed: AudioQueue = serde_json::from_str(json)?;
        let tracks = parsed.tracks.into_iter().map(|mut track| {
            track.ensure_name();
            track
        });
        Ok(Self::from_tracks(tracks, parsed.use_loops))
    }

    /// Write the queue to a JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Read a queue from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

impl std::ops::Index<usize> for AudioQueue {
    type Output = AudioTrack;

    fn index(&self, index: usize) -> &Self::Output {
        &self.tracks[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::PlayRange;
    use url::Url;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn track(name: &str, duration: u64) -> AudioTrack {
        AudioTrack::new(
            Url::parse(&format!("file:///audio/{}.wav", name)).unwrap(),
            secs(duration),
        )
    }

    #[test]
    fn loop_queue_folds_repeats() {
        let clip = track("clip", 4);
        let mut queue = AudioQueue::looping();
        queue.push(clip.clone());
        queue.push(clip.clone());
        queue.push(clip);

        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].duration(), secs(12));
        assert!(queue.is_single_loop());
    }

    #[test]
    fn plain_queue_keeps_repeats() {
        let clip = track("clip", 4);
        let queue = AudioQueue::from_tracks([clip.clone(), clip], false);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn folding_only_applies_to_last_entry() {
        let a = track("a", 3);
        let b = track("b", 5);
        let queue = AudioQueue::from_tracks([a.clone(), b, a], true);
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn total_duration_without_cross_fade_is_plain_sum() {
        let queue = AudioQueue::from_tracks([track("a", 10), track("b", 8)], false);
        let timing = QueueTiming::new(false, None, None);
        assert_eq!(queue.total_duration(&timing), secs(18));
    }

    #[test]
    fn total_duration_subtracts_half_overlaps() {
        let a = track("a", 10).with_outro(Segue::Linear(secs(2)));
        let b = track("b", 8).with_intro(Segue::Linear(secs(2)));
        let queue = AudioQueue::from_tracks([a, b], false);

        let timing = QueueTiming::default();
        assert_eq!(queue.total_duration(&timing), secs(16));
        assert_eq!(queue.transition_time(0, &timing), secs(8));
        assert_eq!(queue.transition_time(1, &timing), secs(8));
    }

    #[test]
    fn defaults_fill_missing_segues() {
        let queue = AudioQueue::from_tracks([track("a", 10), track("b", 10), track("c", 10)], false);
        let timing = QueueTiming::new(true, Some(Segue::Linear(secs(4))), Some(Segue::Abrupt));

        // Each boundary overlaps (0 + 4) / 2
        assert_eq!(queue.total_duration(&timing), secs(26));

        // Without defaults the 2s timing fallback applies
        assert_eq!(queue.total_duration(&QueueTiming::default()), secs(26));
    }

    #[test]
    fn loop_queue_reports_one_cycle() {
        let queue = AudioQueue::from_tracks([track("a", 10), track("b", 6)], true);
        // 2s fallback fades overlap at a->b and at the wrap b->a
        assert_eq!(queue.total_duration(&QueueTiming::default()), secs(12));
        assert_eq!(
            queue.total_duration(&QueueTiming::new(false, None, None)),
            secs(16)
        );

        let single = AudioQueue::from_tracks([track("a", 10)], true);
        assert_eq!(single.total_duration(&QueueTiming::default()), secs(10));
    }

    #[test]
    fn ranged_repeats_stay_separate_entries() {
        let clip = track("clip", 30).with_range(PlayRange::new(secs(5), secs(15)));
        let mut queue = AudioQueue::looping();
        queue.push(clip.clone());
        queue.push(clip.clone());

        assert_eq!(queue.len(), 2);
        assert!(!queue.is_single_loop());
        assert_eq!(queue[0].range(), clip.range());
        assert_eq!(queue[1].effective_duration(), secs(10));
    }

    #[test]
    fn next_index_wraps_only_when_looping() {
        let tracks = [track("a", 1), track("b", 1)];
        let plain = AudioQueue::from_tracks(tracks.clone(), false);
        let looped = AudioQueue::from_tracks(tracks, true);

        assert_eq!(plain.next_index(None), Some(0));
        assert_eq!(plain.next_index(Some(0)), Some(1));
        assert_eq!(plain.next_index(Some(1)), None);
        assert_eq!(looped.next_index(Some(1)), Some(0));
        assert_eq!(AudioQueue::new().next_index(None), None);
    }

    #[test]
    fn schedule_aligns_fade_midpoints() {
        let a = track("a", 10).with_outro(Segue::Linear(secs(2)));
        let b = track("b", 8).with_intro(Segue::Linear(secs(2)));
        let queue = AudioQueue::from_tracks([a, b], false);
        let schedule = queue.schedule(&QueueTiming::default());

        assert_eq!(schedule[1].start, secs(8));
        assert_eq!(schedule[0].end, secs(10));
        assert_eq!(schedule[1].end, secs(16));

        let outro_mid = schedule[0].end - schedule[0].outro / 2;
        let intro_mid = schedule[1].start + schedule[1].intro / 2;
        assert_eq!(outro_mid, intro_mid);
    }

    #[test]
    fn track_at_prefers_incoming_track() {
        let queue = AudioQueue::from_tracks([track("a", 10), track("b", 10)], false);
        let timing = QueueTiming::default();

        assert_eq!(queue.track_at(secs(3), &timing), Some((0, secs(3))));
        // b starts at 8s (2s fades on both sides)
        assert_eq!(queue.track_at(secs(9), &timing), Some((1, secs(1))));
        assert_eq!(queue.track_at(secs(30), &timing), None);
    }

    #[test]
    fn track_at_wraps_loop_queues() {
        let queue = AudioQueue::from_tracks([track("a", 5), track("b", 5)], true);
        let timing = QueueTiming::new(false, None, None);
        assert_eq!(queue.track_at(secs(12), &timing), Some((0, secs(2))));
    }

    #[test]
    fn track_after_does_not_wrap() {
        let a = track("a", 1);
        let b = track("b", 1);
        let queue = AudioQueue::from_tracks([a.clone(), b.clone()], true);
        assert_eq!(queue.track_after(&a), Some(&b));
        assert_eq!(queue.track_after(&b), None);
    }

    #[test]
    fn push_with_overrides_segues() {
        let mut queue = AudioQueue::new();
        queue.push_with(&track("a", 10), Some(Segue::Abrupt), None);
        assert_eq!(queue[0].intro(), Some(Segue::Abrupt));
        assert_eq!(queue[0].outro(), None);
    }

    #[test]
    fn json_round_trip_keeps_identity_and_segues() {
        let a = track("a", 10).with_outro(Segue::ConstantPower(secs(3)));
        let mut queue = AudioQueue::new();
        queue.push(a.clone());
        queue.push_silence(secs(2));

        let restored = AudioQueue::from_json(&queue.to_json().unwrap()).unwrap();
        assert_eq!(restored.len(), 2);
        assert_eq!(restored[0], a);
        assert_eq!(restored[0].outro(), Some(Segue::ConstantPower(secs(3))));
        assert!(restored[1].is_silence());
    }

    #[test]
    fn json_defaults_for_sparse_entries() {
        let json = r#"{
            "tracks": [
                {"url": "file:///audio/rain.wav", "duration": 30.0,
                 "intro": {"name": "swoosh"}}
            ]
        }"#;
        let queue = AudioQueue::from_json(json).unwrap();
        let rain = &queue[0];

        assert!(!queue.use_loops());
        assert_eq!(rain.name(), "rain");
        assert_eq!(rain.volume(), 1.0);
        assert_eq!(rain.intro(), Some(Segue::Linear(secs(5))));
        assert_eq!(rain.outro(), None);
    }
}
