//! Pause-aware local time
//!
//! Timers and fades are stored on a local timeline that stops while paused:
//!
//! ```text
//! local(now) = min(now, paused_at) - total_pause
//! ```
//!
//! Resuming adds the time spent paused to `total_pause`, so every pending
//! deadline moves later by exactly that amount without being touched. A pause
//! can be requested for a future instant (the end of a pause fade); local time
//! keeps running until then.

use std::time::Duration;

/// Local time that freezes while paused
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timeline {
    paused_at: Option<Duration>,
    total_pause: Duration,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Local time at engine time `now`
    pub fn local(&self, now: Duration) -> Duration {
        let frozen = self.paused_at.map_or(now, |paused_at| now.min(paused_at));
        frozen.saturating_sub(self.total_pause)
    }

    /// Engine time at which local time `local` is (or was) reached
    ///
    /// Only meaningful for local times before the current pause point.
    pub fn global(&self, local: Duration) -> Duration {
        local + self.total_pause
    }

    /// Whether `local` can still be reached before the pause point
    pub fn reachable(&self, local: Duration) -> bool {
        self.paused_at
            .map_or(true, |paused_at| self.global(local) <= paused_at)
    }

    /// Stop local time at engine time `at` (no-op while already pausing)
    pub fn pause_at(&mut self, at: Duration) {
        if self.paused_at.is_none() {
            self.paused_at = Some(at);
        }
    }

    /// Restart local time, returning how long it stood still
    ///
    /// Resuming before the pause point was reached costs nothing.
    pub fn resume(&mut self, now: Duration) -> Duration {
        let Some(paused_at) = self.paused_at.take() else {
            return Duration::ZERO;
        };
        let delta = now.saturating_sub(paused_at);
        self.total_pause += delta;
        delta
    }

    /// Engine time at which local time stops (or stopped)
    pub fn paused_at(&self) -> Option<Duration> {
        self.paused_at
    }

    /// Whether a pause has been requested
    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// Whether local time has actually stopped at `now`
    pub fn is_frozen(&self, now: Duration) -> bool {
        self.paused_at.is_some_and(|paused_at| now >= paused_at)
    }

    /// Accumulated pause time
    pub fn total_pause(&self) -> Duration {
        self.total_pause
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn local_tracks_engine_time_until_paused() {
        let mut timeline = Timeline::new();
        assert_eq!(timeline.local(secs(4)), secs(4));

        timeline.pause_at(secs(5));
        assert_eq!(timeline.local(secs(4)), secs(4));
        assert_eq!(timeline.local(secs(9)), secs(5));
        assert!(!timeline.is_frozen(secs(4)));
        assert!(timeline.is_frozen(secs(5)));
    }

    #[test]
    fn resume_shifts_deadlines() {
        let mut timeline = Timeline::new();
        let deadline = secs(8);
        timeline.pause_at(secs(5));

        assert!(!timeline.reachable(deadline));
        assert_eq!(timeline.resume(secs(12)), secs(7));
        assert_eq!(timeline.local(secs(12)), secs(5));
        assert_eq!(timeline.global(deadline), secs(15));
    }

    #[test]
    fn resuming_before_pause_point_costs_nothing() {
        let mut timeline = Timeline::new();
        timeline.pause_at(secs(5));
        assert_eq!(timeline.resume(secs(3)), Duration::ZERO);
        assert_eq!(timeline.local(secs(7)), secs(7));
    }

    #[test]
    fn second_pause_request_keeps_first_point() {
        let mut timeline = Timeline::new();
        timeline.pause_at(secs(5));
        timeline.pause_at(secs(2));
        assert_eq!(timeline.paused_at(), Some(secs(5)));
    }
}
