//! Single-track player
//!
//! Wraps one native player and owns everything time-dependent about it: the
//! intro/outro fade, the pause/resume ramp, the mute ramp and the end-of-track
//! timers. Nothing here runs on its own. The owner asks for the next deadline,
//! fires it at its exact instant, and re-applies the volume on every tick.
//!
//! Volume model:
//!
//! ```text
//! effective = track volume × fade × transport × (1 − mute)
//! ```
//!
//! - `fade` (intro/outro) runs on the player's pause-aware local time, so a
//!   pause freezes it mid-ramp.
//! - `transport` (pause fade-out, resume fade-in) and `mute` run on engine time,
//!   independent of play state.

use crate::backend::{NativePlayer, SharedBackend};
use crate::clock::SharedClock;
use crate::error::Result;
use crate::state::PlayerState;
use crate::timeline::Timeline;
use crate::transport::{Completion, Reporting, Transport};
use cadence_core::{AudioTrack, FadeCurve, Segue, Transition, VolumeRamp};
use std::fmt;
use std::time::Duration;

/// Something a player's timer did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    /// Intro fade reached full volume
    IntroFinished,
    /// Outro fade began
    OutroStarted,
    /// Track reached its end and the player went idle
    Finished,
    /// Pause fade ended and the native player is frozen
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Timer {
    IntroDone,
    Outro,
    Finish,
    PauseLanding,
}

/// Plays one track
pub struct Player {
    track: AudioTrack,
    channel: String,
    backend: SharedBackend,
    clock: SharedClock,
    native: Option<Box<dyn NativePlayer>>,
    state: PlayerState,
    timeline: Timeline,

    // Anchors on local time
    started_at: Option<Duration>,
    start_position: Duration,

    // Deadlines on local time
    intro_done_at: Option<Duration>,
    outro_at: Option<Duration>,
    finish_at: Option<Duration>,
    outro: Segue,

    fade: VolumeRamp,
    transport: VolumeRamp,
    mute: VolumeRamp,
    mute_factor: f64,

    native_loop: bool,
    pause_landed: bool,
    on_finish: Option<Completion>,
    on_pause: Option<Completion>,
}

impl Player {
    /// Bind `track` to a player owned by `channel`
    ///
    /// Nothing is opened yet. A missing file is only logged here; playback
    /// reports it when the player is preloaded.
    pub fn load(
        track: AudioTrack,
        channel: &str,
        backend: SharedBackend,
        clock: SharedClock,
    ) -> Self {
        if let Some(path) = track.file_path() {
            if !path.exists() {
                tracing::warn!(
                    "Channel '{}': audio file missing for '{}': {}",
                    channel,
                    track.name(),
                    path.display()
                );
            }
        }

        Self {
            track,
            channel: channel.to_string(),
            backend,
            clock,
            native: None,
            state: PlayerState::IDLE,
            timeline: Timeline::new(),
            started_at: None,
            start_position: Duration::ZERO,
            intro_done_at: None,
            outro_at: None,
            finish_at: None,
            outro: Segue::Abrupt,
            fade: VolumeRamp::settled(0.0),
            transport: VolumeRamp::settled(1.0),
            mute: VolumeRamp::settled(0.0),
            mute_factor: 0.0,
            native_loop: false,
            pause_landed: false,
            on_finish: None,
            on_pause: None,
        }
    }

    /// Open and prepare the native player
    ///
    /// Never opens anything for the silence track. When the track is longer
    /// than the file (folded loop entries) the native player loops.
    pub fn preload(&mut self) -> Result<()> {
        if self.track.is_silence() || self.native.is_some() {
            return Ok(());
        }

        let mut native = self.backend.open(self.track.url()).map_err(|e| {
            tracing::warn!(
                "Channel '{}': cannot open '{}': {}",
                self.channel,
                self.track.name(),
                e
            );
            e
        })?;
        native.prepare()?;

        if !native.duration().is_zero() && self.track.duration() > native.duration() {
            tracing::debug!(
                "'{}' runs {:.1}s over a {:.1}s file, looping natively",
                self.track.name(),
                self.track.duration().as_secs_f64(),
                native.duration().as_secs_f64()
            );
            native.set_looping(true);
        }
        native.set_volume(0.0, None);

        self.native = Some(native);
        Ok(())
    }

    /// Start from the beginning
    pub fn start(
        &mut self,
        transition: Transition,
        completion: Option<Completion>,
        now: Duration,
    ) -> Result<()> {
        self.start_from(Duration::ZERO, transition, completion, now)
    }

    /// Start `position` into the track
    pub fn start_from(
        &mut self,
        position: Duration,
        transition: Transition,
        completion: Option<Completion>,
        now: Duration,
    ) -> Result<()> {
        self.preload()?;

        self.timeline = Timeline::new();
        self.pause_landed = false;
        self.on_pause = None;
        self.transport = VolumeRamp::settled(1.0);
        self.state.remove(PlayerState::PAUSED | PlayerState::OUTROING);

        let local = self.timeline.local(now);
        let intro = self.track.duration_of(Some(&transition.intro));
        if intro.is_zero() {
            self.fade = VolumeRamp::settled(1.0);
            self.intro_done_at = None;
            self.state.remove(PlayerState::INTROING);
        } else {
            self.fade = VolumeRamp::new(0.0, 1.0, local, intro, transition.intro.curve());
            self.intro_done_at = Some(local + intro);
            self.state.insert(PlayerState::INTROING);
        }
        self.state.insert(PlayerState::PLAYING);

        self.outro = match transition.outro {
            Some(outro) => outro.normalized(self.track.duration_of(Some(&outro))),
            None => Segue::Abrupt,
        };
        self.on_finish = completion;
        self.rebase(position, local);

        if let Some(native) = self.native.as_mut() {
            let mut offset = self.track.start_offset() + self.start_position;
            if !native.duration().is_zero() && offset >= native.duration() {
                offset = Duration::from_nanos(
                    (offset.as_nanos() % native.duration().as_nanos()) as u64,
                );
            }
            native.set_current_time(offset);
            native.play();
        }

        tracing::debug!(
            "Channel '{}': started '{}' at {:.2}s (intro {:.2}s, outro {:.2}s)",
            self.channel,
            self.track.name(),
            self.start_position.as_secs_f64(),
            intro.as_secs_f64(),
            self.outro.duration().as_secs_f64()
        );

        self.apply_volume(now);
        Ok(())
    }

    /// Anchor playback so `position` is reached at local time `local`
    fn rebase(&mut self, position: Duration, local: Duration) {
        let length = self.track.effective_duration();
        self.start_position = position.min(length);
        self.started_at = Some(local);

        if self.native_loop {
            self.outro_at = None;
            self.finish_at = None;
            return;
        }

        let remaining = length - self.start_position;
        self.outro_at = self
            .outro
            .exists()
            .then(|| local + remaining.saturating_sub(self.outro.duration()));
        self.finish_at = Some(local + remaining);
    }

    /// Loop forever on the native player, with no end timers
    pub fn enable_native_loop(&mut self) {
        self.native_loop = true;
        self.outro_at = None;
        self.finish_at = None;
        if let Some(native) = self.native.as_mut() {
            native.set_looping(true);
        }
    }

    /// Jump to `position` within the track
    pub fn seek(&mut self, position: Duration, now: Duration) {
        if self.started_at.is_none() {
            return;
        }
        let local = self.timeline.local(now);
        if self.state.contains(PlayerState::OUTROING) {
            self.state.remove(PlayerState::OUTROING);
            self.fade = VolumeRamp::settled(self.fade.value_at(local));
        }
        self.rebase(position, local);
        if let Some(native) = self.native.as_mut() {
            native.set_current_time(self.track.start_offset() + self.start_position);
        }
        self.apply_volume(now);
    }

    /// Fade out over `outro`, then freeze
    ///
    /// Timers stop at the instant the fade completes; `completion` fires then.
    pub fn suspend(&mut self, outro: Segue, completion: Option<Completion>, now: Duration) {
        if !self.state.contains(PlayerState::PLAYING) || self.timeline.is_paused() {
            if let Some(completion) = completion {
                completion();
            }
            return;
        }

        let duration = outro.duration();
        self.transport = VolumeRamp::new(
            self.transport.value_at(now),
            0.0,
            now,
            duration,
            outro.curve(),
        );
        self.timeline.pause_at(now + duration);
        self.state.insert(PlayerState::PAUSED);
        self.pause_landed = false;
        self.on_pause = completion;

        if duration.is_zero() {
            self.land_pause();
        }
        self.apply_volume(now);
    }

    /// Continue after a pause, fading back in over `intro`
    pub fn resume(&mut self, intro: Segue, now: Duration) {
        if !self.timeline.is_paused() {
            return;
        }

        let paused_for = self.timeline.resume(now);
        self.transport = VolumeRamp::new(
            self.transport.value_at(now),
            1.0,
            now,
            intro.duration(),
            intro.curve(),
        );
        self.state.remove(PlayerState::PAUSED);
        self.on_pause = None;

        if self.pause_landed {
            if let Some(native) = self.native.as_mut() {
                native.play();
            }
        }
        self.pause_landed = false;

        tracing::debug!(
            "Channel '{}': resumed '{}' after {:.2}s",
            self.channel,
            self.track.name(),
            paused_for.as_secs_f64()
        );
        self.apply_volume(now);
    }

    /// Ramp the mute factor to `factor` over `segue`
    pub fn set_mute(&mut self, factor: f64, segue: Segue, now: Duration) {
        let factor = factor.clamp(0.0, 1.0);
        self.mute = VolumeRamp::new(
            self.mute.value_at(now),
            factor,
            now,
            segue.duration(),
            segue.curve(),
        );
        self.mute_factor = factor;
        let muted = factor >= 1.0;
        self.state.set(PlayerState::MUTED, muted);
        self.state.set(PlayerState::DUCKED, !muted && factor > 0.0);
        self.apply_volume(now);
    }

    fn land_pause(&mut self) -> PlayerEvent {
        if let Some(native) = self.native.as_mut() {
            native.pause();
        }
        self.pause_landed = true;
        if let Some(completion) = self.on_pause.take() {
            completion();
        }
        PlayerEvent::Paused
    }

    fn finish(&mut self) -> PlayerEvent {
        tracing::debug!(
            "Channel '{}': '{}' finished",
            self.channel,
            self.track.name()
        );
        self.release();
        self.state.remove(
            PlayerState::INTROING
                | PlayerState::PLAYING
                | PlayerState::OUTROING
                | PlayerState::PAUSED,
        );
        if let Some(completion) = self.on_finish.take() {
            completion();
        }
        PlayerEvent::Finished
    }

    fn release(&mut self) {
        if let Some(mut native) = self.native.take() {
            native.stop();
        }
        self.intro_done_at = None;
        self.outro_at = None;
        self.finish_at = None;
        self.started_at = None;
    }

    // ===== Scheduling =====

    fn pending(&self) -> Option<(Duration, Timer)> {
        let local_timers = [
            (self.intro_done_at, Timer::IntroDone),
            (self.outro_at, Timer::Outro),
            (self.finish_at, Timer::Finish),
        ];
        let landing = self
            .timeline
            .paused_at()
            .filter(|_| !self.pause_landed)
            .map(|at| (at, Timer::PauseLanding));

        local_timers
            .into_iter()
            .filter_map(|(deadline, timer)| {
                deadline
                    .filter(|local| self.timeline.reachable(*local))
                    .map(|local| (self.timeline.global(local), timer))
            })
            .chain(landing)
            .min()
    }

    /// Engine time of the next pending timer
    ///
    /// Timers past the pause point are not pending until playback resumes.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending().map(|(at, _)| at)
    }

    /// Fire the earliest timer if it is due by `at`
    ///
    /// The timer runs at its own scheduled instant, not at `at`.
    pub fn fire_due(&mut self, at: Duration) -> Option<PlayerEvent> {
        let (deadline, timer) = self.pending().filter(|(deadline, _)| *deadline <= at)?;
        let local = self.timeline.local(deadline);

        let event = match timer {
            Timer::IntroDone => {
                self.intro_done_at = None;
                self.state.remove(PlayerState::INTROING);
                PlayerEvent::IntroFinished
            }
            Timer::Outro => {
                self.outro_at = None;
                self.intro_done_at = None;
                self.state.remove(PlayerState::INTROING);
                self.state.insert(PlayerState::OUTROING);
                self.fade = VolumeRamp::new(
                    self.fade.value_at(local),
                    0.0,
                    local,
                    self.outro.duration(),
                    self.outro.curve(),
                );
                PlayerEvent::OutroStarted
            }
            Timer::Finish => self.finish(),
            Timer::PauseLanding => self.land_pause(),
        };
        Some(event)
    }

    /// Fire everything due by `now` and update the output volume
    pub fn tick(&mut self, now: Duration) -> Vec<PlayerEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.fire_due(now) {
            events.push(event);
        }
        self.apply_volume(now);
        events
    }

    // ===== Levels =====

    /// Output gain at `now`
    pub fn effective_volume(&self, now: Duration) -> f64 {
        if !self.state.contains(PlayerState::PLAYING) {
            return 0.0;
        }
        let local = self.timeline.local(now);
        self.track.volume()
            * self.fade.value_at(local)
            * self.transport.value_at(now)
            * (1.0 - self.mute.value_at(now))
    }

    /// Push the current gain to the native player
    pub fn apply_volume(&mut self, now: Duration) {
        let volume = self.effective_volume(now);
        if let Some(native) = self.native.as_mut() {
            native.set_volume(volume, None);
        }
    }

    // ===== Accessors =====

    pub fn track(&self) -> &AudioTrack {
        &self.track
    }

    /// Name of the owning channel
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Target mute factor
    pub fn mute_factor(&self) -> f64 {
        self.mute_factor
    }

    /// Whether a native player is open
    pub fn is_loaded(&self) -> bool {
        self.native.is_some()
    }

    pub fn is_native_loop(&self) -> bool {
        self.native_loop
    }

    /// Shape of the fade currently applied
    pub fn fade_curve(&self) -> FadeCurve {
        self.fade.curve
    }

    /// Position within the played range at `now`
    pub fn position(&self, now: Duration) -> Duration {
        let Some(started_at) = self.started_at else {
            return Duration::ZERO;
        };
        let played = self.timeline.local(now).saturating_sub(started_at) + self.start_position;
        if self.native_loop {
            played
        } else {
            played.min(self.track.effective_duration())
        }
    }

    /// Time left at `now`
    pub fn remaining(&self, now: Duration) -> Duration {
        if self.started_at.is_none() {
            return Duration::ZERO;
        }
        self.track
            .effective_duration()
            .saturating_sub(self.position(now))
    }
}

impl Transport for Player {
    fn play(&mut self, transition: Transition, completion: Option<Completion>) -> Result<()> {
        let now = self.clock.now();
        if self.timeline.is_paused() {
            self.resume(transition.intro, now);
            if completion.is_some() {
                self.on_finish = completion;
            }
            return Ok(());
        }
        if self.state.contains(PlayerState::PLAYING) {
            return Ok(());
        }
        self.start(transition, completion, now)
    }

    fn pause(&mut self, outro: Option<Segue>, completion: Option<Completion>) {
        let now = self.clock.now();
        let outro = outro.unwrap_or(Segue::DEFAULT);
        let outro = outro.normalized(self.remaining(now));
        self.suspend(outro, completion, now);
    }

    fn mute(&mut self, factor: f64, segue: Option<Segue>) {
        let now = self.clock.now();
        self.set_mute(factor, segue.unwrap_or(Segue::DEFAULT), now);
    }

    fn reset(&mut self) {
        self.release();
        self.timeline = Timeline::new();
        self.state = PlayerState::IDLE;
        self.fade = VolumeRamp::settled(0.0);
        self.transport = VolumeRamp::settled(1.0);
        self.mute = VolumeRamp::settled(0.0);
        self.mute_factor = 0.0;
        self.native_loop = false;
        self.pause_landed = false;
        self.on_finish = None;
        self.on_pause = None;
    }
}

impl Reporting for Player {
    fn state(&self) -> PlayerState {
        self.state
    }

    fn time_remaining(&self) -> Duration {
        self.remaining(self.clock.now())
    }

    fn active_tracks(&self) -> Vec<AudioTrack> {
        if self.state.contains(PlayerState::PLAYING) {
            vec![self.track.clone()]
        } else {
            Vec::new()
        }
    }
}

impl fmt::Debug for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Player")
            .field("track", &self.track.name())
            .field("channel", &self.channel)
            .field("state", &self.state)
            .field("loaded", &self.native.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{NativeOp, VirtualBackend};
    use crate::clock::ManualClock;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use url::Url;

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    struct Rig {
        clock: ManualClock,
        backend: VirtualBackend,
    }

    impl Rig {
        fn new() -> Self {
            let clock = ManualClock::new();
            let backend = VirtualBackend::new(clock.shared());
            Self { clock, backend }
        }

        fn track(&self, name: &str, duration: f64) -> AudioTrack {
            let url = Url::parse(&format!("file:///virtual/{}.wav", name)).unwrap();
            self.backend.register(url.clone(), secs(duration));
            AudioTrack::new(url, secs(duration))
        }

        fn player(&self, track: AudioTrack) -> Player {
            Player::load(
                track,
                "test",
                Arc::new(self.backend.clone()),
                self.clock.shared(),
            )
        }

        fn tick(&self, player: &mut Player, at: f64) -> Vec<PlayerEvent> {
            self.clock.set(secs(at));
            player.tick(secs(at))
        }
    }

    fn linear(s: f64) -> Segue {
        Segue::Linear(secs(s))
    }

    #[test]
    fn intro_then_outro_then_finish() {
        let rig = Rig::new();
        let mut player = rig.player(rig.track("a", 10.0));
        player
            .start(Transition::new(linear(2.0), Some(linear(2.0))), None, secs(0.0))
            .unwrap();

        assert!(player.state().contains(PlayerState::INTROING | PlayerState::PLAYING));
        assert!((player.effective_volume(secs(1.0)) - 0.5).abs() < 1e-9);

        assert_eq!(rig.tick(&mut player, 2.0), vec![PlayerEvent::IntroFinished]);
        assert!(player.state().is_playing_full_on());

        assert_eq!(rig.tick(&mut player, 8.0), vec![PlayerEvent::OutroStarted]);
        assert!(player.state().contains(PlayerState::OUTROING));
        assert!((player.effective_volume(secs(9.0)) - 0.5).abs() < 1e-9);

        assert_eq!(rig.tick(&mut player, 10.0), vec![PlayerEvent::Finished]);
        assert!(player.state().is_idle());
        assert!(!player.is_loaded());
    }

    #[test]
    fn coarse_tick_fires_timers_in_order() {
        let rig = Rig::new();
        let mut player = rig.player(rig.track("a", 10.0));
        player
            .start(Transition::new(linear(2.0), Some(linear(2.0))), None, secs(0.0))
            .unwrap();

        let events = rig.tick(&mut player, 30.0);
        assert_eq!(
            events,
            vec![
                PlayerEvent::IntroFinished,
                PlayerEvent::OutroStarted,
                PlayerEvent::Finished
            ]
        );
    }

    #[test]
    fn zero_length_intro_jumps_to_full_volume() {
        let rig = Rig::new();
        let mut player = rig.player(rig.track("a", 10.0).with_volume(0.8));
        player.start(Transition::ABRUPT, None, secs(0.0)).unwrap();

        assert!(player.state().is_playing_full_on());
        assert_eq!(player.effective_volume(secs(0.0)), 0.8);
        assert_eq!(player.next_deadline(), Some(secs(10.0)));
    }

    #[test]
    fn pause_freezes_timers_and_resume_shifts_them() {
        let rig = Rig::new();
        let mut player = rig.player(rig.track("a", 10.0));
        player.start(Transition::ABRUPT, None, secs(0.0)).unwrap();

        player.suspend(Segue::Abrupt, None, secs(4.0));
        assert!(player.is_paused());
        assert_eq!(player.next_deadline(), None);
        assert_eq!(player.effective_volume(secs(5.0)), 0.0);

        rig.tick(&mut player, 20.0);
        assert_eq!(player.position(secs(20.0)), secs(4.0));

        player.resume(Segue::Abrupt, secs(20.0));
        assert_eq!(player.next_deadline(), Some(secs(26.0)));
        assert_eq!(rig.tick(&mut player, 26.0), vec![PlayerEvent::Finished]);
    }

    #[test]
    fn pause_fade_lands_then_fires_completion() {
        let rig = Rig::new();
        let mut player = rig.player(rig.track("a", 10.0));
        player.start(Transition::ABRUPT, None, secs(0.0)).unwrap();

        let landed = Arc::new(AtomicBool::new(false));
        let flag = landed.clone();
        player.suspend(
            linear(1.0),
            Some(Box::new(move || flag.store(true, Ordering::SeqCst))),
            secs(2.0),
        );

        assert!((player.effective_volume(secs(2.5)) - 0.5).abs() < 1e-9);
        rig.tick(&mut player, 2.5);
        assert!(!landed.load(Ordering::SeqCst));

        assert_eq!(rig.tick(&mut player, 3.0), vec![PlayerEvent::Paused]);
        assert!(landed.load(Ordering::SeqCst));

        // Local time ran through the fade, so 7s remain
        assert_eq!(player.remaining(secs(50.0)), secs(7.0));
    }

    #[test]
    fn mute_scales_volume_without_touching_play_state() {
        let rig = Rig::new();
        let mut player = rig.player(rig.track("a", 10.0).with_volume(0.6));
        player.start(Transition::ABRUPT, None, secs(0.0)).unwrap();

        player.set_mute(0.5, Segue::Abrupt, secs(1.0));
        assert!(player.is_playing());
        assert!(player.state().contains(PlayerState::DUCKED));
        assert!((player.effective_volume(secs(1.0)) - 0.3).abs() < 1e-9);

        player.set_mute(1.0, linear(2.0), secs(2.0));
        assert!(player.state().contains(PlayerState::MUTED));
        assert!((player.effective_volume(secs(3.0)) - 0.6 * 0.25).abs() < 1e-9);
        assert_eq!(player.effective_volume(secs(4.0)), 0.0);
    }

    #[test]
    fn silence_never_opens_native_player() {
        let rig = Rig::new();
        let mut player = rig.player(AudioTrack::silence(secs(5.0)));
        player.start(Transition::DEFAULT, None, secs(0.0)).unwrap();

        assert!(!player.is_loaded());
        assert!(player.is_playing());
        assert!(rig.backend.calls().is_empty());
        assert_eq!(
            rig.tick(&mut player, 5.0).last(),
            Some(&PlayerEvent::Finished)
        );
    }

    #[test]
    fn folded_track_loops_natively_until_end() {
        let rig = Rig::new();
        let clip = rig.track("clip", 3.0);
        let mut queue = cadence_core::AudioQueue::looping();
        queue.push(clip.clone());
        queue.push(clip);

        let mut player = rig.player(queue[0].clone());
        player.start(Transition::ABRUPT, None, secs(0.0)).unwrap();

        let ops: Vec<NativeOp> = rig.backend.calls().into_iter().map(|c| c.op).collect();
        assert!(ops.contains(&NativeOp::Looping(true)));
        assert_eq!(player.next_deadline(), Some(secs(6.0)));
    }

    #[test]
    fn native_loop_has_no_end_timers() {
        let rig = Rig::new();
        let mut player = rig.player(rig.track("a", 4.0));
        player
            .start(Transition::new(Segue::Abrupt, Some(linear(1.0))), None, secs(0.0))
            .unwrap();
        player.enable_native_loop();

        assert_eq!(player.next_deadline(), None);
        assert!(rig.tick(&mut player, 100.0).is_empty());
        assert!(player.is_playing());
    }

    #[test]
    fn seek_rebases_end_timers() {
        let rig = Rig::new();
        let mut player = rig.player(rig.track("a", 10.0));
        player
            .start(Transition::new(Segue::Abrupt, Some(linear(2.0))), None, secs(0.0))
            .unwrap();

        player.seek(secs(7.0), secs(1.0));
        // 3s left: outro at 1 + 1, finish at 1 + 3
        assert_eq!(player.next_deadline(), Some(secs(2.0)));
        assert_eq!(rig.tick(&mut player, 4.0).last(), Some(&PlayerEvent::Finished));
    }

    #[test]
    fn missing_file_fails_preload() {
        let rig = Rig::new();
        let track = AudioTrack::new(
            Url::parse("file:///virtual/not-there.wav").unwrap(),
            secs(3.0),
        );
        let mut player = rig.player(track);
        assert!(matches!(
            player.start(Transition::DEFAULT, None, secs(0.0)),
            Err(crate::error::PlaybackError::FileMissing(_))
        ));
        assert!(player.state().is_idle());
    }

    #[test]
    fn finish_fires_play_completion() {
        let rig = Rig::new();
        let mut player = rig.player(rig.track("a", 2.0));
        let done = Arc::new(AtomicBool::new(false));
        let flag = done.clone();
        player
            .play(
                Transition::ABRUPT,
                Some(Box::new(move || flag.store(true, Ordering::SeqCst))),
            )
            .unwrap();

        rig.tick(&mut player, 2.0);
        assert!(done.load(Ordering::SeqCst));
    }

    #[test]
    fn reset_cancels_everything() {
        let rig = Rig::new();
        let mut player = rig.player(rig.track("a", 10.0));
        player.start(Transition::DEFAULT, None, secs(0.0)).unwrap();
        player.reset();

        assert!(player.state().is_idle());
        assert_eq!(player.next_deadline(), None);
        assert!(!player.is_loaded());
        assert!(rig.tick(&mut player, 20.0).is_empty());
    }
}
