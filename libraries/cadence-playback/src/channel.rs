//! Channel: one queue, sequential and cross-faded playback
//!
//! A channel keeps at most two players alive: the current one and the one
//! fading out behind it. When a third track arrives before the fading-out
//! player has finished, that oldest player is cut off.
//!
//! # Scheduling
//!
//! The next-track transition is a single deadline (`will_transition_at`) on
//! the channel's pause-aware local time. For a track with effective duration
//! `d` followed by another, it sits at
//!
//! ```text
//! d − (outro + next_intro) / 2
//! ```
//!
//! so the midpoint of the outgoing outro lines up with the midpoint of the
//! incoming intro. Pausing stops local time, which moves the deadline later by
//! exactly the length of the pause.
//!
//! `tick()` fires every deadline that is due, earliest first, each at its own
//! scheduled instant. When a player timer and the transition share an instant,
//! the player goes first.

use crate::backend::SharedBackend;
use crate::clock::SharedClock;
use crate::config::EngineConfig;
use crate::error::{PlaybackError, Result};
use crate::events::EngineEvent;
use crate::player::{Player, PlayerEvent};
use crate::state::PlayerState;
use crate::timeline::Timeline;
use crate::transport::{Completion, Reporting, Transport};
use cadence_core::{AudioQueue, AudioTrack, QueueTiming, Segue, Transition};
use std::fmt;
use std::time::Duration;

/// Upper bound on timers fired by a single tick
const MAX_STEPS_PER_TICK: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Slot {
    FadingOut,
    Current,
    PauseLanding,
    Transition,
}

/// Named playback lane with its own queue
pub struct Channel {
    name: String,
    backend: SharedBackend,
    clock: SharedClock,
    queue: AudioQueue,

    // Fade settings
    cross_fade: bool,
    default_intro: Option<Segue>,
    default_outro: Option<Segue>,
    mixer_intro: Segue,
    mixer_outro: Segue,
    session_outro: Option<Segue>,
    pause_fade: Segue,
    resume_fade: Segue,
    duck_factor: f64,
    duck_segue: Segue,

    // Players
    current_index: Option<usize>,
    current: Option<Player>,
    fading_out: Option<Player>,

    // Time accounting (local time)
    timeline: Timeline,
    started_at: Option<Duration>,
    elapsed_base: Duration,
    current_duration: Duration,
    will_transition_at: Option<Duration>,
    pause_landed: bool,

    mute_factor: f64,
    on_end: Option<Completion>,
    on_pause: Option<Completion>,
    ready: Vec<Completion>,
    deferred: bool,
    pending_events: Vec<EngineEvent>,
}

impl Channel {
    /// Create a channel with default settings
    pub fn new(name: impl Into<String>, backend: SharedBackend, clock: SharedClock) -> Self {
        Self::with_config(name, backend, clock, &EngineConfig::default())
    }

    /// Create a channel using the fades in `config`
    pub fn with_config(
        name: impl Into<String>,
        backend: SharedBackend,
        clock: SharedClock,
        config: &EngineConfig,
    ) -> Self {
        Self {
            name: name.into(),
            backend,
            clock,
            queue: AudioQueue::new(),
            cross_fade: config.cross_fade,
            default_intro: None,
            default_outro: None,
            mixer_intro: config.default_intro,
            mixer_outro: config.default_outro,
            session_outro: None,
            pause_fade: config.pause_fade,
            resume_fade: config.resume_fade,
            duck_factor: config.duck_factor,
            duck_segue: config.duck_segue,
            current_index: None,
            current: None,
            fading_out: None,
            timeline: Timeline::new(),
            started_at: None,
            elapsed_base: Duration::ZERO,
            current_duration: Duration::ZERO,
            will_transition_at: None,
            pause_landed: false,
            mute_factor: 0.0,
            on_end: None,
            on_pause: None,
            ready: Vec::new(),
            deferred: false,
            pending_events: Vec::new(),
        }
    }

    // ===== Settings =====

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cross_fade(&self) -> bool {
        self.cross_fade
    }

    /// Overlap neighbouring tracks
    pub fn set_cross_fade(&mut self, cross_fade: bool) {
        self.cross_fade = cross_fade;
        self.refresh_duration();
    }

    /// Channel-level intro (`None` inherits the mixer's)
    pub fn set_default_intro(&mut self, intro: Option<Segue>) {
        self.default_intro = intro;
        self.refresh_duration();
    }

    /// Channel-level outro (`None` inherits the mixer's)
    pub fn set_default_outro(&mut self, outro: Option<Segue>) {
        self.default_outro = outro;
        self.refresh_duration();
    }

    pub(crate) fn set_mixer_segues(&mut self, intro: Segue, outro: Segue) {
        self.mixer_intro = intro;
        self.mixer_outro = outro;
        self.refresh_duration();
    }

    /// Intro used for tracks without their own
    pub fn inherited_intro(&self) -> Segue {
        self.default_intro.unwrap_or(self.mixer_intro)
    }

    /// Outro used for tracks without their own
    pub fn inherited_outro(&self) -> Segue {
        self.default_outro.unwrap_or(self.mixer_outro)
    }

    /// Fade settings the queue is timed with
    pub fn timing(&self) -> QueueTiming {
        QueueTiming::new(
            self.cross_fade,
            Some(self.inherited_intro()),
            Some(self.session_outro.unwrap_or_else(|| self.inherited_outro())),
        )
    }

    // ===== Queue =====

    pub fn queue(&self) -> &AudioQueue {
        &self.queue
    }

    /// Replace the queue; a running session continues into the new entries
    pub fn set_queue(&mut self, queue: AudioQueue) {
        self.queue = queue;
        self.refresh_duration();
    }

    /// Append a track with optional fade overrides
    pub fn enqueue(&mut self, track: &AudioTrack, intro: Option<Segue>, outro: Option<Segue>) {
        self.queue.push_with(track, intro, outro);
        self.refresh_duration();
    }

    /// Append a stretch of silence
    pub fn enqueue_silence(&mut self, duration: Duration) {
        self.queue.push_silence(duration);
        self.refresh_duration();
    }

    /// Stop and empty the queue
    pub fn clear_queue(&mut self) {
        self.stop();
        self.queue.clear();
    }

    /// Queue entry audible `offset` into the session
    pub fn track_at(&self, offset: Duration) -> Option<&AudioTrack> {
        self.queue
            .track_at(offset, &self.timing())
            .and_then(|(index, _)| self.queue.get(index))
    }

    /// Entry queued after `track`
    pub fn track_after(&self, track: &AudioTrack) -> Option<&AudioTrack> {
        self.queue.track_after(track)
    }

    fn refresh_duration(&mut self) {
        if self.is_started() {
            self.current_duration = self.queue.total_duration(&self.timing());
        }
    }

    // ===== Transport =====

    /// Start the queue, or resume it when paused
    ///
    /// With a `track`, the queue is replaced by that single track first (and
    /// any running session is stopped). `completion` fires when the queue runs
    /// out.
    pub fn play_track(
        &mut self,
        track: Option<AudioTrack>,
        transition: Transition,
        completion: Option<Completion>,
    ) {
        let now = self.clock.now();
        if let Some(track) = track {
            if self.is_started() {
                self.teardown();
            }
            self.queue = AudioQueue::single(track);
        }

        if self.timeline.is_paused() {
            self.resume_at(Some(transition.intro), now);
            if completion.is_some() {
                self.on_end = completion;
            }
        } else if self.is_started() {
            if completion.is_some() {
                self.on_end = completion;
            }
        } else {
            self.begin(transition, completion, now);
        }
        self.settle();
    }

    fn begin(&mut self, transition: Transition, completion: Option<Completion>, now: Duration) {
        self.session_outro = transition.outro;
        self.timeline = Timeline::new();
        self.pause_landed = false;
        self.started_at = Some(self.timeline.local(now));
        self.elapsed_base = Duration::ZERO;
        self.current_index = None;
        self.current_duration = self.queue.total_duration(&self.timing());
        self.on_end = completion;
        self.announce(now);

        self.start_next_track(Some(transition.intro), now);
    }

    fn announce(&mut self, now: Duration) {
        tracing::info!(
            "Channel '{}': starting {} track(s), {:.2}s",
            self.name,
            self.queue.len(),
            self.current_duration.as_secs_f64()
        );
        self.pending_events.push(EngineEvent::ChannelStarted {
            channel: self.name.clone(),
            duration: self.current_duration,
            at: now,
        });
    }

    /// Pause, fading out over `outro` (clamped to the time remaining)
    pub fn pause_at(&mut self, outro: Option<Segue>, completion: Option<Completion>, now: Duration) {
        if !self.is_started() || self.timeline.is_paused() {
            self.ready.extend(completion);
            self.settle();
            return;
        }

        let outro = outro.unwrap_or(self.pause_fade);
        let fade = outro.duration().min(self.time_remaining_at(now));
        let outro = outro.normalized(fade);

        self.timeline.pause_at(now + fade);
        self.pause_landed = false;
        self.on_pause = completion;
        for player in self.players_mut() {
            player.suspend(outro, None, now);
        }

        tracing::info!(
            "Channel '{}': pausing over {:.2}s with {:.2}s remaining",
            self.name,
            fade.as_secs_f64(),
            self.time_remaining_at(now).as_secs_f64()
        );

        if fade.is_zero() {
            self.land_pause(now);
        }
        self.settle();
    }

    /// Resume after a pause, fading in over `intro`
    ///
    /// Pending timers move later by the time spent paused.
    pub fn resume_at(&mut self, intro: Option<Segue>, now: Duration) {
        if !self.timeline.is_paused() {
            return;
        }
        let intro = intro.unwrap_or(self.resume_fade);
        let paused_for = self.timeline.resume(now);
        self.pause_landed = false;
        self.on_pause = None;
        for player in self.players_mut() {
            player.resume(intro, now);
        }

        tracing::info!(
            "Channel '{}': resumed after {:.2}s, {:.2}s remaining",
            self.name,
            paused_for.as_secs_f64(),
            self.time_remaining_at(now).as_secs_f64()
        );
        self.pending_events.push(EngineEvent::ChannelResumed {
            channel: self.name.clone(),
            paused_for,
        });
    }

    /// Resume with the channel's resume fade
    pub fn resume(&mut self) {
        let now = self.clock.now();
        self.resume_at(None, now);
    }

    /// Stop everything immediately
    pub fn stop(&mut self) {
        if !self.is_started() && self.current.is_none() && self.fading_out.is_none() {
            return;
        }
        self.teardown();
        self.on_end = None;
        tracing::info!("Channel '{}': stopped", self.name);
        self.pending_events.push(EngineEvent::ChannelStopped {
            channel: self.name.clone(),
        });
    }

    /// Pause when playing, play otherwise
    pub fn toggle(&mut self) {
        if self.is_playing() {
            Transport::pause(self, None, None);
        } else {
            self.play_track(None, Transition::DEFAULT, None);
        }
    }

    /// Jump to `offset` into the session
    ///
    /// The covering track restarts mid-way with a short intro; the other
    /// players are cut.
    pub fn seek(&mut self, offset: Duration) -> Result<()> {
        let now = self.clock.now();
        self.seek_at(offset, now)
    }

    pub fn seek_at(&mut self, offset: Duration, now: Duration) -> Result<()> {
        if self.queue.is_empty() {
            return Err(PlaybackError::QueueEmpty);
        }
        let timing = self.timing();
        let (index, into) = self
            .queue
            .track_at(offset, &timing)
            .ok_or(PlaybackError::InvalidSeekPosition(offset))?;

        let was_started = self.is_started();
        let on_end = self.on_end.take();
        let session_outro = self.session_outro;
        self.teardown();
        self.session_outro = session_outro;
        self.on_end = on_end;

        self.timeline = Timeline::new();
        self.started_at = Some(self.timeline.local(now));
        self.elapsed_base = offset;
        self.current_duration = self.queue.total_duration(&timing);
        self.current_index = Some(index);
        if !was_started {
            self.announce(now);
        }

        tracing::info!(
            "Channel '{}': seeking to {:.2}s (track {} at {:.2}s)",
            self.name,
            offset.as_secs_f64(),
            index,
            into.as_secs_f64()
        );

        match self.launch(index, into, Some(Segue::DEFAULT), now) {
            Ok(player) => self.adopt(index, into, player, now),
            Err(e) => {
                self.report_failure(index, &e);
                self.start_next_track(None, now);
            }
        }
        self.settle();
        Ok(())
    }

    /// Set the mute factor on every live player
    ///
    /// Ramps over `segue` while playing, applies instantly otherwise. New
    /// players inherit the factor.
    pub fn set_mute_at(&mut self, factor: f64, segue: Option<Segue>, now: Duration) {
        let factor = factor.clamp(0.0, 1.0);
        self.mute_factor = factor;
        let segue = if self.is_playing() {
            segue.unwrap_or(Segue::DEFAULT)
        } else {
            Segue::Abrupt
        };
        for player in self.players_mut() {
            player.set_mute(factor, segue, now);
        }
        self.pending_events.push(EngineEvent::MuteChanged {
            channel: self.name.clone(),
            factor,
        });
    }

    /// Duck to the configured factor
    pub fn duck(&mut self, segue: Option<Segue>) {
        let now = self.clock.now();
        self.set_mute_at(self.duck_factor, segue.or(Some(self.duck_segue)), now);
    }

    /// Undo ducking
    pub fn unduck(&mut self, segue: Option<Segue>) {
        let now = self.clock.now();
        self.set_mute_at(0.0, segue.or(Some(self.duck_segue)), now);
    }

    /// Silence the channel
    pub fn silence(&mut self, segue: Option<Segue>) {
        Transport::mute(self, 1.0, segue);
    }

    /// Make the channel audible again
    pub fn unmute(&mut self, segue: Option<Segue>) {
        Transport::mute(self, 0.0, segue);
    }

    pub fn mute_factor(&self) -> f64 {
        self.mute_factor
    }

    // ===== Scheduling =====

    fn start_next_track(&mut self, first_intro: Option<Segue>, at: Duration) {
        self.will_transition_at = None;

        // Third track in flight: cut the oldest
        if let Some(mut oldest) = self.fading_out.take() {
            if !oldest.state().is_idle() {
                tracing::debug!(
                    "Channel '{}': cutting '{}' short",
                    self.name,
                    oldest.track().name()
                );
            }
            oldest.reset();
        }
        self.fading_out = self.current.take();

        let mut failures = 0;
        loop {
            let Some(index) = self.queue.next_index(self.current_index) else {
                self.ended(at);
                return;
            };
            self.current_index = Some(index);

            match self.launch(index, Duration::ZERO, first_intro, at) {
                Ok(player) => {
                    self.adopt(index, Duration::ZERO, player, at);
                    return;
                }
                Err(e) => {
                    self.report_failure(index, &e);
                    failures += 1;
                    if failures >= self.queue.len() {
                        tracing::warn!(
                            "Channel '{}': no playable track left in the queue",
                            self.name
                        );
                        self.ended(at);
                        return;
                    }
                }
            }
        }
    }

    fn launch(
        &self,
        index: usize,
        position: Duration,
        intro_override: Option<Segue>,
        at: Duration,
    ) -> Result<Player> {
        let track = self.queue[index].clone();
        let timing = self.timing();
        let intro = track
            .intro()
            .or(intro_override)
            .unwrap_or_else(|| self.inherited_intro());
        let outro = timing.outro_for(&track);

        let mut player = Player::load(track, &self.name, self.backend.clone(), self.clock.clone());
        player.set_mute(self.mute_factor, Segue::Abrupt, at);
        player.start_from(position, Transition::new(intro, Some(outro)), None, at)?;
        Ok(player)
    }

    fn adopt(&mut self, index: usize, position: Duration, mut player: Player, at: Duration) {
        if self.queue.is_single_loop() {
            player.enable_native_loop();
        } else {
            let transition = self.queue.transition_time(index, &self.timing());
            let local = self.timeline.local(at);
            self.will_transition_at = Some(local + transition.saturating_sub(position));
        }

        // Started inside a pause fade: follow the channel down
        if let Some(paused_at) = self.timeline.paused_at() {
            let fade = paused_at.saturating_sub(at);
            player.suspend(Segue::Linear(fade), None, at);
        }

        let track_id = player.track().id();
        tracing::info!(
            "Channel '{}': playing '{}' ({}/{})",
            self.name,
            player.track().name(),
            index + 1,
            self.queue.len()
        );
        if let Some(outgoing) = self.fading_out.as_ref() {
            if !outgoing.state().is_idle() {
                self.pending_events.push(EngineEvent::CrossfadeStarted {
                    channel: self.name.clone(),
                    from_track_id: outgoing.track().id(),
                    to_track_id: track_id,
                    at,
                });
            }
        }
        self.pending_events.push(EngineEvent::TrackStarted {
            channel: self.name.clone(),
            track_id,
            index,
            at,
        });
        self.current = Some(player);
    }

    fn report_failure(&mut self, index: usize, error: &PlaybackError) {
        let track = &self.queue[index];
        tracing::warn!(
            "Channel '{}': skipping '{}': {}",
            self.name,
            track.name(),
            error
        );
        self.pending_events.push(EngineEvent::TrackFailed {
            channel: self.name.clone(),
            track_id: track.id(),
            index,
            message: error.to_string(),
        });
    }

    fn land_pause(&mut self, at: Duration) {
        self.pause_landed = true;
        self.pending_events.push(EngineEvent::ChannelPaused {
            channel: self.name.clone(),
            at,
        });
        self.ready.extend(self.on_pause.take());
    }

    fn ended(&mut self, at: Duration) {
        if !self.is_started() {
            return;
        }
        let elapsed = self.time_elapsed_at(at).unwrap_or_default();
        self.teardown();

        tracing::info!(
            "Channel '{}': ended after {:.2}s",
            self.name,
            elapsed.as_secs_f64()
        );
        self.pending_events.push(EngineEvent::ChannelEnded {
            channel: self.name.clone(),
            elapsed,
            at,
        });
        self.ready.extend(self.on_end.take());
    }

    fn teardown(&mut self) {
        for player in self.players_mut() {
            player.reset();
        }
        self.current = None;
        self.fading_out = None;
        self.current_index = None;
        self.will_transition_at = None;
        self.started_at = None;
        self.elapsed_base = Duration::ZERO;
        self.timeline = Timeline::new();
        self.pause_landed = false;
        self.session_outro = None;
        self.on_pause = None;
    }

    fn next_due(&self) -> Option<(Duration, Slot)> {
        let landing = self
            .timeline
            .paused_at()
            .filter(|_| self.is_started() && !self.pause_landed);
        let transition = self.next_transition();

        [
            (
                self.fading_out.as_ref().and_then(Player::next_deadline),
                Slot::FadingOut,
            ),
            (
                self.current.as_ref().and_then(Player::next_deadline),
                Slot::Current,
            ),
            (landing, Slot::PauseLanding),
            (transition, Slot::Transition),
        ]
        .into_iter()
        .filter_map(|(deadline, slot)| deadline.map(|at| (at, slot)))
        .min()
    }

    /// Fire everything due by the clock's current time
    pub fn tick(&mut self) {
        let now = self.clock.now();
        self.tick_at(now);
    }

    /// Fire everything due by `now`, then update player volumes
    pub fn tick_at(&mut self, now: Duration) {
        for _ in 0..MAX_STEPS_PER_TICK {
            let Some((at, slot)) = self.next_due().filter(|(at, _)| *at <= now) else {
                break;
            };
            match slot {
                Slot::FadingOut => {
                    let event = self.fading_out.as_mut().and_then(|p| p.fire_due(at));
                    if let Some(event) = event {
                        self.on_player_event(true, event, at);
                    }
                }
                Slot::Current => {
                    let event = self.current.as_mut().and_then(|p| p.fire_due(at));
                    if let Some(event) = event {
                        self.on_player_event(false, event, at);
                    }
                }
                Slot::PauseLanding => self.land_pause(at),
                Slot::Transition => self.start_next_track(None, at),
            }
        }

        for player in self.players_mut() {
            player.apply_volume(now);
        }
        self.settle();
    }

    // ===== Completions =====

    /// Run finished completions, unless an owner collects them
    fn settle(&mut self) {
        if !self.deferred {
            for completion in std::mem::take(&mut self.ready) {
                completion();
            }
        }
    }

    /// Hold completions until the owner takes them
    pub(crate) fn defer_completions(&mut self) {
        self.deferred = true;
    }

    /// Completions whose operation has finished
    pub(crate) fn take_completions(&mut self) -> Vec<Completion> {
        std::mem::take(&mut self.ready)
    }

    fn on_player_event(&mut self, fading_out: bool, event: PlayerEvent, at: Duration) {
        let slot = if fading_out {
            &mut self.fading_out
        } else {
            &mut self.current
        };
        let Some(track_id) = slot.as_ref().map(|p| p.track().id()) else {
            return;
        };

        match event {
            PlayerEvent::OutroStarted => {
                self.pending_events.push(EngineEvent::OutroStarted {
                    channel: self.name.clone(),
                    track_id,
                    at,
                });
            }
            PlayerEvent::Finished => {
                *slot = None;
                self.pending_events.push(EngineEvent::TrackFinished {
                    channel: self.name.clone(),
                    track_id,
                    at,
                });
            }
            PlayerEvent::IntroFinished | PlayerEvent::Paused => {}
        }
    }

    // ===== Reporting =====

    fn players(&self) -> impl Iterator<Item = &Player> {
        self.current.iter().chain(self.fading_out.iter())
    }

    fn players_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.current.iter_mut().chain(self.fading_out.iter_mut())
    }

    /// Whether a session is running (playing or paused)
    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn current_track(&self) -> Option<&AudioTrack> {
        self.current.as_ref().map(Player::track)
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    /// Live players (current first)
    pub fn live_players(&self) -> usize {
        self.players().count()
    }

    /// Expected length of the running session
    pub fn current_duration(&self) -> Duration {
        self.current_duration
    }

    /// Local time of the pending transition
    pub fn will_transition_at(&self) -> Option<Duration> {
        self.will_transition_at
    }

    /// Engine time the pending transition will fire at, if not suspended
    ///
    /// Once a pause has landed, a transition due at the pause instant waits
    /// for the resume.
    pub fn next_transition(&self) -> Option<Duration> {
        self.will_transition_at
            .filter(|local| self.timeline.reachable(*local))
            .map(|local| self.timeline.global(local))
            .filter(|at| !self.pause_landed || self.timeline.paused_at() != Some(*at))
    }

    /// Session time elapsed at `now`, pauses excluded
    pub fn time_elapsed_at(&self, now: Duration) -> Option<Duration> {
        let started_at = self.started_at?;
        Some(self.timeline.local(now).saturating_sub(started_at) + self.elapsed_base)
    }

    /// Session time left at `now`
    pub fn time_remaining_at(&self, now: Duration) -> Duration {
        self.time_elapsed_at(now).map_or(Duration::ZERO, |elapsed| {
            self.current_duration.saturating_sub(elapsed)
        })
    }

    /// Session time elapsed now
    pub fn time_elapsed(&self) -> Option<Duration> {
        self.time_elapsed_at(self.clock.now())
    }

    /// Output gain of each live player at `now`
    pub fn levels(&self, now: Duration) -> Vec<(AudioTrack, f64)> {
        self.players()
            .map(|player| (player.track().clone(), player.effective_volume(now)))
            .collect()
    }

    /// Queue a progress report
    pub fn emit_progress(&mut self) {
        let now = self.clock.now();
        if let Some(elapsed) = self.time_elapsed_at(now) {
            self.pending_events.push(EngineEvent::Progress {
                channel: self.name.clone(),
                elapsed,
                remaining: self.time_remaining_at(now),
                duration: self.current_duration,
            });
        }
    }

    /// Take all events queued since the last call
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }
}

impl Transport for Channel {
    fn play(&mut self, transition: Transition, completion: Option<Completion>) -> Result<()> {
        self.play_track(None, transition, completion);
        Ok(())
    }

    fn pause(&mut self, outro: Option<Segue>, completion: Option<Completion>) {
        let now = self.clock.now();
        self.pause_at(outro, completion, now);
    }

    fn mute(&mut self, factor: f64, segue: Option<Segue>) {
        let now = self.clock.now();
        self.set_mute_at(factor, segue, now);
    }

    fn reset(&mut self) {
        self.stop();
    }
}

impl Reporting for Channel {
    fn state(&self) -> PlayerState {
        let mut state = self
            .players()
            .fold(PlayerState::IDLE, |acc, player| acc | player.state());
        state.remove(PlayerState::MUTED | PlayerState::DUCKED | PlayerState::PAUSED);
        state.set(PlayerState::PAUSED, self.timeline.is_paused());
        let muted = self.mute_factor >= 1.0;
        state.set(PlayerState::MUTED, muted);
        state.set(PlayerState::DUCKED, !muted && self.mute_factor > 0.0);
        state
    }

    fn time_remaining(&self) -> Duration {
        self.time_remaining_at(self.clock.now())
    }

    fn active_tracks(&self) -> Vec<AudioTrack> {
        self.players().flat_map(Reporting::active_tracks).collect()
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("name", &self.name)
            .field("tracks", &self.queue.len())
            .field("current_index", &self.current_index)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
