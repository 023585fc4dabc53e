//! Mixer: named channels sharing one clock and backend
//!
//! The mixer fans transport commands out to every channel, hands down default
//! segues, and handles host audio-session interruptions: channels that were
//! playing when an interruption began are paused abruptly and resumed when it
//! ends, while channels the user had paused stay paused.

use crate::backend::SharedBackend;
use crate::channel::Channel;
use crate::clock::SharedClock;
use crate::config::EngineConfig;
use crate::error::{PlaybackError, Result};
use crate::events::EngineEvent;
use crate::state::PlayerState;
use crate::transport::{Completion, Reporting, Transport};
use cadence_core::{AudioTrack, Segue, Transition};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Owner of every channel
pub struct Mixer {
    channels: HashMap<String, Channel>,
    backend: SharedBackend,
    clock: SharedClock,
    config: EngineConfig,
    default_intro: Segue,
    default_outro: Segue,
    interrupted: Vec<String>,
    ready: Vec<Completion>,
    deferred: bool,
    pending_events: Vec<EngineEvent>,
}

impl Mixer {
    /// Create an empty mixer
    pub fn new(backend: SharedBackend, clock: SharedClock, config: EngineConfig) -> Self {
        tracing::debug!(
            "Mixer: tick {}ms, cross-fade {}, intro {}, outro {}",
            config.tick_interval_ms,
            config.cross_fade,
            config.default_intro,
            config.default_outro
        );
        Self {
            channels: HashMap::new(),
            backend,
            clock,
            default_intro: config.default_intro,
            default_outro: config.default_outro,
            config,
            interrupted: Vec::new(),
            ready: Vec::new(),
            deferred: false,
            pending_events: Vec::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Engine time now
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    // ===== Channels =====

    /// Channel named `name`, created on first use
    ///
    /// Completions passed straight to the channel run on the mixer's next
    /// tick (or when a [`MixerHandle`](crate::MixerHandle) call returns).
    pub fn channel(&mut self, name: &str) -> &mut Channel {
        let Self {
            channels,
            backend,
            clock,
            config,
            default_intro,
            default_outro,
            ..
        } = self;
        channels.entry(name.to_string()).or_insert_with(|| {
            tracing::debug!("Mixer: creating channel '{}'", name);
            let mut channel = Channel::with_config(name, backend.clone(), clock.clone(), config);
            channel.set_mixer_segues(*default_intro, *default_outro);
            channel.defer_completions();
            channel
        })
    }

    /// Existing channel
    pub fn get_channel(&self, name: &str) -> Option<&Channel> {
        self.channels.get(name)
    }

    /// Existing channel, or `ChannelNotFound`
    pub fn channel_mut(&mut self, name: &str) -> Result<&mut Channel> {
        self.channels
            .get_mut(name)
            .ok_or_else(|| PlaybackError::ChannelNotFound(name.to_string()))
    }

    /// Stop and drop a channel
    pub fn remove_channel(&mut self, name: &str) -> Result<()> {
        let mut channel = self
            .channels
            .remove(name)
            .ok_or_else(|| PlaybackError::ChannelNotFound(name.to_string()))?;
        channel.stop();
        self.ready.extend(channel.take_completions());
        self.pending_events.extend(channel.drain_events());
        self.interrupted.retain(|n| n != name);
        Ok(())
    }

    /// Channel names, sorted
    pub fn channel_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.channels.keys().cloned().collect();
        names.sort();
        names
    }

    fn sorted_channels_mut(&mut self) -> Vec<&mut Channel> {
        let mut channels: Vec<&mut Channel> = self.channels.values_mut().collect();
        channels.sort_by(|a, b| a.name().cmp(b.name()));
        channels
    }

    // ===== Defaults =====

    pub fn default_intro(&self) -> Segue {
        self.default_intro
    }

    pub fn default_outro(&self) -> Segue {
        self.default_outro
    }

    /// Change the segues channels inherit
    pub fn set_default_segues(&mut self, intro: Segue, outro: Segue) {
        self.default_intro = intro;
        self.default_outro = outro;
        for channel in self.channels.values_mut() {
            channel.set_mixer_segues(intro, outro);
        }
    }

    // ===== Transport fan-out =====

    /// Play a channel's queue, or a single track on it
    pub fn play_on(
        &mut self,
        name: &str,
        track: Option<AudioTrack>,
        transition: Transition,
        completion: Option<Completion>,
    ) {
        self.channel(name).play_track(track, transition, completion);
        self.settle();
    }

    /// Start every channel
    pub fn start(&mut self) {
        for channel in self.channels.values_mut() {
            channel.play_track(None, Transition::DEFAULT, None);
        }
        self.settle();
    }

    /// Stop every channel
    pub fn stop(&mut self) {
        for channel in self.channels.values_mut() {
            channel.stop();
        }
        self.interrupted.clear();
        self.settle();
    }

    /// Resume every paused channel
    pub fn resume(&mut self, intro: Option<Segue>) {
        let now = self.clock.now();
        for channel in self.channels.values_mut() {
            channel.resume_at(intro, now);
        }
        self.interrupted.clear();
        self.settle();
    }

    /// Duck every channel
    pub fn duck(&mut self, segue: Option<Segue>) {
        for channel in self.channels.values_mut() {
            channel.duck(segue);
        }
    }

    /// Undo ducking on every channel
    pub fn unduck(&mut self, segue: Option<Segue>) {
        for channel in self.channels.values_mut() {
            channel.unduck(segue);
        }
    }

    /// Make every channel audible again
    pub fn unmute(&mut self, segue: Option<Segue>) {
        Transport::mute(self, 0.0, segue);
    }

    // ===== Interruptions =====

    /// Host session interrupted: freeze what is playing
    pub fn interruption_began(&mut self) {
        let now = self.clock.now();
        let mut paused = Vec::new();
        for channel in self.sorted_channels_mut() {
            if channel.is_playing() {
                channel.pause_at(Some(Segue::Abrupt), None, now);
                paused.push(channel.name().to_string());
            }
        }

        tracing::info!("Mixer: interruption began, paused {:?}", paused);
        for name in &paused {
            if !self.interrupted.contains(name) {
                self.interrupted.push(name.clone());
            }
        }
        self.pending_events
            .push(EngineEvent::InterruptionBegan { paused });
        self.settle();
    }

    /// Host session back: resume what the interruption paused
    ///
    /// Channels paused by the user (before or during the interruption) are
    /// left alone.
    pub fn interruption_ended(&mut self) {
        let now = self.clock.now();
        let mut resumed = Vec::new();
        for name in std::mem::take(&mut self.interrupted) {
            if let Some(channel) = self.channels.get_mut(&name) {
                if channel.is_paused() {
                    channel.resume_at(None, now);
                    resumed.push(name);
                }
            }
        }

        tracing::info!("Mixer: interruption ended, resumed {:?}", resumed);
        self.pending_events
            .push(EngineEvent::InterruptionEnded { resumed });
    }

    /// Channels waiting for an interruption to end
    pub fn interrupted(&self) -> &[String] {
        &self.interrupted
    }

    /// Record a user pause so the interruption does not undo it
    pub fn pause_channel(&mut self, name: &str, outro: Option<Segue>) -> Result<()> {
        self.interrupted.retain(|n| n != name);
        let channel = self.channel_mut(name)?;
        Transport::pause(channel, outro, None);
        self.settle();
        Ok(())
    }

    // ===== Driving =====

    /// Advance every channel to the clock's current time
    pub fn tick(&mut self) {
        let now = self.clock.now();
        self.tick_at(now);
    }

    /// Advance every channel to `now`
    pub fn tick_at(&mut self, now: Duration) {
        for channel in self.channels.values_mut() {
            channel.tick_at(now);
        }
        self.settle();
    }

    /// Queue a progress report for every running channel
    pub fn emit_progress(&mut self) {
        for channel in self.sorted_channels_mut() {
            channel.emit_progress();
        }
    }

    /// Take every queued event: the mixer's own first, then per channel by name
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        let mut events = std::mem::take(&mut self.pending_events);
        for channel in self.sorted_channels_mut() {
            events.extend(channel.drain_events());
        }
        events
    }

    // ===== Completions =====

    /// Gather channel completions and run them, unless a handle collects them
    fn settle(&mut self) {
        if self.deferred {
            return;
        }
        for completion in self.take_completions() {
            completion();
        }
    }

    /// Hold completions until [`take_completions`](Self::take_completions)
    pub(crate) fn defer_completions(&mut self) {
        self.deferred = true;
    }

    /// Completions whose operation has finished, the mixer's own first
    pub(crate) fn take_completions(&mut self) -> Vec<Completion> {
        let mut completions = std::mem::take(&mut self.ready);
        for channel in self.sorted_channels_mut() {
            completions.extend(channel.take_completions());
        }
        completions
    }

    /// One completion per channel; `completion` runs once all of them have
    fn fan_out(&mut self, completion: Option<Completion>) -> Vec<Completion> {
        match completion {
            None => Vec::new(),
            Some(completion) if self.channels.is_empty() => {
                self.ready.push(completion);
                Vec::new()
            }
            Some(completion) => countdown(completion, self.channels.len()),
        }
    }
}

/// Split `completion` into `parts` completions; it runs after the last one
fn countdown(completion: Completion, parts: usize) -> Vec<Completion> {
    let remaining = Arc::new(AtomicUsize::new(parts));
    let slot = Arc::new(Mutex::new(Some(completion)));
    (0..parts)
        .map(|_| {
            let remaining = Arc::clone(&remaining);
            let slot = Arc::clone(&slot);
            Box::new(move || {
                if remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
                    let completion = slot.lock().take();
                    if let Some(completion) = completion {
                        completion();
                    }
                }
            }) as Completion
        })
        .collect()
}

impl Transport for Mixer {
    /// Play every channel; `completion` runs once all of them have ended
    fn play(&mut self, transition: Transition, completion: Option<Completion>) -> Result<()> {
        let mut parts = self.fan_out(completion).into_iter();
        for channel in self.channels.values_mut() {
            channel.play_track(None, transition, parts.next());
        }
        self.settle();
        Ok(())
    }

    /// Pause every channel; `completion` runs once every pause has landed
    fn pause(&mut self, outro: Option<Segue>, completion: Option<Completion>) {
        let now = self.clock.now();
        let mut parts = self.fan_out(completion).into_iter();
        for channel in self.channels.values_mut() {
            channel.pause_at(outro, parts.next(), now);
        }
        self.interrupted.clear();
        self.settle();
    }

    fn mute(&mut self, factor: f64, segue: Option<Segue>) {
        let now = self.clock.now();
        for channel in self.channels.values_mut() {
            channel.set_mute_at(factor, segue, now);
        }
    }

    fn reset(&mut self) {
        self.stop();
    }
}

impl Reporting for Mixer {
    fn state(&self) -> PlayerState {
        self.channels
            .values()
            .fold(PlayerState::IDLE, |acc, channel| acc | channel.state())
    }

    fn time_remaining(&self) -> Duration {
        self.channels
            .values()
            .map(Reporting::time_remaining)
            .max()
            .unwrap_or_default()
    }

    fn active_tracks(&self) -> Vec<AudioTrack> {
        let mut names: Vec<&String> = self.channels.keys().collect();
        names.sort();
        names
            .into_iter()
            .filter_map(|name| self.channels.get(name))
            .flat_map(Reporting::active_tracks)
            .collect()
    }

    fn is_playing(&self) -> bool {
        self.channels.values().any(Reporting::is_playing)
    }

    fn is_paused(&self) -> bool {
        !self.channels.is_empty() && self.channels.values().all(Reporting::is_paused)
    }

    /// Muted only when every channel is
    fn is_muted(&self) -> bool {
        !self.channels.is_empty() && self.channels.values().all(Reporting::is_muted)
    }
}

impl fmt::Debug for Mixer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mixer")
            .field("channels", &self.channel_names())
            .field("interrupted", &self.interrupted)
            .finish_non_exhaustive()
    }
}
