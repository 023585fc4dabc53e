/// Real-time rehearsal of a queue
use crate::config::CliConfig;
use crate::error::Result;
use cadence_core::{AudioQueue, Transition};
use cadence_playback::{EngineEvent, MixerHandle, SystemClock, VirtualBackend};
use std::sync::Arc;
use std::time::Duration;

/// Channel the CLI plays on
pub const CHANNEL: &str = "main";

/// How a rehearsal ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The queue ran out
    Finished,
    /// Interrupted by the user
    Stopped,
}

/// One line of output for `event`
pub fn describe(event: &EngineEvent, json: bool) -> String {
    if json {
        return serde_json::to_string(event).unwrap_or_else(|e| format!("{{\"error\":\"{}\"}}", e));
    }
    match event {
        EngineEvent::ChannelStarted { channel, duration, at } => format!(
            "[{:>8.3}] {}: started, {:.2}s scheduled",
            at.as_secs_f64(),
            channel,
            duration.as_secs_f64()
        ),
        EngineEvent::TrackStarted { channel, index, at, .. } => format!(
            "[{:>8.3}] {}: track {} started",
            at.as_secs_f64(),
            channel,
            index + 1
        ),
        EngineEvent::CrossfadeStarted { channel, at, .. } => {
            format!("[{:>8.3}] {}: cross-fading", at.as_secs_f64(), channel)
        }
        EngineEvent::OutroStarted { channel, at, .. } => {
            format!("[{:>8.3}] {}: outro", at.as_secs_f64(), channel)
        }
        EngineEvent::TrackFinished { channel, at, .. } => {
            format!("[{:>8.3}] {}: track finished", at.as_secs_f64(), channel)
        }
        EngineEvent::TrackFailed { channel, index, message, .. } => {
            format!("           {}: track {} skipped: {}", channel, index + 1, message)
        }
        EngineEvent::ChannelPaused { channel, at } => {
            format!("[{:>8.3}] {}: paused", at.as_secs_f64(), channel)
        }
        EngineEvent::ChannelResumed { channel, paused_for } => format!(
            "           {}: resumed after {:.2}s",
            channel,
            paused_for.as_secs_f64()
        ),
        EngineEvent::MuteChanged { channel, factor } => {
            format!("           {}: mute {:.0}%", channel, factor * 100.0)
        }
        EngineEvent::ChannelEnded { channel, elapsed, at } => format!(
            "[{:>8.3}] {}: ended after {:.2}s",
            at.as_secs_f64(),
            channel,
            elapsed.as_secs_f64()
        ),
        EngineEvent::ChannelStopped { channel } => format!("           {}: stopped", channel),
        EngineEvent::InterruptionBegan { paused } => {
            format!("           interruption, paused {:?}", paused)
        }
        EngineEvent::InterruptionEnded { resumed } => {
            format!("           interruption over, resumed {:?}", resumed)
        }
        EngineEvent::Progress {
            channel,
            elapsed,
            remaining,
            ..
        } => format!(
            "           {}: {:.1}s elapsed, {:.1}s left",
            channel,
            elapsed.as_secs_f64(),
            remaining.as_secs_f64()
        ),
    }
}

/// Whether `event` closes the session on `channel`
fn is_terminal(event: &EngineEvent, channel: &str) -> bool {
    matches!(
        event,
        EngineEvent::ChannelEnded { channel: c, .. } | EngineEvent::ChannelStopped { channel: c }
            if c == channel
    )
}

/// Engine wired to the wall clock and the silent backend
pub fn engine(config: &CliConfig) -> MixerHandle {
    let clock = SystemClock::shared();
    let backend = VirtualBackend::new(clock.clone());
    MixerHandle::new(Arc::new(backend), clock, config.engine.clone())
}

/// Play `queue` in real time, printing events until it ends or ctrl-c
pub async fn rehearse(
    handle: MixerHandle,
    queue: AudioQueue,
    config: &CliConfig,
    mut emit: impl FnMut(String),
) -> Result<Outcome> {
    handle.with(|mixer| {
        let channel = mixer.channel(CHANNEL);
        channel.set_queue(queue);
        channel.play_track(None, Transition::DEFAULT, None);
    });

    let mut tick = tokio::time::interval(config.engine.tick_interval());
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut progress = tokio::time::interval(progress_period(config));
    progress.tick().await;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = tick.tick() => {
                handle.tick();
            }
            _ = progress.tick(), if config.output.progress => {
                handle.with(|mixer| mixer.emit_progress());
            }
            _ = &mut ctrl_c => {
                tracing::info!("Interrupted, stopping playback");
                handle.with(|mixer| mixer.stop());
                for event in handle.drain_events() {
                    emit(describe(&event, config.output.json));
                }
                return Ok(Outcome::Stopped);
            }
        }

        let mut finished = false;
        for event in handle.drain_events() {
            finished |= is_terminal(&event, CHANNEL);
            emit(describe(&event, config.output.json));
        }
        if finished {
            return Ok(Outcome::Finished);
        }
    }
}

fn progress_period(config: &CliConfig) -> Duration {
    config.engine.progress_interval().max(Duration::from_millis(1))
}
