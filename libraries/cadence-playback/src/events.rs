//! Engine events
//!
//! Channels and the mixer queue events as they happen; the host collects
//! them with `drain_events()` after each tick. Time fields are engine time
//! (the instant the event was scheduled for, not the tick that noticed it).

use cadence_core::serde_secs;
use cadence_core::TrackId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Events emitted by the playback engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngineEvent {
    /// Channel began playing its queue
    ChannelStarted {
        channel: String,
        /// Expected length of the session
        #[serde(with = "serde_secs")]
        duration: Duration,
        #[serde(with = "serde_secs")]
        at: Duration,
    },

    /// A queue entry started
    TrackStarted {
        channel: String,
        track_id: TrackId,
        index: usize,
        #[serde(with = "serde_secs")]
        at: Duration,
    },

    /// Outgoing and incoming tracks now overlap
    CrossfadeStarted {
        channel: String,
        from_track_id: TrackId,
        to_track_id: TrackId,
        #[serde(with = "serde_secs")]
        at: Duration,
    },

    /// A track began its outro fade
    OutroStarted {
        channel: String,
        track_id: TrackId,
        #[serde(with = "serde_secs")]
        at: Duration,
    },

    /// A track reached its end
    TrackFinished {
        channel: String,
        track_id: TrackId,
        #[serde(with = "serde_secs")]
        at: Duration,
    },

    /// A track could not be opened and was skipped
    TrackFailed {
        channel: String,
        track_id: TrackId,
        index: usize,
        message: String,
    },

    /// Pause fade finished and playback is frozen
    ChannelPaused {
        channel: String,
        #[serde(with = "serde_secs")]
        at: Duration,
    },

    /// Playback continued after a pause
    ChannelResumed {
        channel: String,
        /// How long the channel stood still
        #[serde(with = "serde_secs")]
        paused_for: Duration,
    },

    /// Mute or duck level changed
    MuteChanged { channel: String, factor: f64 },

    /// The queue ran out
    ChannelEnded {
        channel: String,
        #[serde(with = "serde_secs")]
        elapsed: Duration,
        #[serde(with = "serde_secs")]
        at: Duration,
    },

    /// Playback was stopped by the caller
    ChannelStopped { channel: String },

    /// Host audio session was interrupted
    InterruptionBegan {
        /// Channels paused because of it
        paused: Vec<String>,
    },

    /// Host audio session came back
    InterruptionEnded {
        /// Channels resumed because of it
        resumed: Vec<String>,
    },

    /// Periodic position report
    Progress {
        channel: String,
        #[serde(with = "serde_secs")]
        elapsed: Duration,
        #[serde(with = "serde_secs")]
        remaining: Duration,
        #[serde(with = "serde_secs")]
        duration: Duration,
    },
}

impl EngineEvent {
    /// Channel the event concerns, if any
    pub fn channel(&self) -> Option<&str> {
        match self {
            EngineEvent::ChannelStarted { channel, .. }
            | EngineEvent::TrackStarted { channel, .. }
            | EngineEvent::CrossfadeStarted { channel, .. }
            | EngineEvent::OutroStarted { channel, .. }
            | EngineEvent::TrackFinished { channel, .. }
            | EngineEvent::TrackFailed { channel, .. }
            | EngineEvent::ChannelPaused { channel, .. }
            | EngineEvent::ChannelResumed { channel, .. }
            | EngineEvent::MuteChanged { channel, .. }
            | EngineEvent::ChannelEnded { channel, .. }
            | EngineEvent::ChannelStopped { channel }
            | EngineEvent::Progress { channel, .. } => Some(channel),
            EngineEvent::InterruptionBegan { .. } | EngineEvent::InterruptionEnded { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_accessor() {
        let event = EngineEvent::ChannelStopped {
            channel: "ambience".to_string(),
        };
        assert_eq!(event.channel(), Some("ambience"));
        assert_eq!(
            EngineEvent::InterruptionEnded { resumed: vec![] }.channel(),
            None
        );
    }

    #[test]
    fn durations_serialize_as_seconds() {
        let event = EngineEvent::ChannelPaused {
            channel: "music".to_string(),
            at: Duration::from_millis(2500),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"ChannelPaused":{"channel":"music","at":2.5}}"#);
    }
}
