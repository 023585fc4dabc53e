//! Cadence Playback
//!
//! Multi-channel playback scheduling on top of a host audio primitive.
//!
//! This crate provides:
//! - Players that own one native handle plus its fades and end timers
//! - Channels that play a queue with cross-fades, pauses and seeking
//! - A mixer of named channels with interruption handling and ducking
//! - Deadline scheduling on an injectable clock (real or manual)
//! - A silent virtual backend for tests and rehearsals
//!
//! # Architecture
//!
//! Nothing runs in the background. The host calls `tick()` periodically; each
//! tick fires every deadline that has come due, in chronological order and at
//! its own scheduled instant, then re-evaluates fade ramps and pushes volumes to
//! the native players. Events are queued and collected with `drain_events()`.
//!
//! Audio output (decoding, device I/O) is provided by the host through
//! [`AudioBackend`] and [`NativePlayer`].
//!
//! # Example
//!
//! ```rust
//! use cadence_core::{AudioQueue, AudioTrack, Segue, Transition};
//! use cadence_playback::{EngineConfig, EngineEvent, ManualClock, Mixer, VirtualBackend};
//! use std::sync::Arc;
//! use std::time::Duration;
//! use url::Url;
//!
//! let clock = ManualClock::new();
//! let backend = VirtualBackend::new(clock.shared());
//!
//! let a = Url::parse("file:///audio/a.wav").unwrap();
//! let b = Url::parse("file:///audio/b.wav").unwrap();
//! backend.register(a.clone(), Duration::from_secs(10));
//! backend.register(b.clone(), Duration::from_secs(8));
//!
//! let mut mixer = Mixer::new(Arc::new(backend), clock.shared(), EngineConfig::default());
//! let queue = AudioQueue::from_tracks(
//!     [
//!         AudioTrack::new(a, Duration::from_secs(10)).with_outro(Segue::Linear(Duration::from_secs(2))),
//!         AudioTrack::new(b, Duration::from_secs(8)).with_intro(Segue::Linear(Duration::from_secs(2))),
//!     ],
//!     false,
//! );
//! mixer.channel("music").set_queue(queue);
//! mixer.play_on("music", None, Transition::ABRUPT, None);
//!
//! clock.set(Duration::from_secs(16));
//! mixer.tick();
//!
//! let events = mixer.drain_events();
//! assert!(matches!(
//!     events.last(),
//!     Some(EngineEvent::ChannelEnded { at, .. }) if *at == Duration::from_secs(16)
//! ));
//! ```

#![forbid(unsafe_code)]

pub mod backend;
pub mod channel;
pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod handle;
pub mod mixer;
pub mod player;
pub mod state;
pub mod timeline;
pub mod transport;

pub use backend::{AudioBackend, BackendCall, NativeOp, NativePlayer, SharedBackend, VirtualBackend};
pub use channel::Channel;
pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use config::EngineConfig;
pub use error::{PlaybackError, Result};
pub use events::EngineEvent;
pub use handle::MixerHandle;
pub use mixer::Mixer;
pub use player::{Player, PlayerEvent};
pub use state::PlayerState;
pub use timeline::Timeline;
pub use transport::{Completion, Reporting, Transport};
