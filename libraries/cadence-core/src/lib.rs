//! Cadence Core
//!
//! Track, segue and queue timing model for the Cadence playback engine.
//!
//! This crate is pure data and arithmetic: it never touches an audio device and
//! never reads a clock. It provides:
//! - Fade curves and volume ramps (linear, constant power, exponential)
//! - Segues and transitions
//! - Tracks, including the silence placeholder
//! - Queues with loop folding, cross-fade timing and JSON persistence
//! - Duration probing via Symphonia (`probe` feature, on by default)
//!
//! # Example
//!
//! ```rust
//! use cadence_core::{AudioQueue, AudioTrack, QueueTiming, Segue};
//! use std::time::Duration;
//! use url::Url;
//!
//! let a = AudioTrack::new(Url::parse("file:///audio/a.wav").unwrap(), Duration::from_secs(10))
//!     .with_outro(Segue::Linear(Duration::from_secs(2)));
//! let b = AudioTrack::new(Url::parse("file:///audio/b.wav").unwrap(), Duration::from_secs(8))
//!     .with_intro(Segue::Linear(Duration::from_secs(2)));
//!
//! let queue = AudioQueue::from_tracks([a, b], false);
//! let timing = QueueTiming::default();
//!
//! assert_eq!(queue.total_duration(&timing), Duration::from_secs(16));
//! assert_eq!(queue.transition_time(0, &timing), Duration::from_secs(8));
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod fade;
#[cfg(feature = "probe")]
pub mod probe;
pub mod queue;
pub mod segue;
pub mod serde_secs;
pub mod track;

pub use error::{CoreError, Result};
pub use fade::{FadeCurve, VolumeRamp};
#[cfg(feature = "probe")]
pub use probe::{probe_duration, probe_file, ProbeInfo};
pub use queue::{AudioQueue, QueueTiming, ScheduledTrack, TIMING_FALLBACK_SEGUE};
pub use segue::{Segue, Transition, FALLBACK_SEGUE};
pub use track::{AudioTrack, PlayRange, TrackId, SILENCE_URL};
