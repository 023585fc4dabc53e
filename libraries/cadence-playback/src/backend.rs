//! Native audio primitive
//!
//! The engine never touches samples. It drives a host-provided player per
//! track through [`NativePlayer`] and obtains those players from an
//! [`AudioBackend`].
//!
//! [`VirtualBackend`] is a silent, clock-driven implementation. It records
//! every call so tests can assert on what the engine asked the host to do,
//! and the CLI uses it to rehearse a queue in real time.

use crate::clock::SharedClock;
use crate::error::{PlaybackError, Result};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// One prepared audio file on the host
pub trait NativePlayer: Send {
    /// Length of the underlying file
    fn duration(&self) -> Duration;

    /// Decode headers and buffer enough to start instantly
    fn prepare(&mut self) -> Result<()>;

    fn play(&mut self);

    fn pause(&mut self);

    /// Stop and rewind
    fn stop(&mut self);

    /// Position within the file
    fn current_time(&self) -> Duration;

    /// Seek within the file
    fn set_current_time(&mut self, position: Duration);

    fn volume(&self) -> f64;

    /// Set the output gain, optionally letting the host ramp to it
    fn set_volume(&mut self, volume: f64, fade: Option<Duration>);

    /// Loop the file forever
    fn set_looping(&mut self, looping: bool);
}

/// Factory for native players
pub trait AudioBackend: Send + Sync {
    /// Open the file at `url`
    fn open(&self, url: &Url) -> Result<Box<dyn NativePlayer>>;
}

/// Backend shared between channels
pub type SharedBackend = Arc<dyn AudioBackend>;

// ===== Virtual backend =====

/// Operation recorded by the [`VirtualBackend`]
#[derive(Debug, Clone, PartialEq)]
pub enum NativeOp {
    Open,
    Prepare,
    Play,
    Pause,
    Stop,
    Seek(Duration),
    Looping(bool),
}

/// A recorded call
#[derive(Debug, Clone, PartialEq)]
pub struct BackendCall {
    /// File the call was made for
    pub url: Url,
    /// What was asked
    pub op: NativeOp,
    /// Engine time of the call
    pub at: Duration,
}

#[derive(Debug, Default)]
struct Registry {
    durations: HashMap<Url, Duration>,
    broken: HashSet<Url>,
    calls: Vec<BackendCall>,
}

/// Silent backend driven by the engine clock
#[derive(Clone)]
pub struct VirtualBackend {
    clock: SharedClock,
    registry: Arc<Mutex<Registry>>,
}

impl VirtualBackend {
    /// Create a backend reading time from `clock`
    pub fn new(clock: SharedClock) -> Self {
        Self {
            clock,
            registry: Arc::new(Mutex::new(Registry::default())),
        }
    }

    /// Make `url` openable with the given native duration
    pub fn register(&self, url: Url, duration: Duration) {
        self.registry.lock().durations.insert(url, duration);
    }

    /// Make `url` fail to decode
    pub fn break_url(&self, url: Url) {
        self.registry.lock().broken.insert(url);
    }

    /// Every call recorded so far
    pub fn calls(&self) -> Vec<BackendCall> {
        self.registry.lock().calls.clone()
    }

    /// Recorded calls for one file
    pub fn calls_for(&self, url: &Url) -> Vec<BackendCall> {
        self.registry
            .lock()
            .calls
            .iter()
            .filter(|call| &call.url == url)
            .cloned()
            .collect()
    }

    /// How many times `url` was opened
    pub fn open_count(&self, url: &Url) -> usize {
        self.registry
            .lock()
            .calls
            .iter()
            .filter(|call| &call.url == url && call.op == NativeOp::Open)
            .count()
    }

    /// Forget recorded calls
    pub fn clear_calls(&self) {
        self.registry.lock().calls.clear();
    }

    fn resolve(&self, url: &Url) -> Result<Duration> {
        {
            let registry = self.registry.lock();
            if registry.broken.contains(url) {
                return Err(PlaybackError::decode(format!("cannot decode {}", url)));
            }
            if let Some(duration) = registry.durations.get(url) {
                return Ok(*duration);
            }
        }

        let Some(path) = (url.scheme() == "file")
            .then(|| url.to_file_path().ok())
            .flatten()
        else {
            return Err(PlaybackError::decode(format!("unsupported location {}", url)));
        };
        if !path.exists() {
            return Err(PlaybackError::FileMissing(path.display().to_string()));
        }

        let duration = cadence_core::probe_duration(&path)
            .map_err(|e| PlaybackError::decode(e.to_string()))?;
        self.register(url.clone(), duration);
        Ok(duration)
    }
}

impl AudioBackend for VirtualBackend {
    fn open(&self, url: &Url) -> Result<Box<dyn NativePlayer>> {
        let duration = self.resolve(url)?;
        let player = VirtualPlayer {
            url: url.clone(),
            duration,
            clock: self.clock.clone(),
            registry: self.registry.clone(),
            playing_since: None,
            position: Duration::ZERO,
            volume: 1.0,
            looping: false,
        };
        player.record(NativeOp::Open);
        Ok(Box::new(player))
    }
}

struct VirtualPlayer {
    url: Url,
    duration: Duration,
    clock: SharedClock,
    registry: Arc<Mutex<Registry>>,
    playing_since: Option<Duration>,
    position: Duration,
    volume: f64,
    looping: bool,
}

impl VirtualPlayer {
    fn record(&self, op: NativeOp) {
        self.registry.lock().calls.push(BackendCall {
            url: self.url.clone(),
            op,
            at: self.clock.now(),
        });
    }
}

impl NativePlayer for VirtualPlayer {
    fn duration(&self) -> Duration {
        self.duration
    }

    fn prepare(&mut self) -> Result<()> {
        self.record(NativeOp::Prepare);
        Ok(())
    }

    fn play(&mut self) {
        if self.playing_since.is_none() {
            self.playing_since = Some(self.clock.now());
            self.record(NativeOp::Play);
        }
    }

    fn pause(&mut self) {
        if self.playing_since.is_some() {
            self.position = self.current_time();
            self.playing_since = None;
            self.record(NativeOp::Pause);
        }
    }

    fn stop(&mut self) {
        self.playing_since = None;
        self.position = Duration::ZERO;
        self.record(NativeOp::Stop);
    }

    fn current_time(&self) -> Duration {
        let position = match self.playing_since {
            Some(since) => self.position + self.clock.now().saturating_sub(since),
            None => self.position,
        };
        if self.duration.is_zero() {
            return Duration::ZERO;
        }
        if self.looping {
            Duration::from_nanos((position.as_nanos() % self.duration.as_nanos()) as u64)
        } else {
            position.min(self.duration)
        }
    }

    fn set_current_time(&mut self, position: Duration) {
        self.position = position;
        if self.playing_since.is_some() {
            self.playing_since = Some(self.clock.now());
        }
        self.record(NativeOp::Seek(position));
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn set_volume(&mut self, volume: f64, _fade: Option<Duration>) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
        self.record(NativeOp::Looping(looping));
    }
}
