//! Shareable mixer handle
//!
//! The engine has a single writer. A [`MixerHandle`] lets the driver loop and
//! command sources share one mixer; every access takes the lock for the
//! duration of one closure. Completions that became due during the access run
//! after the lock is released, so they may use the handle themselves.

use crate::backend::SharedBackend;
use crate::clock::SharedClock;
use crate::config::EngineConfig;
use crate::events::EngineEvent;
use crate::mixer::Mixer;
use crate::transport::Completion;
use parking_lot::Mutex;
use std::sync::Arc;

/// Cloneable handle to one mixer
#[derive(Clone)]
pub struct MixerHandle {
    inner: Arc<Mutex<Mixer>>,
}

impl MixerHandle {
    /// Build a mixer and wrap it
    pub fn new(backend: SharedBackend, clock: SharedClock, config: EngineConfig) -> Self {
        Self::from_mixer(Mixer::new(backend, clock, config))
    }

    /// Wrap an existing mixer
    pub fn from_mixer(mut mixer: Mixer) -> Self {
        mixer.defer_completions();
        Self {
            inner: Arc::new(Mutex::new(mixer)),
        }
    }

    /// Run `f` with exclusive access to the mixer
    pub fn with<R>(&self, f: impl FnOnce(&mut Mixer) -> R) -> R {
        let (result, completions) = {
            let mut mixer = self.inner.lock();
            let result = f(&mut mixer);
            (result, mixer.take_completions())
        };
        run(completions);
        result
    }

    /// Advance the mixer to the current time
    pub fn tick(&self) {
        let completions = {
            let mut mixer = self.inner.lock();
            mixer.tick();
            mixer.take_completions()
        };
        run(completions);
    }

    /// Take all queued events
    pub fn drain_events(&self) -> Vec<EngineEvent> {
        self.inner.lock().drain_events()
    }
}

fn run(completions: Vec<Completion>) {
    for completion in completions {
        completion();
    }
}

impl std::fmt::Debug for MixerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MixerHandle").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::VirtualBackend;
    use crate::clock::ManualClock;
    use crate::transport::Reporting;
    use cadence_core::{AudioTrack, Transition};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;
    use url::Url;

    #[test]
    fn clones_share_one_mixer() {
        let clock = ManualClock::new();
        let backend = VirtualBackend::new(clock.shared());
        let url = Url::parse("file:///virtual/a.wav").unwrap();
        backend.register(url.clone(), Duration::from_secs(3));

        let handle = MixerHandle::new(Arc::new(backend), clock.shared(), EngineConfig::default());
        let other = handle.clone();
        other.with(|mixer| {
            mixer.play_on(
                "music",
                Some(AudioTrack::new(url, Duration::from_secs(3))),
                Transition::ABRUPT,
                None,
            );
        });
        assert!(handle.with(|mixer| mixer.is_playing()));

        clock.set(Duration::from_secs(3));
        handle.tick();
        let events = handle.drain_events();
        assert!(matches!(events.last(), Some(EngineEvent::ChannelEnded { .. })));
        assert!(!other.with(|mixer| mixer.is_playing()));
    }

    #[test]
    fn completions_run_after_the_lock_is_released() {
        let clock = ManualClock::new();
        let backend = VirtualBackend::new(clock.shared());
        let url = Url::parse("file:///virtual/a.wav").unwrap();
        backend.register(url.clone(), Duration::from_secs(3));

        let handle = MixerHandle::new(Arc::new(backend), clock.shared(), EngineConfig::default());
        let reentrant = handle.clone();
        let (tx, rx) = mpsc::channel();
        handle.with(|mixer| {
            mixer.play_on(
                "music",
                Some(AudioTrack::new(url, Duration::from_secs(3))),
                Transition::ABRUPT,
                Some(Box::new(move || {
                    let channels = reentrant.with(|mixer| mixer.channel_names().len());
                    tx.send(channels).unwrap();
                })),
            );
        });
        assert!(rx.try_recv().is_err());

        // Ticking from another thread must come back even though the
        // completion takes the lock again
        clock.set(Duration::from_secs(3));
        let ticker = handle.clone();
        let (done_tx, done_rx) = mpsc::channel();
        thread::spawn(move || {
            ticker.tick();
            done_tx.send(()).unwrap();
        });
        assert!(done_rx.recv_timeout(Duration::from_secs(5)).is_ok());
        assert_eq!(rx.try_recv().unwrap(), 1);
    }

    #[test]
    fn pause_completion_with_zero_fade_runs_outside_the_lock() {
        let clock = ManualClock::new();
        let backend = VirtualBackend::new(clock.shared());
        let url = Url::parse("file:///virtual/b.wav").unwrap();
        backend.register(url.clone(), Duration::from_secs(10));

        let handle = MixerHandle::new(Arc::new(backend), clock.shared(), EngineConfig::default());
        handle.with(|mixer| {
            mixer.play_on(
                "voice",
                Some(AudioTrack::new(url, Duration::from_secs(10))),
                Transition::ABRUPT,
                None,
            );
        });

        let reentrant = handle.clone();
        let (tx, rx) = mpsc::channel();
        handle.with(|mixer| {
            mixer.channel("voice").pause_at(
                Some(cadence_core::Segue::Abrupt),
                Some(Box::new(move || {
                    tx.send(reentrant.with(|mixer| mixer.is_paused())).unwrap();
                })),
                Duration::from_secs(1),
            );
        });
        assert!(rx.try_recv().unwrap());
    }
}
