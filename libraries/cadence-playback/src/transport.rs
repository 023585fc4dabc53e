//! Capabilities shared by players, channels and the mixer
//!
//! Anything that can be started, paused, muted and reset implements
//! [`Transport`]; anything that can describe what it is doing implements
//! [`Reporting`]. Operations read the current time from the owner's clock.

use crate::error::Result;
use crate::state::PlayerState;
use cadence_core::{AudioTrack, Segue, Transition};
use std::time::Duration;

/// Callback fired once an operation completes
pub type Completion = Box<dyn FnOnce() + Send>;

/// Start, stop and level control
pub trait Transport {
    /// Start or resume
    ///
    /// `completion` fires when playback runs to its natural end.
    fn play(&mut self, transition: Transition, completion: Option<Completion>) -> Result<()>;

    /// Fade out over `outro` (or the owner's default) and freeze
    ///
    /// `completion` fires once playback is actually frozen.
    fn pause(&mut self, outro: Option<Segue>, completion: Option<Completion>);

    /// Set the mute factor (0.0 = audible, 1.0 = silent) over `segue`
    fn mute(&mut self, factor: f64, segue: Option<Segue>);

    /// Hard stop: cancel every timer and release native resources
    fn reset(&mut self);
}

/// Read-only status
pub trait Reporting {
    /// Current state flags
    fn state(&self) -> PlayerState;

    /// Time left until playback ends
    fn time_remaining(&self) -> Duration;

    /// Tracks currently audible
    fn active_tracks(&self) -> Vec<AudioTrack>;

    /// Whether audio is running (fades included, pauses excluded)
    fn is_playing(&self) -> bool {
        let state = self.state();
        state.contains(PlayerState::PLAYING) && !state.contains(PlayerState::PAUSED)
    }

    fn is_paused(&self) -> bool {
        self.state().contains(PlayerState::PAUSED)
    }

    fn is_muted(&self) -> bool {
        self.state().contains(PlayerState::MUTED)
    }
}
