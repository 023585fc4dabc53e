//! Player state flags
//!
//! A player can be in several states at once (introing and playing, playing
//! and ducked). `PAUSED` is orthogonal: it freezes whatever state the player
//! was in and clears again on resume.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Composable player state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerState(u8);

impl PlayerState {
    /// Nothing loaded or playback finished
    pub const IDLE: PlayerState = PlayerState(0);
    /// Intro fade running
    pub const INTROING: PlayerState = PlayerState(1);
    /// Audio is running
    pub const PLAYING: PlayerState = PlayerState(1 << 1);
    /// Outro fade running
    pub const OUTROING: PlayerState = PlayerState(1 << 2);
    /// Mute factor at 1.0
    pub const MUTED: PlayerState = PlayerState(1 << 3);
    /// Mute factor between 0.0 and 1.0
    pub const DUCKED: PlayerState = PlayerState(1 << 4);
    /// Frozen mid-playback
    pub const PAUSED: PlayerState = PlayerState(1 << 5);

    const NAMES: [(PlayerState, &'static str); 6] = [
        (Self::INTROING, "introing"),
        (Self::PLAYING, "playing"),
        (Self::OUTROING, "outroing"),
        (Self::MUTED, "muted"),
        (Self::DUCKED, "ducked"),
        (Self::PAUSED, "paused"),
    ];

    /// Raw bits
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Whether every flag in `other` is set
    pub fn contains(self, other: PlayerState) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether any flag in `other` is set
    pub fn intersects(self, other: PlayerState) -> bool {
        self.0 & other.0 != 0
    }

    pub fn insert(&mut self, other: PlayerState) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: PlayerState) {
        self.0 &= !other.0;
    }

    /// Set or clear `other`
    pub fn set(&mut self, other: PlayerState, value: bool) {
        if value {
            self.insert(other);
        } else {
            self.remove(other);
        }
    }

    pub fn is_idle(self) -> bool {
        self.0 == 0
    }

    /// Playing with no fade in progress
    pub fn is_playing_full_on(self) -> bool {
        self.contains(Self::PLAYING) && !self.intersects(Self::INTROING | Self::OUTROING)
    }
}

impl BitOr for PlayerState {
    type Output = PlayerState;

    fn bitor(self, rhs: Self) -> Self::Output {
        PlayerState(self.0 | rhs.0)
    }
}

impl BitOrAssign for PlayerState {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for PlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_idle() {
            return write!(f, "idle");
        }
        let names: Vec<&str> = Self::NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "{}", names.join("+"))
    }
}
