//! Segues and transitions
//!
//! A [`Segue`] is the fade applied when a track enters (intro) or leaves
//! (outro). A [`Transition`] pairs the two for a single `play()` call.

use crate::fade::FadeCurve;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Fade used when a queue file names an unknown segue or omits its duration
pub const FALLBACK_SEGUE: Segue = Segue::Linear(Duration::from_secs(5));

/// Fade shape plus duration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "SegueRecord", into = "SegueRecord")]
pub enum Segue {
    /// Instant cut, no fade
    Abrupt,

    /// Equal power fade
    ConstantPower(Duration),

    /// Linear fade
    Linear(Duration),

    /// Exponential fade rising from `floor`
    Exponential {
        /// Fade length
        duration: Duration,
        /// Gain at the start of the curve
        floor: f64,
    },
}

impl Segue {
    /// Short fade used for click-free starts, pauses and seeks
    pub const DEFAULT: Segue = Segue::Linear(Duration::from_millis(200));

    /// Fade used when ducking without an explicit segue
    pub const DEFAULT_DUCK: Segue = Segue::Linear(Duration::from_secs(1));

    /// Requested fade length (zero for `Abrupt`)
    pub fn duration(&self) -> Duration {
        match self {
            Segue::Abrupt => Duration::ZERO,
            Segue::ConstantPower(duration) | Segue::Linear(duration) => *duration,
            Segue::Exponential { duration, .. } => *duration,
        }
    }

    /// Whether the segue actually fades
    pub fn exists(&self) -> bool {
        !self.duration().is_zero()
    }

    /// Curve used to evaluate the fade
    pub fn curve(&self) -> FadeCurve {
        match self {
            Segue::ConstantPower(_) => FadeCurve::ConstantPower,
            Segue::Exponential { floor, .. } => FadeCurve::Exponential { floor: *floor },
            Segue::Abrupt | Segue::Linear(_) => FadeCurve::Linear,
        }
    }

    /// Short name, also used as the serialized tag
    pub fn name(&self) -> &'static str {
        match self {
            Segue::Abrupt => "abrupt",
            Segue::ConstantPower(_) => "constantPower",
            Segue::Linear(_) => "linear",
            Segue::Exponential { .. } => "exponential",
        }
    }

    /// Clamp the duration to `max`
    ///
    /// Only ever shortens a segue; one already within `max` is returned unchanged.
    pub fn normalized(self, max: Duration) -> Self {
        if self.duration() <= max {
            return self;
        }
        self.with_duration(max)
    }

    /// Same shape, different length
    pub fn with_duration(self, duration: Duration) -> Self {
        match self {
            Segue::Abrupt => Segue::Abrupt,
            Segue::ConstantPower(_) => Segue::ConstantPower(duration),
            Segue::Linear(_) => Segue::Linear(duration),
            Segue::Exponential { floor, .. } => Segue::Exponential { duration, floor },
        }
    }
}

impl Default for Segue {
    fn default() -> Self {
        Segue::DEFAULT
    }
}

impl fmt::Display for Segue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segue::Abrupt => f.write_str("abrupt"),
            _ => write!(f, "{} {:.2}s", self.name(), self.duration().as_secs_f64()),
        }
    }
}

/// Wire form of a segue: `{"name": "linear", "duration": 2.0}`
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SegueRecord {
    name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    duration: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    floor: Option<f64>,
}

impl From<SegueRecord> for Segue {
    fn from(record: SegueRecord) -> Self {
        if record.name == "abrupt" {
            return Segue::Abrupt;
        }

        let Some(duration) = record
            .duration
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        else {
            tracing::debug!("Segue '{}' without a valid duration, using fallback", record.name);
            return FALLBACK_SEGUE;
        };

        match record.name.as_str() {
            "linear" => Segue::Linear(duration),
            "constantPower" | "constant" => Segue::ConstantPower(duration),
            "exponential" => Segue::Exponential {
                duration,
                floor: record.floor.unwrap_or(0.0),
            },
            other => {
                tracing::debug!("Unknown segue '{}', using fallback", other);
                FALLBACK_SEGUE
            }
        }
    }
}

impl From<Segue> for SegueRecord {
    fn from(segue: Segue) -> Self {
        // A zero-length fade still needs its duration, or it reads back as the fallback
        let duration = (!matches!(segue, Segue::Abrupt)).then(|| segue.duration().as_secs_f64());
        let floor = match segue {
            Segue::Exponential { floor, .. } => Some(floor),
            _ => None,
        };
        Self {
            name: segue.name().to_string(),
            duration,
            floor,
        }
    }
}

/// How a player enters and, optionally, how it leaves
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Fade applied when playback starts or resumes
    pub intro: Segue,

    /// Fade applied when playback ends or pauses (None = caller's default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outro: Option<Segue>,
}

impl Transition {
    /// Short intro, default outro
    pub const DEFAULT: Transition = Transition {
        intro: Segue::DEFAULT,
        outro: None,
    };

    /// Hard cut in and out
    pub const ABRUPT: Transition = Transition {
        intro: Segue::Abrupt,
        outro: Some(Segue::Abrupt),
    };

    /// Create a transition
    pub fn new(intro: Segue, outro: Option<Segue>) -> Self {
        Self { intro, outro }
    }

    /// Longest of the two fades
    pub fn duration(&self) -> Duration {
        self.intro
            .duration()
            .max(self.outro.map_or(Duration::ZERO, |outro| outro.duration()))
    }
}

impl Default for Transition {
    fn default() -> Self {
        Transition::DEFAULT
    }
}
