//! Fade curves and volume ramps
//!
//! A fade is never a polling loop that nudges the volume. It is a
//! [`VolumeRamp`] descriptor (`from`, `to`, `start`, `duration`, `curve`) that the
//! scheduler evaluates whenever it ticks. Cancelling a fade means dropping the
//! descriptor.
//!
//! Curves:
//! - Linear: `v(t) = v0 + t * (v1 - v0)`
//! - ConstantPower: sine/cosine pan law, no perceived dip at the crossfade midpoint
//! - Exponential: `floor + 100^(t - 1)`, a steep rise from `floor`
//!
//! Ramps use each curve rescaled to run from exactly 0 to exactly 1, so a
//! ramp leaves `from` and lands on `to` without a step at either end.

use std::f64::consts::FRAC_PI_2;
use std::time::Duration;

/// Base of the exponential curve
const EXPONENTIAL_BASE: f64 = 100.0;

/// Shape of a volume change over its normalized progress
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FadeCurve {
    /// Constant rate of change
    #[default]
    Linear,

    /// Equal power: `sin²(x) + cos²(x) = 1` keeps crossfades at constant loudness
    ConstantPower,

    /// Exponential rise starting at `floor`
    Exponential {
        /// Gain at the very start of the curve
        floor: f64,
    },
}

impl FadeCurve {
    /// Rising shape at normalized position `t`, from 0.0 (start) to 1.0 (end)
    ///
    /// Always within `[0.0, 1.0]`.
    #[inline]
    pub fn shape(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            FadeCurve::Linear => t,
            FadeCurve::ConstantPower => (t * FRAC_PI_2).sin(),
            FadeCurve::Exponential { floor } => {
                if t <= 0.0 {
                    floor.clamp(0.0, 1.0)
                } else {
                    (floor + EXPONENTIAL_BASE.powf(t - 1.0)).clamp(0.0, 1.0)
                }
            }
        }
    }

    /// [`shape`](Self::shape) rescaled to 0.0 at `t = 0` and 1.0 at `t = 1`
    ///
    /// Linear and constant-power curves already span that range. For the
    /// exponential curve the floor only bends the rise.
    #[inline]
    pub fn normalized(&self, t: f64) -> f64 {
        match self {
            FadeCurve::Exponential { floor } => {
                let t = t.clamp(0.0, 1.0);
                let floor = floor.clamp(0.0, 1.0);
                let rise = |t: f64| (floor + EXPONENTIAL_BASE.powf(t - 1.0)).min(1.0);
                let (low, high) = (rise(0.0), rise(1.0));
                if high - low <= f64::EPSILON {
                    t
                } else {
                    (rise(t) - low) / (high - low)
                }
            }
            _ => self.shape(t),
        }
    }

    /// Interpolate between two gains at normalized position `t`
    ///
    /// Falling ramps mirror the rising shape, so a constant-power fade-out
    /// follows `cos(t * π/2)` while the matching fade-in follows `sin(t * π/2)`.
    #[inline]
    pub fn interpolate(&self, from: f64, to: f64, t: f64) -> f64 {
        if to >= from {
            from + (to - from) * self.normalized(t)
        } else {
            to + (from - to) * self.normalized(1.0 - t)
        }
    }

    /// Human-readable name for logs
    pub fn display_name(&self) -> &'static str {
        match self {
            FadeCurve::Linear => "Linear",
            FadeCurve::ConstantPower => "Constant Power",
            FadeCurve::Exponential { .. } => "Exponential",
        }
    }
}

/// A scheduled gain change
///
/// `start` is expressed on whatever timeline the owner uses (the player's
/// pause-aware local time for intro/outro fades, the engine clock for mute
/// ramps). The ramp itself never reads a clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeRamp {
    /// Gain at `start`
    pub from: f64,

    /// Gain once the ramp completes
    pub to: f64,

    /// When the ramp begins
    pub start: Duration,

    /// How long the ramp lasts (zero means an instant jump)
    pub duration: Duration,

    /// Shape of the change
    pub curve: FadeCurve,
}

impl VolumeRamp {
    /// Create a new ramp
    pub fn new(from: f64, to: f64, start: Duration, duration: Duration, curve: FadeCurve) -> Self {
        Self {
            from,
            to,
            start,
            duration,
            curve,
        }
    }

    /// A ramp that has already reached `value`
    pub fn settled(value: f64) -> Self {
        Self::new(value, value, Duration::ZERO, Duration::ZERO, FadeCurve::Linear)
    }

    /// Instant at which the ramp reaches `to`
    pub fn end(&self) -> Duration {
        self.start + self.duration
    }

    /// Normalized progress at `now` (0.0 to 1.0)
    pub fn progress(&self, now: Duration) -> f64 {
        if self.duration.is_zero() {
            return if now >= self.start { 1.0 } else { 0.0 };
        }
        let elapsed = now.saturating_sub(self.start).as_secs_f64();
        (elapsed / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// Gain at `now`
    pub fn value_at(&self, now: Duration) -> f64 {
        let progress = self.progress(now);
        if progress >= 1.0 {
            self.to
        } else {
            self.curve.interpolate(self.from, self.to, progress)
        }
    }

    /// Whether the ramp has reached its target at `now`
    pub fn is_complete(&self, now: Duration) -> bool {
        now >= self.end()
    }

    /// Shift the ramp later in time (used when a pause freezes a fade)
    pub fn delayed_by(mut self, delta: Duration) -> Self {
        self.start += delta;
        self
    }
}
