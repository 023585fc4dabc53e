//! Playable track descriptions

use crate::error::{CoreError, Result};
use crate::segue::Segue;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

/// Reserved location of the silence pseudo-track
pub const SILENCE_URL: &str = "cadence://silence";

/// Track identifier
///
/// Identity of a track. Clones of a track share the id, which is what loop
/// folding compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(Uuid);

impl TrackId {
    /// Generate a new random track ID
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Get the inner UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TrackId {
    fn default() -> Self {
        Self::generate()
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Portion of a file to play
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayRange {
    /// Offset of the first audible instant
    #[serde(with = "crate::serde_secs")]
    pub start: Duration,

    /// Offset where playback stops
    #[serde(with = "crate::serde_secs")]
    pub end: Duration,
}

impl PlayRange {
    /// Create a range, swapping the bounds if given in reverse
    pub fn new(start: Duration, end: Duration) -> Self {
        if end < start {
            Self {
                start: end,
                end: start,
            }
        } else {
            Self { start, end }
        }
    }

    /// Length of the range
    pub fn len(&self) -> Duration {
        self.end.saturating_sub(self.start)
    }

    /// Whether the range is empty
    pub fn is_empty(&self) -> bool {
        self.len().is_zero()
    }
}

/// A playable unit
///
/// Immutable once queued. Built from a file reference, from a probed file, or as
/// a synthetic silence placeholder that occupies queue time without ever touching
/// the audio backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioTrack {
    #[serde(default)]
    id: TrackId,

    url: Url,

    #[serde(default)]
    name: String,

    #[serde(default = "default_volume", deserialize_with = "clamped_volume")]
    volume: f64,

    /// Length of the audio (or of all folded repeats)
    #[serde(with = "crate::serde_secs")]
    duration: Duration,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    range: Option<PlayRange>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    intro: Option<Segue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    outro: Option<Segue>,
}

fn default_volume() -> f64 {
    1.0
}

fn clamped_volume<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(f64::deserialize(deserializer)?.clamp(0.0, 1.0))
}

impl AudioTrack {
    /// Create a track for `url` lasting `duration`
    pub fn new(url: Url, duration: Duration) -> Self {
        let name = name_from_url(&url);
        Self {
            id: TrackId::generate(),
            url,
            name,
            volume: 1.0,
            duration,
            range: None,
            intro: None,
            outro: None,
        }
    }

    /// Create a track for a local file with a known duration
    pub fn from_path(path: impl AsRef<Path>, duration: Duration) -> Result<Self> {
        let path = path.as_ref();
        let url = Url::from_file_path(path).map_err(|()| {
            CoreError::invalid_track(format!("not an absolute path: {}", path.display()))
        })?;
        Ok(Self::new(url, duration))
    }

    /// Create a track for a local file, reading its duration from the container
    #[cfg(feature = "probe")]
    pub fn probe(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let duration = crate::probe::probe_duration(path)?;
        Self::from_path(path, duration)
    }

    /// Silent placeholder that still occupies `duration` of queue time
    pub fn silence(duration: Duration) -> Self {
        let mut track = Self::new(silence_url(), duration);
        track.name = "silence".to_string();
        track.volume = 0.0;
        track
    }

    /// Override the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Target gain (clamped to 0.0..=1.0)
    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = volume.clamp(0.0, 1.0);
        self
    }

    /// Per-track intro override
    pub fn with_intro(mut self, intro: Segue) -> Self {
        self.intro = Some(intro);
        self
    }

    /// Per-track outro override
    pub fn with_outro(mut self, outro: Segue) -> Self {
        self.outro = Some(outro);
        self
    }

    /// Only play part of the file
    pub fn with_range(mut self, range: PlayRange) -> Self {
        self.range = Some(range);
        self
    }

    /// Explicit identity (e.g. restored from storage)
    pub fn with_id(mut self, id: TrackId) -> Self {
        self.id = id;
        self
    }

    /// Copy with the given overrides applied; `None` keeps the current value
    pub fn adjusting_segues(&self, intro: Option<Segue>, outro: Option<Segue>) -> Self {
        let mut copy = self.clone();
        copy.intro = intro.or(self.intro);
        copy.outro = outro.or(self.outro);
        copy
    }

    pub fn id(&self) -> TrackId {
        self.id
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Display name (falls back to the file stem)
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Full length of the audio, including folded repeats
    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn range(&self) -> Option<PlayRange> {
        self.range
    }

    pub fn intro(&self) -> Option<Segue> {
        self.intro
    }

    pub fn outro(&self) -> Option<Segue> {
        self.outro
    }

    /// Time the track should actually be scheduled for
    pub fn effective_duration(&self) -> Duration {
        self.range.map_or(self.duration, |range| range.len())
    }

    /// Offset into the file where playback begins
    pub fn start_offset(&self) -> Duration {
        self.range.map_or(Duration::ZERO, |range| range.start)
    }

    /// Whether this is the silence placeholder
    pub fn is_silence(&self) -> bool {
        self.url.as_str() == SILENCE_URL
    }

    /// Local path of the audio file, if the track points at one
    pub fn file_path(&self) -> Option<std::path::PathBuf> {
        if self.url.scheme() == "file" {
            self.url.to_file_path().ok()
        } else {
            None
        }
    }

    /// Effective length of `segue` on this track
    ///
    /// Never exceeds half the effective duration, so an intro and an outro can
    /// at most meet in the middle of the track.
    pub fn duration_of(&self, segue: Option<&Segue>) -> Duration {
        let Some(segue) = segue else {
            return Duration::ZERO;
        };
        segue.duration().min(self.effective_duration() / 2)
    }

    /// Fold a repeat of the same whole-file track into this entry
    ///
    /// Only unranged tracks fold, so the range never needs to grow.
    pub(crate) fn extend_by(&mut self, repeat: &AudioTrack) {
        debug_assert!(self.range.is_none() && repeat.range.is_none());
        self.duration += repeat.duration;
    }

    /// Fill in the name when deserialized without one
    pub(crate) fn ensure_name(&mut self) {
        if self.name.is_empty() {
            self.name = if self.is_silence() {
                "silence".to_string()
            } else {
                name_from_url(&self.url)
            };
        }
    }
}

impl PartialEq for AudioTrack {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for AudioTrack {}

impl std::hash::Hash for AudioTrack {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for AudioTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:.1}s",
            self.name,
            self.effective_duration().as_secs_f64()
        )
    }
}

fn silence_url() -> Url {
    // Constant, always parses
    Url::parse(SILENCE_URL).unwrap_or_else(|_| unreachable!("silence url is valid"))
}

fn name_from_url(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            Path::new(segment)
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or(segment)
                .to_string()
        })
        .unwrap_or_else(|| url.to_string())
}
