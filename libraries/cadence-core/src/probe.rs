//! Duration probing
//!
//! Reads container metadata with Symphonia to learn how long a file plays. No
//! samples are decoded.

use crate::error::{CoreError, Result};
use std::path::Path;
use std::time::Duration;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Basic facts about an audio file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeInfo {
    /// Playback length
    pub duration: Duration,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Number of channels (if the container reports it)
    pub channels: Option<u16>,
}

/// Probe a file for its duration
pub fn probe_duration(path: &Path) -> Result<Duration> {
    probe_file(path).map(|info| info.duration)
}

/// Probe a file for its duration, sample rate and channel count
pub fn probe_file(path: &Path) -> Result<ProbeInfo> {
    if !path.exists() {
        return Err(CoreError::FileNotFound(path.display().to_string()));
    }

    let file = std::fs::File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| CoreError::probe(format!("Failed to probe {}: {}", path.display(), e)))?;

    let track = probed
        .format
        .default_track()
        .ok_or_else(|| CoreError::probe("No audio tracks found"))?;
    let params = &track.codec_params;

    let sample_rate = params
        .sample_rate
        .ok_or_else(|| CoreError::probe("Unknown sample rate"))?;
    let n_frames = params
        .n_frames
        .ok_or_else(|| CoreError::probe("Container does not report a frame count"))?;

    // Prefer the track's time base, fall back to frames / rate
    let duration = match params.time_base {
        Some(time_base) => {
            let time = time_base.calc_time(n_frames);
            Duration::from_secs(time.seconds) + Duration::from_secs_f64(time.frac)
        }
        None => Duration::from_secs_f64(n_frames as f64 / f64::from(sample_rate)),
    };

    tracing::debug!(
        "Probed {}: {:.3}s @ {} Hz",
        path.display(),
        duration.as_secs_f64(),
        sample_rate
    );

    Ok(ProbeInfo {
        duration,
        sample_rate,
        channels: params.channels.map(|c| c.count() as u16),
    })
}
