/// Queue building and schedule rendering
use crate::error::{CliError, Result};
use cadence_core::{AudioQueue, AudioTrack, QueueTiming, ScheduledTrack, Segue};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Parse a segue given on the command line
///
/// Accepts `abrupt`, or `<shape>:<seconds>` where shape is `linear`,
/// `constantPower` or `exponential`.
pub fn parse_segue(input: &str) -> Result<Segue> {
    if input == "abrupt" {
        return Ok(Segue::Abrupt);
    }
    let (shape, secs) = input
        .split_once(':')
        .ok_or_else(|| CliError::InvalidInput(format!("expected <shape>:<seconds>, got '{}'", input)))?;
    let secs: f64 = secs
        .parse()
        .map_err(|_| CliError::InvalidInput(format!("invalid fade length '{}'", secs)))?;
    let duration = Duration::try_from_secs_f64(secs)
        .map_err(|_| CliError::InvalidInput(format!("invalid fade length '{}'", secs)))?;

    match shape {
        "linear" => Ok(Segue::Linear(duration)),
        "constantPower" | "constant" => Ok(Segue::ConstantPower(duration)),
        "exponential" => Ok(Segue::Exponential {
            duration,
            floor: 0.0,
        }),
        other => Err(CliError::InvalidInput(format!("unknown fade shape '{}'", other))),
    }
}

/// Probe `files` and build a queue from them
///
/// A file listed more than once is probed once and shares one track id, so
/// back-to-back repeats fold into a single entry in a looping queue.
pub fn build_queue(
    files: &[impl AsRef<Path>],
    use_loops: bool,
    intro: Option<Segue>,
    outro: Option<Segue>,
) -> Result<AudioQueue> {
    let mut queue = if use_loops {
        AudioQueue::looping()
    } else {
        AudioQueue::new()
    };
    let mut probed: HashMap<PathBuf, AudioTrack> = HashMap::new();
    for file in files {
        // Track urls need absolute paths
        let file = std::fs::canonicalize(file.as_ref())?;
        let track = match probed.get(&file) {
            Some(track) => track.clone(),
            None => {
                let track = AudioTrack::probe(&file)?;
                tracing::debug!(
                    "Probed '{}': {:.2}s",
                    track.name(),
                    track.duration().as_secs_f64()
                );
                probed.insert(file, track.clone());
                track
            }
        };
        queue.push_with(&track, intro, outro);
    }
    Ok(queue)
}

fn format_time(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    let minutes = (secs / 60.0).floor();
    format!("{:02}:{:06.3}", minutes as u64, secs - minutes * 60.0)
}

/// Render the queue's timeline as a table
pub fn render_schedule(queue: &AudioQueue, timing: &QueueTiming) -> String {
    let schedule: Vec<ScheduledTrack> = queue.schedule(timing);
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{:>3}  {:<28} {:>10} {:>10} {:>10} {:>7} {:>7}",
        "#", "track", "start", "next at", "end", "intro", "outro"
    );
    for entry in &schedule {
        let track = &queue[entry.index];
        let next = if entry.transition_at == entry.end {
            "-".to_string()
        } else {
            format_time(entry.transition_at)
        };
        let _ = writeln!(
            out,
            "{:>3}  {:<28} {:>10} {:>10} {:>10} {:>6.2}s {:>6.2}s",
            entry.index + 1,
            truncate(track.name(), 28),
            format_time(entry.start),
            next,
            format_time(entry.end),
            entry.intro.as_secs_f64(),
            entry.outro.as_secs_f64()
        );
    }

    let _ = writeln!(
        out,
        "{} track(s), total {}{}",
        queue.len(),
        format_time(queue.total_duration(timing)),
        if queue.use_loops() { " per pass (looping)" } else { "" }
    );
    out
}

fn truncate(name: &str, width: usize) -> String {
    if name.chars().count() <= width {
        return name.to_string();
    }
    let mut short: String = name.chars().take(width - 1).collect();
    short.push('…');
    short
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[test]
    fn parses_command_line_segues() {
        assert_eq!(parse_segue("abrupt").unwrap(), Segue::Abrupt);
        assert_eq!(
            parse_segue("linear:2.5").unwrap(),
            Segue::Linear(Duration::from_millis(2500))
        );
        assert_eq!(
            parse_segue("constant:1").unwrap(),
            Segue::ConstantPower(Duration::from_secs(1))
        );
        assert!(parse_segue("linear").is_err());
        assert!(parse_segue("wobble:1").is_err());
        assert!(parse_segue("linear:-1").is_err());
    }

    #[test]
    fn schedule_table_lists_every_entry() {
        let a = AudioTrack::new(Url::parse("file:///a.wav").unwrap(), Duration::from_secs(10))
            .with_name("first")
            .with_outro(Segue::Linear(Duration::from_secs(2)));
        let b = AudioTrack::new(Url::parse("file:///b.wav").unwrap(), Duration::from_secs(8))
            .with_name("second")
            .with_intro(Segue::Linear(Duration::from_secs(2)));
        let queue = AudioQueue::from_tracks([a, b], false);

        let table = render_schedule(&queue, &QueueTiming::default());
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].contains("first"));
        assert!(lines[1].contains("00:08.000"));
        assert!(lines[2].contains("second"));
        assert!(lines[3].contains("total 00:16.000"));
    }

    #[test]
    fn long_names_are_shortened() {
        assert_eq!(truncate("abcdef", 4), "abc…");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
