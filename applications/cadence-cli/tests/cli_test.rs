//! Integration tests for the CLI commands

use cadence_cli::plan::{build_queue, render_schedule};
use cadence_cli::session::{self, Outcome};
use cadence_cli::CliConfig;
use cadence_core::{AudioQueue, QueueTiming, Segue};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

fn write_wav(dir: &Path, name: &str, frames: u32) -> PathBuf {
    let path = dir.join(name);
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: 8000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for _ in 0..frames * 2 {
        writer.write_sample(0i16).unwrap();
    }
    writer.finalize().unwrap();
    path
}

#[test]
fn build_save_and_plan_a_queue() {
    let dir = tempfile::tempdir().unwrap();
    let files = vec![
        write_wav(dir.path(), "one.wav", 16_000),
        write_wav(dir.path(), "two.wav", 8_000),
    ];

    let queue = build_queue(&files, false, None, Some(Segue::Linear(Duration::from_millis(500))))
        .unwrap();
    assert_eq!(queue.len(), 2);
    assert_eq!(queue[0].name(), "one");

    let path = dir.path().join("queue.json");
    queue.save(&path).unwrap();
    let loaded = AudioQueue::load(&path).unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[1].outro(), Some(Segue::Linear(Duration::from_millis(500))));

    let table = render_schedule(&loaded, &QueueTiming::default());
    assert!(table.contains("one"));
    assert!(table.contains("2 track(s)"));
}

#[test]
fn same_file_twice_folds_in_a_looping_queue() {
    let dir = tempfile::tempdir().unwrap();
    let clip = write_wav(dir.path(), "clip.wav", 4_000);

    let queue = build_queue(&[clip.clone(), clip.clone()], true, None, None).unwrap();
    assert_eq!(queue.len(), 1);
    assert!(queue.use_loops());
    assert!((queue[0].duration().as_secs_f64() - 1.0).abs() < 0.01);

    // Without looping the repeat stays a separate entry
    let queue = build_queue(&[clip.clone(), clip], false, None, None).unwrap();
    assert_eq!(queue.len(), 2);
}

#[test]
fn missing_file_fails_to_build() {
    let result = build_queue(&[PathBuf::from("/nonexistent/a.wav")], false, None, None);
    assert!(result.is_err());
}

#[tokio::test]
async fn rehearsal_runs_to_the_end() {
    let dir = tempfile::tempdir().unwrap();
    let files = vec![
        write_wav(dir.path(), "a.wav", 1_600),
        write_wav(dir.path(), "b.wav", 1_600),
    ];
    let queue = build_queue(&files, false, Some(Segue::Abrupt), Some(Segue::Abrupt)).unwrap();

    let mut config = CliConfig::default();
    config.output.progress = false;
    let handle = session::engine(&config);

    let started = Instant::now();
    let mut lines = Vec::new();
    let outcome = session::rehearse(handle, queue, &config, |line| lines.push(line))
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Finished);
    assert!(started.elapsed() >= Duration::from_millis(350));
    assert!(lines.iter().any(|line| line.contains("track 2 started")));
    assert!(lines.last().unwrap().contains("ended"));
}
