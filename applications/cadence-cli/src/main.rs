/// Cadence - plan, probe and rehearse playback queues
use cadence_cli::{
    config::CliConfig,
    plan::{build_queue, parse_segue, render_schedule},
    session::{self, Outcome},
};
use cadence_core::{probe_file, AudioQueue, Segue};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cadence")]
#[command(about = "Cadence multi-channel playback engine", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./cadence.toml when present)
    #[arg(short, long, global = true, env = "CADENCE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print duration and format of audio files
    Probe {
        /// Files to probe
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Build a queue file from audio files
    Build {
        /// Files in play order
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Where to write the queue JSON
        #[arg(short, long)]
        output: PathBuf,
        /// Loop the queue
        #[arg(long = "loop")]
        looping: bool,
        /// Intro for every track, e.g. `linear:2` or `abrupt`
        #[arg(long, value_parser = parse_segue_arg)]
        intro: Option<Segue>,
        /// Outro for every track
        #[arg(long, value_parser = parse_segue_arg)]
        outro: Option<Segue>,
    },
    /// Show the timeline of a queue
    Plan {
        /// Queue JSON file
        queue: PathBuf,
        /// Play tracks back to back without overlapping
        #[arg(long)]
        no_cross_fade: bool,
    },
    /// Rehearse a queue in real time on the silent backend
    Play {
        /// Queue JSON file
        #[arg(short, long, conflicts_with = "files")]
        queue: Option<PathBuf>,
        /// Audio files to play in order
        files: Vec<PathBuf>,
        /// Loop the queue
        #[arg(long = "loop")]
        looping: bool,
    },
}

fn parse_segue_arg(input: &str) -> Result<Segue, String> {
    parse_segue(input).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cadence=info,cadence_cli=info,cadence_core=info,cadence_playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Probe { files } => probe(&files),
        Commands::Build {
            files,
            output,
            looping,
            intro,
            outro,
        } => {
            let queue = build_queue(&files, looping, intro, outro)?;
            queue.save(&output)?;
            tracing::info!(
                "Wrote {} track(s) to {}",
                queue.len(),
                output.display()
            );
        }
        Commands::Plan {
            queue,
            no_cross_fade,
        } => {
            let queue = AudioQueue::load(&queue)?;
            let timing = cadence_core::QueueTiming::new(
                config.engine.cross_fade && !no_cross_fade,
                Some(config.engine.default_intro),
                Some(config.engine.default_outro),
            );
            print!("{}", render_schedule(&queue, &timing));
        }
        Commands::Play {
            queue,
            files,
            looping,
        } => {
            let mut queue = match queue {
                Some(path) => AudioQueue::load(&path)?,
                None if files.is_empty() => {
                    anyhow::bail!("nothing to play: pass --queue or audio files")
                }
                None => build_queue(&files, looping, None, None)?,
            };
            if looping {
                queue.set_use_loops(true);
            }

            tracing::info!("Rehearsing {} track(s)", queue.len());
            let handle = session::engine(&config);
            let outcome =
                session::rehearse(handle, queue, &config, |line| println!("{}", line)).await?;
            if outcome == Outcome::Stopped {
                tracing::info!("Stopped before the end of the queue");
            }
        }
    }

    Ok(())
}

fn probe(files: &[PathBuf]) {
    for file in files {
        match probe_file(file) {
            Ok(info) => println!(
                "{}: {:.3}s, {} Hz, {} channel(s)",
                file.display(),
                info.duration.as_secs_f64(),
                info.sample_rate,
                info.channels
                    .map_or_else(|| "?".to_string(), |channels| channels.to_string())
            ),
            Err(e) => {
                tracing::warn!("Cannot probe {}: {}", file.display(), e);
                println!("{}: error: {}", file.display(), e);
            }
        }
    }
}
