//! Cadence CLI Library
//!
//! Command-line front end for the Cadence playback engine: probe audio files,
//! build and inspect queue schedules, and rehearse a queue in real time on the
//! silent virtual backend.
//!
//! This library exposes the command implementations for testing purposes.

pub mod config;
pub mod error;
pub mod plan;
pub mod session;

pub use config::CliConfig;
pub use error::{CliError, Result};
pub use session::Outcome;
