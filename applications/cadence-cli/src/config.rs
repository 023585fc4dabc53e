/// CLI configuration
use crate::error::{CliError, Result};
use cadence_playback::EngineConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file, read from the working directory when present
pub const DEFAULT_CONFIG_FILE: &str = "cadence.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub output: OutputSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputSettings {
    /// Print events as JSON lines instead of text
    #[serde(default)]
    pub json: bool,

    /// Print periodic progress reports
    #[serde(default = "default_progress")]
    pub progress: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            json: false,
            progress: default_progress(),
        }
    }
}

fn default_progress() -> bool {
    true
}

impl CliConfig {
    /// Load from an optional file and the environment
    ///
    /// An explicit `path` must exist; otherwise `cadence.toml` is read if
    /// present. Variables prefixed with `CADENCE_` override the file, with
    /// `__` separating sections (`CADENCE_ENGINE__TICK_INTERVAL_MS=20`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("CADENCE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: CliConfig = settings.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.engine.validate()?;
        if self.engine.progress_interval_ms == 0 && self.output.progress {
            return Err(CliError::Config(
                "progress_interval_ms must be greater than zero when progress is enabled"
                    .to_string(),
            ));
        }
        Ok(())
    }
}
