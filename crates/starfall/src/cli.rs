//! Command line arguments.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use starfall_config::{Config, ConfigError};
use starfall_core::AnimationSpeed;

/// Animated starfield backdrop for your terminal.
#[derive(Debug, Default, Parser)]
#[command(name = "starfall", version, about)]
pub struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Text file shown over the backdrop.
    #[arg(long, value_name = "FILE")]
    pub content: Option<PathBuf>,

    /// Seed for star placement and meteor timing.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Animation speed.
    #[arg(long, value_enum)]
    pub speed: Option<SpeedArg>,

    /// Disable meteors.
    #[arg(long)]
    pub no_meteors: bool,

    /// Target frames per second.
    #[arg(long, value_name = "FPS")]
    pub fps: Option<u32>,

    /// Log filter, e.g. `debug` or `starfall_background=trace`.
    #[arg(long, value_name = "FILTER")]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SpeedArg {
    Slow,
    Medium,
    Fast,
}

impl From<SpeedArg> for AnimationSpeed {
    fn from(arg: SpeedArg) -> Self {
        match arg {
            SpeedArg::Slow => AnimationSpeed::Slow,
            SpeedArg::Medium => AnimationSpeed::Medium,
            SpeedArg::Fast => AnimationSpeed::Fast,
        }
    }
}

impl Cli {
    /// Load the config file and apply command line overrides.
    pub fn resolve_config(&self) -> Result<Config, ConfigError> {
        let config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => match Config::load() {
                Err(ConfigError::NoConfigDir) => Config::default(),
                other => other?,
            },
        };
        let config = self.apply(config);
        config.validate()?;
        Ok(config)
    }

    fn apply(&self, mut config: Config) -> Config {
        if let Some(content) = &self.content {
            config.content = Some(content.clone());
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(speed) = self.speed {
            config.speed = speed.into();
        }
        if self.no_meteors {
            config.meteors = false;
        }
        if let Some(fps) = self.fps {
            config.frame_rate = fps;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        config
    }
}
