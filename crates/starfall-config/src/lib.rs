//! Configuration for starfall.
//!
//! Settings live in a TOML file under the platform config directory
//! (for example `~/.config/starfall/config.toml` on Linux). Every field is
//! optional; a missing file yields [`Config::default`].

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use starfall_core::{AnimationSpeed, ColorTheme};
use thiserror::Error;

/// Name of the config file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Highest accepted frame rate.
pub const MAX_FRAME_RATE: u32 = 240;

/// Most meteors allowed in flight at once.
pub const MAX_METEORS: usize = 5;

/// Errors produced while loading, validating or saving the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine a config directory for this platform")]
    NoConfigDir,
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("frame_rate must be between 1 and {MAX_FRAME_RATE}, got {0}")]
    FrameRate(u32),
    #[error("meteor_min_interval_ms ({min}) is greater than meteor_max_interval_ms ({max})")]
    MeteorInterval { min: u64, max: u64 },
    #[error("pixels_per_cell must be positive, got {0}")]
    PixelsPerCell(f32),
    #[error("max_meteors must be at most {MAX_METEORS}, got {0}")]
    MaxMeteors(usize),
}

/// User configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seed for the random source; a fresh seed is drawn when unset.
    pub seed: Option<u64>,
    /// Simulation speed.
    pub speed: AnimationSpeed,
    /// Colour of the content page text.
    pub color_theme: ColorTheme,
    /// Target frames per second.
    pub frame_rate: u32,
    /// Whether meteors are spawned.
    pub meteors: bool,
    /// Maximum number of meteors alive at once.
    pub max_meteors: usize,
    /// Lower bound of the random meteor spawn interval.
    pub meteor_min_interval_ms: u64,
    /// Upper bound of the random meteor spawn interval.
    pub meteor_max_interval_ms: u64,
    /// Virtual pixels covered by one terminal column.
    pub pixels_per_cell: f32,
    /// Tilt the content page with the pointer.
    pub tilt: bool,
    /// Draw the animated backdrop even if the terminal does not advertise truecolor.
    pub force_truecolor: bool,
    /// Default log filter, overridden by `RUST_LOG`.
    pub log_level: String,
    /// Text file shown over the backdrop.
    pub content: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: None,
            speed: AnimationSpeed::default(),
            color_theme: ColorTheme::default(),
            frame_rate: 60,
            meteors: true,
            max_meteors: 5,
            meteor_min_interval_ms: 2000,
            meteor_max_interval_ms: 7000,
            pixels_per_cell: 8.0,
            tilt: true,
            force_truecolor: false,
            log_level: "info".to_string(),
            content: None,
        }
    }
}

impl Config {
    /// Default location of the config file, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "starfall").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Load from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path().ok_or(ConfigError::NoConfigDir)?;
        Self::load_from(&path)
    }

    /// Load from `path`, falling back to defaults when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let config: Config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        tracing::info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Write to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let text = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, text).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reject values the renderer cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_rate == 0 || self.frame_rate > MAX_FRAME_RATE {
            return Err(ConfigError::FrameRate(self.frame_rate));
        }
        if self.meteor_min_interval_ms > self.meteor_max_interval_ms {
            return Err(ConfigError::MeteorInterval {
                min: self.meteor_min_interval_ms,
                max: self.meteor_max_interval_ms,
            });
        }
        if self.pixels_per_cell.is_nan() || self.pixels_per_cell <= 0.0 {
            return Err(ConfigError::PixelsPerCell(self.pixels_per_cell));
        }
        if self.max_meteors > MAX_METEORS {
            return Err(ConfigError::MaxMeteors(self.max_meteors));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_meteors, 5);
        assert_eq!(config.meteor_min_interval_ms, 2000);
        assert_eq!(config.meteor_max_interval_ms, 7000);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str("seed = 42\nspeed = \"fast\"\n").unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.speed, AnimationSpeed::Fast);
        assert_eq!(config.frame_rate, 60);
        assert!(config.meteors);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = Config {
            frame_rate: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::FrameRate(0))));

        let config = Config {
            meteor_min_interval_ms: 9000,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MeteorInterval { min: 9000, max: 7000 })
        ));

        let config = Config {
            pixels_per_cell: 0.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::PixelsPerCell(_))));

        let config = Config {
            max_meteors: 6,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::MaxMeteors(6))));
        let config = Config {
            max_meteors: 0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("does-not-exist.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        // Parent directories are created on save
        let path = dir.path().join("nested").join("saved.toml");
        let config = Config {
            seed: Some(7),
            color_theme: ColorTheme::Magenta,
            meteors: false,
            ..Default::default()
        };
        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "frame_rate = \"fast\"").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("broken.toml"));
    }
}
