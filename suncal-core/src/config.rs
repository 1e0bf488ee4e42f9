//! suncal configuration.
//!
//! Read from `~/.config/suncal/config.toml` (optional), then `SUNCAL_*`
//! environment variables. Command-line flags are applied on top by the server.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_EVENTS_FILE, DEFAULT_HOST, DEFAULT_PORT, MAX_YEAR, MIN_YEAR};
use crate::error::{CalError, CalResult};

fn default_events_file() -> PathBuf {
    PathBuf::from(DEFAULT_EVENTS_FILE)
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_min_year() -> i32 {
    MIN_YEAR
}

fn default_max_year() -> i32 {
    MAX_YEAR
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuncalConfig {
    /// JSON file holding the events. Relative paths resolve against the
    /// working directory; `~` is expanded.
    #[serde(default = "default_events_file")]
    pub events_file: PathBuf,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Bounds of the year picker.
    #[serde(default = "default_min_year")]
    pub min_year: i32,

    #[serde(default = "default_max_year")]
    pub max_year: i32,
}

impl Default for SuncalConfig {
    fn default() -> Self {
        SuncalConfig {
            events_file: default_events_file(),
            host: default_host(),
            port: default_port(),
            min_year: default_min_year(),
            max_year: default_max_year(),
        }
    }
}

impl SuncalConfig {
    pub fn config_path() -> CalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CalError::Config("Could not determine config directory".into()))?
            .join("suncal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from `path`, or from the default location when `None`.
    /// A missing file is not an error.
    pub fn load(path: Option<&Path>) -> CalResult<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::config_path()?,
        };

        let config: SuncalConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("SUNCAL").try_parsing(true))
            .build()
            .map_err(|e| CalError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CalError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CalResult<()> {
        if self.min_year > self.max_year {
            return Err(CalError::Config(format!(
                "min_year ({}) is greater than max_year ({})",
                self.min_year, self.max_year
            )));
        }
        Ok(())
    }

    /// `events_file` with `~` expanded.
    pub fn events_path(&self) -> PathBuf {
        let expanded = shellexpand::tilde(&self.events_file.to_string_lossy()).into_owned();
        PathBuf::from(expanded)
    }

    /// Reject years the year picker would not offer.
    pub fn check_year(&self, year: i32) -> CalResult<()> {
        if (self.min_year..=self.max_year).contains(&year) {
            Ok(())
        } else {
            Err(CalError::YearOutOfRange {
                year,
                min: self.min_year,
                max: self.max_year,
            })
        }
    }

    /// The effective configuration as TOML.
    pub fn to_toml(&self) -> CalResult<String> {
        toml::to_string_pretty(self).map_err(|e| CalError::Serialization(e.to_string()))
    }
}
