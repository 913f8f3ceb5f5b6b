use std::fs;
use std::io;
use std::path::Path;

use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub(crate) const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Settings read from `config.json`. Keys keep the PascalCase names users
/// already have in their files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub(crate) struct Config {
    #[serde(rename = "OSCPort")]
    pub(crate) osc_port: u16,
    pub(crate) heart_rate_source: String,
    #[serde(rename = "HeartRateAPIKey")]
    pub(crate) heart_rate_api_key: String,
    pub(crate) show_spotify: bool,
    pub(crate) show_trend: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            osc_port: 9000,
            heart_rate_source: String::from("PULSOID"),
            heart_rate_api_key: String::from("xxxx"),
            show_spotify: true,
            show_trend: true,
        }
    }
}

impl Config {
    pub(crate) fn read(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub(crate) fn write(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source: io::Error| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        let bytes = serde_json::to_vec_pretty(self).map_err(|e| write_err(e.into()))?;
        fs::write(path, bytes).map_err(write_err)
    }

    /// Reads the config, creating it with defaults first if it is missing.
    ///
    /// Never fails: any problem is logged and the defaults are used instead.
    pub(crate) fn load_or_create(path: &Path) -> Self {
        if !path.exists() {
            match Config::default().write(path) {
                Ok(()) => info!("Generated default config at {:?}", path),
                Err(err) => error!("{err}"),
            }
        }

        match Config::read(path) {
            Ok(config) => {
                info!("Successfully read config");
                config
            }
            Err(err) => {
                error!("{err}");
                error!("Falling back to default settings");
                Config::default()
            }
        }
    }
}
