use std::{fs::File, io::ErrorKind, path::Path, time::Duration};

use acadme_client::DEFAULT_BASE;
use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use simplelog::LevelFilter;
use xdg::BaseDirectories;

/// Prefix for all of our XDG directories
pub const XDG_PREFIX: &str = "acadme-tui";

/// Environment variable which overrides [`Config::base_url`]
pub const URL_VAR: &str = "ACADME_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the API lives
    pub base_url: String,

    /// How long to wait after the search filter changes before searching
    pub debounce_ms: u64,

    /// One of off, error, warn, info, debug, trace
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE.to_string(),
            debounce_ms: 300,
            log_level: if cfg!(debug_assertions) {
                "debug"
            } else {
                "info"
            }
            .to_string(),
        }
    }
}

impl Config {
    /// Load the config from the XDG config directory, writing the defaults there if it doesn't exist yet.
    pub fn load(dirs: &BaseDirectories) -> Result<Self> {
        let path = dirs
            .place_config_file("config.json")
            .context("error creating config directory")?;

        let mut config = Self::load_from(&path)?;
        if let Ok(url) = std::env::var(URL_VAR) {
            debug!("using base url from {}", URL_VAR);
            config.base_url = url;
        }

        Ok(config)
    }

    fn load_from(path: &Path) -> Result<Self> {
        match File::open(path) {
            Ok(file) => serde_json::from_reader(&file).context("error deserialising config file"),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let config = Self::default();
                let mut file = File::create(path).context("error creating config file")?;
                serde_json::to_writer_pretty(&mut file, &config)
                    .context("error serialising config file")?;

                Ok(config)
            }
            Err(e) => Err(e).context("error opening config file"),
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// The configured log level, falling back to info if it's not recognised
    pub fn log_level(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }
}
