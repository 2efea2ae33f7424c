//! Configuration management for Harvest.
//!
//! Configuration is read once at startup, either from an explicit path or from
//! `~/.config/harvest/config.toml`. If the default file doesn't exist, a
//! commented default is written. The resulting [`Config`] is passed into each
//! component; nothing reads configuration from global state.

mod jitter;
mod sections;

pub use jitter::JitterRange;
pub use sections::{DelayConfig, DeviceConfig, GameConfig, RunConfig, SearchConfig};

use crate::fetcher::FetcherConfig;
use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub device: DeviceConfig,
    pub run: RunConfig,
    pub search: SearchConfig,
    pub game: GameConfig,
    pub delays: DelayConfig,
    pub fetcher: FetcherConfig,
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the default path is used and
    /// created with commented defaults when missing. Missing fields in the file
    /// use default values.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default_path = Self::default_config_path()?;
                if !default_path.exists() {
                    Self::create_default_config(&default_path)?;
                    return Ok(Self::default());
                }
                default_path
            }
        };

        let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path,
            source: e,
        })?;

        Ok(config)
    }

    /// Get the default config file path: `~/.config/harvest/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("harvest").join("config.toml"))
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let device = &self.device;
        if device.count == 0 || device.id == 0 || device.id > device.count {
            return Err(ConfigError::Invalid(format!(
                "device id must be in 1..={}, got {}",
                device.count, device.id
            )));
        }
        if self.run.workers == 0 {
            return Err(ConfigError::Invalid("workers must be at least 1".into()));
        }
        if self.run.batch_size == 0 {
            return Err(ConfigError::Invalid("batch_size must be at least 1".into()));
        }
        if self.fetcher.timeout_secs == 0 {
            return Err(ConfigError::Invalid("fetcher.timeout_secs must be at least 1".into()));
        }
        if self.search.first_page > self.search.last_page {
            return Err(ConfigError::Invalid(format!(
                "empty page range {}..={}",
                self.search.first_page, self.search.last_page
            )));
        }
        for (name, range) in [
            ("page", &self.delays.page),
            ("item", &self.delays.item),
            ("batch", &self.delays.batch),
        ] {
            if !range.is_valid() {
                return Err(ConfigError::Invalid(format!(
                    "delays.{name}: min_ms {} exceeds max_ms {}",
                    range.min_ms, range.max_ms
                )));
            }
        }
        Ok(())
    }

    /// Stage 1 output for this device.
    pub fn link_file(&self) -> PathBuf {
        self.link_file_for(self.device.id)
    }

    pub fn link_file_for(&self, device_id: usize) -> PathBuf {
        self.run.work_dir.join(format!("links_part_{device_id}.csv"))
    }

    pub fn progress_file(&self) -> PathBuf {
        self.run
            .work_dir
            .join(format!("progress_{}.txt", self.device.id))
    }

    pub fn error_log(&self) -> PathBuf {
        self.run
            .work_dir
            .join(format!("errors_{}.log", self.device.id))
    }

    pub fn results_dir(&self) -> PathBuf {
        self.run.work_dir.join(&self.run.results_dir)
    }

    pub fn merged_links_file(&self) -> PathBuf {
        self.run.work_dir.join("steam_links.csv")
    }

    pub fn merged_results_file(&self) -> PathBuf {
        self.run.work_dir.join("steam_full.csv")
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> &'static str {
        r##"# Harvest configuration
#
# Every value can be left out; the defaults below apply.

[device]
# This machine's number (1-based) and how many machines share the work.
# Each device takes every `count`-th search page starting at `id`.
id = 1
count = 3

[run]
# Concurrent page fetches
workers = 5
# Links parsed before each results file is written
batch_size = 40
# Leave failed links out of the progress file so the next run retries them
retry_failed = false
work_dir = "."
results_dir = "results"

[search]
base_url = "https://store.steampowered.com/search/?category1=998"
first_page = 1
last_page = 300
result_selector = ".search_result_row"
link_attribute = "href"

[game]
title_selector = ".apphub_AppName"
release_selector = ".date"
# Tried in order; the first match wins
price_selectors = [".game_purchase_price", ".discount_final_price"]
missing_price = "N/A"

# Random delays in milliseconds, drawn uniformly from [min_ms, max_ms]
[delays]
page = { min_ms = 1500, max_ms = 2500 }
item = { min_ms = 1500, max_ms = 3000 }
batch = { min_ms = 2000, max_ms = 5000 }

[fetcher]
# "chrome" renders pages in headless Chrome, "http" does a plain GET
backend = "chrome"
headless = true
timeout_secs = 30
"##
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
