//! Individual configuration sections.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::JitterRange;

/// Which shard of the work this process owns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// 1-based device number
    pub id: usize,
    /// Total number of devices sharing the work
    pub count: usize,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self { id: 1, count: 3 }
    }
}

/// Worker pool, batching and output locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Maximum concurrent fetches per stage (default: 5)
    pub workers: usize,
    /// Links parsed before each flush to disk (default: 40)
    pub batch_size: usize,
    /// Leave failed links out of the progress ledger so a relaunch retries them
    pub retry_failed: bool,
    /// Directory holding link, progress and error files
    pub work_dir: PathBuf,
    /// Directory for chunk output files, relative to `work_dir` unless absolute
    pub results_dir: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            workers: 5,
            batch_size: 40,
            retry_failed: false,
            work_dir: PathBuf::from("."),
            results_dir: PathBuf::from("results"),
        }
    }
}

/// Search result pages crawled in stage 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Search URL without the page parameter
    pub base_url: String,
    pub first_page: u32,
    pub last_page: u32,
    /// CSS selector for one result row
    pub result_selector: String,
    /// Attribute of the result row holding the item link
    pub link_attribute: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://store.steampowered.com/search/?category1=998".to_string(),
            first_page: 1,
            last_page: 300,
            result_selector: ".search_result_row".to_string(),
            link_attribute: "href".to_string(),
        }
    }
}

/// Selectors for the fields extracted from an item page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub title_selector: String,
    pub release_selector: String,
    /// Price selectors, in priority order
    pub price_selectors: Vec<String>,
    /// Price written when no price selector matches
    pub missing_price: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            title_selector: ".apphub_AppName".to_string(),
            release_selector: ".date".to_string(),
            price_selectors: vec![
                ".game_purchase_price".to_string(),
                ".discount_final_price".to_string(),
            ],
            missing_price: "N/A".to_string(),
        }
    }
}

/// Randomized delays used to pace requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DelayConfig {
    /// After loading a search page, before reading it
    pub page: JitterRange,
    /// After loading an item page, before reading it
    pub item: JitterRange,
    /// Between flushed batches
    pub batch: JitterRange,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            page: JitterRange::new(1500, 2500),
            item: JitterRange::new(1500, 3000),
            batch: JitterRange::new(2000, 5000),
        }
    }
}
