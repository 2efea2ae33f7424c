//! In-memory fetcher serving canned HTML, for tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::app::{HarvestError, Result};
use crate::fetcher::{PageFetcher, RenderedPage};

#[derive(Default)]
pub struct MemoryFetcher {
    pages: HashMap<String, String>,
    failing: HashSet<String>,
    stalled: HashSet<String>,
    latency: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    fetched: Mutex<Vec<String>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    /// Make `url` fail as if the network dropped.
    pub fn with_failure(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    /// Make fetches of `url` hang forever, like a tab that never loads.
    pub fn with_stall(mut self, url: &str) -> Self {
        self.stalled.insert(url.to_string());
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for MemoryFetcher {
    async fn fetch(&self, url: &str, settle: Duration) -> Result<RenderedPage> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.fetched.lock().unwrap().push(url.to_string());

        if self.stalled.contains(url) {
            std::future::pending::<()>().await;
        }

        let wait = self.latency + settle;
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }

        let result = if self.failing.contains(url) {
            Err(HarvestError::Browser(format!("connection reset: {}", url)))
        } else {
            Ok(RenderedPage {
                url: url.to_string(),
                html: self.pages.get(url).cloned().unwrap_or_default(),
            })
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Minimal item page with the default selectors.
pub fn game_page(title: &str, release: &str, price: Option<&str>) -> String {
    let price = price
        .map(|p| format!(r#"<div class="game_purchase_price price">{p}</div>"#))
        .unwrap_or_default();
    format!(
        r#"<html><body>
<div class="apphub_AppName">{title}</div>
<div class="release_date"><div class="date">{release}</div></div>
{price}
</body></html>"#
    )
}

/// Search result page linking to each href.
pub fn search_page(hrefs: &[&str]) -> String {
    let rows: String = hrefs
        .iter()
        .map(|h| format!(r#"<a class="search_result_row" href="{h}">row</a>"#))
        .collect();
    format!("<html><body><div id=\"search_resultsRows\">{rows}</div></body></html>")
}
