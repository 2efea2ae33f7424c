//! Page fetching.
//!
//! A [`PageFetcher`] turns a URL into the rendered HTML of that page. Callers
//! query the result with CSS selectors through [`RenderedPage::document`].
//! Fetchers are unreliable by nature: every failure comes back as an ordinary
//! error for the caller to handle.

pub mod chrome;
mod config;
pub mod http_fetcher;

#[cfg(test)]
pub mod memory;

pub use chrome::ChromeFetcher;
pub use config::{Backend, FetcherConfig};
pub use http_fetcher::HttpFetcher;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use scraper::Html;

use crate::app::Result;

/// HTML of a page after it finished loading.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub url: String,
    pub html: String,
}

impl RenderedPage {
    /// Parse the HTML for selector queries. The returned document is not `Send`,
    /// so query it without holding it across an `.await`.
    pub fn document(&self) -> Html {
        Html::parse_document(&self.html)
    }
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Load `url`, wait `settle` for the page to finish rendering, and return
    /// its HTML. Any per-call resources are released before this returns, on
    /// success and on failure.
    async fn fetch(&self, url: &str, settle: Duration) -> Result<RenderedPage>;

    /// Release long-lived resources such as a browser process.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Build the fetcher selected by `config.backend`.
pub async fn from_config(config: &FetcherConfig) -> Result<Arc<dyn PageFetcher>> {
    let fetcher: Arc<dyn PageFetcher> = match config.backend {
        Backend::Chrome => Arc::new(ChromeFetcher::new(config.clone()).await?),
        Backend::Http => Arc::new(HttpFetcher::new(config)?),
    };
    Ok(fetcher)
}
