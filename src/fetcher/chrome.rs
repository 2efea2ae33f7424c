use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::app::{HarvestError, Result};
use crate::fetcher::{FetcherConfig, PageFetcher, RenderedPage};

/// Renders pages in headless Chrome using chromiumoxide.
///
/// One browser process serves every call; each `fetch` opens its own tab and
/// closes it again before returning.
pub struct ChromeFetcher {
    browser: RwLock<Option<Browser>>,
    handler: Mutex<Option<JoinHandle<()>>>,
    config: FetcherConfig,
}

impl ChromeFetcher {
    /// Launch the browser with the given configuration
    pub async fn new(config: FetcherConfig) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-software-rasterizer");

        if !config.headless {
            builder = builder.with_head();
        }

        let browser_config = builder
            .build()
            .map_err(|e| HarvestError::Browser(format!("Failed to build browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            HarvestError::Browser(format!(
                "Failed to launch browser: {}. Is Chrome or Chromium installed and in PATH?",
                e
            ))
        })?;

        let handler = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {
                // Drive the CDP connection
            }
        });

        Ok(Self {
            browser: RwLock::new(Some(browser)),
            handler: Mutex::new(Some(handler)),
            config,
        })
    }

    async fn render(&self, page: &Page, url: &str, settle: Duration) -> Result<RenderedPage> {
        if let Some(ref ua) = self.config.user_agent {
            page.set_user_agent(ua)
                .await
                .map_err(|e| HarvestError::Browser(format!("Failed to set user agent: {}", e)))?;
        }

        let load = async {
            page.goto(url).await?;
            page.wait_for_navigation().await.map(|_| ())
        };

        tokio::time::timeout(self.config.timeout(), load)
            .await
            .map_err(|_| HarvestError::Timeout(self.config.timeout_secs))?
            .map_err(|e| HarvestError::Browser(format!("Navigation failed: {}", e)))?;

        // Let scripts finish filling in the page
        tokio::time::sleep(settle).await;

        let html = page
            .content()
            .await
            .map_err(|e| HarvestError::Browser(format!("Failed to read page content: {}", e)))?;

        Ok(RenderedPage {
            url: url.to_string(),
            html,
        })
    }
}

#[async_trait]
impl PageFetcher for ChromeFetcher {
    async fn fetch(&self, url: &str, settle: Duration) -> Result<RenderedPage> {
        let guard = self.browser.read().await;
        let browser = guard
            .as_ref()
            .ok_or_else(|| HarvestError::Browser("Browser already closed".to_string()))?;

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| HarvestError::Browser(format!("Failed to create page: {}", e)))?;

        let result = self.render(&page, url, settle).await;

        // The tab goes away whether or not rendering worked
        if let Err(e) = page.close().await {
            warn!("Failed to close page for {}: {}", url, e);
        }

        result
    }

    async fn close(&self) -> Result<()> {
        let Some(mut browser) = self.browser.write().await.take() else {
            return Ok(());
        };

        browser
            .close()
            .await
            .map_err(|e| HarvestError::Browser(format!("Failed to close browser: {}", e)))?;
        browser.wait().await?;

        if let Some(handler) = self.handler.lock().await.take() {
            handler.abort();
        }
        debug!("Browser closed");
        Ok(())
    }
}
