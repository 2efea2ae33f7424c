use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::app::Result;
use crate::fetcher::{FetcherConfig, PageFetcher, RenderedPage};

/// Fetches raw HTML with a plain GET. Pages that build their content with
/// JavaScript come back without it.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(config.timeout())
            .gzip(true)
            .brotli(true);

        if let Some(ref ua) = config.user_agent {
            builder = builder.user_agent(ua.clone());
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, settle: Duration) -> Result<RenderedPage> {
        let response = self.client.get(url).send().await?;
        response.error_for_status_ref()?;

        let final_url = response.url().to_string();
        let html = response.text().await?;

        // Nothing renders after a plain GET; the delay only paces requests
        tokio::time::sleep(settle).await;

        Ok(RenderedPage {
            url: final_url,
            html,
        })
    }
}
