use std::sync::Arc;

use scraper::Html;
use tracing::{error, info, warn};

use crate::app::Result;
use crate::config::{GameConfig, JitterRange};
use crate::domain::{GameRecord, ParseResult};
use crate::fetcher::{PageFetcher, RenderedPage};
use crate::pipeline::selector::NamedSelector;
use crate::store::ErrorLog;

/// Compiled selectors for an item page.
#[derive(Debug, Clone)]
pub struct GameSelectors {
    title: NamedSelector,
    release: NamedSelector,
    prices: Vec<NamedSelector>,
    missing_price: String,
}

impl GameSelectors {
    pub fn from_config(config: &GameConfig) -> Result<Self> {
        Ok(Self {
            title: NamedSelector::parse(&config.title_selector)?,
            release: NamedSelector::parse(&config.release_selector)?,
            prices: config
                .price_selectors
                .iter()
                .map(|css| NamedSelector::parse(css))
                .collect::<Result<_>>()?,
            missing_price: config.missing_price.clone(),
        })
    }

    /// Title and release date are required; price falls back through the
    /// price selectors in order, then to the missing-price sentinel.
    pub fn extract(&self, doc: &Html) -> Result<GameRecord> {
        let title = self.title.require_text(doc)?;
        let release = self.release.require_text(doc)?;
        let price = self
            .prices
            .iter()
            .find_map(|sel| sel.first_text(doc))
            .unwrap_or_else(|| self.missing_price.clone());

        Ok(GameRecord {
            title,
            release,
            price,
        })
    }
}

/// Turns one item link into a [`ParseResult`].
///
/// Fetch and extraction failures never escape [`GameParser::parse`]: they are
/// written to the error log and returned as a failed result.
pub struct GameParser {
    fetcher: Arc<dyn PageFetcher>,
    selectors: GameSelectors,
    delay: JitterRange,
    errors: ErrorLog,
}

impl GameParser {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        config: &GameConfig,
        delay: JitterRange,
        errors: ErrorLog,
    ) -> Result<Self> {
        Ok(Self {
            fetcher,
            selectors: GameSelectors::from_config(config)?,
            delay,
            errors,
        })
    }

    pub async fn parse(&self, link: &str) -> ParseResult {
        match self.try_parse(link).await {
            Ok(record) => {
                info!("Processed {}", link);
                ParseResult::parsed(link, record)
            }
            Err(e) => {
                let message = e.to_string();
                warn!("Error on {}: {}", link, message);
                if let Err(log_err) = self.errors.record(link, &message) {
                    error!(
                        "Failed to write {}: {}",
                        self.errors.path().display(),
                        log_err
                    );
                }
                ParseResult::failed(link, message)
            }
        }
    }

    async fn try_parse(&self, link: &str) -> Result<GameRecord> {
        let page = self.fetcher.fetch(link, self.delay.sample()).await?;
        self.extract(&page)
    }

    fn extract(&self, page: &RenderedPage) -> Result<GameRecord> {
        self.selectors.extract(&page.document())
    }
}
