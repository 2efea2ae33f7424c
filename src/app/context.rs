use std::sync::Arc;

use crate::app::Result;
use crate::config::Config;
use crate::fetcher::{self, PageFetcher};
use crate::pipeline::{BatchScheduler, GameParser, LinkCollector, WorkerPool};
use crate::store::{ErrorLog, ProgressLedger};

/// Wires the configuration to a page fetcher and builds the pipeline stages.
pub struct AppContext {
    pub config: Config,
    pub fetcher: Arc<dyn PageFetcher>,
}

impl AppContext {
    /// Validate `config` and start the configured page fetcher.
    pub async fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let fetcher = fetcher::from_config(&config.fetcher).await?;
        Ok(Self::with_fetcher(config, fetcher))
    }

    pub fn with_fetcher(config: Config, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { config, fetcher }
    }

    pub fn link_collector(&self) -> Result<LinkCollector> {
        LinkCollector::new(
            self.fetcher.clone(),
            WorkerPool::with_workers(self.config.run.workers),
            &self.config.search,
            self.config.delays.page,
        )
    }

    pub fn batch_scheduler(&self) -> Result<BatchScheduler> {
        let config = &self.config;
        let parser = GameParser::new(
            self.fetcher.clone(),
            &config.game,
            config.delays.item,
            ErrorLog::open(&config.error_log())?,
        )?;
        let ledger = ProgressLedger::open(&config.progress_file())?;

        Ok(BatchScheduler::new(
            Arc::new(parser),
            Arc::new(ledger),
            WorkerPool::with_workers(config.run.workers),
            config.device.id,
            config.run.batch_size,
            config.results_dir(),
            config.run.retry_failed,
            config.delays.batch,
        ))
    }

    /// Release the fetcher's resources.
    pub async fn shutdown(&self) -> Result<()> {
        self.fetcher.close().await
    }
}
