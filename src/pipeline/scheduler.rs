use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};

use crate::app::{HarvestError, Result};
use crate::config::JitterRange;
use crate::domain::{OutputRow, ParseResult};
use crate::pipeline::parallel::WorkerPool;
use crate::pipeline::parser::GameParser;
use crate::store::files::{chunk_path, next_chunk_index, read_links, write_chunk};
use crate::store::ProgressLedger;

/// What one scheduler run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Links already in the ledger when the run started
    pub already_done: usize,
    /// Links this run set out to parse
    pub pending: usize,
    pub parsed: usize,
    pub failed: usize,
    /// Chunk files written, in order
    pub chunks: Vec<PathBuf>,
}

/// Links not yet in `done`, in their original order, each at most once.
pub fn pending_links(links: &[String], done: &HashSet<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    links
        .iter()
        .filter(|l| !done.contains(*l) && seen.insert(l.as_str()))
        .cloned()
        .collect()
}

/// Stage 2: parses pending links chunk by chunk, recording progress as each
/// link completes and flushing every chunk to its own output file.
pub struct BatchScheduler {
    parser: Arc<GameParser>,
    ledger: Arc<ProgressLedger>,
    pool: WorkerPool,
    device_id: usize,
    batch_size: usize,
    results_dir: PathBuf,
    retry_failed: bool,
    pause: JitterRange,
}

impl BatchScheduler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        parser: Arc<GameParser>,
        ledger: Arc<ProgressLedger>,
        pool: WorkerPool,
        device_id: usize,
        batch_size: usize,
        results_dir: PathBuf,
        retry_failed: bool,
        pause: JitterRange,
    ) -> Self {
        Self {
            parser,
            ledger,
            pool,
            device_id,
            batch_size: batch_size.max(1),
            results_dir,
            retry_failed,
            pause,
        }
    }

    /// Parse everything in `link_file` that the ledger doesn't already hold.
    pub async fn run(&self, link_file: &Path) -> Result<RunSummary> {
        if !link_file.exists() {
            return Err(HarvestError::Other(format!(
                "No link file {}. Collect links first.",
                link_file.display()
            )));
        }
        let links = read_links(link_file)?;
        self.run_links(&links).await
    }

    pub async fn run_links(&self, links: &[String]) -> Result<RunSummary> {
        let start = Utc::now();
        let done = ProgressLedger::load(self.ledger.path())?;
        let pending = pending_links(links, &done);
        let mut summary = RunSummary {
            already_done: links.iter().filter(|l| done.contains(*l)).count(),
            pending: pending.len(),
            ..Default::default()
        };
        info!(
            "Device {}: {} done, {} remaining, {} workers",
            self.device_id,
            summary.already_done,
            summary.pending,
            self.pool.workers()
        );

        let mut index = next_chunk_index(&self.results_dir, self.device_id)?;
        let chunks: Vec<&[String]> = pending.chunks(self.batch_size).collect();
        for (n, chunk) in chunks.iter().enumerate() {
            let results = self.process_chunk(chunk).await?;
            summary.failed += results.iter().filter(|r| r.is_failed()).count();
            summary.parsed += results.len();

            let path = chunk_path(&self.results_dir, self.device_id, index);
            let rows: Vec<OutputRow> = results.into_iter().map(OutputRow::from).collect();
            write_chunk(&path, &rows)?;
            info!(
                "Device {}: saved {} ({} records)",
                self.device_id,
                path.display(),
                rows.len()
            );
            summary.chunks.push(path);
            index += 1;

            if n + 1 < chunks.len() {
                self.pause.sleep().await;
            }
        }

        let elapsed = Utc::now().signed_duration_since(start);
        info!(
            "Device {}: parsed {} links, {} errors, {} files ({:.1}s)",
            self.device_id,
            summary.parsed,
            summary.failed,
            summary.chunks.len(),
            elapsed.num_milliseconds() as f64 / 1000.0
        );
        Ok(summary)
    }

    /// Parse one chunk concurrently. Each link is recorded in the ledger as
    /// soon as its parse returns; a ledger write failure aborts the run.
    async fn process_chunk(&self, chunk: &[String]) -> Result<Vec<ParseResult>> {
        let mut set = self.pool.spawn_all(chunk.to_vec(), |link| {
            let parser = self.parser.clone();
            let ledger = self.ledger.clone();
            let retry_failed = self.retry_failed;
            async move {
                let result = parser.parse(&link).await;
                if !(retry_failed && result.is_failed()) {
                    ledger.record(&result.url)?;
                }
                Ok::<_, HarvestError>(result)
            }
        });

        let mut results = Vec::with_capacity(chunk.len());
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(result) => results.push(result?),
                // The link stays out of the ledger and is picked up next run
                Err(e) => error!("Task join error: {}", e),
            }
        }
        Ok(results)
    }
}
