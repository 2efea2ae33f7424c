use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error, info, warn};
use url::Url;

use crate::app::Result;
use crate::config::{JitterRange, SearchConfig};
use crate::domain::{normalize_link, shard};
use crate::fetcher::{PageFetcher, RenderedPage};
use crate::pipeline::parallel::WorkerPool;
use crate::pipeline::selector::NamedSelector;
use crate::store::files::write_links;

/// Pulls item links out of a search result page.
#[derive(Debug, Clone)]
pub struct ResultRows {
    rows: NamedSelector,
    attribute: String,
}

impl ResultRows {
    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        Ok(Self {
            rows: NamedSelector::parse(&config.result_selector)?,
            attribute: config.link_attribute.clone(),
        })
    }

    /// Normalized links of every result row. Rows without the attribute, or
    /// with a value that is not a URL, are skipped.
    pub fn links(&self, page: &RenderedPage) -> Result<BTreeSet<String>> {
        let base = Url::parse(&page.url)?;
        let doc = page.document();

        let mut links = BTreeSet::new();
        for row in self.rows.select_all(&doc) {
            let Some(href) = row.value().attr(&self.attribute) else {
                continue;
            };
            match normalize_link(&base, href) {
                Ok(link) => {
                    links.insert(link);
                }
                Err(e) => debug!("Skipping href {:?} on {}: {}", href, page.url, e),
            }
        }
        Ok(links)
    }
}

/// Stage 1: gathers item links from this device's share of the search pages.
pub struct LinkCollector {
    fetcher: Arc<dyn PageFetcher>,
    pool: WorkerPool,
    rows: Arc<ResultRows>,
    delay: JitterRange,
}

impl LinkCollector {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        pool: WorkerPool,
        search: &SearchConfig,
        delay: JitterRange,
    ) -> Result<Self> {
        Ok(Self {
            fetcher,
            pool,
            rows: Arc::new(ResultRows::from_config(search)?),
            delay,
        })
    }

    /// Fetch this device's shard of `pages` and return the deduplicated,
    /// sorted union of their item links. A page that fails contributes nothing.
    pub async fn collect_links(
        &self,
        pages: &[String],
        device_id: usize,
        device_count: usize,
    ) -> Result<Vec<String>> {
        let assigned = shard(pages, device_id, device_count);
        info!(
            "Device {}: {} search pages of {}, {} workers",
            device_id,
            assigned.len(),
            pages.len(),
            self.pool.workers()
        );

        let mut set = self.pool.spawn_all(assigned, |url| {
            let fetcher = self.fetcher.clone();
            let rows = self.rows.clone();
            let delay = self.delay;
            async move { collect_page(fetcher.as_ref(), &rows, delay, &url).await }
        });

        let mut all = BTreeSet::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(links) => all.extend(links),
                Err(e) => error!("Task join error: {}", e),
            }
        }

        Ok(all.into_iter().collect())
    }

    /// [`collect_links`](Self::collect_links), then overwrite `link_file` with the result.
    pub async fn collect_to_file(
        &self,
        pages: &[String],
        device_id: usize,
        device_count: usize,
        link_file: &Path,
    ) -> Result<Vec<String>> {
        let links = self.collect_links(pages, device_id, device_count).await?;
        write_links(link_file, &links)?;
        info!(
            "Device {}: saved {} links to {}",
            device_id,
            links.len(),
            link_file.display()
        );
        Ok(links)
    }
}

async fn collect_page(
    fetcher: &dyn PageFetcher,
    rows: &ResultRows,
    delay: JitterRange,
    url: &str,
) -> BTreeSet<String> {
    let links = match fetcher.fetch(url, delay.sample()).await {
        Ok(page) => rows.links(&page),
        Err(e) => Err(e),
    };

    match links {
        Ok(links) => {
            debug!("{} links on {}", links.len(), url);
            links
        }
        Err(e) => {
            warn!("Search page {} failed: {}", url, e);
            BTreeSet::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::search_pages;
    use crate::fetcher::memory::{search_page, MemoryFetcher};
    use crate::store::files::read_links;
    use std::time::Duration;

    const BASE: &str = "https://store.example.com/search/?category1=998";

    fn page(n: u32) -> String {
        format!("{BASE}&page={n}")
    }

    fn collector(fetcher: Arc<MemoryFetcher>, workers: usize) -> LinkCollector {
        LinkCollector::new(
            fetcher,
            WorkerPool::with_workers(workers),
            &SearchConfig::default(),
            JitterRange::none(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_collects_dedups_and_sorts() {
        let fetcher = Arc::new(
            MemoryFetcher::new()
                .with_page(
                    &page(1),
                    &search_page(&[
                        "https://store.example.com/app/20/B/?snr=1_7_7_230_150_1",
                        "https://store.example.com/app/10/A/?snr=abc",
                    ]),
                )
                .with_page(
                    &page(2),
                    &search_page(&[
                        "https://store.example.com/app/10/A/?snr=other",
                        "/app/30/C/?snr=x",
                    ]),
                ),
        );
        let pages = search_pages(BASE, 1, 2).unwrap();

        let links = collector(fetcher, 2).collect_links(&pages, 1, 1).await.unwrap();

        assert_eq!(
            links,
            vec![
                "https://store.example.com/app/10/A/",
                "https://store.example.com/app/20/B/",
                "https://store.example.com/app/30/C/",
            ]
        );
    }

    #[tokio::test]
    async fn test_only_fetches_own_shard() {
        let fetcher = Arc::new(MemoryFetcher::new());
        let pages = search_pages(BASE, 1, 10).unwrap();

        collector(fetcher.clone(), 3)
            .collect_links(&pages, 2, 3)
            .await
            .unwrap();

        let mut fetched = fetcher.fetched();
        fetched.sort();
        let mut expected = vec![page(2), page(5), page(8)];
        expected.sort();
        assert_eq!(fetched, expected);
    }

    #[tokio::test]
    async fn test_failed_page_does_not_abort() {
        let fetcher = Arc::new(
            MemoryFetcher::new()
                .with_failure(&page(1))
                .with_page(&page(2), &search_page(&["https://store.example.com/app/1/X/"])),
        );
        let pages = search_pages(BASE, 1, 2).unwrap();

        let links = collector(fetcher, 2).collect_links(&pages, 1, 1).await.unwrap();
        assert_eq!(links, vec!["https://store.example.com/app/1/X/"]);
    }

    #[tokio::test]
    async fn test_worker_bound_and_link_file() {
        let fetcher = Arc::new(MemoryFetcher::new().with_latency(Duration::from_millis(10)));
        let pages = search_pages(BASE, 1, 12).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let link_file = dir.path().join("links_part_1.csv");

        let links = collector(fetcher.clone(), 2)
            .collect_to_file(&pages, 1, 1, &link_file)
            .await
            .unwrap();

        assert!(links.is_empty());
        assert_eq!(fetcher.fetched().len(), 12);
        assert!(fetcher.max_in_flight() <= 2);
        assert!(read_links(&link_file).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rerun_overwrites_link_file() {
        let dir = tempfile::tempdir().unwrap();
        let link_file = dir.path().join("links_part_1.csv");
        write_links(&link_file, &["https://stale.example/app/1/".to_string()]).unwrap();

        let fetcher = Arc::new(
            MemoryFetcher::new()
                .with_page(&page(1), &search_page(&["https://store.example.com/app/5/E/?a=b"])),
        );
        let pages = search_pages(BASE, 1, 1).unwrap();

        for _ in 0..2 {
            collector(fetcher.clone(), 1)
                .collect_to_file(&pages, 1, 1, &link_file)
                .await
                .unwrap();
        }

        assert_eq!(
            read_links(&link_file).unwrap(),
            vec!["https://store.example.com/app/5/E/"]
        );
    }
}
