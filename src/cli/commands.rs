use std::collections::HashSet;

use crate::app::{AppContext, Result};
use crate::config::Config;
use crate::domain::search_pages;
use crate::pipeline::scheduler::pending_links;
use crate::store::files::read_links_if_exists;
use crate::store::{merge_links, merge_results, ProgressLedger};

pub async fn collect(ctx: &AppContext) -> Result<()> {
    let config = &ctx.config;
    let search = &config.search;
    let pages = search_pages(&search.base_url, search.first_page, search.last_page)?;

    let links = ctx
        .link_collector()?
        .collect_to_file(
            &pages,
            config.device.id,
            config.device.count,
            &config.link_file(),
        )
        .await?;

    println!(
        "Device {}: {} links saved to {}",
        config.device.id,
        links.len(),
        config.link_file().display()
    );
    Ok(())
}

pub async fn parse(ctx: &AppContext) -> Result<()> {
    let summary = ctx
        .batch_scheduler()?
        .run(&ctx.config.link_file())
        .await?;

    println!(
        "Device {}: {} parsed ({} errors) into {} files, {} were already done",
        ctx.config.device.id,
        summary.parsed,
        summary.failed,
        summary.chunks.len(),
        summary.already_done
    );
    Ok(())
}

pub fn status(config: &Config) -> Result<()> {
    let Some(links) = read_links_if_exists(&config.link_file())? else {
        println!(
            "Device {}: no link file at {}",
            config.device.id,
            config.link_file().display()
        );
        return Ok(());
    };

    let done = ProgressLedger::load(&config.progress_file())?;
    let (total, finished, remaining) = progress_counts(&links, &done);
    println!(
        "Device {}: {} links, {} done, {} remaining",
        config.device.id, total, finished, remaining
    );
    Ok(())
}

/// Distinct links, links already in the ledger, links still to parse.
fn progress_counts(links: &[String], done: &HashSet<String>) -> (usize, usize, usize) {
    let pending = pending_links(links, done).len();
    let finished = links.iter().filter(|l| done.contains(*l)).count();
    (links.len(), finished, pending)
}

pub fn merge_all_links(config: &Config) -> Result<()> {
    let files: Vec<_> = (1..=config.device.count)
        .map(|id| config.link_file_for(id))
        .collect();
    let out = config.merged_links_file();
    let count = merge_links(&files, &out)?;
    println!("Merged {} links into {}", count, out.display());
    Ok(())
}

pub fn merge_all_results(config: &Config) -> Result<()> {
    let out = config.merged_results_file();
    let count = merge_results(&config.results_dir(), &out)?;
    println!("Merged {} records into {}", count, out.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_link_is_not_counted_done() {
        let links: Vec<String> = ["a", "b", "a", "c"].map(String::from).to_vec();
        let done: HashSet<String> = ["c".to_string()].into_iter().collect();

        assert_eq!(progress_counts(&links, &done), (4, 1, 2));
    }
}
