pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::fetcher::Backend;

#[derive(Parser)]
#[command(name = "harvest")]
#[command(about = "Resumable, multi-device storefront scraper", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.config/harvest/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// This device's number, 1-based
    #[arg(short, long, global = true)]
    pub device_id: Option<usize>,

    /// Number of devices sharing the work
    #[arg(long, global = true)]
    pub device_count: Option<usize>,

    /// Number of parallel workers
    #[arg(short, long, global = true)]
    pub workers: Option<usize>,

    /// Links parsed per results file
    #[arg(short, long, global = true)]
    pub batch_size: Option<usize>,

    /// Directory for link, progress, error and results files
    #[arg(long, global = true)]
    pub work_dir: Option<PathBuf>,

    /// Don't record failed links as done, so the next run retries them
    #[arg(long, global = true)]
    pub retry_failed: bool,

    /// Page fetcher backend
    #[arg(long, value_enum, global = true)]
    pub backend: Option<Backend>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded config.
    pub fn apply(&self, config: &mut Config) {
        if let Some(id) = self.device_id {
            config.device.id = id;
        }
        if let Some(count) = self.device_count {
            config.device.count = count;
        }
        if let Some(workers) = self.workers {
            config.run.workers = workers;
        }
        if let Some(batch_size) = self.batch_size {
            config.run.batch_size = batch_size;
        }
        if let Some(ref dir) = self.work_dir {
            config.run.work_dir = dir.clone();
        }
        if self.retry_failed {
            config.run.retry_failed = true;
        }
        if let Some(backend) = self.backend {
            config.fetcher.backend = backend;
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Stage 1: collect item links from this device's search pages
    Collect,
    /// Stage 2: parse collected links, resuming from the progress file
    Parse,
    /// Show how many links this device has done and has left
    Status,
    /// Merge every device's link file into one
    MergeLinks,
    /// Merge all results files into one dataset
    MergeResults,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply() {
        let cli = Cli::parse_from([
            "harvest",
            "--device-id",
            "2",
            "--workers",
            "8",
            "--retry-failed",
            "--backend",
            "http",
            "parse",
        ]);
        let mut config = Config::default();
        cli.apply(&mut config);

        assert_eq!(config.device.id, 2);
        assert_eq!(config.device.count, 3);
        assert_eq!(config.run.workers, 8);
        assert!(config.run.retry_failed);
        assert_eq!(config.fetcher.backend, Backend::Http);
        assert!(matches!(cli.command, Commands::Parse));
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let cli = Cli::parse_from(["harvest", "status"]);
        let mut config = Config::default();
        config.run.retry_failed = true;
        cli.apply(&mut config);

        assert!(config.run.retry_failed);
        assert_eq!(config.run.batch_size, 40);
    }
}
