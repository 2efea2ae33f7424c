//! # Harvest
//!
//! A resumable, multi-device scraper for storefront product listings.
//!
//! ## Architecture
//!
//! ```text
//! Search pages → LinkCollector → link file → BatchScheduler → chunk files → merge
//!                                                   ↕
//!                                          GameParser, ProgressLedger
//! ```
//!
//! Several devices split the work without talking to each other: each one
//! takes every N-th search page. Stage 2 records every finished link in an
//! append-only progress file, so a killed run picks up where it stopped.
//!
//! ## Quick Start
//!
//! ```bash
//! # Stage 1 on device 2 of 3
//! harvest --device-id 2 --device-count 3 collect
//!
//! # Stage 2, rerun after any interruption
//! harvest --device-id 2 parse
//!
//! # After all devices finish
//! harvest merge-links
//! harvest merge-results
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires the configuration to a
/// page fetcher and builds the pipeline stages.
pub mod app;

/// Command-line interface using clap.
///
/// - `collect` - Stage 1, gather item links
/// - `parse` - Stage 2, parse links with resume
/// - `status` - Done/remaining counts
/// - `merge-links`, `merge-results` - Stage 3
pub mod cli;

/// Configuration loaded from `~/.config/harvest/config.toml` or `--config`.
pub mod config;

/// Core domain models and pure helpers.
///
/// - [`ParseResult`](domain::ParseResult): outcome of parsing one link
/// - [`OutputRow`](domain::OutputRow): one row of a results file
/// - [`shard`](domain::shard): stride partition across devices
pub mod domain;

/// Page fetching.
///
/// - [`PageFetcher`](fetcher::PageFetcher): Async trait for page loading
/// - [`ChromeFetcher`](fetcher::ChromeFetcher): headless Chrome via chromiumoxide
/// - [`HttpFetcher`](fetcher::HttpFetcher): plain reqwest GET
pub mod fetcher;

/// Link collection, item parsing and batch scheduling.
pub mod pipeline;

/// Flat-file persistence and merging.
pub mod store;
