//! The scraping pipeline.
//!
//! ```text
//! search pages → LinkCollector → link file → BatchScheduler + GameParser → chunk files
//! ```

pub mod collector;
pub mod parallel;
pub mod parser;
pub mod scheduler;
pub mod selector;

pub use collector::LinkCollector;
pub use parallel::{WorkerPool, DEFAULT_WORKERS};
pub use parser::GameParser;
pub use scheduler::{BatchScheduler, RunSummary};
