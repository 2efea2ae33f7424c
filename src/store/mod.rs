//! Flat-file persistence: progress ledger, error log, link and chunk files.

mod append;
pub mod error_log;
pub mod files;
pub mod ledger;
pub mod merge;

pub use error_log::ErrorLog;
pub use ledger::ProgressLedger;
pub use merge::{merge_links, merge_results};
