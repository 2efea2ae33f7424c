pub mod link;
pub mod record;

pub use link::{normalize_link, search_pages, shard, strip_query};
pub use record::{GameRecord, OutputRow, ParseOutcome, ParseResult};
