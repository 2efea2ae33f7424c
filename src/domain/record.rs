use serde::{Deserialize, Serialize};

/// Fields extracted from one item page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub title: String,
    pub release: String,
    pub price: String,
}

/// What happened when an item page was parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Parsed(GameRecord),
    Failed { error: String },
}

/// Result of parsing one item link. `url` always matches the link that was parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult {
    pub url: String,
    pub outcome: ParseOutcome,
}

impl ParseResult {
    pub fn parsed(url: impl Into<String>, record: GameRecord) -> Self {
        Self {
            url: url.into(),
            outcome: ParseOutcome::Parsed(record),
        }
    }

    pub fn failed(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            outcome: ParseOutcome::Failed {
                error: error.into(),
            },
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, ParseOutcome::Failed { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            ParseOutcome::Failed { error } => Some(error),
            ParseOutcome::Parsed(_) => None,
        }
    }
}

/// One row of a chunk output file. Missing fields serialize as empty cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRow {
    pub title: Option<String>,
    pub release: Option<String>,
    pub price: Option<String>,
    pub url: String,
    pub error: Option<String>,
}

impl OutputRow {
    pub const HEADERS: [&'static str; 5] = ["title", "release", "price", "url", "error"];
}

impl From<ParseResult> for OutputRow {
    fn from(result: ParseResult) -> Self {
        match result.outcome {
            ParseOutcome::Parsed(record) => Self {
                title: Some(record.title),
                release: Some(record.release),
                price: Some(record.price),
                url: result.url,
                error: None,
            },
            ParseOutcome::Failed { error } => Self {
                url: result.url,
                error: Some(error),
                ..Default::default()
            },
        }
    }
}
