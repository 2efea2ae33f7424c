use scraper::{ElementRef, Html, Selector};

use crate::app::{HarvestError, Result};

/// A compiled CSS selector that remembers its source text for messages.
#[derive(Debug, Clone)]
pub struct NamedSelector {
    css: String,
    selector: Selector,
}

impl NamedSelector {
    pub fn parse(css: &str) -> Result<Self> {
        let selector = Selector::parse(css).map_err(|e| HarvestError::Selector {
            selector: css.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            css: css.to_string(),
            selector,
        })
    }

    pub fn select_all<'a>(&'a self, doc: &'a Html) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        doc.select(&self.selector)
    }

    /// Text of the first match, or `None` if nothing matches.
    pub fn first_text(&self, doc: &Html) -> Option<String> {
        doc.select(&self.selector).next().map(element_text)
    }

    /// Text of the first match, or a missing-element error.
    pub fn require_text(&self, doc: &Html) -> Result<String> {
        self.first_text(doc)
            .ok_or_else(|| HarvestError::MissingElement(self.css.clone()))
    }
}

/// Visible text of an element with whitespace runs collapsed.
pub fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
