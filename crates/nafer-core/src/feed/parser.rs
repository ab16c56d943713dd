use feed_rs::parser;

use crate::{Error, Result};

/// What we keep from a parsed feed body: enough to log, nothing stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSummary {
    pub title: Option<String>,
    pub entries: usize,
}

/// Check that content is an RSS/Atom/JSON feed
pub fn inspect_feed(content: &[u8]) -> Result<FeedSummary> {
    let feed = parser::parse(content).map_err(|e| Error::FeedParse(e.to_string()))?;

    Ok(FeedSummary {
        title: feed.title.map(|t| t.content),
        entries: feed.entries.len(),
    })
}
