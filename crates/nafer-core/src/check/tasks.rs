use chrono::{DateTime, Utc};

use super::state::{check_feed, CheckPolicy};
use crate::feed::{FeedRecord, FeedSource};
use crate::storage::FeedStore;

/// What a run should do
#[derive(Debug, Clone, Default)]
pub struct CheckRequest {
    /// Feed names to check; empty means all of them
    pub feeds: Vec<String>,
    pub policy: CheckPolicy,
    /// Print every raw fetch outcome to stderr
    pub debug: bool,
}

impl CheckRequest {
    fn selects(&self, name: &str) -> bool {
        self.feeds.is_empty() || self.feeds.iter().any(|feed| feed == name)
    }
}

/// Per-feed line of a run report
#[derive(Debug, Clone, PartialEq)]
pub struct FeedReport {
    pub name: String,
    pub status: Option<i32>,
    /// The record as it will be saved
    pub record: FeedRecord,
}

/// Check the selected feeds of `store` one after the other.
///
/// Records are updated in place; saving the store is left to the caller so
/// that it happens exactly once, after every feed was processed.
pub async fn check_all_feeds(
    store: &mut FeedStore,
    source: &dyn FeedSource,
    request: &CheckRequest,
    now: DateTime<Utc>,
) -> Vec<FeedReport> {
    for name in request.feeds.iter().filter(|name| !store.contains(name)) {
        tracing::warn!(feed = %name, "No such feed in the store, ignored");
    }

    let mut reports = Vec::new();

    for (name, record) in store.iter_mut() {
        if !request.selects(name) {
            continue;
        }

        tracing::debug!("Checking feed: {}", name);

        let check = check_feed(source, record, now, &request.policy, |outcome| {
            if request.debug {
                eprintln!("{}: {:#?}", name, outcome);
            }
        })
        .await;

        reports.push(FeedReport {
            name: name.to_string(),
            status: check.status,
            record: record.clone(),
        });
    }

    reports
}
