//! Per-feed state transitions.
//!
//! [`plan`] decides whether a feed needs a network round trip at all, [`apply`]
//! folds a fetch outcome back into the stored record. Both are pure; the
//! clock is passed in. [`check_feed`] chains them around a [`FeedSource`].

use chrono::{DateTime, TimeDelta, Utc};

use crate::config::SyncConfig;
use crate::feed::{
    FeedRecord, FeedSource, FetchOutcome, Validators, STATUS_GONE, STATUS_MOVED_PERMANENTLY,
};
use crate::timestamp::{format_http_date, parse_http_date};

/// When a feed may be skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckPolicy {
    /// Feeds checked more recently than this are not fetched again
    pub recheck_interval: TimeDelta,
    /// Fetch even inside the recheck interval
    pub force: bool,
}

impl Default for CheckPolicy {
    fn default() -> Self {
        Self {
            recheck_interval: TimeDelta::days(1),
            force: false,
        }
    }
}

impl CheckPolicy {
    pub fn new(sync: &SyncConfig, force: bool) -> Self {
        Self {
            recheck_interval: sync.recheck_interval(),
            force,
        }
    }
}

/// What to do with one feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Report `status` without touching the network or the record
    Skip { status: Option<i32> },
    /// Conditional GET of `url`
    Fetch { url: String, validators: Validators },
}

pub fn plan(record: &FeedRecord, now: DateTime<Utc>, policy: &CheckPolicy) -> Plan {
    let url = match &record.url {
        Some(url) if record.last_status != Some(STATUS_GONE) => url,
        _ => {
            return Plan::Skip {
                status: Some(STATUS_GONE),
            }
        }
    };

    if !policy.force && checked_within(record, now, policy.recheck_interval) {
        return Plan::Skip {
            status: record.last_status,
        };
    }

    Plan::Fetch {
        url: url.clone(),
        validators: record.validators(),
    }
}

/// An unparsable stamp never throttles
fn checked_within(record: &FeedRecord, now: DateTime<Utc>, interval: TimeDelta) -> bool {
    record
        .last_checked
        .as_deref()
        .and_then(parse_http_date)
        .is_some_and(|checked| now.signed_duration_since(checked) < interval)
}

/// Record the outcome of a fetch and return the status to report
pub fn apply(record: &mut FeedRecord, outcome: &FetchOutcome, now: DateTime<Utc>) -> i32 {
    let status = outcome.status();

    if let FetchOutcome::Response(response) = outcome {
        if let Some(modified) = &response.validators.modified {
            record.modified = Some(modified.clone());
        }
        if let Some(etag) = &response.validators.etag {
            record.etag = Some(etag.clone());
        }

        match status {
            STATUS_MOVED_PERMANENTLY => {
                if let Some(target) = &response.redirected_to {
                    record.url = Some(target.clone());
                }
            }
            STATUS_GONE => record.url = None,
            _ => {}
        }
    }

    record.last_status = Some(status);
    record.last_checked = Some(format_http_date(now));
    status
}

/// Result of checking one feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedCheck {
    /// Status to report; `None` for a skipped feed that never had one
    pub status: Option<i32>,
    /// Set when the feed was actually fetched
    pub outcome: Option<FetchOutcome>,
}

/// Check one feed, updating `record` in place.
///
/// `inspect` sees the raw outcome before it is applied.
pub async fn check_feed<F>(
    source: &dyn FeedSource,
    record: &mut FeedRecord,
    now: DateTime<Utc>,
    policy: &CheckPolicy,
    inspect: F,
) -> FeedCheck
where
    F: FnOnce(&FetchOutcome),
{
    let (url, validators) = match plan(record, now, policy) {
        Plan::Skip { status } => {
            return FeedCheck {
                status,
                outcome: None,
            }
        }
        Plan::Fetch { url, validators } => (url, validators),
    };

    let outcome = source.fetch(&url, &validators).await;
    inspect(&outcome);

    let previous = record.last_status;
    let status = apply(record, &outcome, now);
    if previous != Some(status) {
        tracing::info!(url = %url, ?previous, status, "Feed status changed");
    }
    match &outcome {
        FetchOutcome::TransportError(reason) => {
            tracing::warn!(url = %url, reason = %reason, "Bad feed or URL")
        }
        FetchOutcome::Unknown(reason) => {
            tracing::warn!(url = %url, reason = %reason, "Unrecognized fetch result")
        }
        FetchOutcome::Response(_) => {}
    }

    FeedCheck {
        status: Some(status),
        outcome: Some(outcome),
    }
}
