use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Status recorded when the feed could not be reached or is not a feed
pub const STATUS_BAD_FEED: i32 = -1;
/// Status recorded when the fetch ended in a way we do not recognize
pub const STATUS_UNKNOWN: i32 = -2;

pub const STATUS_UPDATED: i32 = 200;
pub const STATUS_MOVED_PERMANENTLY: i32 = 301;
pub const STATUS_NOT_MODIFIED: i32 = 304;
pub const STATUS_NOT_FOUND: i32 = 404;
pub const STATUS_GONE: i32 = 410;
pub const STATUS_TOO_MANY_REQUESTS: i32 = 429;

/// One configured feed, as persisted in the feed store.
///
/// Records are written by hand; the tool only mutates them. Keys it does not
/// know about are kept in `extra` and written back untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedRecord {
    /// Absent once the feed is gone (or was never given a URL)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Last-Modified validator from the previous response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    /// ETag validator from the previous response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_status: Option<i32>,
    /// HTTP date of the last fetch attempt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_checked: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FeedRecord {
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Validators to send with the next conditional request
    pub fn validators(&self) -> Validators {
        Validators {
            modified: self.modified.clone(),
            etag: self.etag.clone(),
        }
    }

    /// Check if the feed is known to be gone for good
    pub fn is_gone(&self) -> bool {
        self.url.is_none() || self.last_status == Some(STATUS_GONE)
    }
}

/// Cache validators echoed back to the server on the next fetch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validators {
    /// Last-Modified value, sent as If-Modified-Since
    pub modified: Option<String>,
    /// ETag value, sent as If-None-Match
    pub etag: Option<String>,
}

impl Validators {
    pub fn is_empty(&self) -> bool {
        self.modified.is_none() && self.etag.is_none()
    }
}

/// An HTTP answer for a feed, after redirects were followed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// Final status; 301 when any hop was a permanent redirect
    pub status: u16,
    pub validators: Validators,
    /// Where a permanent redirect pointed to
    pub redirected_to: Option<String>,
}

/// Result of one fetch attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Response(FetchResponse),
    /// Network failure, timeout, bad URL, or a body that is not RSS/Atom
    TransportError(String),
    /// Anything else
    Unknown(String),
}

impl FetchOutcome {
    /// Status recorded for this outcome
    pub fn status(&self) -> i32 {
        match self {
            FetchOutcome::Response(response) => i32::from(response.status),
            FetchOutcome::TransportError(_) => STATUS_BAD_FEED,
            FetchOutcome::Unknown(_) => STATUS_UNKNOWN,
        }
    }
}
