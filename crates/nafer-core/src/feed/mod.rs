mod fetcher;
mod models;
mod parser;

pub use fetcher::{FeedSource, HttpFeedSource};
pub use models::{
    FeedRecord, FetchOutcome, FetchResponse, Validators, STATUS_BAD_FEED, STATUS_GONE,
    STATUS_MOVED_PERMANENTLY, STATUS_NOT_FOUND, STATUS_NOT_MODIFIED, STATUS_TOO_MANY_REQUESTS,
    STATUS_UNKNOWN, STATUS_UPDATED,
};
pub use parser::{inspect_feed, FeedSummary};
