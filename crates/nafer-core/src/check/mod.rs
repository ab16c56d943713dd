mod state;
pub mod tasks;

pub use state::{apply, check_feed, plan, CheckPolicy, FeedCheck, Plan};
pub use tasks::{check_all_feeds, CheckRequest, FeedReport};
