mod store;

pub use store::FeedStore;
