pub mod check;
pub mod config;
pub mod error;
pub mod feed;
pub mod report;
pub mod storage;
pub mod timestamp;

pub use config::AppConfig;
pub use error::{Error, Result};
