pub mod error;
pub mod fetch;
pub mod storage;
pub mod types;

pub use error::{Error, Result};
pub use fetch::Fetcher;
pub use storage::ArticleSink;
pub use types::{Article, Threshold, DAY_FORMAT, NO_TITLE};
