use async_trait::async_trait;
use crate::Result;

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Returns the body of `url`. Transport errors and non-2xx responses are errors.
    async fn fetch(&self, url: &str) -> Result<String>;
}
