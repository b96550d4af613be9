use async_trait::async_trait;
use crate::types::Article;
use crate::Result;

#[async_trait]
pub trait ArticleSink: Send + Sync {
    /// Short name used in log lines
    fn name(&self) -> &str;

    /// Deliver the full, ordered result set of a run
    async fn write_articles(&self, articles: &[Article]) -> Result<()>;
}
