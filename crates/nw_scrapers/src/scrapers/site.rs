use std::sync::Arc;

use async_trait::async_trait;
use nw_core::{Article, Fetcher, Result, Threshold};
use scraper::Html;
use url::Url;

use crate::config::ScraperConfig;
use crate::logging::Logger;
use crate::scrapers::{RawItem, Scraper, SiteParser};

/// Fetch, parse, normalize and filter for one configured site.
pub struct SiteScraper {
    id: String,
    url: String,
    base: Option<Url>,
    parser: Box<dyn SiteParser>,
    fetcher: Arc<dyn Fetcher>,
    logger: Logger,
}

impl SiteScraper {
    pub fn new(config: &ScraperConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        Self::with_parser(&config.id, &config.url, config.parser.build(), fetcher)
    }

    pub fn with_parser(
        id: &str,
        url: &str,
        parser: Box<dyn SiteParser>,
        fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        Self {
            id: id.to_string(),
            url: url.to_string(),
            base: Url::parse(url).ok(),
            parser,
            fetcher,
            logger: Logger::new().with_prefix(format!("[{}]", id)),
        }
    }

    /// The document never outlives this call, so nothing non-`Send` is held
    /// across an await point.
    fn parse(&self, body: &str) -> Result<Vec<RawItem>> {
        let document = Html::parse_document(body);
        self.parser.extract(&document)
    }

    /// Emits links in absolute, serialized form rather than as the `href` was
    /// written: relative links are joined to the listing URL and stray
    /// whitespace is dropped by the URL parser. Unresolvable links are kept.
    fn resolve_link(&self, link: String) -> String {
        if link.is_empty() {
            return link;
        }
        if let Ok(url) = Url::parse(&link) {
            return url.to_string();
        }
        match self.base.as_ref().map(|base| base.join(&link)) {
            Some(Ok(resolved)) => resolved.to_string(),
            _ => link,
        }
    }

    fn collect(&self, items: Vec<RawItem>, threshold: &Threshold) -> Vec<Article> {
        items
            .into_iter()
            .filter_map(|mut item| {
                item.link = self.resolve_link(std::mem::take(&mut item.link));
                match item.into_article() {
                    Ok(article) => Some(article),
                    Err(e) => {
                        self.logger.debug(&format!("skipping item: {}", e));
                        None
                    }
                }
            })
            .filter(|article| threshold.admits(article))
            .collect()
    }
}

#[async_trait]
impl Scraper for SiteScraper {
    fn id(&self) -> &str {
        &self.id
    }

    async fn scrape(&self, threshold: &Threshold) -> Vec<Article> {
        let body = match self.fetcher.fetch(&self.url).await {
            Ok(body) => body,
            Err(e) => {
                self.logger.error(&format!("failed to fetch {}: {}", self.url, e));
                return Vec::new();
            }
        };

        let items = match self.parse(&body) {
            Ok(items) => items,
            Err(e) => {
                self.logger.warn(&format!("{}, skipping site", e));
                return Vec::new();
            }
        };

        if items.is_empty() {
            self.logger.info("no articles found");
            return Vec::new();
        }

        let total = items.len();
        let articles = self.collect(items, threshold);
        self.logger.info(&format!(
            "kept {} of {} articles published on or after {}",
            articles.len(),
            total,
            threshold
        ));
        articles
    }
}
