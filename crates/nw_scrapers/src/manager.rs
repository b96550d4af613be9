use std::sync::Arc;

use futures::future::join_all;
use nw_core::{Article, Fetcher, Threshold};
use tracing::info;

use crate::config::ScraperConfig;
use crate::scrapers::{Scraper, SiteScraper};

type BoxedScraper = Box<dyn Scraper>;

/// Runs every configured scraper against one threshold.
///
/// Scrapers run concurrently, but the output always lists the articles of
/// each scraper in the order the scrapers were added.
#[derive(Default)]
pub struct Pipeline {
    scrapers: Vec<BoxedScraper>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_configs(configs: &[ScraperConfig], fetcher: Arc<dyn Fetcher>) -> Self {
        let mut pipeline = Self::new();
        for config in configs {
            pipeline.add_scraper(Box::new(SiteScraper::new(config, fetcher.clone())));
        }
        pipeline
    }

    pub fn add_scraper(&mut self, scraper: BoxedScraper) {
        self.scrapers.push(scraper);
    }

    pub fn scraper_ids(&self) -> Vec<&str> {
        self.scrapers.iter().map(|s| s.id()).collect()
    }

    pub async fn run(&self, threshold: &Threshold) -> Vec<Article> {
        info!("🦗 Scraping {} sites for articles since {}", self.scrapers.len(), threshold);
        let per_site = join_all(self.scrapers.iter().map(|s| s.scrape(threshold))).await;
        let articles: Vec<Article> = per_site.into_iter().flatten().collect();
        info!("✨ Collected {} articles", articles.len());
        articles
    }
}

/// Builds a pipeline for `configs` and runs it once.
pub async fn run(
    threshold: &Threshold,
    configs: &[ScraperConfig],
    fetcher: Arc<dyn Fetcher>,
) -> Vec<Article> {
    Pipeline::from_configs(configs, fetcher).run(threshold).await
}
