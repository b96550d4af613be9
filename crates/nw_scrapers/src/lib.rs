pub mod cli;
pub mod config;
pub mod dates;
pub mod fetch;
pub mod logging;
pub mod manager;
pub mod scrapers;

pub use cli::PipelineArgs;
pub use config::{ParserKind, ScraperConfig};
pub use fetch::{FetchConfig, HttpFetcher};
pub use manager::Pipeline;
pub use scrapers::{Scraper, SiteParser, SiteScraper};

pub mod prelude {
    pub use super::scrapers::{Scraper, SiteParser};
    pub use nw_core::{Article, Error, Result, Threshold};
}
