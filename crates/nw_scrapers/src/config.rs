use std::fs;
use std::path::Path;

use nw_core::{Error, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::scrapers::canada::{BetaKitParser, FinSmesParser};
use crate::scrapers::SiteParser;

/// The markup variant a site is parsed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParserKind {
    BetaKit,
    FinSmes,
}

impl ParserKind {
    pub fn build(self) -> Box<dyn SiteParser> {
        match self {
            ParserKind::BetaKit => Box::new(BetaKitParser::new()),
            ParserKind::FinSmes => Box::new(FinSmesParser::new()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScraperConfig {
    pub id: String,
    pub url: String,
    pub parser: ParserKind,
}

impl ScraperConfig {
    pub fn new(id: &str, url: &str, parser: ParserKind) -> Self {
        Self {
            id: id.to_string(),
            url: url.to_string(),
            parser,
        }
    }
}

/// Built-in site list, in output order.
pub fn default_sites() -> Vec<ScraperConfig> {
    crate::scrapers::canada::default_sites()
}

/// Reads a JSON array of site configs.
pub fn load_sites(path: &Path) -> Result<Vec<ScraperConfig>> {
    let raw = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
    parse_sites(&raw)
}

pub fn parse_sites(raw: &str) -> Result<Vec<ScraperConfig>> {
    let sites: Vec<ScraperConfig> = serde_json::from_str(raw)?;
    if sites.is_empty() {
        return Err(Error::Config("site list is empty".to_string()));
    }
    for site in &sites {
        Url::parse(&site.url).map_err(|e| {
            Error::Config(format!("site {} has an invalid url {:?}: {}", site.id, site.url, e))
        })?;
    }
    Ok(sites)
}
