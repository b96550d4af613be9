use crate::config::{ParserKind, ScraperConfig};

pub mod betakit;
pub mod finsmes;

pub use betakit::BetaKitParser;
pub use finsmes::FinSmesParser;

/// The Canadian startup news sites, in output order
pub fn default_sites() -> Vec<ScraperConfig> {
    vec![
        ScraperConfig::new("betakit", BetaKitParser::BASE_URL, ParserKind::BetaKit),
        ScraperConfig::new("finsmes", FinSmesParser::BASE_URL, ParserKind::FinSmes),
    ]
}
