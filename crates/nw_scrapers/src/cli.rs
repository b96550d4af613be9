use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use nw_core::Result;

use crate::config::{self, ScraperConfig};
use crate::fetch::{FetchConfig, HttpFetcher, DEFAULT_TIMEOUT_SECS};
use crate::manager::Pipeline;

#[derive(Args, Debug, Clone)]
pub struct PipelineArgs {
    /// JSON array of {id, url, parser} site entries; defaults to the built-in list
    #[arg(long, value_name = "FILE")]
    pub sites: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

impl PipelineArgs {
    pub fn site_configs(&self) -> Result<Vec<ScraperConfig>> {
        match &self.sites {
            Some(path) => config::load_sites(path),
            None => Ok(config::default_sites()),
        }
    }

    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            ..FetchConfig::default()
        }
    }

    /// Resolves sites and the HTTP client without touching the network.
    pub fn build_pipeline(&self) -> Result<Pipeline> {
        let sites = self.site_configs()?;
        let fetcher = Arc::new(HttpFetcher::new(self.fetch_config())?);
        Ok(Pipeline::from_configs(&sites, fetcher))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        pipeline: PipelineArgs,
    }

    #[test]
    fn test_defaults() {
        let cli = TestCli::parse_from(["nw"]);
        assert_eq!(cli.pipeline.timeout_secs, DEFAULT_TIMEOUT_SECS);
        let pipeline = cli.pipeline.build_pipeline().unwrap();
        assert_eq!(pipeline.scraper_ids(), vec!["betakit", "finsmes"]);
    }

    #[test]
    fn test_timeout_flag() {
        let cli = TestCli::parse_from(["nw", "--timeout-secs", "5"]);
        assert_eq!(cli.pipeline.fetch_config().timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_missing_sites_file() {
        let cli = TestCli::parse_from(["nw", "--sites", "/nonexistent/sites.json"]);
        assert!(cli.pipeline.build_pipeline().is_err());
    }
}
