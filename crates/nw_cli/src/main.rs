use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::Parser;
use nw_core::{Article, ArticleSink, Threshold};
use nw_scrapers::logging::init_logging;
use nw_scrapers::PipelineArgs;
use nw_storage::{create_sink, flatfile, SheetsConfig, SinkConfig};
use tracing::{error, info, warn};

const USAGE: &str = "usage: nw <threshold_date (YYYY-MM-DD)>";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Collect recent articles from news listing pages",
    long_about = None
)]
pub struct Cli {
    /// Keep articles published on or after this date (YYYY-MM-DD)
    #[arg(required_unless_present = "from_file")]
    threshold: Option<String>,

    /// Flat file the articles are written to
    #[arg(short, long, default_value = "articles.txt")]
    output: PathBuf,

    /// Do not write the flat file
    #[arg(long)]
    no_file: bool,

    /// Append the articles to Google Sheets (configured through SPREADSHEET_* variables)
    #[arg(long)]
    sheets: bool,

    /// Send the records of an existing flat file to Google Sheets instead of scraping
    #[arg(long, value_name = "FILE", requires = "sheets", conflicts_with = "threshold")]
    from_file: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,

    #[command(flatten)]
    pipeline: PipelineArgs,
}

impl Cli {
    /// Every sink is configured before anything touches the network.
    fn sink_configs(&self) -> anyhow::Result<Vec<SinkConfig>> {
        let mut configs = Vec::new();
        if !self.no_file && self.from_file.is_none() {
            configs.push(SinkConfig::FlatFile {
                path: self.output.clone(),
            });
        }
        if self.sheets {
            let sheets = SheetsConfig::from_env().context("Google Sheets is not configured")?;
            configs.push(SinkConfig::Sheets(sheets));
        }
        Ok(configs)
    }

    fn threshold(&self) -> anyhow::Result<Threshold> {
        let Some(raw) = self.threshold.as_deref() else {
            bail!("missing threshold date; {}", USAGE);
        };
        raw.parse::<Threshold>().with_context(|| USAGE.to_string())
    }
}

async fn load(path: &Path) -> anyhow::Result<Vec<Article>> {
    let articles = flatfile::read_articles(path)
        .await
        .with_context(|| format!("cannot load articles from {}", path.display()))?;
    info!("📄 Loaded {} articles from {}", articles.len(), path.display());
    Ok(articles)
}

async fn deliver(sinks: &[Box<dyn ArticleSink>], articles: &[Article]) -> anyhow::Result<()> {
    if sinks.is_empty() {
        warn!("No output selected, printing articles");
        for article in articles {
            println!("{}  {}  {}", article.date_string(), article.title, article.link);
        }
        return Ok(());
    }
    for sink in sinks {
        sink.write_articles(articles)
            .await
            .with_context(|| format!("failed to write articles to {}", sink.name()))?;
    }
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let threshold = cli.from_file.is_none().then(|| cli.threshold()).transpose()?;
    let sinks = cli
        .sink_configs()?
        .into_iter()
        .map(create_sink)
        .collect::<nw_core::Result<Vec<_>>>()?;

    let articles = match (threshold, &cli.from_file) {
        (Some(threshold), _) => {
            let pipeline = cli
                .pipeline
                .build_pipeline()
                .context("invalid scraper configuration")?;
            info!("🦗 Scrapers initialized: {}", pipeline.scraper_ids().join(", "));
            pipeline.run(&threshold).await
        }
        (None, Some(path)) => load(path).await?,
        (None, None) => bail!(USAGE),
    };

    deliver(&sinks, &articles).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_logging(cli.verbose);
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
