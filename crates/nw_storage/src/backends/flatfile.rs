use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use nw_core::{Article, ArticleSink, Error, Result, DAY_FORMAT};
use tracing::info;

pub const SEPARATOR_WIDTH: usize = 40;

const TITLE_KEY: &str = "Title:";
const DATE_KEY: &str = "Date:";
const LINK_KEY: &str = "Link:";

/// One block of the flat-file format, with the date kept as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatRecord {
    pub title: String,
    pub date: String,
    pub link: String,
}

impl From<&Article> for FlatRecord {
    fn from(article: &Article) -> Self {
        Self {
            title: article.title.clone(),
            date: article.date_string(),
            link: article.link.clone(),
        }
    }
}

impl FlatRecord {
    /// Rebuilds the article; the time of day is gone, so it lands on midnight.
    pub fn into_article(self) -> Result<Article> {
        let day = NaiveDate::parse_from_str(&self.date, DAY_FORMAT)
            .map_err(|_| Error::UnparseableDate(self.date.clone()))?;
        Ok(Article::new(self.title, self.link, day.and_time(NaiveTime::MIN)))
    }
}

fn separator() -> String {
    "-".repeat(SEPARATOR_WIDTH)
}

/// Renders articles as `Title:`/`Date:`/`Link:` blocks closed by a dashed line.
pub fn render(articles: &[Article]) -> String {
    let separator = separator();
    let mut out = String::new();
    for article in articles {
        out.push_str(&format!("{} {}\n", TITLE_KEY, article.title));
        out.push_str(&format!("{}  {}\n", DATE_KEY, article.date_string()));
        out.push_str(&format!("{}  {}\n", LINK_KEY, article.link));
        out.push_str(&separator);
        out.push('\n');
    }
    out
}

/// Reads the blocks written by [`render`]. A block ends at a line that is
/// exactly the separator; blocks without any known field are ignored.
pub fn parse_records(text: &str) -> Vec<FlatRecord> {
    let separator = separator();
    let mut records = Vec::new();
    let mut block: Vec<&str> = Vec::new();
    for line in text.lines().map(str::trim) {
        if line == separator {
            records.extend(parse_block(&block));
            block.clear();
        } else {
            block.push(line);
        }
    }
    records.extend(parse_block(&block));
    records
}

fn parse_block(lines: &[&str]) -> Option<FlatRecord> {
    let mut title = None;
    let mut date = None;
    let mut link = None;
    for line in lines {
        if let Some(value) = line.strip_prefix(TITLE_KEY) {
            title = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix(DATE_KEY) {
            date = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix(LINK_KEY) {
            link = Some(value.trim().to_string());
        }
    }
    if title.is_none() && date.is_none() && link.is_none() {
        return None;
    }
    Some(FlatRecord {
        title: title.unwrap_or_default(),
        date: date.unwrap_or_default(),
        link: link.unwrap_or_default(),
    })
}

/// Loads a previously written file back into articles.
pub async fn read_articles(path: &Path) -> Result<Vec<Article>> {
    let text = tokio::fs::read_to_string(path).await?;
    parse_records(&text)
        .into_iter()
        .map(FlatRecord::into_article)
        .collect()
}

#[derive(Debug, Clone)]
pub struct FlatFileSink {
    path: PathBuf,
}

impl FlatFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ArticleSink for FlatFileSink {
    fn name(&self) -> &str {
        "flat file"
    }

    async fn write_articles(&self, articles: &[Article]) -> Result<()> {
        tokio::fs::write(&self.path, render(articles)).await?;
        info!("💾 Saved {} articles to '{}'", articles.len(), self.path.display());
        Ok(())
    }
}
