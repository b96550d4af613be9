use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Placeholder title for listing items whose heading could not be resolved.
pub const NO_TITLE: &str = "No Title";

/// Day format used for thresholds and for rendering article dates.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// A single article preview lifted from a site's listing page.
///
/// `published_at` is timezone-naive: whatever offset the source carried has
/// already been dropped, so it must not be read as UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub link: String,
    pub published_at: NaiveDateTime,
}

impl Article {
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        published_at: NaiveDateTime,
    ) -> Self {
        let title = title.into();
        let title = if title.trim().is_empty() {
            NO_TITLE.to_string()
        } else {
            title
        };
        Self {
            title,
            link: link.into(),
            published_at,
        }
    }

    /// Publication day as `YYYY-MM-DD`.
    pub fn date_string(&self) -> String {
        self.published_at.format(DAY_FORMAT).to_string()
    }
}

/// Inclusive lower bound on `Article::published_at` for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Threshold(NaiveDateTime);

impl Threshold {
    pub fn instant(&self) -> NaiveDateTime {
        self.0
    }

    pub fn admits(&self, article: &Article) -> bool {
        article.published_at >= self.0
    }
}

impl From<NaiveDate> for Threshold {
    fn from(day: NaiveDate) -> Self {
        Self(day.and_time(NaiveTime::MIN))
    }
}

impl FromStr for Threshold {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), DAY_FORMAT)
            .map(Threshold::from)
            .map_err(|_| Error::InvalidThreshold(s.to_string()))
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DAY_FORMAT))
    }
}
