use async_trait::async_trait;
use nw_core::{Article, Error, Result, Threshold, NO_TITLE};
use scraper::{ElementRef, Html, Selector};

use crate::dates::{self, DateInput};

pub mod canada;
pub mod site;

pub use site::SiteScraper;

#[async_trait]
pub trait Scraper: Send + Sync {
    /// Identifier of the site this scraper covers
    fn id(&self) -> &str;

    /// Fetches the listing page and returns the articles on or after `threshold`,
    /// in document order. Site failures yield an empty list.
    async fn scrape(&self, threshold: &Threshold) -> Vec<Article>;
}

/// Turns a parsed listing page into raw items for one site's markup.
pub trait SiteParser: Send + Sync {
    /// Selectors and date interpretation for this site
    fn layout(&self) -> &ListingLayout;

    /// Extracts raw items in document order.
    ///
    /// Fails only with [`Error::ContainerNotFound`] (or a bad selector); items
    /// without a usable date element are skipped.
    fn extract(&self, document: &Html) -> Result<Vec<RawItem>> {
        extract_listing(document, self.layout())
    }
}

/// Where a listing item keeps its publication date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    /// The date element's text, read with `pattern`.
    Text { pattern: &'static str },
    /// A timestamp attribute on the date element; the element text read with
    /// `fallback_pattern` backs it up.
    Attribute {
        name: &'static str,
        fallback_pattern: &'static str,
    },
}

impl DateField {
    fn read(&self, element: ElementRef<'_>) -> Option<DateInput> {
        match *self {
            DateField::Text { pattern } => Some(DateInput::Text {
                text: utils::element_text(element),
                pattern,
            }),
            DateField::Attribute { name, fallback_pattern } => {
                let value = element.value().attr(name)?.trim();
                if value.is_empty() {
                    return None;
                }
                Some(DateInput::Timestamp {
                    value: value.to_string(),
                    text: utils::element_text(element),
                    pattern: fallback_pattern,
                })
            }
        }
    }
}

/// CSS selectors describing one site's listing markup.
#[derive(Debug, Clone, Copy)]
pub struct ListingLayout {
    /// Outer listing container; `None` means the whole document.
    pub container: Option<&'static str>,
    /// Candidate item nodes inside the container.
    pub item: &'static str,
    /// Inner module that holds the actual item; cards without it are dropped.
    pub inner: Option<&'static str>,
    pub date: &'static str,
    pub date_field: DateField,
    /// Heading that wraps the title link.
    pub heading: &'static str,
    pub link: &'static str,
}

/// A listing item before date normalization and filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawItem {
    pub title: String,
    pub link: String,
    pub date: DateInput,
}

impl RawItem {
    pub fn into_article(self) -> Result<Article> {
        let published_at = dates::normalize(&self.date)?;
        Ok(Article::new(self.title, self.link, published_at))
    }
}

/// The extraction walk shared by every [`SiteParser`].
pub fn extract_listing(document: &Html, layout: &ListingLayout) -> Result<Vec<RawItem>> {
    let item_selector = utils::selector(layout.item)?;
    let inner_selector = layout.inner.map(utils::selector).transpose()?;
    let date_selector = utils::selector(layout.date)?;
    let heading_selector = utils::selector(layout.heading)?;
    let link_selector = utils::selector(layout.link)?;

    let root = match layout.container {
        Some(css) => {
            let container_selector = utils::selector(css)?;
            document
                .select(&container_selector)
                .next()
                .ok_or_else(|| Error::ContainerNotFound(css.to_string()))?
        }
        None => document.root_element(),
    };

    let mut items = Vec::new();
    for candidate in root.select(&item_selector) {
        let node = match &inner_selector {
            Some(inner) => match candidate.select(inner).next() {
                Some(module) => module,
                None => continue,
            },
            None => candidate,
        };

        let Some(date_input) = node
            .select(&date_selector)
            .next()
            .and_then(|el| layout.date_field.read(el))
        else {
            continue;
        };

        let (title, link) = node
            .select(&heading_selector)
            .next()
            .and_then(|heading| heading.select(&link_selector).next())
            .map(|anchor| {
                let title = utils::element_text(anchor);
                let link = anchor.value().attr("href").unwrap_or_default().trim().to_string();
                (title, link)
            })
            .unwrap_or_else(|| (NO_TITLE.to_string(), String::new()));

        items.push(RawItem {
            title,
            link,
            date: date_input,
        });
    }

    Ok(items)
}

/// Common utilities for scrapers
pub(crate) mod utils {
    use super::*;

    pub fn selector(css: &str) -> Result<Selector> {
        Selector::parse(css).map_err(|e| Error::Selector(format!("{}: {}", css, e)))
    }

    /// Text content with whitespace runs collapsed to single spaces.
    pub fn element_text(element: ElementRef<'_>) -> String {
        element
            .text()
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }
}
