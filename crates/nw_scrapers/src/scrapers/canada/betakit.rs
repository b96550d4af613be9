use crate::dates::LONG_DATE_FORMAT;
use crate::scrapers::{DateField, ListingLayout, SiteParser};

static LAYOUT: ListingLayout = ListingLayout {
    container: Some("section.section__latest-posts"),
    item: "article",
    inner: None,
    date: "span.entry-date",
    date_field: DateField::Text { pattern: LONG_DATE_FORMAT },
    heading: "h2.entry-title",
    link: "a",
};

/// "Latest" listing on BetaKit: one `<article>` per post, long-form date text.
#[derive(Debug, Clone, Default)]
pub struct BetaKitParser;

impl BetaKitParser {
    pub fn new() -> Self {
        Self
    }

    pub const BASE_URL: &'static str = "https://betakit.com/";
}

impl SiteParser for BetaKitParser {
    fn layout(&self) -> &ListingLayout {
        &LAYOUT
    }
}
