use crate::dates::LONG_DATE_FORMAT;
use crate::scrapers::{DateField, ListingLayout, SiteParser};

// Cards sit directly in the page; the module inside each card is the item.
static LAYOUT: ListingLayout = ListingLayout {
    container: None,
    item: "div.td-cpt-post",
    inner: Some("div.td-module-container"),
    date: "time.entry-date",
    date_field: DateField::Attribute {
        name: "datetime",
        fallback_pattern: LONG_DATE_FORMAT,
    },
    heading: "h3.entry-title",
    link: "a",
};

#[derive(Debug, Clone, Default)]
pub struct FinSmesParser;

impl FinSmesParser {
    pub fn new() -> Self {
        Self
    }

    pub const BASE_URL: &'static str = "https://www.finsmes.com/category/canada";
}

impl SiteParser for FinSmesParser {
    fn layout(&self) -> &ListingLayout {
        &LAYOUT
    }
}
