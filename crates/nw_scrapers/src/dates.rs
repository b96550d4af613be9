//! Normalization of the date shapes found on listing pages.
//!
//! Every shape ends up as a timezone-naive [`NaiveDateTime`]. Timestamps that
//! carry a UTC offset keep their wall-clock time and lose the offset; they are
//! not converted to UTC first.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use nw_core::{Error, Result};

/// English long-form date, e.g. "April 14, 2025".
pub const LONG_DATE_FORMAT: &str = "%B %d, %Y";

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Raw date material pulled out of a listing item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateInput {
    /// Display text in a site-specific pattern.
    Text { text: String, pattern: &'static str },
    /// Machine-readable timestamp plus the element's display text, which is
    /// tried with `pattern` when the timestamp does not parse.
    Timestamp {
        value: String,
        text: String,
        pattern: &'static str,
    },
}

/// Turns a [`DateInput`] into the canonical naive instant.
pub fn normalize(input: &DateInput) -> Result<NaiveDateTime> {
    match input {
        DateInput::Text { text, pattern } => parse_long_form(text, pattern),
        DateInput::Timestamp { value, text, pattern } => parse_timestamp(value)
            .or_else(|_| parse_long_form(text, pattern))
            .map_err(|_| Error::UnparseableDate(value.clone())),
    }
}

/// Parses display text with `pattern`. Date-only patterns land on midnight.
pub fn parse_long_form(text: &str, pattern: &str) -> Result<NaiveDateTime> {
    let text = text.trim();
    NaiveDateTime::parse_from_str(text, pattern)
        .or_else(|_| {
            NaiveDate::parse_from_str(text, pattern).map(|day| day.and_time(NaiveTime::MIN))
        })
        .map_err(|_| Error::UnparseableDate(text.to_string()))
}

/// Parses an ISO-8601 style timestamp, dropping any offset in place.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.naive_local());
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Ok(dt.naive_local());
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|day| day.and_time(NaiveTime::MIN))
        .map_err(|_| Error::UnparseableDate(value.to_string()))
}
