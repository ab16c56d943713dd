//! The one textual timestamp format used by the tool.
//!
//! Servers send `Last-Modified` as an IMF-fixdate (`Sun, 06 Nov 1994 08:49:37 GMT`),
//! and the `last_checked` stamp we write uses the same layout so both can be
//! rendered with one parser. Stored values stay opaque strings; they are only
//! parsed for throttling and display.

use chrono::{DateTime, NaiveDateTime, Utc};

/// strftime pattern of an HTTP date, always in GMT
pub const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Format a UTC instant as an HTTP date
pub fn format_http_date(instant: DateTime<Utc>) -> String {
    instant.format(HTTP_DATE_FORMAT).to_string()
}

/// Parse an HTTP date, `None` when the text does not match the fixed format
pub fn parse_http_date(text: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(text.trim(), HTTP_DATE_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Date part (`YYYY-MM-DD`) of an HTTP date
pub fn short_date(text: &str) -> Option<String> {
    parse_http_date(text).map(|dt| dt.format("%Y-%m-%d").to_string())
}
