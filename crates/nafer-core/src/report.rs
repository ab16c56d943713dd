//! Text output of a run: the per-feed table, the one-line summary, the feed list.

use std::fmt;

use crate::check::FeedReport;
use crate::feed::{
    STATUS_BAD_FEED, STATUS_GONE, STATUS_MOVED_PERMANENTLY, STATUS_NOT_FOUND, STATUS_NOT_MODIFIED,
    STATUS_TOO_MANY_REQUESTS, STATUS_UNKNOWN, STATUS_UPDATED,
};
use crate::storage::FeedStore;
use crate::timestamp::short_date;

/// Printed instead of a summary when the feed store cannot be loaded
pub const LOAD_FAILURE_SUMMARY: &str = "x/x!/x";

const TABLE_HEADER: [&str; 5] = ["Feed", "Status code", "Status", "Last modified", "Last checked"];

pub fn status_label(status: Option<i32>) -> &'static str {
    match status {
        Some(STATUS_UPDATED) => "Feed updated",
        Some(STATUS_MOVED_PERMANENTLY) => "Feed permanently redirected",
        Some(STATUS_NOT_MODIFIED) => "Feed not modified",
        Some(STATUS_NOT_FOUND) => "Feed not found",
        Some(STATUS_GONE) => "Feed gone",
        Some(STATUS_TOO_MANY_REQUESTS) => "Too many requests",
        Some(STATUS_BAD_FEED) => "Bad feed/URL",
        _ => "Unknown",
    }
}

/// How a status counts in the short summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Updated,
    Bad,
    /// Not modified, never checked, or any other code
    Neutral,
}

impl StatusClass {
    pub fn of(status: Option<i32>) -> Self {
        match status {
            Some(STATUS_UPDATED | STATUS_MOVED_PERMANENTLY) => StatusClass::Updated,
            Some(
                STATUS_NOT_FOUND
                | STATUS_GONE
                | STATUS_TOO_MANY_REQUESTS
                | STATUS_BAD_FEED
                | STATUS_UNKNOWN,
            ) => StatusClass::Bad,
            _ => StatusClass::Neutral,
        }
    }
}

/// `<updated>/<bad>!/<total>`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShortSummary {
    pub updated: usize,
    pub bad: usize,
    pub total: usize,
}

impl ShortSummary {
    pub fn from_statuses<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = Option<i32>>,
    {
        statuses
            .into_iter()
            .fold(Self::default(), |mut summary, status| {
                match StatusClass::of(status) {
                    StatusClass::Updated => summary.updated += 1,
                    StatusClass::Bad => summary.bad += 1,
                    StatusClass::Neutral => {}
                }
                summary.total += 1;
                summary
            })
    }

    pub fn from_reports(reports: &[FeedReport]) -> Self {
        Self::from_statuses(reports.iter().map(|report| report.status))
    }
}

impl fmt::Display for ShortSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}!/{}", self.updated, self.bad, self.total)
    }
}

fn table_row(report: &FeedReport) -> [String; 5] {
    let date = |value: &Option<String>| {
        value
            .as_deref()
            .and_then(short_date)
            .unwrap_or_else(|| "-".to_string())
    };

    [
        report.name.clone(),
        report
            .status
            .map(|status| status.to_string())
            .unwrap_or_else(|| "-".to_string()),
        status_label(report.status).to_string(),
        date(&report.record.modified),
        date(&report.record.last_checked),
    ]
}

/// Render the per-feed table, one row per report
pub fn render_table(reports: &[FeedReport]) -> String {
    let rows: Vec<[String; 5]> = reports.iter().map(table_row).collect();

    let mut widths = TABLE_HEADER.map(|title| title.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let separator = widths
        .iter()
        .fold(String::from("+"), |line, width| line + &"-".repeat(width + 2) + "+");
    let format_row = |cells: &[&str]| {
        cells
            .iter()
            .zip(&widths)
            .fold(String::from("|"), |line, (cell, width)| {
                let pad = width - cell.chars().count();
                format!("{} {}{} |", line, cell, " ".repeat(pad))
            })
    };

    let mut out = Vec::with_capacity(rows.len() + 4);
    out.push(separator.clone());
    out.push(format_row(&TABLE_HEADER));
    out.push(separator.clone());
    for row in &rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push(format_row(&cells));
    }
    out.push(separator);
    out.join("\n")
}

/// `name: url` for every feed; feeds without a URL show `-`
pub fn render_list(store: &FeedStore) -> Vec<String> {
    store
        .iter()
        .map(|(name, record)| format!("{}: {}", name, record.url.as_deref().unwrap_or("-")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::FeedRecord;
    use pretty_assertions::assert_eq;

    fn report(name: &str, status: Option<i32>) -> FeedReport {
        FeedReport {
            name: name.to_string(),
            status,
            record: FeedRecord::default(),
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(status_label(Some(200)), "Feed updated");
        assert_eq!(status_label(Some(301)), "Feed permanently redirected");
        assert_eq!(status_label(Some(304)), "Feed not modified");
        assert_eq!(status_label(Some(404)), "Feed not found");
        assert_eq!(status_label(Some(410)), "Feed gone");
        assert_eq!(status_label(Some(429)), "Too many requests");
        assert_eq!(status_label(Some(-1)), "Bad feed/URL");
        assert_eq!(status_label(Some(-2)), "Unknown");
        assert_eq!(status_label(Some(500)), "Unknown");
        assert_eq!(status_label(None), "Unknown");
    }

    #[test]
    fn test_short_summary_counting() {
        let summary = ShortSummary::from_statuses([Some(200), Some(410), Some(304), Some(429)]);
        assert_eq!(summary.to_string(), "1/2!/4");
    }

    #[test]
    fn test_short_summary_boundaries() {
        let summary = ShortSummary::from_statuses([
            Some(301),
            Some(-1),
            Some(-2),
            Some(404),
            Some(500),
            None,
        ]);
        assert_eq!(
            summary,
            ShortSummary {
                updated: 1,
                bad: 3,
                total: 6
            }
        );
        assert_eq!(ShortSummary::from_reports(&[]).to_string(), "0/0!/0");
    }

    #[test]
    fn test_table_shows_dates_and_placeholders() {
        let mut checked = report("lwn", Some(304));
        checked.record.modified = Some("Wed, 21 Oct 2015 07:28:00 GMT".to_string());
        checked.record.last_checked = Some("Thu, 22 Oct 2015 08:00:00 GMT".to_string());

        let table = render_table(&[checked, report("x", None)]);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 6);
        assert_eq!(
            lines[1],
            "| Feed | Status code | Status            | Last modified | Last checked |"
        );
        assert_eq!(
            lines[3],
            "| lwn  | 304         | Feed not modified | 2015-10-21    | 2015-10-22   |"
        );
        assert_eq!(
            lines[4],
            "| x    | -           | Unknown           | -             | -            |"
        );
        assert_eq!(lines[0], lines[5]);
    }

    #[test]
    fn test_list_lines() {
        let store: FeedStore = [
            ("A".to_string(), FeedRecord::with_url("http://x")),
            ("B".to_string(), FeedRecord::with_url("http://y")),
            ("C".to_string(), FeedRecord::default()),
        ]
        .into_iter()
        .collect();

        assert_eq!(render_list(&store), vec!["A: http://x", "B: http://y", "C: -"]);
    }
}
