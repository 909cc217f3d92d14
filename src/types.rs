use std::{convert::Infallible, str::FromStr};

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

use crate::utils::{ARCHIVE_VIEW_PREFIX, TIMESTAMP_FORMAT};

// Tabular CDX payload: row 0 is the header, rows 1..N are data rows in
// timestamp/original/statuscode/mimetype order.
pub type RawSnapshots = Vec<Vec<String>>;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("missing or empty target url")]
    InvalidInput,
    #[error("could not reach the archive service: {0}")]
    UpstreamUnreachable(#[from] reqwest::Error),
    #[error("archive service returned status {0}")]
    UpstreamError(u16),
    #[error("invalid archive response")]
    MalformedResponse,
    #[error("no snapshots found for this url")]
    EmptyResult,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub timestamp: String,
    pub original_url: String,
    pub status_code: String,
    pub mime_type: String,
    pub captured_at: Option<DateTime<Utc>>,
    pub year: String,
    pub archive_view_url: String,
}

impl Snapshot {
    pub fn from_row(row: &[String]) -> Self {
        let timestamp = row.first().cloned().unwrap_or_default();
        let original_url = row.get(1).cloned().unwrap_or_default();
        let status_code = row.get(2).cloned().unwrap_or_default();
        let mime_type = row.get(3).cloned().unwrap_or_default();

        // Timestamps are YYYYMMDDhhmmss in UTC. Anything that does not parse
        // keeps its raw string but renders as an invalid date.
        let captured_at = NaiveDateTime::parse_from_str(&timestamp, TIMESTAMP_FORMAT)
            .ok()
            .map(|naive| Utc.from_utc_datetime(&naive));
        let year = timestamp.get(..4).unwrap_or_default().to_string();
        let archive_view_url = format!("{}{}/{}", ARCHIVE_VIEW_PREFIX, timestamp, original_url);

        Snapshot {
            timestamp,
            original_url,
            status_code,
            mime_type,
            captured_at,
            year,
            archive_view_url,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Newest,
    Oldest,
    Status,
    Unspecified,
}

impl FromStr for SortMode {
    type Err = Infallible;

    // Unknown modes sort as a no-op rather than failing, so a stale or
    // mistyped mode leaves the view order untouched.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "newest" => SortMode::Newest,
            "oldest" => SortMode::Oldest,
            "status" => SortMode::Status,
            _ => SortMode::Unspecified,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    // None or the "all" sentinel disables a predicate; the query is inactive
    // when empty after trimming.
    pub status: Option<String>,
    pub year: Option<String>,
    pub query: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRow {
    pub rank: usize,
    pub captured: String,
    pub original_url: String,
    pub status_code: String,
    pub mime_type: String,
    pub archive_view_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total: usize,
    pub showing: usize,
    pub date_range: Option<String>,
}
