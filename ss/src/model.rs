//! Persisted record types

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Watermarks for a single repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoState {
    /// Repository identifier (owner/name)
    pub repo_name: String,
    /// Newest commit SHA seen; empty when no commit has been observed yet
    pub last_commit_sha: String,
    /// When the repository was last checked with changes found
    pub last_check_timestamp: DateTime<Utc>,
}

/// One generated summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub id: i64,
    pub repo_name: String,
    pub summary: String,
    pub changes_count: u32,
    pub timestamp: DateTime<Utc>,
}

/// Render a timestamp the way it is stored: `YYYY-MM-DDTHH:MM:SS.ffffffZ`
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp
///
/// Accepts RFC 3339 and the offset-less ISO form older databases wrote
/// (`2024-01-01T09:00:00.123456`), which is read as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
