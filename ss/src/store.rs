//! SQLite-backed SummaryStore

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, SubsecRound, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::model::{RepoState, SummaryRecord, format_timestamp, parse_timestamp};
use crate::schema;

/// How long a writer waits on a locked database before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Durable record of repository watermarks and generated summaries
///
/// Holds only the database path. Each operation acquires a connection,
/// uses it, and releases it when the connection goes out of scope, including
/// on early returns through `?`.
#[derive(Debug, Clone)]
pub struct SummaryStore {
    db_path: PathBuf,
}

impl SummaryStore {
    /// Open (creating if needed) the database at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db_path = path.as_ref().to_path_buf();
        debug!(?db_path, "SummaryStore::open: called");

        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let store = Self { db_path };
        let conn = store.connect()?;
        schema::create_tables(&conn)?;

        info!(path = %store.db_path.display(), "Opened summary store");
        Ok(store)
    }

    /// Path of the underlying database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }

    /// When `repo` was last checked with changes, if ever
    pub fn get_last_check_timestamp(&self, repo: &str) -> Result<Option<DateTime<Utc>>, StoreError> {
        debug!(%repo, "get_last_check_timestamp: called");
        let conn = self.connect()?;

        let value: Option<Option<String>> = conn
            .query_row(
                "SELECT last_check_timestamp FROM repo_states WHERE repo_name = ?1",
                params![repo],
                |row| row.get(0),
            )
            .optional()?;

        match value.flatten().filter(|v| !v.is_empty()) {
            Some(raw) => parse_timestamp(&raw).map(Some).ok_or(StoreError::InvalidTimestamp {
                repo: repo.to_string(),
                value: raw,
            }),
            None => {
                debug!(%repo, "get_last_check_timestamp: never checked");
                Ok(None)
            }
        }
    }

    /// Full watermark row for `repo`
    pub fn get_repo_state(&self, repo: &str) -> Result<Option<RepoState>, StoreError> {
        debug!(%repo, "get_repo_state: called");
        let conn = self.connect()?;

        let row: Option<(Option<String>, Option<String>)> = conn
            .query_row(
                "SELECT last_commit_sha, last_check_timestamp FROM repo_states WHERE repo_name = ?1",
                params![repo],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((sha, raw_ts)) = row else {
            return Ok(None);
        };

        let raw_ts = raw_ts.unwrap_or_default();
        let last_check_timestamp = parse_timestamp(&raw_ts).ok_or(StoreError::InvalidTimestamp {
            repo: repo.to_string(),
            value: raw_ts,
        })?;

        Ok(Some(RepoState {
            repo_name: repo.to_string(),
            last_commit_sha: sha.unwrap_or_default(),
            last_check_timestamp,
        }))
    }

    /// Record a check of `repo` at the current time
    ///
    /// With `Some(sha)` the commit watermark moves to `sha`. With `None` the
    /// stored SHA is kept, or set to the empty string for a new repository.
    /// Returns the timestamp that was written.
    pub fn upsert_repo_state(&self, repo: &str, last_commit_sha: Option<&str>) -> Result<DateTime<Utc>, StoreError> {
        debug!(%repo, ?last_commit_sha, "upsert_repo_state: called");
        let conn = self.connect()?;
        write_repo_state(&conn, repo, last_commit_sha)
    }

    /// Append a summary for `repo`, returning its id
    pub fn append_summary(&self, repo: &str, summary: &str, changes_count: u32) -> Result<i64, StoreError> {
        debug!(%repo, changes_count, summary_len = summary.len(), "append_summary: called");
        if changes_count == 0 {
            return Err(StoreError::EmptySummary(repo.to_string()));
        }

        let conn = self.connect()?;
        let id = insert_summary(&conn, repo, summary, changes_count, &Utc::now())?;
        debug!(%repo, id, "append_summary: stored");
        Ok(id)
    }

    /// Advance the watermark and append the summary for one completed check
    ///
    /// Both writes share a transaction: either the watermark moves and the
    /// summary is stored, or neither happens. Returns the check timestamp and
    /// the new summary id.
    pub fn record_check(
        &self,
        repo: &str,
        last_commit_sha: Option<&str>,
        summary: &str,
        changes_count: u32,
    ) -> Result<(DateTime<Utc>, i64), StoreError> {
        debug!(%repo, ?last_commit_sha, changes_count, "record_check: called");
        if changes_count == 0 {
            return Err(StoreError::EmptySummary(repo.to_string()));
        }

        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let checked_at = write_repo_state(&tx, repo, last_commit_sha)?;
        let id = insert_summary(&tx, repo, summary, changes_count, &checked_at)?;
        tx.commit()?;

        debug!(%repo, id, "record_check: committed");
        Ok((checked_at, id))
    }

    /// Most recent summaries first, optionally for one repository only
    pub fn list_summaries(&self, repo_filter: Option<&str>, limit: usize) -> Result<Vec<SummaryRecord>, StoreError> {
        debug!(?repo_filter, limit, "list_summaries: called");
        let conn = self.connect()?;

        let mut stmt = conn.prepare(
            "SELECT id, repo_name, summary, changes_count, timestamp
             FROM summaries
             WHERE (?1 IS NULL OR repo_name = ?1)
             ORDER BY timestamp DESC, id DESC
             LIMIT ?2",
        )?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt
            .query_map(params![repo_filter, limit], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, u32>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut records = Vec::with_capacity(rows.len());
        for (id, repo_name, summary, changes_count, raw_ts) in rows {
            let Some(timestamp) = parse_timestamp(&raw_ts) else {
                return Err(StoreError::InvalidTimestamp {
                    repo: repo_name,
                    value: raw_ts,
                });
            };
            records.push(SummaryRecord {
                id,
                repo_name,
                summary,
                changes_count,
                timestamp,
            });
        }

        debug!(count = records.len(), "list_summaries: loaded");
        Ok(records)
    }
}

/// Upsert the watermark row, stamped with the current time at microsecond precision
fn write_repo_state(conn: &Connection, repo: &str, last_commit_sha: Option<&str>) -> Result<DateTime<Utc>, StoreError> {
    let now = Utc::now().trunc_subsecs(6);
    conn.execute(
        "INSERT INTO repo_states (repo_name, last_commit_sha, last_check_timestamp)
         VALUES (?1, COALESCE(?2, (SELECT last_commit_sha FROM repo_states WHERE repo_name = ?1), ''), ?3)
         ON CONFLICT(repo_name) DO UPDATE SET
             last_commit_sha = excluded.last_commit_sha,
             last_check_timestamp = excluded.last_check_timestamp",
        params![repo, last_commit_sha, format_timestamp(&now)],
    )?;
    Ok(now)
}

fn insert_summary(
    conn: &Connection,
    repo: &str,
    summary: &str,
    changes_count: u32,
    at: &DateTime<Utc>,
) -> Result<i64, StoreError> {
    conn.execute(
        "INSERT INTO summaries (repo_name, summary, changes_count, timestamp) VALUES (?1, ?2, ?3, ?4)",
        params![repo, summary, changes_count, format_timestamp(at)],
    )?;
    Ok(conn.last_insert_rowid())
}
