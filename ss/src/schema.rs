use rusqlite::Connection;

pub(crate) fn create_tables(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS repo_states (
            repo_name            TEXT PRIMARY KEY,
            last_commit_sha      TEXT,
            last_check_timestamp TEXT
        );

        CREATE TABLE IF NOT EXISTS summaries (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            repo_name     TEXT NOT NULL,
            summary       TEXT NOT NULL,
            changes_count INTEGER NOT NULL,
            timestamp     TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_summaries_repo ON summaries(repo_name, timestamp);
        ",
    )
}
