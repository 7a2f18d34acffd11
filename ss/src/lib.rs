//! SummaryStore - persistent state for repository change summaries
//!
//! Keeps two SQLite tables: one watermark row per repository and an
//! append-only log of generated summaries.
//!
//! # Layout
//!
//! ```text
//! repo_states(repo_name PK, last_commit_sha, last_check_timestamp)
//! summaries(id PK AUTOINCREMENT, repo_name, summary, changes_count, timestamp)
//! ```
//!
//! Every operation opens its own connection and drops it before returning,
//! so no handle outlives the call that needed it.
//!
//! # Example
//!
//! ```ignore
//! use summarystore::SummaryStore;
//!
//! let store = SummaryStore::open("repo_summaries.db")?;
//! store.upsert_repo_state("rust-lang/rust", Some("abc123"))?;
//! store.append_summary("rust-lang/rust", "Lots of compiler work", 3)?;
//! let recent = store.list_summaries(None, 10)?;
//! ```

mod error;
mod model;
mod schema;
mod store;

pub use error::StoreError;
pub use model::{RepoState, SummaryRecord, format_timestamp, parse_timestamp};
pub use store::SummaryStore;

/// Default file name for the summary database
pub const DEFAULT_DB_FILE: &str = "repo_summaries.db";
