//! GitHub REST API payloads
//!
//! Only the fields the summarizer reads are modelled; serde ignores the rest.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// An entry from `GET /repos/{owner}/{repo}/commits`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub commit: CommitDetail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitDetail {
    pub message: String,
    pub author: CommitAuthor,
}

/// Git author as recorded in the commit; `date` is kept verbatim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitAuthor {
    pub name: String,
    pub date: String,
}

impl Commit {
    pub fn new(
        sha: impl Into<String>,
        message: impl Into<String>,
        author: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            sha: sha.into(),
            commit: CommitDetail {
                message: message.into(),
                author: CommitAuthor {
                    name: author.into(),
                    date: date.into(),
                },
            },
        }
    }

    /// First line of the commit message
    pub fn headline(&self) -> &str {
        self.commit.message.lines().next().unwrap_or_default()
    }

    pub fn author_name(&self) -> &str {
        &self.commit.author.name
    }

    pub fn author_date(&self) -> &str {
        &self.commit.author.date
    }
}

/// An entry from `GET /repos/{owner}/{repo}/pulls`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub state: String,
    pub title: String,
    pub user: PullUser,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullUser {
    pub login: String,
}

impl PullRequest {
    pub fn new(
        state: impl Into<String>,
        title: impl Into<String>,
        login: impl Into<String>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            state: state.into(),
            title: title.into(),
            user: PullUser { login: login.into() },
            updated_at,
        }
    }

    /// `updated_at` in the API's own `YYYY-MM-DDTHH:MM:SSZ` form
    pub fn updated_at_display(&self) -> String {
        self.updated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}
