//! GitHub fetch error types

use thiserror::Error;

/// A failed fetch for one repository
#[derive(Debug, Error)]
pub enum GithubError {
    #[error("Fetch error for {repo}: {source}")]
    Network {
        repo: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Fetch error for {repo}: GitHub API returned {status}: {message}")]
    Api { repo: String, status: u16, message: String },

    #[error("Invalid repository '{0}', expected owner/name")]
    InvalidRepo(String),
}
