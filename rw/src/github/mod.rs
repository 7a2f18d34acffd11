//! Change fetching from the GitHub REST API
//!
//! The monitor talks to GitHub only through [`ChangeSource`], which keeps the
//! HTTP client swappable in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

mod client;
mod error;
mod types;

pub use client::GithubClient;
pub use error::GithubError;
pub use types::{Commit, CommitAuthor, CommitDetail, PullRequest, PullUser};

/// Pull requests requested per check, most recently updated first
pub const PULLS_PER_PAGE: u32 = 10;

/// Source of commits and pull requests for a repository
#[async_trait]
pub trait ChangeSource: Send + Sync {
    /// Commits newer than `since`, newest first
    ///
    /// `None` leaves the window to the API's default.
    async fn fetch_commits(&self, repo: &str, since: Option<DateTime<Utc>>) -> Result<Vec<Commit>, GithubError>;

    /// The most recently updated pull requests in any state, newest first
    async fn fetch_pulls(&self, repo: &str) -> Result<Vec<PullRequest>, GithubError>;
}

/// Check that `repo` looks like `owner/name`
pub fn validate_repo(repo: &str) -> Result<(), GithubError> {
    let mut parts = repo.split('/');
    let valid = matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty()
    ) && !repo.chars().any(char::is_whitespace);

    if valid {
        Ok(())
    } else {
        Err(GithubError::InvalidRepo(repo.to_string()))
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;
    use tracing::debug;

    /// In-memory change source that behaves like the real endpoints
    ///
    /// Commits are filtered server-side by `since`; pulls are returned as-is.
    #[derive(Default)]
    pub struct MockChangeSource {
        commits: Mutex<Vec<Commit>>,
        pulls: Mutex<Vec<PullRequest>>,
        failing: Mutex<Vec<String>>,
        since_calls: Mutex<Vec<(String, Option<DateTime<Utc>>)>>,
    }

    impl MockChangeSource {
        pub fn new(commits: Vec<Commit>, pulls: Vec<PullRequest>) -> Self {
            Self {
                commits: Mutex::new(commits),
                pulls: Mutex::new(pulls),
                ..Default::default()
            }
        }

        /// Make every fetch for `repo` fail with an API error
        pub fn fail_for(&self, repo: &str) {
            self.failing.lock().unwrap().push(repo.to_string());
        }

        pub fn push_commit(&self, commit: Commit) {
            self.commits.lock().unwrap().insert(0, commit);
        }

        pub fn push_pull(&self, pull: PullRequest) {
            self.pulls.lock().unwrap().insert(0, pull);
        }

        /// Every `(repo, since)` passed to `fetch_commits`
        pub fn since_calls(&self) -> Vec<(String, Option<DateTime<Utc>>)> {
            self.since_calls.lock().unwrap().clone()
        }

        fn check_failure(&self, repo: &str) -> Result<(), GithubError> {
            if self.failing.lock().unwrap().iter().any(|r| r == repo) {
                return Err(GithubError::Api {
                    repo: repo.to_string(),
                    status: 500,
                    message: "mock failure".to_string(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ChangeSource for MockChangeSource {
        async fn fetch_commits(&self, repo: &str, since: Option<DateTime<Utc>>) -> Result<Vec<Commit>, GithubError> {
            debug!(%repo, ?since, "MockChangeSource::fetch_commits: called");
            self.since_calls.lock().unwrap().push((repo.to_string(), since));
            self.check_failure(repo)?;

            let commits = self.commits.lock().unwrap();
            Ok(commits
                .iter()
                .filter(|c| match since {
                    Some(since) => DateTime::parse_from_rfc3339(c.author_date())
                        .map(|d| d.with_timezone(&Utc) >= since)
                        .unwrap_or(true),
                    None => true,
                })
                .cloned()
                .collect())
        }

        async fn fetch_pulls(&self, repo: &str) -> Result<Vec<PullRequest>, GithubError> {
            debug!(%repo, "MockChangeSource::fetch_pulls: called");
            self.check_failure(repo)?;
            Ok(self
                .pulls
                .lock()
                .unwrap()
                .iter()
                .take(PULLS_PER_PAGE as usize)
                .cloned()
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_repo_accepts_owner_name() {
        assert!(validate_repo("rust-lang/rust").is_ok());
        assert!(validate_repo("octo/Hello-World").is_ok());
    }

    #[test]
    fn test_validate_repo_rejects_malformed() {
        for bad in ["rust", "/rust", "rust-lang/", "a/b/c", "", "rust lang/rust"] {
            assert!(
                matches!(validate_repo(bad), Err(GithubError::InvalidRepo(_))),
                "{bad} should be rejected"
            );
        }
    }
}
