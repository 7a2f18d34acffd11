//! Repository monitor: fetch, summarize, persist

use std::sync::Arc;

use chrono::{Duration, Utc};
use summarystore::SummaryStore;
use tracing::{debug, error, info};

use crate::error::CheckError;
use crate::github::ChangeSource;
use crate::summarizer::{Summarizer, format_for_prompt};

/// Look-back window for a repository that has never been checked
pub const DEFAULT_LOOKBACK_DAYS: i64 = 7;

/// Result of checking one repository
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    /// New activity was found and a summary stored
    Summarized { summary: String, commits: usize, pulls: usize },
    /// Nothing new since the last check; nothing was written
    NoChanges,
    /// The check could not complete
    Failed { error: String },
}

impl CheckOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Outcomes of one batch, in the order the repositories were checked
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub results: Vec<(String, CheckOutcome)>,
}

impl BatchReport {
    pub fn summarized(&self) -> usize {
        self.count(|o| matches!(o, CheckOutcome::Summarized { .. }))
    }

    pub fn unchanged(&self) -> usize {
        self.count(|o| matches!(o, CheckOutcome::NoChanges))
    }

    pub fn failed(&self) -> usize {
        self.count(CheckOutcome::is_failed)
    }

    fn count(&self, pred: impl Fn(&CheckOutcome) -> bool) -> usize {
        self.results.iter().filter(|(_, o)| pred(o)).count()
    }
}

/// Drives the fetch/summarize/store cycle for repositories
pub struct RepoMonitor {
    source: Arc<dyn ChangeSource>,
    summarizer: Summarizer,
    store: SummaryStore,
}

impl RepoMonitor {
    pub fn new(source: Arc<dyn ChangeSource>, summarizer: Summarizer, store: SummaryStore) -> Self {
        Self {
            source,
            summarizer,
            store,
        }
    }

    pub fn store(&self) -> &SummaryStore {
        &self.store
    }

    /// Check one repository for activity since its last check
    ///
    /// Never fails: fetch and store errors are logged and reported as
    /// [`CheckOutcome::Failed`].
    pub async fn check_repo_for_changes(&self, repo: &str) -> CheckOutcome {
        debug!(%repo, "check_repo_for_changes: called");
        match self.try_check(repo).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(%repo, error = %e, "Repository check failed");
                CheckOutcome::Failed { error: e.to_string() }
            }
        }
    }

    async fn try_check(&self, repo: &str) -> Result<CheckOutcome, CheckError> {
        let last_check = self.store.get_last_check_timestamp(repo)?;
        let since = last_check.unwrap_or_else(|| Utc::now() - Duration::days(DEFAULT_LOOKBACK_DAYS));
        debug!(%repo, ?last_check, %since, "try_check: watermark");

        let commits = self.source.fetch_commits(repo, Some(since)).await?;
        let pulls = self.source.fetch_pulls(repo).await?;
        let pulls: Vec<_> = match last_check {
            Some(last) => pulls.into_iter().filter(|pr| pr.updated_at > last).collect(),
            None => pulls,
        };

        let total = commits.len() + pulls.len();
        if total == 0 {
            info!(%repo, "No new changes");
            return Ok(CheckOutcome::NoChanges);
        }

        let changes_text = format_for_prompt(&commits, &pulls);
        let summary = self.summarizer.generate_summary(&changes_text, repo).await;

        let newest_sha = commits.first().map(|c| c.sha.as_str());
        let (_, id) = self.store.record_check(repo, newest_sha, &summary, saturating_u32(total))?;
        info!(%repo, id, commits = commits.len(), pulls = pulls.len(), "Stored summary");

        Ok(CheckOutcome::Summarized {
            summary,
            commits: commits.len(),
            pulls: pulls.len(),
        })
    }

    /// Check each repository in turn; one failure doesn't stop the rest
    pub async fn check_all_repos(&self, repos: &[String]) -> BatchReport {
        info!(count = repos.len(), "Checking repositories");
        let mut report = BatchReport::default();

        for repo in repos {
            let outcome = self.check_repo_for_changes(repo).await;
            report.results.push((repo.clone(), outcome));
        }

        info!(
            summarized = report.summarized(),
            unchanged = report.unchanged(),
            failed = report.failed(),
            "Batch complete"
        );
        report
    }
}

fn saturating_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
