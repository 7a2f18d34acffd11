//! HTTP implementation of ChangeSource

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{ChangeSource, Commit, GithubError, PULLS_PER_PAGE, PullRequest, validate_repo};
use crate::config::GithubConfig;

const USER_AGENT: &str = "repowatch";
const ACCEPT: &str = "application/vnd.github.v3+json";

/// GitHub REST API client
pub struct GithubClient {
    api_url: String,
    token: String,
    http: Client,
}

impl GithubClient {
    /// Create a client from configuration and a resolved token
    pub fn from_config(config: &GithubConfig, token: impl Into<String>) -> Result<Self, reqwest::Error> {
        debug!(api_url = %config.api_url, "GithubClient::from_config: called");
        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token: token.into(),
            http,
        })
    }

    fn get(&self, repo: &str, endpoint: &str) -> RequestBuilder {
        let url = format!("{}/repos/{}/{}", self.api_url, repo, endpoint);
        self.http
            .get(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", ACCEPT)
    }

    async fn send<T: DeserializeOwned>(&self, repo: &str, request: RequestBuilder) -> Result<T, GithubError> {
        let network = |source| GithubError::Network {
            repo: repo.to_string(),
            source,
        };

        let response = request.send().await.map_err(network)?;
        let status = response.status();
        if !status.is_success() {
            debug!(%repo, %status, "send: API error");
            let message = response.text().await.unwrap_or_default();
            return Err(GithubError::Api {
                repo: repo.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        response.json().await.map_err(network)
    }
}

#[async_trait]
impl ChangeSource for GithubClient {
    async fn fetch_commits(&self, repo: &str, since: Option<DateTime<Utc>>) -> Result<Vec<Commit>, GithubError> {
        debug!(%repo, ?since, "fetch_commits: called");
        validate_repo(repo)?;

        let mut request = self.get(repo, "commits");
        if let Some(since) = since {
            request = request.query(&[("since", since.to_rfc3339_opts(SecondsFormat::Micros, true))]);
        }

        let commits: Vec<Commit> = self.send(repo, request).await?;
        debug!(%repo, count = commits.len(), "fetch_commits: done");
        Ok(commits)
    }

    async fn fetch_pulls(&self, repo: &str) -> Result<Vec<PullRequest>, GithubError> {
        debug!(%repo, "fetch_pulls: called");
        validate_repo(repo)?;

        let per_page = PULLS_PER_PAGE.to_string();
        let request = self.get(repo, "pulls").query(&[
            ("state", "all"),
            ("sort", "updated"),
            ("direction", "desc"),
            ("per_page", per_page.as_str()),
        ]);

        let pulls: Vec<PullRequest> = self.send(repo, request).await?;
        debug!(%repo, count = pulls.len(), "fetch_pulls: done");
        Ok(pulls)
    }
}
