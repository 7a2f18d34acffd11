//! Prompt formatting and summary generation

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::LlmConfig;
use crate::github::{Commit, PullRequest};
use crate::llm::{CompletionRequest, LlmClient, LlmError, Message};

/// Commits listed in a prompt, newest first
pub const MAX_PROMPT_COMMITS: usize = 10;

/// Pull requests listed in a prompt, most recently updated first
pub const MAX_PROMPT_PULLS: usize = 5;

/// Prefix of the text stored when generation fails
pub const GENERATION_ERROR_PREFIX: &str = "Error generating summary:";

/// Render fetched changes as the plain-text block embedded in the prompt
///
/// Only the first line of each commit message is used. Empty sections are
/// left out; present sections are separated by a blank line.
pub fn format_for_prompt(commits: &[Commit], pulls: &[PullRequest]) -> String {
    debug!(commits = commits.len(), pulls = pulls.len(), "format_for_prompt: called");
    let mut sections = Vec::with_capacity(2);

    if !commits.is_empty() {
        let mut lines = vec!["Recent Commits:".to_string()];
        lines.extend(
            commits
                .iter()
                .take(MAX_PROMPT_COMMITS)
                .map(|c| format!("- {} (by {} on {})", c.headline(), c.author_name(), c.author_date())),
        );
        sections.push(lines.join("\n"));
    }

    if !pulls.is_empty() {
        let mut lines = vec!["Recent Pull Requests:".to_string()];
        lines.extend(pulls.iter().take(MAX_PROMPT_PULLS).map(|pr| {
            format!(
                "- [{}] {} (by {}, updated {})",
                pr.state.to_uppercase(),
                pr.title,
                pr.user.login,
                pr.updated_at_display()
            )
        }));
        sections.push(lines.join("\n"));
    }

    sections.join("\n\n")
}

/// The full instruction sent to the model for one repository
pub fn build_prompt(changes_text: &str, repo: &str) -> String {
    format!(
        "Please provide a concise summary of the recent activity in the GitHub repository '{repo}':

{changes_text}

Focus on:
1. Key features or fixes that were implemented
2. Notable contributors and their contributions
3. Overall development trends or patterns
4. Any significant pull request activity

Keep the summary under 200 words and highlight the most important changes."
    )
}

/// Turns formatted changes into a natural-language summary
pub struct Summarizer {
    llm: Arc<dyn LlmClient>,
    max_tokens: u32,
    temperature: f32,
}

impl Summarizer {
    pub fn new(llm: Arc<dyn LlmClient>, config: &LlmConfig) -> Self {
        Self {
            llm,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    /// Ask the model for a summary of `changes_text`
    ///
    /// Never fails: a generation error comes back as a string starting with
    /// [`GENERATION_ERROR_PREFIX`], which callers store like any summary.
    pub async fn generate_summary(&self, changes_text: &str, repo: &str) -> String {
        debug!(%repo, text_len = changes_text.len(), "generate_summary: called");
        match self.request_summary(changes_text, repo).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(%repo, error = %e, "generate_summary: generation failed, storing error text");
                format!("{GENERATION_ERROR_PREFIX} {e}")
            }
        }
    }

    async fn request_summary(&self, changes_text: &str, repo: &str) -> Result<String, LlmError> {
        let request = CompletionRequest {
            messages: vec![Message::user(build_prompt(changes_text, repo))],
            max_tokens: self.max_tokens,
            temperature: Some(self.temperature),
        };

        let response = self.llm.complete(request).await?;
        response
            .content
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| LlmError::InvalidResponse("model returned an empty completion".to_string()))
    }
}
