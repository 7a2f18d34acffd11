//! Error types shared across the crate

use summarystore::StoreError;
use thiserror::Error;

use crate::github::GithubError;

/// Startup configuration problems; always fatal
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing credential: set the {var} environment variable")]
    MissingCredential { var: String },

    #[error("No repositories configured")]
    NoRepositories,

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),
}

/// Why a single repository check could not complete
#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Fetch(#[from] GithubError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_display() {
        let err = ConfigError::MissingCredential {
            var: "GITHUB_TOKEN".to_string(),
        };
        assert_eq!(err.to_string(), "Missing credential: set the GITHUB_TOKEN environment variable");
    }

    #[test]
    fn test_fetch_error_is_transparent() {
        let err = CheckError::from(GithubError::InvalidRepo("nope".to_string()));
        assert_eq!(err.to_string(), "Invalid repository 'nope', expected owner/name");
    }
}
