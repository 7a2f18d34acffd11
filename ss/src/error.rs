//! Store error types

use thiserror::Error;

/// Errors that can occur while reading or writing the summary database
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to prepare store directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid timestamp '{value}' stored for {repo}")]
    InvalidTimestamp { repo: String, value: String },

    #[error("Refusing to record a summary with zero changes for {0}")]
    EmptySummary(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_timestamp_display() {
        let err = StoreError::InvalidTimestamp {
            repo: "octo/repo".to_string(),
            value: "yesterday".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid timestamp 'yesterday' stored for octo/repo");
    }
}
