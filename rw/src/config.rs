//! repowatch configuration types and loading

use std::fs;
use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::scheduler::ScheduleTimezone;

/// Project-local config file name
pub const LOCAL_CONFIG_FILE: &str = ".repowatch.yml";

/// Main repowatch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Repositories to watch, as owner/name
    pub repositories: Vec<String>,

    /// Hours of the day (0-23) at which the daemon runs a batch check
    #[serde(rename = "schedule-hours")]
    pub schedule_hours: Vec<u32>,

    /// Time zone the schedule hours are interpreted in
    pub timezone: ScheduleTimezone,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// GitHub API configuration
    pub github: GithubConfig,

    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Storage configuration
    pub storage: StorageConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repositories: Vec::new(),
            schedule_hours: vec![9, 17],
            timezone: ScheduleTimezone::default(),
            log_level: None,
            github: GithubConfig::default(),
            llm: LlmConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

/// Secrets resolved from the environment
#[derive(Clone)]
pub struct Credentials {
    pub github_token: String,
    pub llm_api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("github_token", &"<redacted>")
            .field("llm_api_key", &"<redacted>")
            .finish()
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .repowatch.yml
        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/repowatch/repowatch.yml
        if let Some(user_config) = Self::user_config_path()
            && user_config.exists()
        {
            match Self::load_from_file(&user_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read just the log level, ignoring any other problems with the file
    ///
    /// Used before logging is initialized, so failures are silent.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let candidates = match config_path {
            Some(path) => vec![path.clone()],
            None => [Some(PathBuf::from(LOCAL_CONFIG_FILE)), Self::user_config_path()]
                .into_iter()
                .flatten()
                .collect(),
        };

        candidates
            .iter()
            .filter(|p| p.exists())
            .find_map(|p| Self::load_from_file(p).ok())
            .and_then(|c| c.log_level)
    }

    fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("repowatch").join("repowatch.yml"))
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Write this configuration as YAML
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content).context(format!("Failed to write config to {}", path.display()))?;
        Ok(())
    }

    /// Sample configuration written by `rw init`
    pub fn sample() -> Self {
        Self {
            repositories: vec!["microsoft/vscode".to_string(), "facebook/react".to_string()],
            ..Self::default()
        }
    }

    /// Apply environment overrides using `lookup` to read variables
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(model) = lookup(self.llm.model_env.as_str()).filter(|m| !m.trim().is_empty()) {
            tracing::debug!(%model, "apply_env_overrides: model overridden from environment");
            self.llm.model = model;
        }
    }

    /// Resolve both API credentials using `lookup`
    ///
    /// Fails on the first missing or blank variable so startup can abort
    /// before any network activity.
    pub fn resolve_credentials(&self, lookup: impl Fn(&str) -> Option<String>) -> Result<Credentials, ConfigError> {
        let require = |var: &str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ConfigError::MissingCredential { var: var.to_string() })
        };

        Ok(Credentials {
            github_token: require(self.github.token_env.as_str())?,
            llm_api_key: require(self.llm.api_key_env.as_str())?,
        })
    }

    /// Configured repositories, failing when there are none
    pub fn require_repositories(&self) -> Result<&[String], ConfigError> {
        if self.repositories.is_empty() {
            return Err(ConfigError::NoRepositories);
        }
        Ok(&self.repositories)
    }
}

/// Read a variable from the process environment
pub fn env_lookup(var: &str) -> Option<String> {
    std::env::var(var).ok()
}

/// GitHub API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    /// API base URL
    #[serde(rename = "api-url")]
    pub api_url: String,

    /// Environment variable containing the API token
    #[serde(rename = "token-env")]
    pub token_env: String,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            token_env: "GITHUB_TOKEN".to_string(),
            timeout_ms: 30_000,
        }
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// Environment variable that overrides `model` when set
    #[serde(rename = "model-env")]
    pub model_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per summary
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            model_env: "OPENAI_MODEL".to_string(),
            base_url: "https://api.openai.com".to_string(),
            max_tokens: 300,
            temperature: 0.7,
            timeout_ms: 60_000,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database holding watermarks and summaries
    #[serde(rename = "db-path")]
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("repowatch")
                .join(summarystore::DEFAULT_DB_FILE),
        }
    }
}
