//! RepoWatch - LLM summaries of GitHub repository activity
//!
//! RepoWatch periodically asks the GitHub API what changed in a set of
//! repositories, has a language model summarize the new commits and pull
//! requests, and keeps every summary in a local SQLite store.
//!
//! # Modules
//!
//! - [`github`] - Change fetching through the [`github::ChangeSource`] trait
//! - [`llm`] - LLM client trait and OpenAI implementation
//! - [`summarizer`] - Prompt formatting and summary generation
//! - [`monitor`] - Per-repository check cycle and batches
//! - [`scheduler`] - Daily schedule and daemon loop
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod error;
pub mod github;
pub mod llm;
pub mod monitor;
pub mod scheduler;
pub mod summarizer;

pub use config::{Config, Credentials};
pub use error::{CheckError, ConfigError};
pub use monitor::{BatchReport, CheckOutcome, RepoMonitor};
pub use scheduler::{DailySchedule, ScheduleTimezone};
pub use summarizer::Summarizer;
