//! CLI command definitions and subcommands

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// RepoWatch - GitHub activity summaries on a schedule
#[derive(Parser)]
#[command(
    name = "rw",
    about = "Summarize recent GitHub repository activity with an LLM",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write a sample config file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Check one repository now
    Check {
        /// Repository as owner/name
        #[arg(value_name = "OWNER/REPO")]
        repo: String,
    },

    /// Check every configured repository
    CheckAll,

    /// Show stored summaries, newest first
    Summaries {
        /// Only show this repository
        #[arg(short, long, value_name = "OWNER/REPO")]
        repo: Option<String>,

        /// Maximum number of summaries
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Run scheduled checks until interrupted
    Daemon {
        /// Skip the check normally run at startup
        #[arg(long)]
        no_initial: bool,
    },
}

/// Output format for listing commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_summaries_defaults() {
        let cli = Cli::try_parse_from(["rw", "summaries"]).unwrap();
        match cli.command {
            Command::Summaries { repo, limit, format } => {
                assert!(repo.is_none());
                assert_eq!(limit, 10);
                assert!(matches!(format, OutputFormat::Text));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["rw", "check", "octo/repo", "-c", "rw.yml", "-l", "debug"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("rw.yml")));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(matches!(cli.command, Command::Check { repo } if repo == "octo/repo"));
    }

    #[test]
    fn test_parse_daemon_no_initial() {
        let cli = Cli::try_parse_from(["rw", "daemon", "--no-initial"]).unwrap();
        assert!(matches!(cli.command, Command::Daemon { no_initial: true }));
    }

    #[test]
    fn test_check_requires_repo() {
        assert!(Cli::try_parse_from(["rw", "check"]).is_err());
    }
}
