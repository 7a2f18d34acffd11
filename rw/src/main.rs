//! RepoWatch - LLM summaries of GitHub repository activity
//!
//! CLI entry point for one-off checks, the scheduled daemon, and browsing
//! stored summaries.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use colored::*;
use eyre::{Context, Result, eyre};
use tracing::{debug, info};

use repowatch::cli::{Cli, Command, OutputFormat};
use repowatch::config::{Config, LOCAL_CONFIG_FILE, env_lookup};
use repowatch::github::GithubClient;
use repowatch::llm::create_client;
use repowatch::monitor::{BatchReport, CheckOutcome, RepoMonitor};
use repowatch::scheduler::{DailySchedule, run_daemon};
use repowatch::summarizer::Summarizer;
use summarystore::SummaryStore;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Can't log here yet; the subscriber isn't installed
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("repowatch")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config_log_level).map(str::to_uppercase).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") | None => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
            tracing::Level::INFO
        }
    };

    let log_file = fs::File::options()
        .create(true)
        .append(true)
        .open(log_dir.join("repowatch.log"))
        .context("Failed to open log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Credentials may live in a .env next to the config
    dotenvy::dotenv().ok();

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    config.apply_env_overrides(env_lookup);
    info!(repos = config.repositories.len(), model = %config.llm.model, "repowatch loaded config");

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Init { force } => {
            debug!(force, "main: matched Init command");
            cmd_init(cli.config, force)
        }
        Command::Check { repo } => {
            debug!(%repo, "main: matched Check command");
            cmd_check(&config, &repo).await
        }
        Command::CheckAll => {
            debug!("main: matched CheckAll command");
            cmd_check_all(&config).await
        }
        Command::Summaries { repo, limit, format } => {
            debug!(?repo, limit, ?format, "main: matched Summaries command");
            cmd_summaries(&config, repo.as_deref(), limit, format)
        }
        Command::Daemon { no_initial } => {
            debug!(no_initial, "main: matched Daemon command");
            cmd_daemon(&config, !no_initial).await
        }
    }
}

/// Build the monitor, resolving credentials before anything touches the network
fn build_monitor(config: &Config) -> Result<RepoMonitor> {
    debug!("build_monitor: called");
    let credentials = config.resolve_credentials(env_lookup)?;

    let source = GithubClient::from_config(&config.github, credentials.github_token)
        .context("Failed to create GitHub client")?;
    let llm = create_client(&config.llm, &credentials.llm_api_key).context("Failed to create LLM client")?;
    let store = SummaryStore::open(&config.storage.db_path)
        .context(format!("Failed to open store at {}", config.storage.db_path.display()))?;

    Ok(RepoMonitor::new(
        Arc::new(source),
        Summarizer::new(llm, &config.llm),
        store,
    ))
}

/// Write a sample config
fn cmd_init(path: Option<PathBuf>, force: bool) -> Result<()> {
    debug!(?path, force, "cmd_init: called");
    let path = path.unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE));

    if path.exists() && !force {
        debug!("cmd_init: config already exists");
        println!("Config already exists at {} (use --force to overwrite)", path.display());
        return Ok(());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context(format!("Failed to create {}", parent.display()))?;
    }
    Config::sample().save(&path)?;
    println!("{} Wrote sample config to {}", "✓".green(), path.display().to_string().cyan());
    println!("Set GITHUB_TOKEN and OPENAI_API_KEY (or use a .env file) before running checks.");
    Ok(())
}

/// Check one repository now
async fn cmd_check(config: &Config, repo: &str) -> Result<()> {
    debug!(%repo, "cmd_check: called");
    let monitor = build_monitor(config)?;

    println!("Checking {}...", repo.cyan());
    match monitor.check_repo_for_changes(repo).await {
        CheckOutcome::Summarized { summary, commits, pulls } => {
            debug!(commits, pulls, "cmd_check: summarized");
            println!("\nSummary for {}:", repo.bold());
            println!("{}", "=".repeat(50));
            println!("{}", summary);
            println!("\n{} commits, {} pull requests", commits, pulls);
            Ok(())
        }
        CheckOutcome::NoChanges => {
            debug!("cmd_check: no changes");
            println!("No new changes found in {}", repo);
            Ok(())
        }
        CheckOutcome::Failed { error } => {
            debug!(%error, "cmd_check: failed");
            Err(eyre!("Check failed for {}: {}", repo, error))
        }
    }
}

/// Check every configured repository
async fn cmd_check_all(config: &Config) -> Result<()> {
    debug!("cmd_check_all: called");
    let repos = config.require_repositories()?;
    let monitor = build_monitor(config)?;

    println!("Checking {} repositories...", repos.len());
    let report = monitor.check_all_repos(repos).await;
    print_report(&report);
    Ok(())
}

fn print_report(report: &BatchReport) {
    for (repo, outcome) in &report.results {
        match outcome {
            CheckOutcome::Summarized { commits, pulls, .. } => {
                println!("{} {} ({} commits, {} pull requests)", "✓".green(), repo, commits, pulls);
            }
            CheckOutcome::NoChanges => {
                println!("{} {} (no new changes)", "-".dimmed(), repo);
            }
            CheckOutcome::Failed { error } => {
                println!("{} {}: {}", "✗".red(), repo, error);
            }
        }
    }
    println!(
        "{} summarized, {} unchanged, {} failed",
        report.summarized().to_string().green(),
        report.unchanged(),
        report.failed().to_string().red()
    );
}

/// Print stored summaries, newest first
fn cmd_summaries(config: &Config, repo: Option<&str>, limit: usize, format: OutputFormat) -> Result<()> {
    debug!(?repo, limit, ?format, "cmd_summaries: called");
    let store = SummaryStore::open(&config.storage.db_path)
        .context(format!("Failed to open store at {}", config.storage.db_path.display()))?;
    let records = store.list_summaries(repo, limit)?;

    match format {
        OutputFormat::Json => {
            debug!("cmd_summaries: format is Json");
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        OutputFormat::Text => {
            debug!("cmd_summaries: format is Text");
            if records.is_empty() {
                match repo {
                    Some(repo) => println!("No summaries found for {}", repo),
                    None => println!("No summaries found"),
                }
                return Ok(());
            }
            for record in &records {
                println!("\n{}", "=".repeat(60));
                println!("Repository: {}", record.repo_name.bold());
                println!("Changes: {}", record.changes_count);
                println!("Date: {}", record.timestamp.format("%Y-%m-%d %H:%M:%S UTC"));
                println!("{}", "=".repeat(60));
                println!("{}", record.summary);
            }
        }
    }
    Ok(())
}

/// Run scheduled checks until Ctrl-C or SIGTERM
async fn cmd_daemon(config: &Config, initial_check: bool) -> Result<()> {
    debug!(initial_check, "cmd_daemon: called");
    let repos = config.require_repositories()?;
    let schedule = DailySchedule::new(&config.schedule_hours)?;
    let monitor = build_monitor(config)?;

    println!("Monitoring {} repositories", repos.len());
    println!(
        "Scheduled checks at: {} ({})",
        schedule.describe(),
        config.timezone.as_str()
    );
    println!("Press Ctrl+C to stop");

    run_daemon(&monitor, repos, &schedule, config.timezone, initial_check, print_report)
        .await
        .context("Failed to install signal handlers")?;

    println!("Stopped");
    Ok(())
}
