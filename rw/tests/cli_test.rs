//! End-to-end tests for the `rw` binary
//!
//! Each test runs in its own temp directory with XDG paths redirected there,
//! so nothing touches the real config, logs, or credentials.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use summarystore::SummaryStore;
use tempfile::TempDir;

fn rw(temp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("rw").expect("binary built");
    cmd.current_dir(temp.path())
        .env("HOME", temp.path())
        .env("XDG_CONFIG_HOME", temp.path().join("config"))
        .env("XDG_DATA_HOME", temp.path().join("data"))
        .env_remove("GITHUB_TOKEN")
        .env_remove("OPENAI_API_KEY")
        .env_remove("OPENAI_MODEL")
        .env_remove("RUST_LOG");
    cmd
}

fn write_config(dir: &Path, repos: &[&str]) -> std::path::PathBuf {
    let db = dir.join("summaries.db");
    let repos = repos.iter().map(|r| format!("  - {r}\n")).collect::<String>();
    let yaml = format!(
        "repositories:\n{}storage:\n  db-path: {}\n",
        if repos.is_empty() { "  []\n".to_string() } else { repos },
        db.display()
    );
    let path = dir.join("rw.yml");
    fs::write(&path, yaml).unwrap();
    path
}

#[test]
fn test_help_lists_commands() {
    let temp = TempDir::new().unwrap();
    rw(&temp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("check-all"))
        .stdout(predicate::str::contains("summaries"))
        .stdout(predicate::str::contains("daemon"));
}

#[test]
fn test_init_writes_sample_config() {
    let temp = TempDir::new().unwrap();

    rw(&temp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains(".repowatch.yml"));

    let written = fs::read_to_string(temp.path().join(".repowatch.yml")).unwrap();
    assert!(written.contains("microsoft/vscode"));
    assert!(written.contains("schedule-hours"));

    rw(&temp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_summaries_on_empty_store() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), &["octo/repo"]);

    rw(&temp)
        .args(["summaries", "-c"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("No summaries found"));
}

#[test]
fn test_summaries_for_unknown_repo_names_it() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), &["octo/repo"]);
    let store = SummaryStore::open(temp.path().join("summaries.db")).unwrap();
    store.append_summary("octo/repo", "Something", 1).unwrap();

    rw(&temp)
        .args(["summaries", "--repo", "octo/other", "-c"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("No summaries found for octo/other"));
}

#[test]
fn test_summaries_lists_newest_first() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), &["octo/a", "octo/b"]);
    let store = SummaryStore::open(temp.path().join("summaries.db")).unwrap();
    store.append_summary("octo/a", "First summary", 3).unwrap();
    store.append_summary("octo/b", "Second summary", 1).unwrap();

    let output = rw(&temp)
        .args(["summaries", "-n", "1", "-c"])
        .arg(&config)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(output).unwrap();

    assert!(stdout.contains("Second summary"));
    assert!(stdout.contains("Changes: 1"));
    assert!(!stdout.contains("First summary"));
}

#[test]
fn test_summaries_json_filtered_by_repo() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), &["octo/a"]);
    let store = SummaryStore::open(temp.path().join("summaries.db")).unwrap();
    store.append_summary("octo/a", "Alpha", 2).unwrap();
    store.append_summary("octo/b", "Beta", 2).unwrap();

    let output = rw(&temp)
        .args(["summaries", "--repo", "octo/a", "--format", "json", "-c"])
        .arg(&config)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let records: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["repo_name"], "octo/a");
    assert_eq!(records[0]["summary"], "Alpha");
}

#[test]
fn test_check_all_without_credentials_fails_before_network() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), &["octo/repo"]);

    rw(&temp)
        .args(["check-all", "-c"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("GITHUB_TOKEN"));

    assert!(!temp.path().join("summaries.db").exists());
}

#[test]
fn test_check_all_without_repositories_fails() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), &[]);

    rw(&temp)
        .args(["check-all", "-c"])
        .arg(&config)
        .env("GITHUB_TOKEN", "gh")
        .env("OPENAI_API_KEY", "sk")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No repositories configured"));
}

#[test]
fn test_daemon_rejects_bad_schedule() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), &["octo/repo"]);
    let mut yaml = fs::read_to_string(&config).unwrap();
    yaml.push_str("schedule-hours: [25]\n");
    fs::write(&config, yaml).unwrap();

    rw(&temp)
        .args(["daemon", "-c"])
        .arg(&config)
        .env("GITHUB_TOKEN", "gh")
        .env("OPENAI_API_KEY", "sk")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid schedule"));
}
