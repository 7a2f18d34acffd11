//! Scheduled batch loop

use std::future::Future;
use std::io;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::{DailySchedule, ScheduleTimezone};
use crate::monitor::{BatchReport, RepoMonitor};

/// Run batches on `schedule` until SIGINT or SIGTERM
///
/// The handlers are installed before the first batch, so an interrupt during
/// the initial check also ends the loop cleanly once that batch finishes.
pub async fn run_daemon(
    monitor: &RepoMonitor,
    repos: &[String],
    schedule: &DailySchedule,
    tz: ScheduleTimezone,
    initial_check: bool,
    on_report: impl FnMut(&BatchReport),
) -> io::Result<()> {
    let shutdown = shutdown_signal()?;
    run_daemon_until(monitor, repos, schedule, tz, initial_check, on_report, shutdown).await;
    Ok(())
}

/// Install interrupt handlers now and return a future that resolves on the first signal
#[cfg(unix)]
pub fn shutdown_signal() -> io::Result<impl Future<Output = ()>> {
    use tokio::signal::unix::{SignalKind, signal};

    debug!("shutdown_signal: installing SIGINT/SIGTERM handlers");
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    Ok(async move {
        tokio::select! {
            _ = sigint.recv() => warn!("SIGINT received"),
            _ = sigterm.recv() => warn!("SIGTERM received"),
        }
    })
}

/// Install the Ctrl-C handler now and return a future that resolves on the first signal
#[cfg(windows)]
pub fn shutdown_signal() -> io::Result<impl Future<Output = ()>> {
    debug!("shutdown_signal: installing ctrl_c handler");
    let mut ctrl_c = tokio::signal::windows::ctrl_c()?;
    Ok(async move {
        ctrl_c.recv().await;
        warn!("Ctrl-C received");
    })
}

/// Run batches on `schedule` until `shutdown` resolves
///
/// Shutdown is only observed while waiting for the next slot, so a batch in
/// progress always finishes.
pub async fn run_daemon_until(
    monitor: &RepoMonitor,
    repos: &[String],
    schedule: &DailySchedule,
    tz: ScheduleTimezone,
    initial_check: bool,
    mut on_report: impl FnMut(&BatchReport),
    shutdown: impl Future<Output = ()>,
) {
    info!(repos = repos.len(), slots = %schedule.describe(), tz = tz.as_str(), "Daemon started");
    tokio::pin!(shutdown);

    if initial_check {
        debug!("run_daemon_until: running initial batch");
        let report = monitor.check_all_repos(repos).await;
        on_report(&report);
    }

    loop {
        let now = Utc::now();
        let next = schedule.next_run_utc(tz, now);
        let wait = (next - now).to_std().unwrap_or_default();
        info!(next = %next, wait_secs = wait.as_secs(), "Waiting for next scheduled check");

        tokio::select! {
            _ = &mut shutdown => {
                info!("Daemon shutting down");
                break;
            }
            _ = tokio::time::sleep(wait) => {
                debug!("run_daemon_until: slot reached");
                let report = monitor.check_all_repos(repos).await;
                on_report(&report);
            }
        }
    }
}
