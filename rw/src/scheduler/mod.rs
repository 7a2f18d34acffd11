//! Daily check schedule and the daemon loop that follows it

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

mod daemon;

pub use daemon::{run_daemon, run_daemon_until, shutdown_signal};

/// Time zone the scheduled hours are read in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleTimezone {
    #[default]
    Utc,
    Local,
}

impl ScheduleTimezone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Utc => "UTC",
            Self::Local => "local time",
        }
    }
}

/// Whole hours of the day at which a batch check runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailySchedule {
    hours: Vec<u32>,
}

impl DailySchedule {
    /// Build a schedule from hours in `0..=23`; order and duplicates don't matter
    pub fn new(hours: &[u32]) -> Result<Self, ConfigError> {
        debug!(?hours, "DailySchedule::new: called");
        if hours.is_empty() {
            return Err(ConfigError::InvalidSchedule("no hours given".to_string()));
        }
        if let Some(bad) = hours.iter().find(|h| **h > 23) {
            return Err(ConfigError::InvalidSchedule(format!("hour {bad} is outside 0-23")));
        }

        let mut hours = hours.to_vec();
        hours.sort_unstable();
        hours.dedup();
        Ok(Self { hours })
    }

    pub fn hours(&self) -> &[u32] {
        &self.hours
    }

    /// Human-readable slot list, e.g. `9:00, 17:00`
    pub fn describe(&self) -> String {
        self.hours.iter().map(|h| format!("{h}:00")).collect::<Vec<_>>().join(", ")
    }

    /// Earliest slot strictly after `now`, in `now`'s time zone
    ///
    /// A slot that falls in a DST gap does not exist locally and is skipped.
    pub fn next_run_after<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        let tz = now.timezone();
        let mut date = now.date_naive();

        // today, tomorrow, and one spare day in case every slot tomorrow is in a gap
        for _ in 0..3 {
            for &hour in &self.hours {
                let Some(naive) = date.and_hms_opt(hour, 0, 0) else {
                    continue;
                };
                match tz.from_local_datetime(&naive).earliest() {
                    Some(candidate) if candidate > *now => return candidate,
                    _ => {}
                }
            }
            match date.succ_opt() {
                Some(next) => date = next,
                None => break,
            }
        }

        now.clone() + Duration::days(1)
    }

    /// Next slot after `now`, with hours read in `tz`, expressed in UTC
    pub fn next_run_utc(&self, tz: ScheduleTimezone, now: DateTime<Utc>) -> DateTime<Utc> {
        match tz {
            ScheduleTimezone::Utc => self.next_run_after(&now),
            ScheduleTimezone::Local => self.next_run_after(&now.with_timezone(&Local)).with_timezone(&Utc),
        }
    }
}
