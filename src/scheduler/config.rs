//! Job cadences and scan settings.

use std::time::Duration;

use chrono::{DateTime, NaiveTime, TimeDelta, Utc};
use serde::Deserialize;
use thiserror::Error;

use super::JobKind;

/// Longest accepted fixed-rate period, one year in seconds.
pub const MAX_PERIOD_SECS: u64 = 366 * 24 * 3600;

/// Longest accepted reminder window or read retention, in days.
pub const MAX_WINDOW_DAYS: u32 = 3660;

/// When a job runs.
///
/// In TOML a schedule is written as `{ every_secs = 3600 }` or
/// `{ daily_at = "09:00:00" }`; daily times are UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobSchedule {
    /// Fixed rate, first run immediately.
    EverySecs(u64),
    /// Once a day at the given UTC time.
    DailyAt(NaiveTime),
}

impl JobSchedule {
    /// Returns how long to wait after `now` before the next run.
    ///
    /// Fixed rates are clamped to `1..=MAX_PERIOD_SECS` seconds. A daily time
    /// equal to `now` schedules the next day's run.
    #[must_use]
    pub fn next_delay(&self, now: DateTime<Utc>) -> Duration {
        match *self {
            Self::EverySecs(secs) => Duration::from_secs(secs.clamp(1, MAX_PERIOD_SECS)),
            Self::DailyAt(_) => self
                .next_run_after(now)
                .and_then(|next| (next - now).to_std().ok())
                .unwrap_or(Duration::ZERO),
        }
    }

    /// Returns the first run strictly after `after`, or `None` when it would
    /// fall outside the representable date range.
    #[must_use]
    pub fn next_run_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match *self {
            Self::EverySecs(secs) => {
                let secs = i64::try_from(secs.clamp(1, MAX_PERIOD_SECS)).ok()?;
                after.checked_add_signed(TimeDelta::try_seconds(secs)?)
            }
            Self::DailyAt(time) => {
                let same_day = after.date_naive().and_time(time).and_utc();
                if same_day > after {
                    Some(same_day)
                } else {
                    same_day.checked_add_signed(TimeDelta::days(1))
                }
            }
        }
    }

    const fn period_secs(&self) -> Option<u64> {
        match *self {
            Self::EverySecs(secs) => Some(secs),
            Self::DailyAt(_) => None,
        }
    }
}

/// A scheduler setting above its accepted limit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("scheduler setting `{field}` is {value}, above the limit of {limit}")]
pub struct SchedulerConfigError {
    /// Offending setting.
    pub field: &'static str,
    /// Configured value.
    pub value: u64,
    /// Largest accepted value.
    pub limit: u64,
}

const fn daily_at(hour: u32) -> JobSchedule {
    match NaiveTime::from_hms_opt(hour, 0, 0) {
        Some(time) => JobSchedule::DailyAt(time),
        None => JobSchedule::DailyAt(NaiveTime::MIN),
    }
}

/// Settings for the deadline scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Overdue scan cadence.
    pub overdue_scan: JobSchedule,
    /// Deadline reminder cadence.
    pub reminder_scan: JobSchedule,
    /// Due-tomorrow reminder cadence.
    pub urgent_reminder_scan: JobSchedule,
    /// Notification cleanup cadence.
    pub notification_cleanup: JobSchedule,
    /// Daily summary cadence.
    pub daily_summary: JobSchedule,
    /// Reminders go out for tasks due within this many days.
    pub reminder_window_days: u32,
    /// Read notifications older than this many days are deleted.
    pub read_retention_days: u32,
    /// Send at most one reminder per task and job each day.
    pub deduplicate_reminders: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            overdue_scan: JobSchedule::EverySecs(3600),
            reminder_scan: daily_at(9),
            urgent_reminder_scan: daily_at(18),
            notification_cleanup: daily_at(2),
            daily_summary: daily_at(8),
            reminder_window_days: 3,
            read_retention_days: 30,
            deduplicate_reminders: false,
        }
    }
}

impl SchedulerConfig {
    /// Checks that periods and day counts stay within their limits.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerConfigError`] naming the first setting out of range.
    pub fn validate(&self) -> Result<(), SchedulerConfigError> {
        for kind in JobKind::ALL {
            if let Some(secs) = self.schedule_for(kind).period_secs() {
                ensure_within(kind.as_str(), secs, MAX_PERIOD_SECS)?;
            }
        }
        ensure_within(
            "reminder_window_days",
            u64::from(self.reminder_window_days),
            u64::from(MAX_WINDOW_DAYS),
        )?;
        ensure_within(
            "read_retention_days",
            u64::from(self.read_retention_days),
            u64::from(MAX_WINDOW_DAYS),
        )
    }

    /// Returns the cadence configured for `kind`.
    #[must_use]
    pub const fn schedule_for(&self, kind: JobKind) -> JobSchedule {
        match kind {
            JobKind::OverdueScan => self.overdue_scan,
            JobKind::ReminderScan => self.reminder_scan,
            JobKind::UrgentReminderScan => self.urgent_reminder_scan,
            JobKind::NotificationCleanup => self.notification_cleanup,
            JobKind::DailySummary => self.daily_summary,
        }
    }
}

fn ensure_within(field: &'static str, value: u64, limit: u64) -> Result<(), SchedulerConfigError> {
    if value <= limit {
        return Ok(());
    }
    Err(SchedulerConfigError {
        field,
        value,
        limit,
    })
}
