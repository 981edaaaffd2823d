//! Deadline tracking jobs.
//!
//! [`DeadlineScheduler`] owns five jobs: the overdue scan, the deadline
//! reminder scan, the due-tomorrow reminder scan, notification cleanup and
//! the daily summary. Each job can be triggered by hand with
//! [`DeadlineScheduler::trigger`] or driven on its configured cadence by
//! [`spawn`], which returns a [`SchedulerHandle`] for stopping jobs.

mod config;
mod error;
mod job;
mod policy;
mod runner;
mod service;

pub use config::{
    JobSchedule, MAX_PERIOD_SECS, MAX_WINDOW_DAYS, SchedulerConfig, SchedulerConfigError,
};
pub use error::{SchedulerError, SchedulerResult};
pub use job::{CleanupReport, DailySummary, JobKind, JobOutcome, JobReport, ScanReport};
pub use policy::{AlwaysRemind, OncePerDay, ReminderPolicy};
pub use runner::{SchedulerHandle, spawn};
pub use service::DeadlineScheduler;

#[cfg(test)]
mod tests;
