//! Reminder de-duplication policies.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::NaiveDate;

use super::JobKind;
use crate::task::domain::TaskId;

/// Decides whether a scan notifies about a task again.
///
/// Scans ask [`ReminderPolicy::should_notify`] before creating a
/// notification and call [`ReminderPolicy::record`] once it was created.
pub trait ReminderPolicy: Send + Sync {
    /// Returns `true` when `job` may notify about `task` on `today`.
    fn should_notify(&self, task: TaskId, job: JobKind, today: NaiveDate) -> bool;

    /// Notes that `job` notified about `task` on `today`.
    fn record(&self, task: TaskId, job: JobKind, today: NaiveDate);
}

/// Notifies on every scan.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysRemind;

impl ReminderPolicy for AlwaysRemind {
    fn should_notify(&self, _task: TaskId, _job: JobKind, _today: NaiveDate) -> bool {
        true
    }

    fn record(&self, _task: TaskId, _job: JobKind, _today: NaiveDate) {}
}

/// Notifies at most once per task, job and calendar day.
#[derive(Debug, Default)]
pub struct OncePerDay {
    last_notified: Mutex<HashMap<(TaskId, JobKind), NaiveDate>>,
}

impl OncePerDay {
    /// Creates an empty policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReminderPolicy for OncePerDay {
    fn should_notify(&self, task: TaskId, job: JobKind, today: NaiveDate) -> bool {
        let last_notified = self
            .last_notified
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        last_notified.get(&(task, job)) != Some(&today)
    }

    fn record(&self, task: TaskId, job: JobKind, today: NaiveDate) {
        let mut last_notified = self
            .last_notified
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        last_notified.retain(|_, day| *day >= today);
        last_notified.insert((task, job), today);
    }
}

#[cfg(test)]
mod tests {
    use super::{AlwaysRemind, OncePerDay, ReminderPolicy};
    use crate::scheduler::JobKind;
    use crate::task::domain::TaskId;
    use chrono::NaiveDate;
    use rstest::{fixture, rstest};

    #[fixture]
    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 10).expect("valid date")
    }

    #[rstest]
    fn always_remind_never_suppresses(today: NaiveDate) {
        let policy = AlwaysRemind;
        let task = TaskId::new();
        policy.record(task, JobKind::OverdueScan, today);
        assert!(policy.should_notify(task, JobKind::OverdueScan, today));
    }

    #[rstest]
    fn once_per_day_suppresses_same_day_repeats(today: NaiveDate) {
        let policy = OncePerDay::new();
        let task = TaskId::new();

        assert!(policy.should_notify(task, JobKind::OverdueScan, today));
        policy.record(task, JobKind::OverdueScan, today);

        assert!(!policy.should_notify(task, JobKind::OverdueScan, today));
        assert!(policy.should_notify(task, JobKind::ReminderScan, today));
        assert!(policy.should_notify(task, JobKind::OverdueScan, today.succ_opt().expect("date")));
    }
}
