//! Job identities, run outcomes and the per-job overlap guard.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// One of the scheduler's recurring jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    /// Notify contractors about tasks past their deadline.
    OverdueScan,
    /// Remind contractors about deadlines in the next few days.
    ReminderScan,
    /// Remind contractors about tasks due tomorrow.
    UrgentReminderScan,
    /// Purge expired and old read notifications.
    NotificationCleanup,
    /// Aggregate operational counts.
    DailySummary,
}

impl JobKind {
    /// Every job, in start order.
    pub const ALL: [Self; 5] = [
        Self::OverdueScan,
        Self::ReminderScan,
        Self::UrgentReminderScan,
        Self::NotificationCleanup,
        Self::DailySummary,
    ];

    /// Returns the job name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OverdueScan => "overdue_scan",
            Self::ReminderScan => "reminder_scan",
            Self::UrgentReminderScan => "urgent_reminder_scan",
            Self::NotificationCleanup => "notification_cleanup",
            Self::DailySummary => "daily_summary",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tally of a notification scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanReport {
    /// Tasks returned by the query.
    pub scanned: usize,
    /// Notifications created.
    pub notified: usize,
    /// Eligible tasks skipped by the reminder policy.
    pub suppressed: usize,
    /// Tasks whose notification could not be created.
    pub failed: usize,
}

/// Tally of a cleanup pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CleanupReport {
    /// Notifications removed because they expired.
    pub expired: usize,
    /// Read notifications removed for age.
    pub old_read: usize,
}

/// Operational counts gathered by the daily summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DailySummary {
    /// Assigned and in-progress tasks.
    pub active_tasks: usize,
    /// Completed tasks awaiting review.
    pub pending_approvals: usize,
    /// Urgent-priority tasks that are not done.
    pub urgent_tasks: usize,
    /// Tasks past their deadline that are not done.
    pub overdue_tasks: usize,
}

/// Result of a successful job run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobReport {
    /// Overdue, reminder or urgent reminder scan.
    Scan(ScanReport),
    /// Notification cleanup.
    Cleanup(CleanupReport),
    /// Daily summary.
    Summary(DailySummary),
}

/// Outcome of triggering a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// The job ran to completion.
    Completed(JobReport),
    /// A previous run of the same job was still active.
    Skipped,
    /// The job failed; the message is already logged.
    Failed(String),
}

/// Running flags, one per job.
#[derive(Debug, Default)]
pub(crate) struct RunningJobs {
    overdue_scan: AtomicBool,
    reminder_scan: AtomicBool,
    urgent_reminder_scan: AtomicBool,
    notification_cleanup: AtomicBool,
    daily_summary: AtomicBool,
}

impl RunningJobs {
    /// Marks `kind` running, or returns `None` when it already is.
    pub(crate) fn try_acquire(&self, kind: JobKind) -> Option<RunGuard<'_>> {
        let flag = self.flag(kind);
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunGuard { flag })
    }

    pub(crate) fn is_running(&self, kind: JobKind) -> bool {
        self.flag(kind).load(Ordering::Acquire)
    }

    const fn flag(&self, kind: JobKind) -> &AtomicBool {
        match kind {
            JobKind::OverdueScan => &self.overdue_scan,
            JobKind::ReminderScan => &self.reminder_scan,
            JobKind::UrgentReminderScan => &self.urgent_reminder_scan,
            JobKind::NotificationCleanup => &self.notification_cleanup,
            JobKind::DailySummary => &self.daily_summary,
        }
    }
}

/// Clears the running flag when dropped, including during unwinding.
#[derive(Debug)]
pub(crate) struct RunGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
