//! The five deadline jobs and their manual trigger.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use mockable::Clock;
use tracing::{error, info, warn};

use super::{
    AlwaysRemind, CleanupReport, DailySummary, JobKind, JobOutcome, JobReport, OncePerDay,
    ReminderPolicy, ScanReport, SchedulerConfig, SchedulerError, SchedulerResult,
    job::RunningJobs,
};
use crate::notification::{
    domain::NotificationRequest, ports::NotificationSink, services::NotificationComposer,
};
use crate::task::{
    domain::{Priority, Task, TaskStatus},
    ports::{BuildingDirectory, TaskRepository},
};

/// Statuses a task can hold while its work is not done.
const OPEN_STATUSES: [TaskStatus; 4] = [
    TaskStatus::Assigned,
    TaskStatus::InProgress,
    TaskStatus::Rejected,
    TaskStatus::OnHold,
];

/// Runs deadline scans, reminders, cleanup and summaries.
///
/// Jobs read tasks and write notifications only. Each job guards against
/// overlapping runs of itself, and a failure while notifying about one task
/// is counted and logged without stopping the scan.
pub struct DeadlineScheduler<R, D, N, C>
where
    R: TaskRepository,
    D: BuildingDirectory,
    N: NotificationSink,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    directory: Arc<D>,
    notifications: Arc<N>,
    clock: Arc<C>,
    composer: NotificationComposer,
    policy: Arc<dyn ReminderPolicy>,
    config: SchedulerConfig,
    running: RunningJobs,
}

impl<R, D, N, C> DeadlineScheduler<R, D, N, C>
where
    R: TaskRepository,
    D: BuildingDirectory,
    N: NotificationSink,
    C: Clock + Send + Sync,
{
    /// Creates a scheduler with the default configuration.
    #[must_use]
    pub fn new(repository: Arc<R>, directory: Arc<D>, notifications: Arc<N>, clock: Arc<C>) -> Self {
        Self {
            repository,
            directory,
            notifications,
            clock,
            composer: NotificationComposer::new(),
            policy: Arc::new(AlwaysRemind),
            config: SchedulerConfig::default(),
            running: RunningJobs::default(),
        }
    }

    /// Applies `config`, selecting [`OncePerDay`] when reminders are
    /// de-duplicated.
    #[must_use]
    pub fn with_config(mut self, config: SchedulerConfig) -> Self {
        self.policy = if config.deduplicate_reminders {
            Arc::new(OncePerDay::new())
        } else {
            Arc::new(AlwaysRemind)
        };
        self.config = config;
        self
    }

    /// Replaces the reminder policy.
    #[must_use]
    pub fn with_policy(mut self, policy: Arc<dyn ReminderPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Returns the scheduler clock's current instant.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }

    /// Returns `true` while a run of `kind` is in progress.
    #[must_use]
    pub fn is_running(&self, kind: JobKind) -> bool {
        self.running.is_running(kind)
    }

    /// Runs `kind` now, outside its schedule.
    ///
    /// Errors are logged and reported as [`JobOutcome::Failed`]; a run that
    /// finds the same job already active returns [`JobOutcome::Skipped`].
    pub async fn trigger(&self, kind: JobKind) -> JobOutcome {
        let Some(_guard) = self.running.try_acquire(kind) else {
            warn!(job = %kind, "previous run still active, skipping");
            return JobOutcome::Skipped;
        };

        info!(job = %kind, "job started");
        let result = match kind {
            JobKind::OverdueScan => self.run_overdue_scan().await.map(JobReport::Scan),
            JobKind::ReminderScan => self.run_reminder_scan().await.map(JobReport::Scan),
            JobKind::UrgentReminderScan => {
                self.run_urgent_reminder_scan().await.map(JobReport::Scan)
            }
            JobKind::NotificationCleanup => {
                self.run_notification_cleanup().await.map(JobReport::Cleanup)
            }
            JobKind::DailySummary => self.run_daily_summary().await.map(JobReport::Summary),
        };

        match result {
            Ok(report) => {
                info!(job = %kind, ?report, "job finished");
                JobOutcome::Completed(report)
            }
            Err(err) => {
                error!(job = %kind, error = %err, "job failed");
                JobOutcome::Failed(err.to_string())
            }
        }
    }

    /// Notifies contractors about every task past its deadline that is not
    /// done. Without de-duplication a task is re-notified on every scan.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError`] when the task query fails.
    pub async fn run_overdue_scan(&self) -> SchedulerResult<ScanReport> {
        let today = self.today();
        let tasks = self.repository.find_overdue(today).await?;
        let eligible = tasks.iter().filter(|task| task.is_overdue(today));
        let mut report = self
            .notify_each(JobKind::OverdueScan, today, eligible, |task| async move {
                let building = self.building_of(task).await?;
                Ok(self
                    .composer
                    .task_overdue(task, &building, task.days_overdue(today))?)
            })
            .await;
        report.scanned = tasks.len();
        Ok(report)
    }

    /// Reminds contractors about active tasks due in one to
    /// `reminder_window_days` days.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError`] when the window end cannot be represented
    /// or the task query fails.
    pub async fn run_reminder_scan(&self) -> SchedulerResult<ScanReport> {
        let today = self.today();
        let window = i64::from(self.config.reminder_window_days);
        let until = shift_date(today, window)?;
        let tasks = self.repository.find_by_deadline_between(today, until).await?;
        let eligible = tasks.iter().filter(|task| {
            let remaining = task.days_until_deadline(today);
            task.status().is_active() && (1..=window).contains(&remaining)
        });
        let mut report = self
            .notify_each(JobKind::ReminderScan, today, eligible, |task| async move {
                Ok(self
                    .composer
                    .deadline_reminder(task, task.days_until_deadline(today))?)
            })
            .await;
        report.scanned = tasks.len();
        Ok(report)
    }

    /// Urgently reminds contractors about active tasks due tomorrow.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError`] when the task query fails.
    pub async fn run_urgent_reminder_scan(&self) -> SchedulerResult<ScanReport> {
        let today = self.today();
        let tomorrow = shift_date(today, 1)?;
        let tasks = self
            .repository
            .find_by_deadline_between(tomorrow, tomorrow)
            .await?;
        let eligible = tasks.iter().filter(|task| task.status().is_active());
        let mut report = self
            .notify_each(JobKind::UrgentReminderScan, today, eligible, |task| async move {
                let building = self.building_of(task).await?;
                Ok(self.composer.urgent_deadline_reminder(task, &building)?)
            })
            .await;
        report.scanned = tasks.len();
        Ok(report)
    }

    /// Deletes expired notifications and read notifications older than the
    /// retention window.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Sink`] when either purge fails and
    /// [`SchedulerError::DateOutOfRange`] when the retention cutoff cannot be
    /// represented.
    pub async fn run_notification_cleanup(&self) -> SchedulerResult<CleanupReport> {
        let now = self.clock.utc();
        let expired = self.notifications.cleanup_expired(now).await?;
        let days = i64::from(self.config.read_retention_days);
        let cutoff = TimeDelta::try_days(days)
            .and_then(|span| now.checked_sub_signed(span))
            .ok_or(SchedulerError::DateOutOfRange { days })?;
        let old_read = self.notifications.cleanup_read_before(cutoff).await?;
        info!(expired, old_read, "notifications cleaned up");
        Ok(CleanupReport { expired, old_read })
    }

    /// Aggregates active, pending, urgent and overdue task counts.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Repository`] when a query fails.
    pub async fn run_daily_summary(&self) -> SchedulerResult<DailySummary> {
        let active_tasks = self.repository.count_by_status(TaskStatus::Assigned).await?
            + self.repository.count_by_status(TaskStatus::InProgress).await?;
        let pending_approvals = self.repository.count_by_status(TaskStatus::Completed).await?;
        let mut urgent_tasks = 0;
        for status in OPEN_STATUSES {
            urgent_tasks += self
                .repository
                .find_by_status(status)
                .await?
                .iter()
                .filter(|task| task.priority() == Priority::Urgent)
                .count();
        }
        let overdue_tasks = self.repository.find_overdue(self.today()).await?.len();

        let summary = DailySummary {
            active_tasks,
            pending_approvals,
            urgent_tasks,
            overdue_tasks,
        };
        info!(
            active_tasks,
            pending_approvals, urgent_tasks, overdue_tasks, "daily task summary"
        );
        Ok(summary)
    }

    /// Creates one notification per eligible task, consulting the reminder
    /// policy and isolating per-task failures.
    async fn notify_each<'a, F, Fut>(
        &self,
        job: JobKind,
        today: NaiveDate,
        tasks: impl Iterator<Item = &'a Task>,
        compose: F,
    ) -> ScanReport
    where
        F: Fn(&'a Task) -> Fut,
        Fut: Future<Output = SchedulerResult<NotificationRequest>>,
    {
        let mut report = ScanReport::default();
        for task in tasks {
            if !self.policy.should_notify(task.id(), job, today) {
                report.suppressed += 1;
                continue;
            }
            let delivered = match compose(task).await {
                Ok(request) => self.notifications.create(request).await.map_err(SchedulerError::from),
                Err(err) => Err(err),
            };
            match delivered {
                Ok(_) => {
                    self.policy.record(task.id(), job, today);
                    report.notified += 1;
                }
                Err(err) => {
                    warn!(job = %job, task_id = %task.id(), error = %err, "notification failed");
                    report.failed += 1;
                }
            }
        }
        report
    }

    async fn building_of(&self, task: &Task) -> SchedulerResult<crate::task::domain::Building> {
        self.directory
            .find_building(task.building_id())
            .await?
            .ok_or(SchedulerError::MissingBuilding(task.building_id()))
    }

    fn today(&self) -> NaiveDate {
        self.clock.utc().date_naive()
    }
}

fn shift_date(date: NaiveDate, days: i64) -> SchedulerResult<NaiveDate> {
    TimeDelta::try_days(days)
        .and_then(|span| date.checked_add_signed(span))
        .ok_or(SchedulerError::DateOutOfRange { days })
}
