//! Drives scheduler jobs on their timers.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use mockable::Clock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::{DeadlineScheduler, JobKind, JobSchedule};
use crate::notification::ports::NotificationSink;
use crate::task::ports::{BuildingDirectory, TaskRepository};

/// Handle to the timer loops started by [`spawn`].
///
/// Each job listens on its own child of a shared cancellation token, so a
/// job can be stopped alone or all at once.
#[derive(Debug)]
pub struct SchedulerHandle {
    root: CancellationToken,
    jobs: HashMap<JobKind, CancellationToken>,
    loops: Vec<JoinHandle<()>>,
}

impl SchedulerHandle {
    /// Stops the timer loop of one job. Returns `false` when it was already
    /// stopped. A run already in progress finishes.
    pub fn stop_job(&self, kind: JobKind) -> bool {
        match self.jobs.get(&kind) {
            Some(token) if !token.is_cancelled() => {
                token.cancel();
                info!(job = %kind, "job stopped");
                true
            }
            _ => false,
        }
    }

    /// Returns `true` while the timer loop of `kind` is active.
    #[must_use]
    pub fn is_scheduled(&self, kind: JobKind) -> bool {
        self.jobs
            .get(&kind)
            .is_some_and(|token| !token.is_cancelled())
    }

    /// Stops every timer loop and waits for the loops to exit.
    pub async fn shutdown(self) {
        self.root.cancel();
        for handle in self.loops {
            if let Err(err) = handle.await {
                warn!(error = %err, "scheduler loop ended abnormally");
            }
        }
        info!("deadline scheduler stopped");
    }
}

/// Starts one timer loop per job on the current tokio runtime.
///
/// Fixed-rate jobs run immediately and then every period; daily jobs wait
/// for their next UTC time and fire at most once per target. Every run is spawned as its own task so a slow
/// or panicking run never delays the timer, and the overlap guard skips a
/// tick whose previous run is still active.
#[must_use]
pub fn spawn<R, D, N, C>(scheduler: Arc<DeadlineScheduler<R, D, N, C>>) -> SchedulerHandle
where
    R: TaskRepository + 'static,
    D: BuildingDirectory + 'static,
    N: NotificationSink + 'static,
    C: Clock + Send + Sync + 'static,
{
    let root = CancellationToken::new();
    let mut jobs = HashMap::with_capacity(JobKind::ALL.len());
    let mut loops = Vec::with_capacity(JobKind::ALL.len());

    for kind in JobKind::ALL {
        let token = root.child_token();
        let schedule = scheduler.config().schedule_for(kind);
        debug!(job = %kind, ?schedule, "scheduling job");
        loops.push(tokio::spawn(drive(
            Arc::clone(&scheduler),
            kind,
            schedule,
            token.clone(),
        )));
        jobs.insert(kind, token);
    }
    info!("deadline scheduler started");

    SchedulerHandle { root, jobs, loops }
}

async fn drive<R, D, N, C>(
    scheduler: Arc<DeadlineScheduler<R, D, N, C>>,
    kind: JobKind,
    schedule: JobSchedule,
    token: CancellationToken,
) where
    R: TaskRepository + 'static,
    D: BuildingDirectory + 'static,
    N: NotificationSink + 'static,
    C: Clock + Send + Sync + 'static,
{
    match schedule {
        JobSchedule::EverySecs(_) => {
            let mut interval = tokio::time::interval(schedule.next_delay(scheduler.now()));
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    () = token.cancelled() => break,
                    _ = interval.tick() => launch(&scheduler, kind),
                }
            }
        }
        JobSchedule::DailyAt(_) => {
            // The sleep runs on the monotonic timer while targets come from
            // the wall clock; each target must lie after the last one fired.
            let mut last_target: Option<DateTime<Utc>> = None;
            loop {
                let now = scheduler.now();
                let after = last_target.map_or(now, |fired| fired.max(now));
                let Some(target) = schedule.next_run_after(after) else {
                    error!(job = %kind, "next run falls outside the date range");
                    break;
                };
                let delay = (target - now).to_std().unwrap_or(Duration::ZERO);
                tokio::select! {
                    () = token.cancelled() => break,
                    () = tokio::time::sleep(delay) => {
                        launch(&scheduler, kind);
                        last_target = Some(target);
                    }
                }
            }
        }
    }
    debug!(job = %kind, "job loop exited");
}

fn launch<R, D, N, C>(scheduler: &Arc<DeadlineScheduler<R, D, N, C>>, kind: JobKind)
where
    R: TaskRepository + 'static,
    D: BuildingDirectory + 'static,
    N: NotificationSink + 'static,
    C: Clock + Send + Sync + 'static,
{
    let shared = Arc::clone(scheduler);
    let run = tokio::spawn(async move { shared.trigger(kind).await });
    tokio::spawn(async move {
        if let Err(err) = run.await
            && err.is_panic()
        {
            error!(job = %kind, "scheduled run panicked");
        }
    });
}
