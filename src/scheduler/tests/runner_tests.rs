//! Tests for the timer loops, driven on a paused tokio clock.

use std::sync::Arc;
use std::time::Duration;

use super::fixtures::{Yard, june};
use crate::notification::domain::NotificationKind;
use crate::scheduler::{JobKind, JobSchedule, SchedulerConfig, spawn};
use crate::task::domain::TaskStatus;
use chrono::TimeDelta;
use eyre::{Result, ensure};
use rstest::{fixture, rstest};
use tokio::time::sleep;

#[fixture]
fn yard() -> Result<Yard> {
    Yard::new()
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn fixed_rate_job_runs_until_stopped(yard: Result<Yard>) -> Result<()> {
    let yard = yard?;
    yard.seed(TaskStatus::InProgress, june(6)).await?;
    let config = SchedulerConfig {
        overdue_scan: JobSchedule::EverySecs(60),
        ..SchedulerConfig::default()
    };
    let handle = spawn(Arc::new(yard.scheduler().with_config(config)));
    let overdue = || yard.sink.of_kind(NotificationKind::TaskOverdue).map(|n| n.len());

    sleep(Duration::from_secs(1)).await;
    ensure!(overdue()? == 1, "first tick runs immediately");
    sleep(Duration::from_secs(60)).await;
    ensure!(overdue()? == 2);

    ensure!(handle.stop_job(JobKind::OverdueScan));
    ensure!(!handle.stop_job(JobKind::OverdueScan));
    ensure!(!handle.is_scheduled(JobKind::OverdueScan));
    ensure!(handle.is_scheduled(JobKind::ReminderScan));

    sleep(Duration::from_secs(180)).await;
    ensure!(overdue()? == 2);
    handle.shutdown().await;
    Ok(())
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn daily_job_fires_at_its_time(yard: Result<Yard>) -> Result<()> {
    let yard = yard?;
    yard.clock
        .advance(TimeDelta::hours(8) + TimeDelta::minutes(59) + TimeDelta::seconds(30));
    yard.seed(TaskStatus::Assigned, june(12)).await?;
    let handle = spawn(Arc::new(yard.scheduler()));
    let reminders = || {
        yard.sink
            .of_kind(NotificationKind::DeadlineReminder)
            .map(|n| n.len())
    };

    sleep(Duration::from_secs(20)).await;
    ensure!(reminders()? == 0);
    sleep(Duration::from_secs(15)).await;
    ensure!(reminders()? == 1);

    handle.shutdown().await;
    Ok(())
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn daily_job_fires_once_while_wall_clock_lags(yard: Result<Yard>) -> Result<()> {
    let yard = yard?;
    yard.clock
        .advance(TimeDelta::hours(8) + TimeDelta::minutes(59) + TimeDelta::seconds(50));
    yard.seed(TaskStatus::InProgress, june(12)).await?;
    let handle = spawn(Arc::new(yard.scheduler()));
    let reminders = || {
        yard.sink
            .of_kind(NotificationKind::DeadlineReminder)
            .map(|n| n.len())
    };

    // The manual clock stands still, so after the timer fires the wall
    // clock still reads just before the target.
    sleep(Duration::from_secs(11)).await;
    ensure!(reminders()? == 1);
    sleep(Duration::from_secs(120)).await;
    ensure!(reminders()? == 1, "the same target fired twice");

    handle.shutdown().await;
    Ok(())
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn shutdown_stops_every_job(yard: Result<Yard>) -> Result<()> {
    let yard = yard?;
    yard.seed(TaskStatus::Assigned, june(3)).await?;
    let config = SchedulerConfig {
        overdue_scan: JobSchedule::EverySecs(30),
        ..SchedulerConfig::default()
    };
    let scheduler = Arc::new(yard.scheduler().with_config(config));
    let handle = spawn(Arc::clone(&scheduler));
    sleep(Duration::from_secs(1)).await;

    handle.shutdown().await;
    let before = yard.sink.all()?.len();
    sleep(Duration::from_secs(300)).await;

    ensure!(yard.sink.all()?.len() == before);
    ensure!(JobKind::ALL.iter().all(|kind| !scheduler.is_running(*kind)));
    Ok(())
}
