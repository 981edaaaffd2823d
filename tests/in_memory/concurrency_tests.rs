//! In-memory integration tests for concurrent writers and job triggers.

use std::sync::Arc;

use eyre::{Result, ensure};
use rstest::rstest;
use sitework::{
    notification::domain::NotificationKind,
    scheduler::{JobKind, JobOutcome, JobReport},
    task::{
        ports::{TaskUpdateLog, UpdateOrder},
        services::ErrorKind,
    },
};
use tokio::task::JoinSet;

use super::helpers::{Project, project};

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_progress_updates_never_lose_audit_entries(project: Project) -> Result<()> {
    let task = project.create("Plaster walls", 15).await?;
    let service = Arc::new(project.service.clone());
    let contractor = project.contractor.id();
    let task_id = task.id();

    let mut writers = JoinSet::new();
    for pct in 1..=16 {
        let writer = Arc::clone(&service);
        writers.spawn(async move { writer.update_progress(task_id, pct, None, contractor).await });
    }
    let mut applied = 0_u64;
    while let Some(joined) = writers.join_next().await {
        match joined? {
            Ok(_) => applied += 1,
            Err(err) => ensure!(
                err.kind() == ErrorKind::StateConflict,
                "unexpected failure {err}"
            ),
        }
    }

    ensure!(applied >= 1);
    let stored = service.get_task(task_id).await?;
    ensure!(stored.revision() == applied);
    let trail = project
        .repository
        .find_by_task(task_id, UpdateOrder::OldestFirst)
        .await?;
    ensure!(u64::try_from(trail.len())? == applied + 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creations_are_all_stored(project: Project) -> Result<()> {
    let project = Arc::new(project);
    let mut creators = JoinSet::new();
    for index in 0..12 {
        let shared = Arc::clone(&project);
        creators.spawn(async move { shared.create(&format!("Unit {index}"), 10).await });
    }
    while let Some(joined) = creators.join_next().await {
        joined??;
    }

    ensure!(
        project
            .service
            .tasks_for_building(project.building.id())
            .await?
            .len()
            == 12
    );
    ensure!(project.sink.of_kind(NotificationKind::TaskAssigned)?.len() == 12);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn simultaneous_triggers_run_each_job_at_most_once_at_a_time(
    project: Project,
) -> Result<()> {
    project.create("Roof battens", 3).await?;
    project.clock.advance(chrono::TimeDelta::days(5));
    let scheduler = Arc::new(project.scheduler());

    let mut triggers = JoinSet::new();
    for _ in 0..8 {
        let shared = Arc::clone(&scheduler);
        triggers.spawn(async move { shared.trigger(JobKind::OverdueScan).await });
    }
    let mut completed = 0;
    while let Some(joined) = triggers.join_next().await {
        match joined? {
            JobOutcome::Completed(JobReport::Scan(report)) => {
                ensure!(report.notified == 1);
                completed += 1;
            }
            JobOutcome::Skipped => {}
            other => eyre::bail!("unexpected outcome {other:?}"),
        }
    }

    ensure!(completed >= 1);
    ensure!(project.sink.of_kind(NotificationKind::TaskOverdue)?.len() == completed);
    ensure!(!scheduler.is_running(JobKind::OverdueScan));
    Ok(())
}
