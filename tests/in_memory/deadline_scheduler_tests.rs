//! In-memory integration tests for the deadline scheduler over tasks
//! created through the lifecycle service.

use chrono::TimeDelta;
use eyre::{Result, ensure};
use rstest::rstest;
use sitework::{
    notification::domain::NotificationKind,
    scheduler::{JobKind, JobOutcome, JobReport, ScanReport},
};

use super::helpers::{Project, project};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn week_of_scans_tracks_a_slipping_task(project: Project) -> Result<()> {
    let task = project.create("Render facade", 6).await?;
    let scheduler = project.scheduler();

    // 4 June: due in two days.
    project.clock.advance(TimeDelta::days(2));
    scheduler.trigger(JobKind::ReminderScan).await;
    // 5 June: due tomorrow.
    project.clock.advance(TimeDelta::days(1));
    scheduler.trigger(JobKind::ReminderScan).await;
    scheduler.trigger(JobKind::UrgentReminderScan).await;
    // 8 June: two days late.
    project.clock.advance(TimeDelta::days(3));
    let outcome = scheduler.trigger(JobKind::OverdueScan).await;

    ensure!(
        outcome
            == JobOutcome::Completed(JobReport::Scan(ScanReport {
                scanned: 1,
                notified: 1,
                suppressed: 0,
                failed: 0,
            }))
    );
    let inbox = project.sink.for_recipient(project.contractor.id())?;
    let titles: Vec<&str> = inbox.iter().map(|n| n.title()).collect();
    ensure!(
        titles
            == [
                "New Task Assigned",
                "Deadline Reminder",
                "Deadline Reminder",
                "URGENT: Task Due Tomorrow",
                "Task Overdue",
            ],
        "unexpected inbox {titles:?}"
    );
    ensure!(inbox.iter().skip(1).all(|n| n.related_task() == Some(task.id())));
    let overdue = project.sink.of_kind(NotificationKind::TaskOverdue)?;
    ensure!(overdue.iter().all(|n| n.message().ends_with("overdue by 2 days")));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn finished_work_drops_out_of_scans(project: Project) -> Result<()> {
    let task = project.create("Fit kitchen", 5).await?;
    project
        .service
        .mark_completed(task.id(), None, project.contractor.id())
        .await?;
    project.clock.advance(TimeDelta::days(10));

    let report = project.scheduler().run_overdue_scan().await?;

    ensure!(report == ScanReport::default());
    ensure!(project.sink.of_kind(NotificationKind::TaskOverdue)?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn summary_reflects_service_activity(project: Project) -> Result<()> {
    let started = project.create("Brickwork", 20).await?;
    let done = project.create("Site survey", 3).await?;
    project.create("Drainage", 4).await?;
    project
        .service
        .update_progress(started.id(), 30, None, project.contractor.id())
        .await?;
    project
        .service
        .mark_completed(done.id(), None, project.contractor.id())
        .await?;
    project.clock.advance(TimeDelta::days(3));

    let summary = project.scheduler().run_daily_summary().await?;

    ensure!(summary.active_tasks == 2);
    ensure!(summary.pending_approvals == 1);
    ensure!(summary.urgent_tasks == 0);
    ensure!(summary.overdue_tasks == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cleanup_keeps_unread_task_notifications(project: Project) -> Result<()> {
    project.create("Glazing", 9).await?;
    project.clock.advance(TimeDelta::days(90));

    let outcome = project.scheduler().trigger(JobKind::NotificationCleanup).await;

    ensure!(matches!(outcome, JobOutcome::Completed(JobReport::Cleanup(report)) if report.old_read == 0 && report.expired == 0));
    ensure!(project.sink.all()?.len() == 1);
    Ok(())
}
