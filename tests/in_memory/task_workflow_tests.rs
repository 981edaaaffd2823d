//! In-memory integration tests for complete task workflows.

use chrono::TimeDelta;
use eyre::{OptionExt, Result, ensure};
use rstest::rstest;
use sitework::{
    notification::domain::NotificationKind,
    task::{
        domain::{Progress, TaskStatus, TaskUpdate, UpdateType},
        ports::{TaskUpdateLog, UpdateOrder},
        services::{ErrorKind, NoteRequest},
    },
};

use super::helpers::{Project, june, project};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn approved_task_leaves_complete_trail(project: Project) -> Result<()> {
    let task = project.create("Pour foundation", 12).await?;
    let contractor = project.contractor.id();

    project.clock.advance(TimeDelta::days(3));
    project
        .service
        .update_progress(task.id(), 50, Some("Formwork in place"), contractor)
        .await?;
    project.clock.advance(TimeDelta::days(4));
    project
        .service
        .mark_completed(task.id(), Some("Cured and inspected"), contractor)
        .await?;
    let approved = project
        .service
        .approve(task.id(), project.builder.id())
        .await?;

    ensure!(approved.status() == TaskStatus::Approved);
    ensure!(approved.progress() == Progress::COMPLETE);
    ensure!(approved.approval_date() == Some(june(9)));
    ensure!(approved.completion_date() == Some(june(9)));
    ensure!(approved.actual_duration_days() == Some(7));

    let trail = project
        .repository
        .find_by_task(task.id(), UpdateOrder::OldestFirst)
        .await?;
    let types: Vec<UpdateType> = trail.iter().map(TaskUpdate::update_type).collect();
    ensure!(
        types
            == [
                UpdateType::StatusChange,
                UpdateType::ProgressUpdate,
                UpdateType::CompletionRequest,
                UpdateType::StatusChange,
            ],
        "unexpected trail {types:?}"
    );

    let kinds: Vec<NotificationKind> = project
        .sink
        .all()?
        .iter()
        .map(|notification| notification.kind())
        .collect();
    ensure!(
        kinds
            == [
                NotificationKind::TaskAssigned,
                NotificationKind::ApprovalRequest,
                NotificationKind::TaskApproved,
            ],
        "unexpected notifications {kinds:?}"
    );
    let approval = project.sink.for_recipient(contractor)?;
    ensure!(approval.iter().any(|n| n.message()
        == "Your completed task 'Pour foundation' has been approved by Bea Builder"));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rejected_task_returns_for_rework(project: Project) -> Result<()> {
    let task = project.create("Pour foundation", 12).await?;
    let contractor = project.contractor.id();
    project
        .service
        .mark_completed(task.id(), None, contractor)
        .await?;

    let rejected = project
        .service
        .reject(task.id(), "missing permit", project.builder.id())
        .await?;

    ensure!(rejected.status() == TaskStatus::Rejected);
    ensure!(rejected.progress() == Progress::new(90)?);
    ensure!(rejected.rejection_reason() == Some("missing permit"));
    let rejections = project.sink.of_kind(NotificationKind::TaskRejected)?;
    ensure!(rejections.len() == 1);
    let notice = rejections.first().ok_or_eyre("missing rejection")?;
    ensure!(notice.recipient() == contractor);
    ensure!(notice.message().ends_with("Reason: missing permit"));

    project
        .service
        .update_status(task.id(), TaskStatus::InProgress, contractor)
        .await?;
    let resubmitted = project
        .service
        .mark_completed(task.id(), Some("Permit attached"), contractor)
        .await?;
    ensure!(resubmitted.status() == TaskStatus::Completed);
    ensure!(resubmitted.rejection_reason() == Some("missing permit"));
    ensure!(project.sink.of_kind(NotificationKind::ApprovalRequest)?.len() == 2);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn paused_task_resumes_and_cancelled_task_is_frozen(project: Project) -> Result<()> {
    let task = project.create("Scaffold east face", 20).await?;
    let contractor = project.contractor.id();

    let paused = project
        .service
        .update_status(task.id(), TaskStatus::OnHold, contractor)
        .await?;
    ensure!(paused.status() == TaskStatus::OnHold);
    let resumed = project
        .service
        .update_status(task.id(), TaskStatus::InProgress, contractor)
        .await?;
    ensure!(resumed.progress() == Progress::new(10)?);

    project
        .service
        .update_status(task.id(), TaskStatus::Cancelled, contractor)
        .await?;
    let frozen = project
        .service
        .update_progress(task.id(), 60, None, contractor)
        .await;
    ensure!(frozen.is_err_and(|err| err.kind() == ErrorKind::StateConflict));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn notes_from_both_parties_join_the_trail(project: Project) -> Result<()> {
    let task = project.create("Tile bathrooms", 15).await?;

    project
        .service
        .add_note(
            task.id(),
            NoteRequest::new("TIME_LOG", "Six hours on site"),
            project.contractor.id(),
        )
        .await?;
    project
        .service
        .add_note(
            task.id(),
            NoteRequest::new("ADMIN_NOTE", "Grout colour confirmed"),
            project.builder.id(),
        )
        .await?;

    let trail = project
        .service
        .list_updates(task.id(), project.builder.id())
        .await?;
    let messages: Vec<&str> = trail.iter().map(TaskUpdate::message).collect();
    ensure!(
        messages
            == [
                "Grout colour confirmed",
                "Six hours on site",
                "Task created and assigned to contractor",
            ]
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn building_and_contractor_views_list_tasks(project: Project) -> Result<()> {
    let first = project.create("Strip out", 6).await?;
    let second = project.create("Second fix", 4).await?;
    project
        .service
        .mark_completed(first.id(), None, project.contractor.id())
        .await?;

    let by_deadline = project
        .service
        .tasks_for_contractor(project.contractor.id())
        .await?;
    let ids: Vec<_> = by_deadline.iter().map(|task| task.id()).collect();
    ensure!(ids == [second.id(), first.id()]);

    let active = project
        .service
        .active_tasks_for_contractor(project.contractor.id())
        .await?;
    ensure!(active.len() == 1);
    ensure!(
        project
            .service
            .tasks_for_building(project.building.id())
            .await?
            .len()
            == 2
    );
    ensure!(project.service.tasks_pending_approval().await?.len() == 1);
    Ok(())
}
