//! Unit tests for task status transition validation.

use super::fixtures::{june, task_in};
use crate::clock::ManualClock;
use crate::task::domain::{TaskDomainError, TaskStatus, UserId};
use eyre::{Result, bail, ensure};
use rstest::{fixture, rstest};

#[fixture]
fn clock() -> ManualClock {
    ManualClock::at_date(june(4))
}

#[rstest]
#[case(TaskStatus::Assigned, TaskStatus::Assigned, false)]
#[case(TaskStatus::Assigned, TaskStatus::InProgress, true)]
#[case(TaskStatus::Assigned, TaskStatus::Completed, true)]
#[case(TaskStatus::Assigned, TaskStatus::Approved, false)]
#[case(TaskStatus::Assigned, TaskStatus::OnHold, true)]
#[case(TaskStatus::Assigned, TaskStatus::Cancelled, true)]
#[case(TaskStatus::InProgress, TaskStatus::Assigned, false)]
#[case(TaskStatus::InProgress, TaskStatus::Completed, true)]
#[case(TaskStatus::InProgress, TaskStatus::Rejected, false)]
#[case(TaskStatus::InProgress, TaskStatus::OnHold, true)]
#[case(TaskStatus::Completed, TaskStatus::Approved, true)]
#[case(TaskStatus::Completed, TaskStatus::Rejected, true)]
#[case(TaskStatus::Completed, TaskStatus::InProgress, false)]
#[case(TaskStatus::Completed, TaskStatus::Cancelled, true)]
#[case(TaskStatus::Rejected, TaskStatus::InProgress, true)]
#[case(TaskStatus::Rejected, TaskStatus::Completed, false)]
#[case(TaskStatus::Rejected, TaskStatus::Approved, false)]
#[case(TaskStatus::OnHold, TaskStatus::InProgress, true)]
#[case(TaskStatus::OnHold, TaskStatus::OnHold, false)]
#[case(TaskStatus::OnHold, TaskStatus::Completed, false)]
#[case(TaskStatus::Approved, TaskStatus::Rejected, false)]
#[case(TaskStatus::Approved, TaskStatus::OnHold, false)]
#[case(TaskStatus::Approved, TaskStatus::Cancelled, false)]
#[case(TaskStatus::Cancelled, TaskStatus::InProgress, false)]
#[case(TaskStatus::Cancelled, TaskStatus::OnHold, false)]
fn can_transition_to_returns_expected(
    #[case] from: TaskStatus,
    #[case] to: TaskStatus,
    #[case] expected: bool,
) {
    assert_eq!(from.can_transition_to(to), expected);
}

#[rstest]
fn terminal_statuses_allow_no_transition() {
    for from in [TaskStatus::Approved, TaskStatus::Cancelled] {
        assert!(from.is_terminal());
        assert!(TaskStatus::ALL.iter().all(|to| !from.can_transition_to(*to)));
    }
}

#[rstest]
fn approve_succeeds_only_from_completed(clock: ManualClock) -> Result<()> {
    for status in TaskStatus::ALL {
        let mut task = task_in(status, &clock)?;
        let result = task.approve(UserId::new(), &clock);

        if status == TaskStatus::Completed {
            ensure!(result.is_ok(), "approve from completed failed: {result:?}");
            ensure!(task.status() == TaskStatus::Approved, "status not approved");
            ensure!(task.approval_date() == Some(june(4)), "approval date not set");
            continue;
        }
        match result {
            Err(TaskDomainError::InvalidStateTransition { from, to, .. }) => {
                ensure!(from == status && to == TaskStatus::Approved, "wrong transition");
            }
            other => bail!("approve from {status} returned {other:?}"),
        }
        ensure!(task.status() == status, "status changed after failed approve");
    }
    Ok(())
}

#[rstest]
fn reject_succeeds_only_from_completed(clock: ManualClock) -> Result<()> {
    for status in TaskStatus::ALL {
        let mut task = task_in(status, &clock)?;
        let progress = task.progress();
        let result = task.reject(UserId::new(), "missing permit", &clock);

        ensure!(
            result.is_ok() == (status == TaskStatus::Completed),
            "reject from {status} returned {result:?}"
        );
        if result.is_err() {
            ensure!(task.status() == status, "status changed after failed reject");
            ensure!(task.progress() == progress, "progress changed after failed reject");
        }
    }
    Ok(())
}

#[rstest]
#[case(TaskStatus::Completed)]
#[case(TaskStatus::Approved)]
#[case(TaskStatus::Rejected)]
#[case(TaskStatus::OnHold)]
#[case(TaskStatus::Cancelled)]
fn complete_requires_assigned_or_in_progress(
    clock: ManualClock,
    #[case] status: TaskStatus,
) -> Result<()> {
    let mut task = task_in(status, &clock)?;
    let result = task.complete(None, &clock);

    let Err(TaskDomainError::InvalidStateTransition { from, to, .. }) = result else {
        bail!("expected invalid transition, got {result:?}");
    };
    ensure!(from == status, "unexpected source status {from}");
    ensure!(to == TaskStatus::Completed, "unexpected target status {to}");
    Ok(())
}

#[rstest]
fn every_mutation_advances_revision_once(clock: ManualClock) -> Result<()> {
    let mut task = task_in(TaskStatus::Assigned, &clock)?;
    task.change_status(TaskStatus::OnHold, &clock)?;
    task.change_status(TaskStatus::InProgress, &clock)?;
    task.complete(None, &clock)?;
    task.approve(UserId::new(), &clock)?;

    ensure!(task.revision() == 4, "revision is {}", task.revision());
    Ok(())
}
