//! Then steps for task approval BDD scenarios.

use super::world::{TaskApprovalWorld, run_async};
use rstest_bdd_macros::then;
use sitework::{
    notification::domain::NotificationKind,
    task::{
        domain::TaskStatus,
        ports::{TaskUpdateLog, UpdateOrder},
        services::ErrorKind,
    },
};

#[then(r#"the task status is "{status}""#)]
fn task_status_is(world: &TaskApprovalWorld, status: String) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let stored = run_async(world.service.get_task(world.task()?.id()))?;
    if stored.status() != expected {
        return Err(eyre::eyre!(
            "expected status {expected}, found {}",
            stored.status()
        ));
    }
    Ok(())
}

#[then("the task progress is {pct:u8} percent")]
fn task_progress_is(world: &TaskApprovalWorld, pct: u8) -> Result<(), eyre::Report> {
    let progress = world.task()?.progress();
    if progress.value() != pct {
        return Err(eyre::eyre!("expected {pct}%, found {progress}"));
    }
    Ok(())
}

#[then("the task took {days:u32} days")]
fn task_took(world: &TaskApprovalWorld, days: u32) -> Result<(), eyre::Report> {
    let actual = world.task()?.actual_duration_days();
    if actual != Some(days) {
        return Err(eyre::eyre!("expected {days} days, found {actual:?}"));
    }
    Ok(())
}

#[then("the audit trail has {count:usize} entries")]
fn audit_trail_has(world: &TaskApprovalWorld, count: usize) -> Result<(), eyre::Report> {
    let trail = run_async(
        world
            .repository
            .find_by_task(world.task()?.id(), UpdateOrder::OldestFirst),
    )?;
    if trail.len() != count {
        return Err(eyre::eyre!(
            "expected {count} audit entries, found {}",
            trail.len()
        ));
    }
    Ok(())
}

#[then("{count:usize} notifications were sent")]
fn notifications_sent(world: &TaskApprovalWorld, count: usize) -> Result<(), eyre::Report> {
    let sent = world.sink.all()?.len();
    if sent != count {
        return Err(eyre::eyre!("expected {count} notifications, found {sent}"));
    }
    Ok(())
}

#[then(r#"the contractor received a "{kind}" notification"#)]
fn contractor_received(world: &TaskApprovalWorld, kind: String) -> Result<(), eyre::Report> {
    let expected = NotificationKind::try_from(kind.as_str())?;
    let inbox = world.sink.for_recipient(world.contractor()?.id())?;
    if !inbox.iter().any(|notification| notification.kind() == expected) {
        return Err(eyre::eyre!("no {expected} notification in contractor inbox"));
    }
    Ok(())
}

#[then(r#"the operation fails with a "{kind}" error"#)]
fn operation_fails_with(world: &TaskApprovalWorld, kind: String) -> Result<(), eyre::Report> {
    let expected = match kind.as_str() {
        "validation" => ErrorKind::Validation,
        "not_found" => ErrorKind::NotFound,
        "authorization" => ErrorKind::Authorization,
        "state_conflict" => ErrorKind::StateConflict,
        other => return Err(eyre::eyre!("unknown error kind in scenario: {other}")),
    };
    let result = world
        .last_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing operation result"))?;
    match result {
        Err(err) if err.kind() == expected => Ok(()),
        other => Err(eyre::eyre!("expected {kind} error, got {other:?}")),
    }
}
