//! When steps for task approval BDD scenarios.

use super::world::{TaskApprovalWorld, run_async};
use chrono::TimeDelta;
use rstest_bdd_macros::when;
use sitework::task::domain::{Role, User, UserId};

#[when("the contractor reports {pct:i32} percent progress")]
fn contractor_reports_progress(
    world: &mut TaskApprovalWorld,
    pct: i32,
) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let contractor = world.contractor()?.id();
    let result = run_async(
        world
            .service
            .update_progress(task_id, pct, None, contractor),
    );
    world.record(result);
    Ok(())
}

#[when("another contractor reports {pct:i32} percent progress")]
fn another_contractor_reports_progress(
    world: &mut TaskApprovalWorld,
    pct: i32,
) -> Result<(), eyre::Report> {
    let stranger = User::new(
        UserId::new(),
        Role::Contractor,
        "Sam Stranger",
        "sam@example.com",
    );
    world.directory.insert_user(stranger.clone())?;
    let task_id = world.task()?.id();
    let result = run_async(
        world
            .service
            .update_progress(task_id, pct, None, stranger.id()),
    );
    world.record(result);
    Ok(())
}

#[when("{days:i64} days pass")]
fn days_pass(world: &mut TaskApprovalWorld, days: i64) {
    world.clock.advance(TimeDelta::days(days));
}

#[when("the contractor marks the task completed")]
fn contractor_marks_completed(world: &mut TaskApprovalWorld) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let contractor = world.contractor()?.id();
    let result = run_async(world.service.mark_completed(task_id, None, contractor));
    world.record(result);
    Ok(())
}

#[when("the builder approves the task")]
fn builder_approves(world: &mut TaskApprovalWorld) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let builder = world.builder()?.id();
    let result = run_async(world.service.approve(task_id, builder));
    world.record(result);
    Ok(())
}

#[when(r#"the builder rejects the task because "{reason}""#)]
fn builder_rejects(world: &mut TaskApprovalWorld, reason: String) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let builder = world.builder()?.id();
    let result = run_async(world.service.reject(task_id, &reason, builder));
    world.record(result);
    Ok(())
}
