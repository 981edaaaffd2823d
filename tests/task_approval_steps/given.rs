//! Given steps for task approval BDD scenarios.

use super::world::{TaskApprovalWorld, run_async};
use chrono::TimeDelta;
use eyre::WrapErr;
use mockable::Clock;
use rstest_bdd_macros::given;
use sitework::task::{
    domain::{Building, BuildingId, Role, User, UserId},
    services::CreateTaskRequest,
};

#[given(r#"a building "{name}" created by builder "{builder}""#)]
fn building_created_by(
    world: &mut TaskApprovalWorld,
    name: String,
    builder: String,
) -> Result<(), eyre::Report> {
    let user = User::new(UserId::new(), Role::Builder, builder, "builder@example.com");
    let building = Building::new(BuildingId::new(), name, user.id());
    world.directory.insert_user(user.clone())?;
    world.directory.insert_building(building.clone())?;
    world.builder = Some(user);
    world.building = Some(building);
    Ok(())
}

#[given(r#"contractor "{contractor}" is assigned "{task}" due in {days:i64} days"#)]
fn contractor_assigned(
    world: &mut TaskApprovalWorld,
    contractor: String,
    task: String,
    days: i64,
) -> Result<(), eyre::Report> {
    let user = User::new(
        UserId::new(),
        Role::Contractor,
        contractor,
        "contractor@example.com",
    );
    world.directory.insert_user(user.clone())?;
    let building = world
        .building
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing building in scenario world"))?;
    let today = world.clock.utc().date_naive();
    let request = CreateTaskRequest::new(
        task,
        "CIVIL_WORK",
        building.id(),
        user.id(),
        today,
        today + TimeDelta::days(days),
    );
    let created = run_async(world.service.create(request, world.builder()?.id()))
        .wrap_err("create task for approval scenario")?;
    world.contractor = Some(user);
    world.task = Some(created);
    Ok(())
}
