//! Shared test helpers for in-memory integration tests.

use std::sync::Arc;

use chrono::NaiveDate;
use rstest::fixture;
use sitework::{
    clock::ManualClock,
    notification::adapters::InMemoryNotificationSink,
    scheduler::DeadlineScheduler,
    task::{
        adapters::memory::{InMemoryDirectory, InMemoryTaskRepository},
        domain::{Building, BuildingId, Role, Task, User, UserId},
        services::{CreateTaskRequest, TaskLifecycleResult, TaskLifecycleService},
    },
};

/// Lifecycle service wired to in-memory adapters.
pub type TestService = TaskLifecycleService<
    InMemoryTaskRepository,
    InMemoryDirectory,
    InMemoryNotificationSink<ManualClock>,
    ManualClock,
>;

/// Deadline scheduler wired to the same adapters.
pub type TestScheduler = DeadlineScheduler<
    InMemoryTaskRepository,
    InMemoryDirectory,
    InMemoryNotificationSink<ManualClock>,
    ManualClock,
>;

/// Returns a day in June 2025.
///
/// # Panics
///
/// Panics when `day` is not a valid day of June.
#[must_use]
pub fn june(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, day).expect("valid June date")
}

/// A building with its builder and contractor, plus the workflow services
/// sharing one set of adapters and one manual clock.
pub struct Project {
    /// Clock shared by every adapter and service.
    pub clock: ManualClock,
    /// Task store.
    pub repository: Arc<InMemoryTaskRepository>,
    /// User and building directory.
    pub directory: Arc<InMemoryDirectory>,
    /// Notification inbox.
    pub sink: Arc<InMemoryNotificationSink<ManualClock>>,
    /// Lifecycle service under test.
    pub service: TestService,
    /// Builder who created the building.
    pub builder: User,
    /// Contractor assigned to every task.
    pub contractor: User,
    /// The project's building.
    pub building: Building,
}

impl Project {
    /// Builds a project on 2 June 2025 for the "Riverside Flats" building.
    ///
    /// # Panics
    ///
    /// Panics when the directory rejects the seeded users.
    #[must_use]
    pub fn new() -> Self {
        let clock = ManualClock::at_date(june(2));
        let repository = Arc::new(InMemoryTaskRepository::new());
        let directory = Arc::new(InMemoryDirectory::new());
        let sink = Arc::new(InMemoryNotificationSink::new(Arc::new(clock.clone())));
        let builder = User::new(UserId::new(), Role::Builder, "Bea Builder", "bea@example.com");
        let contractor = User::new(
            UserId::new(),
            Role::Contractor,
            "Carl Contractor",
            "carl@example.com",
        );
        let building = Building::new(BuildingId::new(), "Riverside Flats", builder.id());
        directory
            .insert_user(builder.clone())
            .expect("builder inserted");
        directory
            .insert_user(contractor.clone())
            .expect("contractor inserted");
        directory
            .insert_building(building.clone())
            .expect("building inserted");
        let service = TaskLifecycleService::new(
            Arc::clone(&repository),
            Arc::clone(&directory),
            Arc::clone(&sink),
            Arc::new(clock.clone()),
        );

        Self {
            clock,
            repository,
            directory,
            sink,
            service,
            builder,
            contractor,
            building,
        }
    }

    /// Returns a scheduler over the project's adapters.
    #[must_use]
    pub fn scheduler(&self) -> TestScheduler {
        DeadlineScheduler::new(
            Arc::clone(&self.repository),
            Arc::clone(&self.directory),
            Arc::clone(&self.sink),
            Arc::new(self.clock.clone()),
        )
    }

    /// Returns a civil-work request running from 2 to `deadline` June.
    #[must_use]
    pub fn request(&self, name: &str, deadline: u32) -> CreateTaskRequest {
        CreateTaskRequest::new(
            name,
            "CIVIL_WORK",
            self.building.id(),
            self.contractor.id(),
            june(2),
            june(deadline),
        )
        .with_priority("HIGH")
    }

    /// Creates a task through the lifecycle service as the builder.
    ///
    /// # Errors
    ///
    /// Returns the lifecycle error when creation fails.
    pub async fn create(&self, name: &str, deadline: u32) -> TaskLifecycleResult<Task> {
        self.service
            .create(self.request(name, deadline), self.builder.id())
            .await
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

/// Provides a fresh project for each test.
#[fixture]
pub fn project() -> Project {
    Project::new()
}
