//! Shared world state for task approval BDD scenarios.

use std::sync::Arc;

use rstest::fixture;
use sitework::{
    clock::ManualClock,
    notification::adapters::InMemoryNotificationSink,
    task::{
        adapters::memory::{InMemoryDirectory, InMemoryTaskRepository},
        domain::{Building, Task, User},
        services::{TaskLifecycleError, TaskLifecycleService},
    },
};

/// Service type used by the BDD world.
pub type TestTaskService = TaskLifecycleService<
    InMemoryTaskRepository,
    InMemoryDirectory,
    InMemoryNotificationSink<ManualClock>,
    ManualClock,
>;

/// Scenario world for task approval behaviour tests.
pub struct TaskApprovalWorld {
    pub clock: ManualClock,
    pub repository: Arc<InMemoryTaskRepository>,
    pub directory: Arc<InMemoryDirectory>,
    pub sink: Arc<InMemoryNotificationSink<ManualClock>>,
    pub service: TestTaskService,
    pub builder: Option<User>,
    pub contractor: Option<User>,
    pub building: Option<Building>,
    pub task: Option<Task>,
    pub last_result: Option<Result<Task, TaskLifecycleError>>,
}

impl TaskApprovalWorld {
    /// Creates a world on 1 June 2025 with empty directories.
    #[must_use]
    pub fn new() -> Self {
        let clock = ManualClock::at_date(
            chrono::NaiveDate::from_ymd_opt(2025, 6, 1).unwrap_or_default(),
        );
        let repository = Arc::new(InMemoryTaskRepository::new());
        let directory = Arc::new(InMemoryDirectory::new());
        let sink = Arc::new(InMemoryNotificationSink::new(Arc::new(clock.clone())));
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
            builder: None,
            contractor: None,
            building: None,
            task: None,
            last_result: None,
        }
    }

    /// Returns the scenario task.
    ///
    /// # Errors
    ///
    /// Returns an error when no task has been created yet.
    pub fn task(&self) -> Result<&Task, eyre::Report> {
        self.task
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing task in scenario world"))
    }

    /// Returns the scenario builder.
    ///
    /// # Errors
    ///
    /// Returns an error when no builder has been registered yet.
    pub fn builder(&self) -> Result<&User, eyre::Report> {
        self.builder
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing builder in scenario world"))
    }

    /// Returns the assigned contractor.
    ///
    /// # Errors
    ///
    /// Returns an error when no contractor has been registered yet.
    pub fn contractor(&self) -> Result<&User, eyre::Report> {
        self.contractor
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing contractor in scenario world"))
    }

    /// Records the outcome of a lifecycle operation, keeping the latest
    /// task state on success.
    pub fn record(&mut self, result: Result<Task, TaskLifecycleError>) {
        if let Ok(ref updated) = result {
            self.task = Some(updated.clone());
        }
        self.last_result = Some(result);
    }
}

impl Default for TaskApprovalWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskApprovalWorld {
    TaskApprovalWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
