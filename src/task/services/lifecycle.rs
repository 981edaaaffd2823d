//! Service layer for the task lifecycle: creation, progress, completion,
//! review, status changes, deletion and audit notes.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use mockable::Clock;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::authorization::{AuthorizationDenial, TaskAction, authorize};
use super::request::{CreateTaskRequest, NoteRequest};
use crate::notification::{
    domain::NotificationRequest, ports::NotificationSink, services::NotificationComposer,
    services::NotificationTemplateError,
};
use crate::task::{
    domain::{
        Building, BuildingId, DependencyGraph, DependencyResolver, ParsePriorityError,
        ParseTaskTypeError, ParseUpdateTypeError, Priority, Progress, Role, Task, TaskDomainError,
        TaskDraft, TaskId, TaskStatus, TaskType, TaskUpdate, UpdateType, User, UserId,
    },
    ports::{
        BuildingDirectory, DirectoryError, TaskRepository, TaskRepositoryError, TaskUpdateLog,
        UpdateOrder, UserDirectory,
    },
};

/// Lifecycle policy switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LifecycleConfig {
    /// Refuse to start or complete a task while any dependency is neither
    /// completed nor approved.
    pub enforce_dependencies: bool,
}

/// Entity a lifecycle operation could not find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingEntity {
    /// The task itself.
    Task(TaskId),
    /// A task named as a dependency.
    Dependency(TaskId),
    /// The task's building.
    Building(BuildingId),
    /// The acting user or the contractor.
    User(UserId),
}

impl fmt::Display for MissingEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Task(id) => write!(f, "task {id}"),
            Self::Dependency(id) => write!(f, "dependency task {id}"),
            Self::Building(id) => write!(f, "building {id}"),
            Self::User(id) => write!(f, "user {id}"),
        }
    }
}

/// Coarse classification of lifecycle failures for callers rendering
/// feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input.
    Validation,
    /// A referenced entity does not exist.
    NotFound,
    /// The actor's role or ownership does not permit the operation.
    Authorization,
    /// The operation does not fit the task's current state.
    StateConflict,
    /// A collaborator failed unexpectedly.
    Internal,
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Domain validation or a state rule failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Unknown task type.
    #[error(transparent)]
    TaskType(#[from] ParseTaskTypeError),
    /// Unknown priority.
    #[error(transparent)]
    Priority(#[from] ParsePriorityError),
    /// Unknown update type.
    #[error(transparent)]
    UpdateType(#[from] ParseUpdateTypeError),
    /// The user named as contractor does not hold the contractor role.
    #[error("user {0} is not a contractor")]
    NotAContractor(UserId),
    /// A referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(MissingEntity),
    /// The actor may not perform the operation.
    #[error(transparent)]
    Unauthorized(#[from] AuthorizationDenial),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(TaskRepositoryError),
    /// Directory lookup failed.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    /// Notification copy could not be rendered.
    #[error(transparent)]
    Template(#[from] NotificationTemplateError),
}

impl TaskLifecycleError {
    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(err) => match err {
                TaskDomainError::InvalidStateTransition { .. }
                | TaskDomainError::NotDeletable { .. }
                | TaskDomainError::HasDependents { .. }
                | TaskDomainError::DependenciesUnsatisfied { .. }
                | TaskDomainError::TerminalTask { .. } => ErrorKind::StateConflict,
                _ => ErrorKind::Validation,
            },
            Self::TaskType(_) | Self::Priority(_) | Self::UpdateType(_) | Self::NotAContractor(_) => {
                ErrorKind::Validation
            }
            Self::NotFound(_)
            | Self::Repository(
                TaskRepositoryError::NotFound(_) | TaskRepositoryError::MissingDependency { .. },
            ) => ErrorKind::NotFound,
            Self::Unauthorized(_) => ErrorKind::Authorization,
            Self::Repository(TaskRepositoryError::DependencyCycle(_)) => ErrorKind::Validation,
            Self::Repository(
                TaskRepositoryError::RevisionConflict { .. }
                | TaskRepositoryError::DuplicateTask(_)
                | TaskRepositoryError::HasDependents { .. },
            ) => ErrorKind::StateConflict,
            Self::Repository(TaskRepositoryError::Persistence(_))
            | Self::Directory(_)
            | Self::Template(_) => ErrorKind::Internal,
        }
    }
}

impl From<TaskRepositoryError> for TaskLifecycleError {
    /// Integrity failures detected at write time surface as the same errors
    /// the service reports when it catches them first.
    fn from(err: TaskRepositoryError) -> Self {
        match err {
            TaskRepositoryError::MissingDependency { dependency, .. } => {
                Self::NotFound(MissingEntity::Dependency(dependency))
            }
            TaskRepositoryError::DependencyCycle(cycle) => {
                Self::Domain(TaskDomainError::DependencyCycle(cycle))
            }
            TaskRepositoryError::HasDependents {
                task_id,
                dependents,
            } => Self::Domain(TaskDomainError::HasDependents {
                task_id,
                dependents,
            }),
            other => Self::Repository(other),
        }
    }
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// A loaded task together with the acting user and the task's building.
struct Scope {
    task: Task,
    actor: User,
    building: Building,
}

/// Task lifecycle orchestration service.
///
/// Every mutating operation reads the task, checks the actor against the
/// authorization policy, applies the domain transition and writes the task
/// together with one audit entry. Notification copy is rendered before the
/// write and delivered after it; a delivery failure is logged and does not
/// undo the transition.
#[derive(Clone)]
pub struct TaskLifecycleService<R, D, N, C>
where
    R: TaskRepository + TaskUpdateLog,
    D: UserDirectory + BuildingDirectory,
    N: NotificationSink,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    directory: Arc<D>,
    notifications: Arc<N>,
    clock: Arc<C>,
    composer: NotificationComposer,
    config: LifecycleConfig,
}

impl<R, D, N, C> TaskLifecycleService<R, D, N, C>
where
    R: TaskRepository + TaskUpdateLog,
    D: UserDirectory + BuildingDirectory,
    N: NotificationSink,
    C: Clock + Send + Sync,
{
    /// Creates a lifecycle service with the default configuration.
    #[must_use]
    pub fn new(repository: Arc<R>, directory: Arc<D>, notifications: Arc<N>, clock: Arc<C>) -> Self {
        Self {
            repository,
            directory,
            notifications,
            clock,
            composer: NotificationComposer::new(),
            config: LifecycleConfig::default(),
        }
    }

    /// Replaces the lifecycle configuration.
    #[must_use]
    pub const fn with_config(mut self, config: LifecycleConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> LifecycleConfig {
        self.config
    }

    /// Creates a task in a building the actor owns and assigns it to a
    /// contractor.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the building, contractor or a
    /// dependency is missing, the actor does not own the building, the
    /// contractor lacks the contractor role, the type or priority is unknown,
    /// or persistence fails.
    pub async fn create(
        &self,
        request: CreateTaskRequest,
        actor_id: UserId,
    ) -> TaskLifecycleResult<Task> {
        let actor = self.load_user(actor_id).await?;
        let building = self.load_building(request.building_id).await?;
        authorize(TaskAction::Create, &actor, &building, None)?;

        let contractor = self.load_user(request.contractor_id).await?;
        if contractor.role() != Role::Contractor {
            return Err(TaskLifecycleError::NotAContractor(contractor.id()));
        }
        let task_type = TaskType::try_from(request.task_type.as_str())?;
        let priority = Priority::try_from(request.priority.as_str())?;
        let dependencies = self.load_dependencies(&request.dependencies).await?;

        let task = Task::new(
            TaskDraft {
                name: request.name,
                description: request.description,
                task_type,
                priority,
                building_id: building.id(),
                contractor_id: contractor.id(),
                created_by: actor.id(),
                start_date: request.start_date,
                deadline: request.deadline,
                estimated_duration_days: request.estimated_duration_days,
                dependencies: request.dependencies,
            },
            &*self.clock,
        )?;
        check_graph(&task, &dependencies)?;

        let audit = self.audit(
            &task,
            &actor,
            UpdateType::StatusChange,
            "Task created and assigned to contractor",
        );
        let notification = self.composer.task_assigned(&task, &building)?;
        self.repository.store(&task, &audit).await?;
        info!(
            task_id = %task.id(),
            building_id = %building.id(),
            contractor_id = %contractor.id(),
            "task created"
        );
        self.deliver(notification).await;
        Ok(task)
    }

    /// Records contractor progress, starting an assigned task when the
    /// percentage is positive.
    ///
    /// Blank notes are replaced by a message describing the change.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the task is missing, the actor is
    /// not the assigned contractor, the percentage is outside 0 to 100, the
    /// task is terminal, dependencies are unsatisfied under enforcement, or
    /// the write conflicts with a concurrent change.
    pub async fn update_progress(
        &self,
        task_id: TaskId,
        percentage: i32,
        notes: Option<&str>,
        actor_id: UserId,
    ) -> TaskLifecycleResult<Task> {
        let Scope { mut task, actor, .. } =
            self.scope(task_id, actor_id, TaskAction::UpdateProgress).await?;
        let progress = Progress::new(percentage)?;
        if !progress.is_zero() && task.status() == TaskStatus::Assigned {
            self.ensure_dependencies_met(&task).await?;
        }

        let previous = task.progress();
        let started = task.record_progress(progress, &*self.clock)?;
        let message = non_blank(notes)
            .unwrap_or_else(|| format!("Progress updated from {previous} to {progress}"));
        let audit = self
            .audit(&task, &actor, UpdateType::ProgressUpdate, message)
            .with_progress(progress);
        self.repository.update(&task, &audit).await?;
        info!(
            task_id = %task.id(),
            actor = %actor.id(),
            progress = progress.value(),
            started,
            "task progress updated"
        );
        Ok(task)
    }

    /// Marks a task complete and asks the building's reviewer for approval.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the task is missing, the actor is
    /// not the assigned contractor, the task is neither assigned nor in
    /// progress, dependencies are unsatisfied under enforcement, or
    /// persistence fails.
    pub async fn mark_completed(
        &self,
        task_id: TaskId,
        completion_notes: Option<&str>,
        actor_id: UserId,
    ) -> TaskLifecycleResult<Task> {
        let Scope {
            mut task,
            actor,
            building,
        } = self.scope(task_id, actor_id, TaskAction::MarkCompleted).await?;
        self.ensure_dependencies_met(&task).await?;

        task.complete(non_blank(completion_notes), &*self.clock)?;
        let audit = self
            .audit(
                &task,
                &actor,
                UpdateType::CompletionRequest,
                "Task marked as completed, awaiting approval",
            )
            .with_progress(task.progress());
        let notification = self.composer.approval_request(&task, &building, &actor)?;
        self.repository.update(&task, &audit).await?;
        info!(task_id = %task.id(), actor = %actor.id(), "task completed, awaiting approval");
        self.deliver(notification).await;
        Ok(task)
    }

    /// Approves completed work.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the task is missing, the actor
    /// did not create the building, the task is not completed, or
    /// persistence fails.
    pub async fn approve(&self, task_id: TaskId, actor_id: UserId) -> TaskLifecycleResult<Task> {
        let Scope { mut task, actor, .. } =
            self.scope(task_id, actor_id, TaskAction::Approve).await?;

        task.approve(actor.id(), &*self.clock)?;
        let audit = self.audit(
            &task,
            &actor,
            UpdateType::StatusChange,
            format!("Task approved by {}", actor.full_name()),
        );
        let notification = self.composer.task_approved(&task, &actor)?;
        self.repository.update(&task, &audit).await?;
        info!(task_id = %task.id(), actor = %actor.id(), "task approved");
        self.deliver(notification).await;
        Ok(task)
    }

    /// Rejects completed work, returning it for rework at 90%.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the task is missing, the actor
    /// did not create the building, the task is not completed, the reason is
    /// blank, or persistence fails.
    pub async fn reject(
        &self,
        task_id: TaskId,
        reason: &str,
        actor_id: UserId,
    ) -> TaskLifecycleResult<Task> {
        let Scope { mut task, actor, .. } =
            self.scope(task_id, actor_id, TaskAction::Reject).await?;

        task.reject(actor.id(), reason, &*self.clock)?;
        let audit = self
            .audit(
                &task,
                &actor,
                UpdateType::StatusChange,
                format!("Task rejected: {}", task.rejection_reason().unwrap_or_default()),
            )
            .with_progress(task.progress());
        let notification = self.composer.task_rejected(&task, &actor)?;
        self.repository.update(&task, &audit).await?;
        info!(task_id = %task.id(), actor = %actor.id(), "task rejected");
        self.deliver(notification).await;
        Ok(task)
    }

    /// Pauses, resumes or cancels work on behalf of the assigned contractor.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the task is missing, the actor is
    /// not the assigned contractor, the target status is reserved for another
    /// operation or not reachable, dependencies are unsatisfied under
    /// enforcement, or persistence fails.
    pub async fn update_status(
        &self,
        task_id: TaskId,
        status: TaskStatus,
        actor_id: UserId,
    ) -> TaskLifecycleResult<Task> {
        let Scope { mut task, actor, .. } =
            self.scope(task_id, actor_id, TaskAction::UpdateStatus).await?;
        if status == TaskStatus::InProgress {
            self.ensure_dependencies_met(&task).await?;
        }

        let previous = task.status();
        task.change_status(status, &*self.clock)?;
        let audit = self.audit(
            &task,
            &actor,
            UpdateType::StatusChange,
            format!("Status changed from {previous} to {status}"),
        );
        self.repository.update(&task, &audit).await?;
        info!(
            task_id = %task.id(),
            actor = %actor.id(),
            from = %previous,
            to = %status,
            "task status changed"
        );
        Ok(task)
    }

    /// Deletes a task that has no recorded work and no dependents.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the task is missing, the actor
    /// did not create the building, work has been recorded, another task
    /// depends on it, or persistence fails.
    pub async fn delete(&self, task_id: TaskId, actor_id: UserId) -> TaskLifecycleResult<()> {
        let Scope { task, actor, .. } = self.scope(task_id, actor_id, TaskAction::Delete).await?;
        task.ensure_deletable()?;
        let dependents = self.repository.find_dependents(task.id()).await?;
        if !dependents.is_empty() {
            return Err(TaskDomainError::HasDependents {
                task_id: task.id(),
                dependents: dependents.len(),
            }
            .into());
        }

        self.repository.delete(task.id(), task.revision()).await?;
        info!(task_id = %task.id(), actor = %actor.id(), "task deleted");
        Ok(())
    }

    /// Appends a manual audit entry such as an issue report or time log.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the task is missing, the actor is
    /// neither the assigned contractor nor the building's creator, the update
    /// type is unknown or reserved for transitions, the message is blank, or
    /// persistence fails.
    pub async fn add_note(
        &self,
        task_id: TaskId,
        note: NoteRequest,
        actor_id: UserId,
    ) -> TaskLifecycleResult<TaskUpdate> {
        let Scope { task, actor, .. } = self.scope(task_id, actor_id, TaskAction::AddNote).await?;
        let update_type = UpdateType::try_from(note.update_type.as_str())?;
        if update_type.is_lifecycle_only() {
            return Err(TaskDomainError::ReservedUpdateType(update_type).into());
        }
        let message = non_blank(Some(note.message.as_str())).ok_or(TaskDomainError::EmptyUpdateMessage)?;

        let update = self
            .audit(&task, &actor, update_type, message)
            .with_image_refs(note.image_refs);
        self.repository.append(&update).await?;
        info!(
            task_id = %task.id(),
            actor = %actor.id(),
            update_type = %update_type,
            "task update added"
        );
        Ok(update)
    }

    /// Lists the audit trail of a task, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the task is missing, the actor
    /// may not view it, or the lookup fails.
    pub async fn list_updates(
        &self,
        task_id: TaskId,
        actor_id: UserId,
    ) -> TaskLifecycleResult<Vec<TaskUpdate>> {
        let Scope { task, .. } = self.scope(task_id, actor_id, TaskAction::View).await?;
        Ok(self
            .repository
            .find_by_task(task.id(), UpdateOrder::NewestFirst)
            .await?)
    }

    /// Replaces the dependency set of a task, keeping the dependency graph
    /// acyclic.
    ///
    /// Dependencies whose deadline falls after the task's start date are
    /// logged but accepted.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the task or a dependency is
    /// missing, the actor did not create the building, the task is terminal,
    /// the set references the task itself or closes a cycle, or persistence
    /// fails.
    pub async fn replace_dependencies(
        &self,
        task_id: TaskId,
        dependencies: Vec<TaskId>,
        actor_id: UserId,
    ) -> TaskLifecycleResult<Task> {
        let Scope { mut task, actor, .. } = self
            .scope(task_id, actor_id, TaskAction::ReplaceDependencies)
            .await?;

        task.replace_dependencies(dependencies, &*self.clock)?;
        self.load_dependencies(task.dependencies()).await?;
        let reachable = self.reachable_dependencies(&task).await?;
        check_graph(&task, &reachable)?;

        let audit = self.audit(
            &task,
            &actor,
            UpdateType::AdminNote,
            format!("Dependencies updated: {} task(s)", task.dependencies().len()),
        );
        self.repository.update(&task, &audit).await?;
        info!(
            task_id = %task.id(),
            actor = %actor.id(),
            dependencies = task.dependencies().len(),
            "task dependencies replaced"
        );
        Ok(task)
    }

    /// Returns a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for an unknown task.
    pub async fn get_task(&self, task_id: TaskId) -> TaskLifecycleResult<Task> {
        self.load_task(task_id).await
    }

    /// Returns every task assigned to a contractor, earliest deadline first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn tasks_for_contractor(&self, contractor: UserId) -> TaskLifecycleResult<Vec<Task>> {
        Ok(self.repository.find_by_contractor(contractor).await?)
    }

    /// Returns the assigned and in-progress tasks of a contractor.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn active_tasks_for_contractor(
        &self,
        contractor: UserId,
    ) -> TaskLifecycleResult<Vec<Task>> {
        let mut tasks = self.repository.find_by_contractor(contractor).await?;
        tasks.retain(|task| task.status().is_active());
        Ok(tasks)
    }

    /// Returns the tasks of a building, earliest start first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn tasks_for_building(&self, building: BuildingId) -> TaskLifecycleResult<Vec<Task>> {
        Ok(self.repository.find_by_building(building).await?)
    }

    /// Returns tasks awaiting review.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn tasks_pending_approval(&self) -> TaskLifecycleResult<Vec<Task>> {
        Ok(self.repository.find_by_status(TaskStatus::Completed).await?)
    }

    /// Returns tasks past their deadline that are not done.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn overdue_tasks(&self) -> TaskLifecycleResult<Vec<Task>> {
        Ok(self.repository.find_overdue(self.today()).await?)
    }

    /// Returns whether a task is overdue today.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for an unknown task.
    pub async fn is_overdue(&self, task_id: TaskId) -> TaskLifecycleResult<bool> {
        Ok(self.load_task(task_id).await?.is_overdue(self.today()))
    }

    /// Returns signed whole days until a task's deadline.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for an unknown task.
    pub async fn days_until_deadline(&self, task_id: TaskId) -> TaskLifecycleResult<i64> {
        Ok(self.load_task(task_id).await?.days_until_deadline(self.today()))
    }

    /// Returns how many days a task is overdue, or zero.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for an unknown task.
    pub async fn days_overdue(&self, task_id: TaskId) -> TaskLifecycleResult<i64> {
        Ok(self.load_task(task_id).await?.days_overdue(self.today()))
    }

    /// Returns whether every dependency of a task is completed or approved.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] for an unknown task or a failed lookup.
    pub async fn can_start(&self, task_id: TaskId) -> TaskLifecycleResult<bool> {
        let task = self.load_task(task_id).await?;
        let dependencies = self.repository.find_by_ids(task.dependencies()).await?;
        Ok(DependencyResolver::can_start(&task, &dependencies))
    }

    /// Counts tasks in a status.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn count_by_status(&self, status: TaskStatus) -> TaskLifecycleResult<usize> {
        Ok(self.repository.count_by_status(status).await?)
    }

    async fn scope(
        &self,
        task_id: TaskId,
        actor_id: UserId,
        action: TaskAction,
    ) -> TaskLifecycleResult<Scope> {
        let task = self.load_task(task_id).await?;
        let actor = self.load_user(actor_id).await?;
        let building = self.load_building(task.building_id()).await?;
        authorize(action, &actor, &building, Some(&task))?;
        Ok(Scope {
            task,
            actor,
            building,
        })
    }

    async fn load_task(&self, id: TaskId) -> TaskLifecycleResult<Task> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(TaskLifecycleError::NotFound(MissingEntity::Task(id)))
    }

    async fn load_user(&self, id: UserId) -> TaskLifecycleResult<User> {
        self.directory
            .find_user(id)
            .await?
            .ok_or(TaskLifecycleError::NotFound(MissingEntity::User(id)))
    }

    async fn load_building(&self, id: BuildingId) -> TaskLifecycleResult<Building> {
        self.directory
            .find_building(id)
            .await?
            .ok_or(TaskLifecycleError::NotFound(MissingEntity::Building(id)))
    }

    async fn load_dependencies(&self, ids: &[TaskId]) -> TaskLifecycleResult<Vec<Task>> {
        let found = self.repository.find_by_ids(ids).await?;
        let known: HashSet<TaskId> = found.iter().map(Task::id).collect();
        if let Some(missing) = ids.iter().find(|id| !known.contains(id)) {
            return Err(TaskLifecycleError::NotFound(MissingEntity::Dependency(
                *missing,
            )));
        }
        Ok(found)
    }

    /// Collects every stored task reachable from `task` through dependency
    /// edges.
    async fn reachable_dependencies(&self, task: &Task) -> TaskLifecycleResult<Vec<Task>> {
        let mut seen: HashSet<TaskId> = HashSet::from([task.id()]);
        let mut reachable = Vec::new();
        let mut frontier: Vec<TaskId> = task.dependencies().to_vec();
        frontier.retain(|id| seen.insert(*id));

        while !frontier.is_empty() {
            let batch = self.repository.find_by_ids(&frontier).await?;
            frontier = batch
                .iter()
                .flat_map(|found| found.dependencies().iter().copied())
                .filter(|id| seen.insert(*id))
                .collect();
            reachable.extend(batch);
        }
        Ok(reachable)
    }

    async fn ensure_dependencies_met(&self, task: &Task) -> TaskLifecycleResult<()> {
        if !self.config.enforce_dependencies || task.dependencies().is_empty() {
            return Ok(());
        }
        let dependencies = self.repository.find_by_ids(task.dependencies()).await?;
        let pending = DependencyResolver::pending(task, &dependencies);
        if pending.is_empty() {
            return Ok(());
        }
        Err(TaskDomainError::DependenciesUnsatisfied {
            task_id: task.id(),
            pending: pending.len(),
        }
        .into())
    }

    fn audit(
        &self,
        task: &Task,
        actor: &User,
        update_type: UpdateType,
        message: impl Into<String>,
    ) -> TaskUpdate {
        TaskUpdate::record(task.id(), actor.id(), update_type, message, &*self.clock)
    }

    async fn deliver(&self, request: NotificationRequest) {
        let kind = request.kind;
        let recipient = request.recipient;
        match self.notifications.create(request).await {
            Ok(id) => debug!(notification_id = %id, %kind, %recipient, "notification created"),
            Err(err) => warn!(%kind, %recipient, error = %err, "notification delivery failed"),
        }
    }

    fn today(&self) -> chrono::NaiveDate {
        self.clock.utc().date_naive()
    }
}

/// Rejects dependency cycles and logs dependencies finishing after the
/// task's start.
fn check_graph(task: &Task, dependencies: &[Task]) -> Result<(), TaskDomainError> {
    let graph = DependencyGraph::from_tasks(std::iter::once(task).chain(dependencies));
    graph.ensure_acyclic()?;
    for conflict in graph
        .temporal_conflicts()
        .into_iter()
        .filter(|conflict| conflict.task_id == task.id())
    {
        warn!(
            task_id = %conflict.task_id,
            dependency_id = %conflict.dependency_id,
            task_start = %conflict.task_start,
            dependency_deadline = %conflict.dependency_deadline,
            "dependency is due after the task starts"
        );
    }
    Ok(())
}

fn non_blank(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(str::to_owned)
}
