//! In-memory task repository and audit log for tests and embedding.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::task::{
    domain::{BuildingId, DependencyGraph, Task, TaskId, TaskStatus, TaskUpdate, UserId},
    ports::{
        TaskRepository, TaskRepositoryError, TaskRepositoryResult, TaskUpdateLog, UpdateOrder,
    },
};

/// Thread-safe in-memory task repository.
///
/// Tasks and their audit entries share one lock so that a task write and
/// its audit entry are applied together, and so that dependency checks see
/// the same state the write lands on.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    updates: HashMap<TaskId, Vec<TaskUpdate>>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> TaskRepositoryResult<RwLockReadGuard<'_, InMemoryTaskState>> {
        self.state.read().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> TaskRepositoryResult<RwLockWriteGuard<'_, InMemoryTaskState>> {
        self.state.write().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn select(
        &self,
        predicate: impl Fn(&Task) -> bool,
        sort_key: impl Fn(&Task) -> NaiveDate,
    ) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| predicate(task))
            .cloned()
            .collect();
        tasks.sort_by_key(|task| (sort_key(task), task.created_at(), task.id()));
        Ok(tasks)
    }
}

fn check_revision(stored: &Task, expected: u64) -> TaskRepositoryResult<()> {
    if stored.revision() == expected {
        return Ok(());
    }
    Err(TaskRepositoryError::RevisionConflict {
        task_id: stored.id(),
        expected,
        stored: stored.revision(),
    })
}

impl InMemoryTaskState {
    fn check_dependencies_stored(&self, task: &Task) -> TaskRepositoryResult<()> {
        match task
            .dependencies()
            .iter()
            .find(|dependency| !self.tasks.contains_key(dependency))
        {
            Some(missing) => Err(TaskRepositoryError::MissingDependency {
                task_id: task.id(),
                dependency: *missing,
            }),
            None => Ok(()),
        }
    }

    /// Checks the graph formed by the stored tasks with `task` substituted
    /// for its stored version.
    fn check_acyclic(&self, task: &Task) -> TaskRepositoryResult<()> {
        let graph = DependencyGraph::from_tasks(std::iter::once(task).chain(self.tasks.values()));
        graph
            .find_cycle()
            .map_or(Ok(()), |cycle| Err(TaskRepositoryError::DependencyCycle(cycle)))
    }

    fn count_dependents(&self, id: TaskId) -> usize {
        self.tasks
            .values()
            .filter(|task| task.dependencies().contains(&id))
            .count()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task, audit: &TaskUpdate) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        state.check_dependencies_stored(task)?;
        state.tasks.insert(task.id(), task.clone());
        state
            .updates
            .entry(task.id())
            .or_default()
            .push(audit.clone());
        Ok(())
    }

    async fn update(&self, task: &Task, audit: &TaskUpdate) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        let stored = state
            .tasks
            .get(&task.id())
            .ok_or(TaskRepositoryError::NotFound(task.id()))?;
        check_revision(stored, task.revision().saturating_sub(1))?;
        if stored.dependencies() != task.dependencies() {
            state.check_dependencies_stored(task)?;
            state.check_acyclic(task)?;
        }

        state.tasks.insert(task.id(), task.clone());
        state
            .updates
            .entry(task.id())
            .or_default()
            .push(audit.clone());
        Ok(())
    }

    async fn delete(&self, id: TaskId, expected_revision: u64) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        let stored = state
            .tasks
            .get(&id)
            .ok_or(TaskRepositoryError::NotFound(id))?;
        check_revision(stored, expected_revision)?;
        let dependents = state.count_dependents(id);
        if dependents > 0 {
            return Err(TaskRepositoryError::HasDependents {
                task_id: id,
                dependents,
            });
        }
        // Audit entries outlive the task.
        state.tasks.remove(&id);
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.read()?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[TaskId]) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        Ok(ids
            .iter()
            .filter_map(|id| state.tasks.get(id).cloned())
            .collect())
    }

    async fn find_by_status(&self, status: TaskStatus) -> TaskRepositoryResult<Vec<Task>> {
        self.select(|task| task.status() == status, Task::deadline)
    }

    async fn find_by_deadline_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> TaskRepositoryResult<Vec<Task>> {
        self.select(
            |task| task.deadline() >= from && task.deadline() <= to,
            Task::deadline,
        )
    }

    async fn find_overdue(&self, today: NaiveDate) -> TaskRepositoryResult<Vec<Task>> {
        self.select(
            |task| task.deadline() < today && !task.status().is_done(),
            Task::deadline,
        )
    }

    async fn find_by_contractor(&self, contractor: UserId) -> TaskRepositoryResult<Vec<Task>> {
        self.select(|task| task.contractor_id() == contractor, Task::deadline)
    }

    async fn find_by_building(&self, building: BuildingId) -> TaskRepositoryResult<Vec<Task>> {
        self.select(|task| task.building_id() == building, Task::start_date)
    }

    async fn find_dependents(&self, dependency: TaskId) -> TaskRepositoryResult<Vec<Task>> {
        self.select(
            |task| task.dependencies().contains(&dependency),
            Task::start_date,
        )
    }

    async fn count_by_status(&self, status: TaskStatus) -> TaskRepositoryResult<usize> {
        let state = self.read()?;
        Ok(state
            .tasks
            .values()
            .filter(|task| task.status() == status)
            .count())
    }
}

#[async_trait]
impl TaskUpdateLog for InMemoryTaskRepository {
    async fn append(&self, update: &TaskUpdate) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        if !state.tasks.contains_key(&update.task_id()) {
            return Err(TaskRepositoryError::NotFound(update.task_id()));
        }
        state
            .updates
            .entry(update.task_id())
            .or_default()
            .push(update.clone());
        Ok(())
    }

    async fn find_by_task(
        &self,
        task_id: TaskId,
        order: UpdateOrder,
    ) -> TaskRepositoryResult<Vec<TaskUpdate>> {
        let state = self.read()?;
        let mut entries = state.updates.get(&task_id).cloned().unwrap_or_default();
        // Entries are kept in append order, which ties break on.
        if order == UpdateOrder::NewestFirst {
            entries.reverse();
        }
        Ok(entries)
    }
}
