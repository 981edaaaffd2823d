//! Dependency gating and dependency graph checks.
//!
//! [`DependencyResolver`] answers whether a task may start given the current
//! state of its dependencies. [`DependencyGraph`] holds tasks in an arena with
//! an index-based edge list and detects cycles and scheduling conflicts.

use super::{Task, TaskDomainError, TaskId};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Pure start-eligibility rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct DependencyResolver;

impl DependencyResolver {
    /// Returns `true` when every dependency of `task` is completed or
    /// approved.
    ///
    /// `dependencies` is the resolved set; a dependency identifier with no
    /// matching entry counts as unsatisfied.
    #[must_use]
    pub fn can_start(task: &Task, dependencies: &[Task]) -> bool {
        Self::pending(task, dependencies).is_empty()
    }

    /// Returns the dependency identifiers that are not yet satisfied.
    #[must_use]
    pub fn pending(task: &Task, dependencies: &[Task]) -> Vec<TaskId> {
        task.dependencies()
            .iter()
            .copied()
            .filter(|dependency_id| {
                !dependencies.iter().any(|candidate| {
                    candidate.id() == *dependency_id && candidate.status().satisfies_dependency()
                })
            })
            .collect()
    }
}

/// A dependency whose deadline falls after the dependent task's start date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemporalConflict {
    /// Task that waits on the dependency.
    pub task_id: TaskId,
    /// Planned start of the waiting task.
    pub task_start: NaiveDate,
    /// Dependency finishing too late.
    pub dependency_id: TaskId,
    /// Deadline of the dependency.
    pub dependency_deadline: NaiveDate,
}

#[derive(Debug, Clone, Copy)]
struct Node {
    id: TaskId,
    start_date: NaiveDate,
    deadline: NaiveDate,
}

/// Arena-backed directed graph of task dependencies.
///
/// Edges point from a task to each of its dependencies. Dependencies that
/// are not part of the arena are ignored.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: Vec<Node>,
    index: HashMap<TaskId, usize>,
    edges: Vec<Vec<usize>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

impl DependencyGraph {
    /// Builds a graph from the given tasks.
    #[must_use]
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut graph = Self::default();
        let mut pending_edges = Vec::new();
        for task in tasks {
            if graph.index.contains_key(&task.id()) {
                continue;
            }
            let slot = graph.nodes.len();
            graph.index.insert(task.id(), slot);
            graph.nodes.push(Node {
                id: task.id(),
                start_date: task.start_date(),
                deadline: task.deadline(),
            });
            graph.edges.push(Vec::new());
            pending_edges.push((slot, task.dependencies().to_vec()));
        }

        for (slot, dependencies) in pending_edges {
            let targets = dependencies
                .iter()
                .filter_map(|dependency| graph.index.get(dependency).copied())
                .collect();
            if let Some(edges) = graph.edges.get_mut(slot) {
                *edges = targets;
            }
        }
        graph
    }

    /// Returns the number of tasks in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` when the arena holds no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Finds one dependency cycle, returned as the task path that closes it
    /// (first and last element are the same task).
    #[must_use]
    pub fn find_cycle(&self) -> Option<Vec<TaskId>> {
        let mut marks = vec![Mark::Unvisited; self.nodes.len()];
        for root in 0..self.nodes.len() {
            if marks.get(root) == Some(&Mark::Unvisited) {
                if let Some(cycle) = self.visit_from(root, &mut marks) {
                    return Some(cycle);
                }
            }
        }
        None
    }

    /// Fails with [`TaskDomainError::DependencyCycle`] when the graph is not
    /// acyclic.
    ///
    /// # Errors
    ///
    /// Returns the detected cycle.
    pub fn ensure_acyclic(&self) -> Result<(), TaskDomainError> {
        self.find_cycle()
            .map_or(Ok(()), |cycle| Err(TaskDomainError::DependencyCycle(cycle)))
    }

    /// Lists dependencies whose deadline is later than the dependent task's
    /// start date.
    #[must_use]
    pub fn temporal_conflicts(&self) -> Vec<TemporalConflict> {
        self.nodes
            .iter()
            .zip(&self.edges)
            .flat_map(|(node, targets)| {
                targets
                    .iter()
                    .filter_map(|target| self.nodes.get(*target))
                    .filter(|dependency| dependency.deadline > node.start_date)
                    .map(|dependency| TemporalConflict {
                        task_id: node.id,
                        task_start: node.start_date,
                        dependency_id: dependency.id,
                        dependency_deadline: dependency.deadline,
                    })
            })
            .collect()
    }

    /// Iterative depth-first search with an explicit stack so deep chains do
    /// not exhaust the call stack.
    fn visit_from(&self, root: usize, marks: &mut [Mark]) -> Option<Vec<TaskId>> {
        let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
        set_mark(marks, root, Mark::OnStack);

        while let Some(frame) = stack.last_mut() {
            let (slot, next_edge) = *frame;
            frame.1 = next_edge + 1;
            let targets = self.edges.get(slot).map_or(&[][..], Vec::as_slice);
            if let Some(&target) = targets.get(next_edge) {
                match marks.get(target).copied() {
                    Some(Mark::Unvisited) => {
                        set_mark(marks, target, Mark::OnStack);
                        stack.push((target, 0));
                    }
                    Some(Mark::OnStack) => return Some(self.cycle_path(&stack, target)),
                    _ => {}
                }
            } else {
                set_mark(marks, slot, Mark::Done);
                stack.pop();
            }
        }
        None
    }

    fn cycle_path(&self, stack: &[(usize, usize)], closing: usize) -> Vec<TaskId> {
        let start = stack
            .iter()
            .position(|(slot, _)| *slot == closing)
            .unwrap_or_default();
        stack
            .iter()
            .skip(start)
            .map(|(slot, _)| *slot)
            .chain(std::iter::once(closing))
            .filter_map(|slot| self.nodes.get(slot).map(|node| node.id))
            .collect()
    }
}

fn set_mark(marks: &mut [Mark], slot: usize, mark: Mark) {
    if let Some(entry) = marks.get_mut(slot) {
        *entry = mark;
    }
}
