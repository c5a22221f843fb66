//! Read-only task resolution.
//!
//! Tasks are owned by another part of the portal. The dependency engine only
//! needs to resolve an id to its code, title, status and project, which is
//! what [`TaskLookup`] provides.
//!
//! [`InMemoryTaskLookup`] is the reference implementation used by the CLI
//! (loaded from `tasks.jsonl`) and by tests. Its mutators stand in for the
//! task owner; the engine itself never calls them.

use crate::domain::{Task, TaskId, TaskStatus};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Resolves task ids to tasks.
///
/// Implementations must be side-effect free with respect to the dependency
/// engine. A missing task is `Ok(None)`; `Err` is reserved for lookup
/// infrastructure failures (timeouts, unavailable backend).
#[async_trait]
pub trait TaskLookup: Send + Sync {
    /// Resolve a task by id
    async fn get_task(&self, id: &TaskId) -> Result<Option<Task>>;
}

/// Thread-safe in-memory task table.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskLookup {
    tasks: Arc<RwLock<HashMap<TaskId, Task>>>,
}

impl InMemoryTaskLookup {
    /// Create an empty lookup
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a lookup pre-populated with `tasks`
    pub fn with_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let map = tasks.into_iter().map(|t| (t.id.clone(), t)).collect();
        Self {
            tasks: Arc::new(RwLock::new(map)),
        }
    }

    /// Insert or replace a task
    pub async fn insert(&self, task: Task) {
        self.tasks.write().await.insert(task.id.clone(), task);
    }

    /// Change a task's status, returning false if the task is unknown
    pub async fn set_status(&self, id: &TaskId, status: TaskStatus) -> bool {
        match self.tasks.write().await.get_mut(id) {
            Some(task) => {
                task.status = status;
                true
            }
            None => false,
        }
    }

    /// Remove a task, returning it if present
    pub async fn remove(&self, id: &TaskId) -> Option<Task> {
        self.tasks.write().await.remove(id)
    }

    /// Number of known tasks
    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }

    /// Whether no tasks are known
    pub async fn is_empty(&self) -> bool {
        self.tasks.read().await.is_empty()
    }
}

#[async_trait]
impl TaskLookup for InMemoryTaskLookup {
    async fn get_task(&self, id: &TaskId) -> Result<Option<Task>> {
        Ok(self.tasks.read().await.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProjectId;

    fn task(id: &str) -> Task {
        Task {
            id: TaskId::new(id),
            code: id.to_uppercase(),
            title: format!("Task {}", id),
            status: TaskStatus::Todo,
            project_id: ProjectId::new("p1"),
        }
    }

    #[tokio::test]
    async fn test_get_task_resolves_known_ids() {
        let lookup = InMemoryTaskLookup::with_tasks([task("a")]);

        let found = lookup.get_task(&TaskId::new("a")).await.unwrap();
        assert_eq!(found.unwrap().code, "A");

        let missing = lookup.get_task(&TaskId::new("zzz")).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_set_status_is_visible_immediately() {
        let lookup = InMemoryTaskLookup::with_tasks([task("a")]);

        assert!(lookup.set_status(&TaskId::new("a"), TaskStatus::Done).await);
        let found = lookup.get_task(&TaskId::new("a")).await.unwrap().unwrap();
        assert_eq!(found.status, TaskStatus::Done);

        assert!(!lookup.set_status(&TaskId::new("b"), TaskStatus::Done).await);
    }

    #[tokio::test]
    async fn test_remove_task() {
        let lookup = InMemoryTaskLookup::with_tasks([task("a"), task("b")]);
        assert_eq!(lookup.len().await, 2);

        assert!(lookup.remove(&TaskId::new("a")).await.is_some());
        assert!(lookup.remove(&TaskId::new("a")).await.is_none());
        assert_eq!(lookup.len().await, 1);
    }
}
