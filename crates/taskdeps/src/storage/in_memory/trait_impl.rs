//! DependencyStore trait implementation for the in-memory store.

use super::graph::bounded_walk;
use super::{InMemoryStore, LoadWarning};
use crate::domain::{
    DependencyEdge, DependencyId, LinkedDependency, NewDependency, ProjectId, TaskId,
};
use crate::error::Result;
use crate::storage::DependencyStore;
use async_trait::async_trait;
use futures::future::try_join_all;
use petgraph::Direction;
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet};
use tracing::debug;

impl InMemoryStore {
    /// Join each edge with the task on its opposite side.
    ///
    /// Runs after the graph lock is released. Edges whose opposite task no
    /// longer resolves are dropped (inner-join semantics).
    async fn join(&self, edges: Vec<(DependencyEdge, TaskId)>) -> Result<Vec<LinkedDependency>> {
        let lookups = edges.iter().map(|(_, other)| self.tasks.get_task(other));
        let resolved = try_join_all(lookups).await?;

        Ok(edges
            .into_iter()
            .zip(resolved)
            .filter_map(|((edge, other), task)| match task {
                Some(task) => Some(LinkedDependency {
                    edge,
                    task: task.summary(),
                }),
                None => {
                    debug!(task_id = %other, edge_id = %edge.id, "Dropping edge to unknown task");
                    None
                }
            })
            .collect())
    }

    /// Edges touching `task_id` in `direction`, paired with the opposite task id.
    async fn edges_in_direction(
        &self,
        task_id: &TaskId,
        direction: Direction,
    ) -> Vec<(DependencyEdge, TaskId)> {
        let inner = self.inner.lock().await;
        let Some(&node) = inner.node_map.get(task_id) else {
            return Vec::new();
        };

        inner
            .graph
            .edges_directed(node, direction)
            .map(|edge| {
                let other = match direction {
                    Direction::Outgoing => edge.target(),
                    Direction::Incoming => edge.source(),
                };
                (edge.weight().clone(), inner.graph[other].clone())
            })
            .collect()
    }
}

#[async_trait]
impl DependencyStore for InMemoryStore {
    async fn create(
        &self,
        dependency: NewDependency,
        expected_version: Option<u64>,
    ) -> Result<DependencyEdge> {
        let mut inner = self.inner.lock().await;
        let edge = inner.create(dependency, expected_version)?;
        debug!(
            edge_id = %edge.id,
            task_id = %edge.task_id,
            depends_on_task_id = %edge.depends_on_task_id,
            version = inner.version,
            "Stored dependency edge"
        );
        Ok(edge)
    }

    async fn delete(&self, id: &DependencyId) -> Result<bool> {
        let mut inner = self.inner.lock().await;
        Ok(inner.remove_id(id).is_some())
    }

    async fn delete_by_pair(
        &self,
        task_id: &TaskId,
        depends_on_task_id: &TaskId,
    ) -> Result<bool> {
        let mut inner = self.inner.lock().await;
        Ok(inner.remove_pair(task_id, depends_on_task_id).is_some())
    }

    async fn delete_for_task(&self, task_id: &TaskId) -> Result<usize> {
        let mut inner = self.inner.lock().await;
        let Some(&node) = inner.node_map.get(task_id) else {
            return Ok(0);
        };

        let pairs: Vec<(TaskId, TaskId)> = inner
            .graph
            .edges_directed(node, Direction::Outgoing)
            .chain(inner.graph.edges_directed(node, Direction::Incoming))
            .map(|edge| {
                (
                    edge.weight().task_id.clone(),
                    edge.weight().depends_on_task_id.clone(),
                )
            })
            .collect();

        let removed = pairs
            .iter()
            .filter(|(from, to)| inner.remove_pair(from, to).is_some())
            .count();
        Ok(removed)
    }

    async fn get(&self, id: &DependencyId) -> Result<Option<DependencyEdge>> {
        let inner = self.inner.lock().await;
        let Some((task_id, depends_on_task_id)) = inner.edge_ids.get(id) else {
            return Ok(None);
        };
        Ok(inner
            .find_edge(task_id, depends_on_task_id)
            .map(|index| inner.graph[index].clone()))
    }

    async fn exists(&self, task_id: &TaskId, depends_on_task_id: &TaskId) -> Result<bool> {
        let inner = self.inner.lock().await;
        Ok(inner.find_edge(task_id, depends_on_task_id).is_some())
    }

    async fn dependencies_of(&self, task_id: &TaskId) -> Result<Vec<LinkedDependency>> {
        let edges = self.edges_in_direction(task_id, Direction::Outgoing).await;
        self.join(edges).await
    }

    async fn dependents_of(&self, task_id: &TaskId) -> Result<Vec<LinkedDependency>> {
        let edges = self.edges_in_direction(task_id, Direction::Incoming).await;
        self.join(edges).await
    }

    async fn dependencies_of_project(
        &self,
        project_id: &ProjectId,
    ) -> Result<Vec<DependencyEdge>> {
        let edges = self.inner.lock().await.all_edges();

        let mut dependents: Vec<&TaskId> = edges.iter().map(|e| &e.task_id).collect();
        dependents.sort();
        dependents.dedup();

        let resolved = try_join_all(dependents.iter().map(|id| self.tasks.get_task(id))).await?;
        let membership: HashMap<&TaskId, bool> = dependents
            .iter()
            .zip(resolved)
            .map(|(id, task)| (*id, task.is_some_and(|t| &t.project_id == project_id)))
            .collect();

        Ok(edges
            .iter()
            .filter(|edge| membership.get(&edge.task_id).copied().unwrap_or(false))
            .cloned()
            .collect())
    }

    async fn transitive_closure(
        &self,
        task_id: &TaskId,
        max_depth: usize,
    ) -> Result<HashSet<TaskId>> {
        let inner = self.inner.lock().await;
        Ok(bounded_walk(&inner, task_id, max_depth).reached)
    }

    async fn reachable_edges(
        &self,
        task_id: &TaskId,
        max_depth: usize,
    ) -> Result<Vec<(TaskId, TaskId)>> {
        let inner = self.inner.lock().await;
        Ok(bounded_walk(&inner, task_id, max_depth).edges)
    }

    async fn graph_version(&self) -> Result<u64> {
        Ok(self.inner.lock().await.version)
    }

    async fn import_edges(&self, edges: Vec<DependencyEdge>) -> Result<Vec<LoadWarning>> {
        let mut inner = self.inner.lock().await;
        Ok(inner.import(edges))
    }

    async fn export_all(&self) -> Result<Vec<DependencyEdge>> {
        Ok(self.inner.lock().await.all_edges())
    }

    async fn save(&self) -> Result<()> {
        // Nothing to persist; the JSONL backend wraps this store for that
        Ok(())
    }

    async fn reload(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DependencyType, Task, TaskStatus};
    use crate::error::Error;
    use crate::lookup::InMemoryTaskLookup;
    use chrono::{Duration, Utc};
    use std::sync::Arc;

    fn task(id: &str, project: &str) -> Task {
        Task {
            id: TaskId::new(id),
            code: id.to_uppercase(),
            title: format!("Task {}", id),
            status: TaskStatus::Todo,
            project_id: ProjectId::new(project),
        }
    }

    fn store_with(tasks: &[Task]) -> InMemoryStore {
        InMemoryStore::new(Arc::new(InMemoryTaskLookup::with_tasks(tasks.to_vec())))
    }

    fn id(s: &str) -> TaskId {
        TaskId::new(s)
    }

    #[tokio::test]
    async fn test_create_rejects_self_reference() {
        let store = store_with(&[]);
        let result = store.create(NewDependency::blocks("a", "a", "u"), None).await;
        assert!(matches!(result, Err(Error::SelfReference(_))));
        assert!(store.export_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_pair() {
        let store = store_with(&[]);
        store
            .create(NewDependency::blocks("a", "b", "u"), None)
            .await
            .unwrap();

        let again = NewDependency::blocks("a", "b", "u").with_type(DependencyType::RelatesTo);
        let result = store.create(again, None).await;
        assert!(matches!(result, Err(Error::DuplicateDependency { .. })));
        assert_eq!(store.export_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_checks_expected_version() {
        let store = store_with(&[]);
        assert_eq!(store.graph_version().await.unwrap(), 0);

        store
            .create(NewDependency::blocks("a", "b", "u"), Some(0))
            .await
            .unwrap();
        assert_eq!(store.graph_version().await.unwrap(), 1);

        let stale = store
            .create(NewDependency::blocks("c", "d", "u"), Some(0))
            .await;
        assert!(matches!(
            stale,
            Err(Error::VersionConflict {
                expected: 0,
                actual: 1
            })
        ));
        assert!(!store.exists(&id("c"), &id("d")).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_rejects_cycle_without_version() {
        let store = store_with(&[]);
        store
            .create(NewDependency::blocks("a", "b", "u"), None)
            .await
            .unwrap();
        store
            .create(NewDependency::blocks("b", "c", "u"), None)
            .await
            .unwrap();
        let version = store.graph_version().await.unwrap();

        let result = store
            .create(NewDependency::blocks("c", "a", "u"), Some(version))
            .await;

        assert!(matches!(result, Err(Error::CircularDependency { .. })));
        assert!(!store.exists(&id("c"), &id("a")).await.unwrap());
        assert_eq!(store.graph_version().await.unwrap(), version);
    }

    #[tokio::test]
    async fn test_deletes_are_idempotent() {
        let store = store_with(&[]);
        let edge = store
            .create(NewDependency::blocks("a", "b", "u"), None)
            .await
            .unwrap();

        assert!(store.delete(&edge.id).await.unwrap());
        assert!(!store.delete(&edge.id).await.unwrap());
        assert!(!store.delete_by_pair(&id("a"), &id("b")).await.unwrap());
        assert!(store.get(&edge.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_by_pair_then_recreate() {
        let store = store_with(&[]);
        store
            .create(NewDependency::blocks("a", "b", "u"), None)
            .await
            .unwrap();

        assert!(store.delete_by_pair(&id("a"), &id("b")).await.unwrap());
        let recreated = store
            .create(
                NewDependency::blocks("a", "b", "u").with_type(DependencyType::RelatesTo),
                None,
            )
            .await
            .unwrap();
        assert_eq!(recreated.dependency_type, DependencyType::RelatesTo);
    }

    #[tokio::test]
    async fn test_delete_for_task_removes_both_directions() {
        let store = store_with(&[]);
        for (from, to) in [("a", "b"), ("b", "c"), ("d", "b"), ("d", "c")] {
            store
                .create(NewDependency::blocks(from, to, "u"), None)
                .await
                .unwrap();
        }

        assert_eq!(store.delete_for_task(&id("b")).await.unwrap(), 3);
        let remaining = store.export_all().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].task_id, id("d"));
        assert_eq!(store.delete_for_task(&id("zzz")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_dependencies_and_dependents_join_opposite_task() {
        let store = store_with(&[task("a", "p"), task("b", "p"), task("c", "p")]);
        store
            .create(NewDependency::blocks("a", "b", "u"), None)
            .await
            .unwrap();
        store
            .create(NewDependency::blocks("c", "b", "u"), None)
            .await
            .unwrap();

        let deps = store.dependencies_of(&id("a")).await.unwrap();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].task.code, "B");

        let mut dependents: Vec<String> = store
            .dependents_of(&id("b"))
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.task.code)
            .collect();
        dependents.sort();
        assert_eq!(dependents, vec!["A", "C"]);
    }

    #[tokio::test]
    async fn test_join_drops_unknown_tasks() {
        let store = store_with(&[task("a", "p")]);
        store
            .create(NewDependency::blocks("a", "ghost", "u"), None)
            .await
            .unwrap();

        assert!(store.dependencies_of(&id("a")).await.unwrap().is_empty());
        assert!(store.exists(&id("a"), &id("ghost")).await.unwrap());
    }

    #[tokio::test]
    async fn test_dependencies_of_project_filters_on_dependent() {
        let store = store_with(&[task("a", "p1"), task("b", "p1"), task("x", "p2")]);
        store
            .create(NewDependency::blocks("a", "b", "u"), None)
            .await
            .unwrap();
        // Dependent in p2, prerequisite in p1: belongs to p2 only
        store
            .create(NewDependency::blocks("x", "a", "u"), None)
            .await
            .unwrap();

        let p1 = store
            .dependencies_of_project(&ProjectId::new("p1"))
            .await
            .unwrap();
        assert_eq!(p1.len(), 1);
        assert_eq!(p1[0].task_id, id("a"));

        let p2 = store
            .dependencies_of_project(&ProjectId::new("p2"))
            .await
            .unwrap();
        assert_eq!(p2.len(), 1);
        assert_eq!(p2[0].task_id, id("x"));
    }

    #[tokio::test]
    async fn test_transitive_closure_and_reachable_edges() {
        let store = store_with(&[]);
        for (from, to) in [("a", "b"), ("b", "c"), ("x", "a")] {
            store
                .create(NewDependency::blocks(from, to, "u"), None)
                .await
                .unwrap();
        }

        let closure = store.transitive_closure(&id("a"), 100).await.unwrap();
        let expected: HashSet<TaskId> = [id("b"), id("c")].into_iter().collect();
        assert_eq!(closure, expected);

        let edges = store.reachable_edges(&id("a"), 100).await.unwrap();
        assert_eq!(edges, vec![(id("a"), id("b")), (id("b"), id("c"))]);
    }

    #[tokio::test]
    async fn test_import_skips_invalid_edges() {
        let store = store_with(&[]);
        let now = Utc::now();
        let edge = |n: &str, from: &str, to: &str, minutes: i64| DependencyEdge {
            id: DependencyId::new(n),
            task_id: id(from),
            depends_on_task_id: id(to),
            dependency_type: DependencyType::Blocks,
            created_by: "u".to_string(),
            created_at: now + Duration::minutes(minutes),
        };

        let warnings = store
            .import_edges(vec![
                edge("dep-3", "b", "a", 3),
                edge("dep-1", "a", "b", 1),
                edge("dep-2", "a", "b", 2),
                edge("dep-4", "c", "c", 4),
            ])
            .await
            .unwrap();

        assert_eq!(warnings.len(), 3);
        assert!(matches!(warnings[0], LoadWarning::DuplicateDependency { .. }));
        assert!(matches!(warnings[1], LoadWarning::CircularDependency { .. }));
        assert!(matches!(warnings[2], LoadWarning::SelfReference { .. }));

        let edges = store.export_all().await.unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].id, DependencyId::new("dep-1"));
    }
}
