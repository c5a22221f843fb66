//! Storage abstraction for dependency edges.
//!
//! This module provides the core [`DependencyStore`] trait and a factory for
//! creating storage backends:
//!
//! - **In-memory**: fast, ephemeral storage backed by petgraph
//! - **JSONL**: the in-memory store plus atomic file persistence
//!
//! # Architecture
//!
//! The trait is async and object-safe so callers hold an
//! `Arc<dyn DependencyStore>` regardless of backend. Methods take `&self`:
//! the store is shared by concurrent callers and synchronizes internally.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use taskdeps::domain::NewDependency;
//! use taskdeps::lookup::InMemoryTaskLookup;
//! use taskdeps::storage::{StorageBackend, create_storage};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let tasks = Arc::new(InMemoryTaskLookup::new());
//!     let store = create_storage(StorageBackend::InMemory, tasks).await?;
//!
//!     let edge = store
//!         .create(NewDependency::blocks("build", "design", "alice"), None)
//!         .await?;
//!     println!("Created edge: {}", edge.id);
//!
//!     Ok(())
//! }
//! ```

use crate::domain::{
    DependencyEdge, DependencyId, LinkedDependency, NewDependency, ProjectId, TaskId,
};
use crate::error::Result;
use crate::lookup::TaskLookup;
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod in_memory;

pub use in_memory::LoadWarning;

/// Default bound on traversal depth.
///
/// A loop-safety guard against pathological fan-out or a pre-existing cycle;
/// callers must not rely on it as a semantic limit.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Core storage trait for the dependency edge relation.
///
/// # Method Categories
///
/// - **Writes**: `create`, `delete`, `delete_by_pair`, `delete_for_task`
/// - **Point reads**: `get`, `exists`
/// - **Joined reads**: `dependencies_of`, `dependents_of`, `dependencies_of_project`
/// - **Reachability**: `transitive_closure`, `reachable_edges`
/// - **Concurrency**: `graph_version`
/// - **Batch / persistence**: `import_edges`, `export_all`, `save`, `reload`
///
/// # Error Handling
///
/// - `DuplicateDependency` / `SelfReference` / `CircularDependency`:
///   constraint violations on `create`
/// - `VersionConflict`: `create` lost an optimistic-concurrency race
/// - `Storage`, `Io`, `Json`, `Lookup`: backend failures
#[async_trait]
pub trait DependencyStore: Send + Sync {
    // ========== Writes ==========

    /// Create a new edge.
    ///
    /// When `expected_version` is given, the insert only happens if the
    /// graph version still equals it; the comparison and the insert are one
    /// atomic step. A successful create bumps the version by one.
    ///
    /// # Errors
    ///
    /// - `Error::SelfReference` if both ends are the same task
    /// - `Error::DuplicateDependency` if the pair already has an edge
    /// - `Error::VersionConflict` if the version moved
    /// - `Error::CircularDependency` if the prerequisite already reaches the
    ///   dependent, whatever the version
    async fn create(
        &self,
        dependency: NewDependency,
        expected_version: Option<u64>,
    ) -> Result<DependencyEdge>;

    /// Delete an edge by id. Returns whether an edge was removed.
    async fn delete(&self, id: &DependencyId) -> Result<bool>;

    /// Delete the edge for a pair. Returns whether an edge was removed.
    async fn delete_by_pair(&self, task_id: &TaskId, depends_on_task_id: &TaskId)
    -> Result<bool>;

    /// Delete every edge touching `task_id`, in either direction.
    ///
    /// Used when a task is permanently deleted. Returns the number removed.
    async fn delete_for_task(&self, task_id: &TaskId) -> Result<usize>;

    // ========== Point reads ==========

    /// Get an edge by id.
    async fn get(&self, id: &DependencyId) -> Result<Option<DependencyEdge>>;

    /// Whether an edge exists for the pair.
    async fn exists(&self, task_id: &TaskId, depends_on_task_id: &TaskId) -> Result<bool>;

    // ========== Joined reads ==========

    /// Edges where `task_id` is the dependent, joined with each prerequisite.
    async fn dependencies_of(&self, task_id: &TaskId) -> Result<Vec<LinkedDependency>>;

    /// Edges where `task_id` is the prerequisite, joined with each dependent.
    async fn dependents_of(&self, task_id: &TaskId) -> Result<Vec<LinkedDependency>>;

    /// Every edge whose dependent task belongs to `project_id`.
    async fn dependencies_of_project(&self, project_id: &ProjectId)
    -> Result<Vec<DependencyEdge>>;

    // ========== Reachability ==========

    /// All task ids reachable from `task_id` via depends-on edges within
    /// `max_depth` hops.
    async fn transitive_closure(&self, task_id: &TaskId, max_depth: usize)
    -> Result<HashSet<TaskId>>;

    /// The depends-on edges traversed by the same bounded walk, as
    /// `(dependent, prerequisite)` pairs.
    ///
    /// This is the adjacency view a caller loads once per operation to run
    /// its own search (e.g. cycle-path reconstruction).
    async fn reachable_edges(
        &self,
        task_id: &TaskId,
        max_depth: usize,
    ) -> Result<Vec<(TaskId, TaskId)>>;

    // ========== Concurrency ==========

    /// Current graph version; grows with every accepted insert and reload.
    async fn graph_version(&self) -> Result<u64>;

    // ========== Batch / persistence ==========

    /// Add existing edges, skipping those that violate a store invariant.
    async fn import_edges(&self, edges: Vec<DependencyEdge>) -> Result<Vec<LoadWarning>>;

    /// Every edge, oldest first.
    async fn export_all(&self) -> Result<Vec<DependencyEdge>>;

    /// Persist pending changes. A no-op for purely in-memory backends.
    async fn save(&self) -> Result<()>;

    /// Discard in-memory state and re-read it from persistent storage.
    ///
    /// Used after a failed `save()` to get back in line with disk.
    async fn reload(&self) -> Result<()>;
}

/// Storage backend configuration.
#[derive(Debug, Clone)]
pub enum StorageBackend {
    /// In-memory storage (ephemeral)
    InMemory,

    /// JSONL file storage (persistent)
    Jsonl(PathBuf),
}

impl StorageBackend {
    /// The data file path for file-based backends
    pub fn data_path(&self) -> Option<&Path> {
        match self {
            StorageBackend::Jsonl(path) => Some(path),
            StorageBackend::InMemory => None,
        }
    }
}

/// In-memory store whose `save()` writes the edge set to a JSONL file.
struct JsonlBackedStore {
    inner: in_memory::InMemoryStore,
    path: PathBuf,
}

#[async_trait]
impl DependencyStore for JsonlBackedStore {
    async fn create(
        &self,
        dependency: NewDependency,
        expected_version: Option<u64>,
    ) -> Result<DependencyEdge> {
        self.inner.create(dependency, expected_version).await
    }

    async fn delete(&self, id: &DependencyId) -> Result<bool> {
        self.inner.delete(id).await
    }

    async fn delete_by_pair(
        &self,
        task_id: &TaskId,
        depends_on_task_id: &TaskId,
    ) -> Result<bool> {
        self.inner.delete_by_pair(task_id, depends_on_task_id).await
    }

    async fn delete_for_task(&self, task_id: &TaskId) -> Result<usize> {
        self.inner.delete_for_task(task_id).await
    }

    async fn get(&self, id: &DependencyId) -> Result<Option<DependencyEdge>> {
        self.inner.get(id).await
    }

    async fn exists(&self, task_id: &TaskId, depends_on_task_id: &TaskId) -> Result<bool> {
        self.inner.exists(task_id, depends_on_task_id).await
    }

    async fn dependencies_of(&self, task_id: &TaskId) -> Result<Vec<LinkedDependency>> {
        self.inner.dependencies_of(task_id).await
    }

    async fn dependents_of(&self, task_id: &TaskId) -> Result<Vec<LinkedDependency>> {
        self.inner.dependents_of(task_id).await
    }

    async fn dependencies_of_project(
        &self,
        project_id: &ProjectId,
    ) -> Result<Vec<DependencyEdge>> {
        self.inner.dependencies_of_project(project_id).await
    }

    async fn transitive_closure(
        &self,
        task_id: &TaskId,
        max_depth: usize,
    ) -> Result<HashSet<TaskId>> {
        self.inner.transitive_closure(task_id, max_depth).await
    }

    async fn reachable_edges(
        &self,
        task_id: &TaskId,
        max_depth: usize,
    ) -> Result<Vec<(TaskId, TaskId)>> {
        self.inner.reachable_edges(task_id, max_depth).await
    }

    async fn graph_version(&self) -> Result<u64> {
        self.inner.graph_version().await
    }

    async fn import_edges(&self, edges: Vec<DependencyEdge>) -> Result<Vec<LoadWarning>> {
        self.inner.import_edges(edges).await
    }

    async fn export_all(&self) -> Result<Vec<DependencyEdge>> {
        self.inner.export_all().await
    }

    async fn save(&self) -> Result<()> {
        in_memory::save_to_jsonl(&self.inner, &self.path).await
    }

    async fn reload(&self) -> Result<()> {
        let (edges, mut warnings) = if self.path.exists() {
            in_memory::read_edges(&self.path).await?
        } else {
            (Vec::new(), Vec::new())
        };
        warnings.extend(self.inner.replace_all(edges).await);
        for warning in &warnings {
            tracing::warn!(%warning, "JSONL reload warning");
        }
        Ok(())
    }
}

/// Create a store for the given backend.
///
/// `tasks` is the lookup used to join task data onto edges.
///
/// # Errors
///
/// - `Error::Io` if the JSONL file exists but cannot be read
pub async fn create_storage(
    backend: StorageBackend,
    tasks: Arc<dyn TaskLookup>,
) -> Result<Arc<dyn DependencyStore>> {
    match backend {
        StorageBackend::InMemory => Ok(Arc::new(in_memory::InMemoryStore::new(tasks))),
        StorageBackend::Jsonl(path) => {
            let inner = if path.exists() {
                let (store, warnings) = in_memory::load_from_jsonl(&path, tasks).await?;
                // Log warnings but continue - the store is still usable
                for warning in &warnings {
                    tracing::warn!(%warning, "JSONL load warning");
                }
                store
            } else {
                // First run: the file is created on the first save
                in_memory::InMemoryStore::new(tasks)
            };
            Ok(Arc::new(JsonlBackedStore { inner, path }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::InMemoryTaskLookup;
    use tempfile::TempDir;

    fn tasks() -> Arc<dyn TaskLookup> {
        Arc::new(InMemoryTaskLookup::new())
    }

    #[tokio::test]
    async fn test_trait_object_usage() {
        let store: Arc<dyn DependencyStore> =
            create_storage(StorageBackend::InMemory, tasks()).await.unwrap();

        let edge = store
            .create(NewDependency::blocks("b", "a", "alice"), None)
            .await
            .unwrap();
        assert!(store.exists(&TaskId::new("b"), &TaskId::new("a")).await.unwrap());
        assert_eq!(store.get(&edge.id).await.unwrap(), Some(edge));
    }

    #[tokio::test]
    async fn test_jsonl_save_and_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("dependencies.jsonl");

        let store = create_storage(StorageBackend::Jsonl(path.clone()), tasks())
            .await
            .unwrap();
        let edge = store
            .create(NewDependency::blocks("b", "a", "alice"), None)
            .await
            .unwrap();
        store.save().await.unwrap();

        let reopened = create_storage(StorageBackend::Jsonl(path), tasks())
            .await
            .unwrap();
        assert_eq!(reopened.export_all().await.unwrap(), vec![edge]);
    }

    #[tokio::test]
    async fn test_jsonl_reload_restores_disk_state() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("dependencies.jsonl");

        let store = create_storage(StorageBackend::Jsonl(path), tasks())
            .await
            .unwrap();
        store
            .create(NewDependency::blocks("b", "a", "alice"), None)
            .await
            .unwrap();
        store.save().await.unwrap();

        // Unsaved change
        store
            .create(NewDependency::blocks("c", "b", "alice"), None)
            .await
            .unwrap();
        assert_eq!(store.export_all().await.unwrap().len(), 2);

        store.reload().await.unwrap();
        let edges = store.export_all().await.unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].task_id, TaskId::new("b"));
    }

    #[tokio::test]
    async fn test_jsonl_reload_missing_file_empties_store() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("dependencies.jsonl");

        let store = create_storage(StorageBackend::Jsonl(path.clone()), tasks())
            .await
            .unwrap();
        store
            .create(NewDependency::blocks("b", "a", "alice"), None)
            .await
            .unwrap();
        store.save().await.unwrap();
        std::fs::remove_file(&path).unwrap();

        store.reload().await.unwrap();
        assert!(store.export_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_in_memory_save_and_reload_are_noops() {
        let store = create_storage(StorageBackend::InMemory, tasks()).await.unwrap();
        store
            .create(NewDependency::blocks("b", "a", "alice"), None)
            .await
            .unwrap();

        store.save().await.unwrap();
        store.reload().await.unwrap();
        assert_eq!(store.export_all().await.unwrap().len(), 1);
    }

    #[test]
    fn test_backend_data_path() {
        assert!(StorageBackend::InMemory.data_path().is_none());
        let backend = StorageBackend::Jsonl(PathBuf::from("deps.jsonl"));
        assert_eq!(backend.data_path(), Some(Path::new("deps.jsonl")));
    }
}
