//! The dependency service facade.
//!
//! [`DependencyService`] is the single entry point for callers. It wires the
//! validator, cycle detector and graph builder around one shared store and
//! task lookup, and closes the validate-then-write race on
//! [`add_dependency`](DependencyService::add_dependency) with the store's
//! graph version.

use crate::cycle::CycleDetector;
use crate::domain::{
    AddedDependency, BlockingStatus, CycleDetectionResult, DependencyGraph, DependencyId,
    DependencyType, LinkedDependency, NewDependency, ProjectId, TaskId, ValidationResult,
};
use crate::error::{Error, Result};
use crate::graph_builder::DependencyGraphBuilder;
use crate::lookup::TaskLookup;
use crate::storage::{DEFAULT_MAX_DEPTH, DependencyStore};
use crate::validator::DependencyValidator;
use std::sync::Arc;
use tracing::{debug, info};

/// Facade over the dependency graph.
///
/// Cloning is cheap; clones share the same store and lookup.
#[derive(Clone)]
pub struct DependencyService {
    store: Arc<dyn DependencyStore>,
    validator: DependencyValidator,
    cycles: CycleDetector,
    graphs: DependencyGraphBuilder,
}

impl DependencyService {
    /// Create a service with the default traversal bound
    pub fn new(store: Arc<dyn DependencyStore>, tasks: Arc<dyn TaskLookup>) -> Self {
        Self::with_max_depth(store, tasks, DEFAULT_MAX_DEPTH)
    }

    /// Create a service with a custom traversal bound
    pub fn with_max_depth(
        store: Arc<dyn DependencyStore>,
        tasks: Arc<dyn TaskLookup>,
        max_depth: usize,
    ) -> Self {
        let cycles = CycleDetector::new(store.clone(), tasks.clone()).with_max_depth(max_depth);
        let validator = DependencyValidator::new(store.clone(), tasks.clone(), cycles.clone());
        let graphs = DependencyGraphBuilder::new(store.clone(), tasks);
        Self {
            store,
            validator,
            cycles,
            graphs,
        }
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<dyn DependencyStore> {
        &self.store
    }

    /// Validate and create a dependency edge.
    ///
    /// The graph version is read before validation and handed to the store,
    /// so an edge inserted concurrently between the check and the write makes
    /// this call fail with [`Error::VersionConflict`] instead of risking a
    /// cycle. The caller may retry.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidDependency` when validation finds errors; `message`
    ///   joins them with `"; "` and `result` holds the details
    /// - `Error::VersionConflict` when the graph changed concurrently
    /// - Store and lookup failures
    pub async fn add_dependency(&self, dependency: NewDependency) -> Result<AddedDependency> {
        let version = self.store.graph_version().await?;

        let validation = self
            .validator
            .validate(&dependency.task_id, &dependency.depends_on_task_id)
            .await?;

        if !validation.is_valid() {
            debug!(
                task_id = %dependency.task_id,
                depends_on_task_id = %dependency.depends_on_task_id,
                errors = validation.errors.len(),
                "Rejected dependency"
            );
            return Err(Error::InvalidDependency {
                message: validation.error_summary(),
                result: Box::new(validation),
            });
        }

        let edge = self.store.create(dependency, Some(version)).await?;
        info!(
            edge_id = %edge.id,
            task_id = %edge.task_id,
            depends_on_task_id = %edge.depends_on_task_id,
            dependency_type = %edge.dependency_type,
            "Added dependency"
        );

        Ok(AddedDependency {
            id: edge.id,
            warnings: validation.warnings,
        })
    }

    /// Remove an edge by id. Returns whether anything was removed.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn remove_dependency(&self, id: &DependencyId) -> Result<bool> {
        let removed = self.store.delete(id).await?;
        if removed {
            info!(edge_id = %id, "Removed dependency");
        }
        Ok(removed)
    }

    /// Remove the edge for a pair. Returns whether anything was removed.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn remove_dependency_by_tasks(
        &self,
        task_id: &TaskId,
        depends_on_task_id: &TaskId,
    ) -> Result<bool> {
        let removed = self.store.delete_by_pair(task_id, depends_on_task_id).await?;
        if removed {
            info!(
                task_id = %task_id,
                depends_on_task_id = %depends_on_task_id,
                "Removed dependency"
            );
        }
        Ok(removed)
    }

    /// Remove every edge touching `task_id`; call when the task is deleted.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn remove_task_dependencies(&self, task_id: &TaskId) -> Result<usize> {
        let removed = self.store.delete_for_task(task_id).await?;
        info!(task_id = %task_id, removed, "Removed dependencies of deleted task");
        Ok(removed)
    }

    /// Validate an edge without creating it.
    ///
    /// # Errors
    ///
    /// Propagates store and lookup failures.
    pub async fn validate_dependency(
        &self,
        task_id: &TaskId,
        depends_on_task_id: &TaskId,
    ) -> Result<ValidationResult> {
        self.validator.validate(task_id, depends_on_task_id).await
    }

    /// Whether the edge would close a cycle, with the path and description.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn detect_circular_dependency(
        &self,
        task_id: &TaskId,
        depends_on_task_id: &TaskId,
    ) -> Result<CycleDetectionResult> {
        self.cycles.detect(task_id, depends_on_task_id).await
    }

    /// Whether `task_id` still waits on a non-terminal `Blocks` prerequisite.
    ///
    /// Evaluated against current task statuses on every call.
    ///
    /// # Errors
    ///
    /// Propagates store and lookup failures.
    pub async fn has_uncompleted_blocking_dependencies(
        &self,
        task_id: &TaskId,
    ) -> Result<BlockingStatus> {
        let blocking_tasks: Vec<_> = self
            .store
            .dependencies_of(task_id)
            .await?
            .into_iter()
            .filter(|dep| {
                dep.edge.dependency_type == DependencyType::Blocks && !dep.task.status.is_terminal()
            })
            .map(|dep| dep.task)
            .collect();

        Ok(BlockingStatus {
            has_blocking: !blocking_tasks.is_empty(),
            blocking_tasks,
        })
    }

    /// Node/edge view of a project's dependencies.
    ///
    /// # Errors
    ///
    /// Propagates store and lookup failures.
    pub async fn get_dependency_graph(&self, project_id: &ProjectId) -> Result<DependencyGraph> {
        self.graphs.build(project_id).await
    }

    /// Prerequisites of `task_id`, joined with their task data.
    ///
    /// # Errors
    ///
    /// Propagates store and lookup failures.
    pub async fn get_dependencies(&self, task_id: &TaskId) -> Result<Vec<LinkedDependency>> {
        self.store.dependencies_of(task_id).await
    }

    /// Dependents of `task_id`, joined with their task data.
    ///
    /// # Errors
    ///
    /// Propagates store and lookup failures.
    pub async fn get_dependents(&self, task_id: &TaskId) -> Result<Vec<LinkedDependency>> {
        self.store.dependents_of(task_id).await
    }
}
