//! Node/edge projection of a project's dependency graph.

use crate::domain::{DependencyGraph, GraphEdge, ProjectId, TaskId};
use crate::error::Result;
use crate::lookup::TaskLookup;
use crate::storage::DependencyStore;
use futures::future::try_join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Builds the visualization view of a project's dependencies.
#[derive(Clone)]
pub struct DependencyGraphBuilder {
    store: Arc<dyn DependencyStore>,
    tasks: Arc<dyn TaskLookup>,
}

impl DependencyGraphBuilder {
    /// Create a builder over the given store and lookup
    pub fn new(store: Arc<dyn DependencyStore>, tasks: Arc<dyn TaskLookup>) -> Self {
        Self { store, tasks }
    }

    /// Build the graph for `project_id`.
    ///
    /// Edges are every edge whose dependent belongs to the project. Nodes are
    /// the distinct task ids those edges touch, in first-seen order; ids
    /// that no longer resolve are left out of the nodes but their edges stay.
    ///
    /// # Errors
    ///
    /// Propagates store and lookup failures.
    pub async fn build(&self, project_id: &ProjectId) -> Result<DependencyGraph> {
        let edges = self.store.dependencies_of_project(project_id).await?;

        let mut seen: HashSet<&TaskId> = HashSet::new();
        let mut ids: Vec<&TaskId> = Vec::new();
        for edge in &edges {
            for id in [&edge.task_id, &edge.depends_on_task_id] {
                if seen.insert(id) {
                    ids.push(id);
                }
            }
        }

        let resolved = try_join_all(ids.iter().map(|id| self.tasks.get_task(id))).await?;
        let nodes: Vec<_> = resolved
            .into_iter()
            .flatten()
            .map(|task| task.summary())
            .collect();

        debug!(
            project_id = %project_id,
            touched = ids.len(),
            nodes = nodes.len(),
            edges = edges.len(),
            "Built dependency graph"
        );

        Ok(DependencyGraph {
            nodes,
            edges: edges
                .into_iter()
                .map(|edge| GraphEdge {
                    from: edge.task_id,
                    to: edge.depends_on_task_id,
                    dependency_type: edge.dependency_type,
                })
                .collect(),
        })
    }
}
