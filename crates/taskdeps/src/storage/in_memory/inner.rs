//! Core in-memory data structures.
//!
//! This module contains the inner store that holds the edge graph and is
//! wrapped in `Arc<Mutex<>>` for thread safety.

use super::graph::has_path;
use super::jsonl::LoadWarning;
use crate::domain::{DependencyEdge, DependencyId, NewDependency, TaskId};
use crate::error::{Error, Result};
use crate::id_generation::EdgeIdGenerator;
use chrono::Utc;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use std::collections::HashMap;

/// Inner store (not thread-safe).
///
/// Nodes are created lazily the first time a task appears on an edge and are
/// never removed; a task without edges is simply an isolated node.
pub(crate) struct InMemoryStoreInner {
    /// Edge relation; source depends on target
    pub(super) graph: DiGraph<TaskId, DependencyEdge>,

    /// Mapping from task id to graph node
    pub(super) node_map: HashMap<TaskId, NodeIndex>,

    /// Edge id -> (dependent, prerequisite)
    pub(super) edge_ids: HashMap<DependencyId, (TaskId, TaskId)>,

    /// Generator for new edge ids
    id_generator: EdgeIdGenerator,

    /// Bumped by every accepted insert
    pub(super) version: u64,
}

impl InMemoryStoreInner {
    pub(crate) fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
            edge_ids: HashMap::new(),
            id_generator: EdgeIdGenerator::new(),
            version: 0,
        }
    }

    fn node_for(&mut self, id: &TaskId) -> NodeIndex {
        if let Some(&node) = self.node_map.get(id) {
            return node;
        }
        let node = self.graph.add_node(id.clone());
        self.node_map.insert(id.clone(), node);
        node
    }

    pub(super) fn find_edge(&self, task_id: &TaskId, depends_on_task_id: &TaskId) -> Option<EdgeIndex> {
        let from = self.node_map.get(task_id)?;
        let to = self.node_map.get(depends_on_task_id)?;
        self.graph.find_edge(*from, *to)
    }

    /// Create a new edge, enforcing the store-level constraints.
    ///
    /// Checks run in order: self reference, uniqueness of the pair, the
    /// optimistic version, then reachability. The graph stays acyclic no
    /// matter which version the caller passed. The version only advances on
    /// success.
    pub(super) fn create(
        &mut self,
        new_dependency: NewDependency,
        expected_version: Option<u64>,
    ) -> Result<DependencyEdge> {
        let NewDependency {
            task_id,
            depends_on_task_id,
            dependency_type,
            created_by,
        } = new_dependency;

        if task_id == depends_on_task_id {
            return Err(Error::SelfReference(task_id));
        }

        if self.find_edge(&task_id, &depends_on_task_id).is_some() {
            return Err(Error::DuplicateDependency {
                task_id,
                depends_on_task_id,
            });
        }

        if let Some(expected) = expected_version {
            if expected != self.version {
                return Err(Error::VersionConflict {
                    expected,
                    actual: self.version,
                });
            }
        }

        if has_path(self, &depends_on_task_id, &task_id) {
            return Err(Error::CircularDependency {
                task_id,
                depends_on_task_id,
            });
        }

        let id = self
            .id_generator
            .generate(task_id.as_str(), depends_on_task_id.as_str(), &created_by)
            .map_err(|e| Error::Storage(format!("ID generation failed: {}", e)))?;

        let edge = DependencyEdge {
            id: DependencyId::new(id),
            task_id,
            depends_on_task_id,
            dependency_type,
            created_by,
            created_at: Utc::now(),
        };

        self.insert_edge(edge.clone());
        self.version += 1;

        Ok(edge)
    }

    /// Add an already-validated edge to the graph and indexes.
    fn insert_edge(&mut self, edge: DependencyEdge) {
        let from = self.node_for(&edge.task_id);
        let to = self.node_for(&edge.depends_on_task_id);
        self.edge_ids.insert(
            edge.id.clone(),
            (edge.task_id.clone(), edge.depends_on_task_id.clone()),
        );
        self.graph.add_edge(from, to, edge);
    }

    /// Remove the edge for a pair, returning it if it existed.
    pub(super) fn remove_pair(
        &mut self,
        task_id: &TaskId,
        depends_on_task_id: &TaskId,
    ) -> Option<DependencyEdge> {
        let index = self.find_edge(task_id, depends_on_task_id)?;
        let edge = self.graph.remove_edge(index)?;
        self.edge_ids.remove(&edge.id);
        self.id_generator.release_id(edge.id.as_str());
        Some(edge)
    }

    /// Remove an edge by id, returning it if it existed.
    pub(super) fn remove_id(&mut self, id: &DependencyId) -> Option<DependencyEdge> {
        let (task_id, depends_on_task_id) = self.edge_ids.get(id).cloned()?;
        self.remove_pair(&task_id, &depends_on_task_id)
    }

    /// All edges, oldest first
    pub(super) fn all_edges(&self) -> Vec<DependencyEdge> {
        let mut edges: Vec<DependencyEdge> = self.graph.edge_weights().cloned().collect();
        edges.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        edges
    }

    /// Import existing edges (e.g. loaded from disk), skipping the ones that
    /// would violate a store invariant.
    ///
    /// Edges are applied oldest first so that, when a file contains a cycle,
    /// the edge that closed it most recently is the one dropped.
    pub(super) fn import(&mut self, mut edges: Vec<DependencyEdge>) -> Vec<LoadWarning> {
        edges.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

        let mut warnings = Vec::new();
        for edge in edges {
            if edge.task_id == edge.depends_on_task_id {
                warnings.push(LoadWarning::SelfReference {
                    edge_id: edge.id,
                    task_id: edge.task_id,
                });
                continue;
            }

            if self.edge_ids.contains_key(&edge.id)
                || self.find_edge(&edge.task_id, &edge.depends_on_task_id).is_some()
            {
                warnings.push(LoadWarning::DuplicateDependency {
                    edge_id: edge.id,
                    task_id: edge.task_id,
                    depends_on_task_id: edge.depends_on_task_id,
                });
                continue;
            }

            if has_path(self, &edge.depends_on_task_id, &edge.task_id) {
                warnings.push(LoadWarning::CircularDependency {
                    edge_id: edge.id,
                    task_id: edge.task_id,
                    depends_on_task_id: edge.depends_on_task_id,
                });
                continue;
            }

            self.id_generator.register_id(edge.id.as_str());
            self.insert_edge(edge);
            self.version += 1;
        }

        warnings
    }
}
