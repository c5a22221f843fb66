//! Cycle detection for proposed dependency edges.
//!
//! Adding `task -> prerequisite` closes a cycle exactly when `task` is already
//! reachable from `prerequisite` along depends-on edges. The detector answers
//! that question through the store's bounded reachability query, then (only
//! when a cycle exists) reconstructs one concrete path and renders it for
//! humans.
//!
//! Nothing is cached: every call re-reads the edges it needs from the store.

use crate::domain::{CycleDetectionResult, TaskId};
use crate::error::Result;
use crate::lookup::TaskLookup;
use crate::storage::{DEFAULT_MAX_DEPTH, DependencyStore};
use futures::future::join_all;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::{debug, warn};

/// Separator between rendered tasks in a cycle description
pub const PATH_SEPARATOR: &str = " → ";

/// Decides whether a proposed edge would create a cycle and explains it.
#[derive(Clone)]
pub struct CycleDetector {
    store: Arc<dyn DependencyStore>,
    tasks: Arc<dyn TaskLookup>,
    max_depth: usize,
}

impl CycleDetector {
    /// Create a detector with the default traversal bound
    pub fn new(store: Arc<dyn DependencyStore>, tasks: Arc<dyn TaskLookup>) -> Self {
        Self {
            store,
            tasks,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Override the traversal bound
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Whether adding `task_id -> depends_on_task_id` would close a cycle.
    ///
    /// A self reference is always a cycle and never touches the store.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn would_create_cycle(
        &self,
        task_id: &TaskId,
        depends_on_task_id: &TaskId,
    ) -> Result<bool> {
        if task_id == depends_on_task_id {
            return Ok(true);
        }

        let reachable = self
            .store
            .transitive_closure(depends_on_task_id, self.max_depth)
            .await?;
        let cycle = reachable.contains(task_id);

        debug!(
            task_id = %task_id,
            depends_on_task_id = %depends_on_task_id,
            reachable = reachable.len(),
            cycle,
            "Checked proposed edge for cycles"
        );
        Ok(cycle)
    }

    /// Reconstruct the cycle the proposed edge would close.
    ///
    /// Meant to be called after [`would_create_cycle`](Self::would_create_cycle)
    /// returned true. The path starts and ends with `task_id`:
    /// `[task_id, depends_on_task_id, ..., task_id]`, or `[task_id, task_id]`
    /// for a self reference. If no path can be rebuilt from the edges, the
    /// minimal `[task_id, depends_on_task_id, task_id]` is returned and a
    /// warning is logged.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn find_cycle_path(
        &self,
        task_id: &TaskId,
        depends_on_task_id: &TaskId,
    ) -> Result<Vec<TaskId>> {
        if task_id == depends_on_task_id {
            return Ok(vec![task_id.clone(), task_id.clone()]);
        }

        let edges = self
            .store
            .reachable_edges(depends_on_task_id, self.max_depth)
            .await?;

        Ok(cycle_path_from_edges(
            &edges,
            task_id,
            depends_on_task_id,
            self.max_depth,
        ))
    }

    /// Render a path as `CODE (Title) → CODE (Title) → ...`.
    ///
    /// Ids that do not resolve, or whose lookup fails, are shown raw.
    pub async fn render_description(&self, path: &[TaskId]) -> String {
        let lookups = path.iter().map(|id| self.tasks.get_task(id));
        let resolved = join_all(lookups).await;

        path.iter()
            .zip(resolved)
            .map(|(id, task)| match task {
                Ok(Some(task)) => format!("{} ({})", task.code, task.title),
                Ok(None) => id.to_string(),
                Err(e) => {
                    debug!(task_id = %id, error = %e, "Task lookup failed while rendering cycle");
                    id.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(PATH_SEPARATOR)
    }

    /// Full detection: decision, path and description in one result.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn detect(
        &self,
        task_id: &TaskId,
        depends_on_task_id: &TaskId,
    ) -> Result<CycleDetectionResult> {
        if !self.would_create_cycle(task_id, depends_on_task_id).await? {
            return Ok(CycleDetectionResult::none());
        }

        let path = self.find_cycle_path(task_id, depends_on_task_id).await?;
        let description = self.render_description(&path).await;

        Ok(CycleDetectionResult {
            has_cycle: true,
            cycle_path: Some(path),
            description,
        })
    }
}

/// Build the cycle path for `task_id -> depends_on_task_id` from an edge list.
///
/// Falls back to the minimal three-node path when `task_id` cannot be reached.
pub(crate) fn cycle_path_from_edges(
    edges: &[(TaskId, TaskId)],
    task_id: &TaskId,
    depends_on_task_id: &TaskId,
    max_depth: usize,
) -> Vec<TaskId> {
    match search_path(edges, depends_on_task_id, task_id, max_depth) {
        Some(found) => {
            let mut path = Vec::with_capacity(found.len() + 1);
            path.push(task_id.clone());
            path.extend(found);
            path
        }
        None => {
            warn!(
                task_id = %task_id,
                depends_on_task_id = %depends_on_task_id,
                "Could not reconstruct cycle path; reporting minimal path"
            );
            vec![
                task_id.clone(),
                depends_on_task_id.clone(),
                task_id.clone(),
            ]
        }
    }
}

/// Breadth-first search for a shortest path `from -> ... -> to` over `edges`.
///
/// Nodes `max_depth` hops from `from` are not expanded, the same bound the
/// store's closure uses, so any target the closure reached is found here.
/// Returns the path including both ends.
fn search_path(
    edges: &[(TaskId, TaskId)],
    from: &TaskId,
    to: &TaskId,
    max_depth: usize,
) -> Option<Vec<TaskId>> {
    let mut adjacency: HashMap<&TaskId, Vec<&TaskId>> = HashMap::new();
    for (dependent, prerequisite) in edges {
        adjacency.entry(dependent).or_default().push(prerequisite);
    }

    // Each reached node maps to the node it was first reached from
    let mut parents: HashMap<&TaskId, Option<&TaskId>> = HashMap::from([(from, None)]);
    let mut queue: VecDeque<(&TaskId, usize)> = VecDeque::from([(from, 0)]);

    while let Some((node, depth)) = queue.pop_front() {
        if node == to {
            let mut path = vec![node.clone()];
            let mut current = node;
            while let Some(&Some(parent)) = parents.get(current) {
                path.push(parent.clone());
                current = parent;
            }
            path.reverse();
            return Some(path);
        }
        if depth >= max_depth {
            continue;
        }

        for &target in adjacency.get(node).into_iter().flatten() {
            if !parents.contains_key(target) {
                parents.insert(target, Some(node));
                queue.push_back((target, depth + 1));
            }
        }
    }

    None
}
