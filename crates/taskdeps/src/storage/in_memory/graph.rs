//! Graph traversals over the in-memory edge relation.
//!
//! - Unbounded path check (used when importing edges)
//! - Depth-bounded BFS (transitive closure and the reachable-edge view)

use super::inner::InMemoryStoreInner;
use crate::domain::TaskId;
use petgraph::algo;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use std::collections::{HashSet, VecDeque};
use tracing::warn;

/// Result of a depth-bounded walk along depends-on edges.
#[derive(Debug, Default)]
pub(super) struct BoundedWalk {
    /// Every task reached (the start is included only if a cycle leads back to it)
    pub(super) reached: HashSet<TaskId>,

    /// Edges followed, as (dependent, prerequisite)
    pub(super) edges: Vec<(TaskId, TaskId)>,

    /// True if the depth bound stopped the walk with nodes left to expand
    pub(super) truncated: bool,
}

/// Whether `to` is reachable from `from` by following depends-on edges.
///
/// Adding `to -> from` would close a cycle exactly when this returns true.
pub(super) fn has_path(inner: &InMemoryStoreInner, from: &TaskId, to: &TaskId) -> bool {
    match (inner.node_map.get(from), inner.node_map.get(to)) {
        (Some(&from), Some(&to)) => algo::has_path_connecting(&inner.graph, from, to, None),
        _ => false,
    }
}

/// Breadth-first walk from `start`, following edges at most `max_depth` hops.
///
/// A task with no node in the graph has no edges, so the walk is empty.
pub(super) fn bounded_walk(
    inner: &InMemoryStoreInner,
    start: &TaskId,
    max_depth: usize,
) -> BoundedWalk {
    let mut walk = BoundedWalk::default();
    let Some(&start_node) = inner.node_map.get(start) else {
        return walk;
    };

    let mut visited: HashSet<NodeIndex> = HashSet::new();
    let mut queue: VecDeque<(NodeIndex, usize)> = VecDeque::new();
    visited.insert(start_node);
    queue.push_back((start_node, 0));

    while let Some((node, depth)) = queue.pop_front() {
        if depth >= max_depth {
            if inner.graph.edges(node).next().is_some() {
                walk.truncated = true;
            }
            continue;
        }

        for edge in inner.graph.edges(node) {
            let target = edge.target();
            walk.edges
                .push((inner.graph[node].clone(), inner.graph[target].clone()));
            walk.reached.insert(inner.graph[target].clone());
            if visited.insert(target) {
                queue.push_back((target, depth + 1));
            }
        }
    }

    if walk.truncated {
        warn!(
            task_id = %start,
            max_depth,
            "Dependency traversal hit the depth limit; result may be incomplete"
        );
    }

    walk
}
