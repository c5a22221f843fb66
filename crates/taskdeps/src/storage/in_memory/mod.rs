//! In-memory dependency store backed by petgraph.
//!
//! All edges live in RAM and are **lost when the process exits** unless the
//! store is wrapped by the JSONL backend (see [`crate::storage`]).
//!
//! # Architecture
//!
//! - `petgraph::DiGraph<TaskId, DependencyEdge>` holds the edge relation;
//!   the full edge record is the edge weight
//! - `HashMap<TaskId, NodeIndex>` maps tasks to graph nodes
//! - `HashMap<DependencyId, (TaskId, TaskId)>` resolves edge ids to pairs
//! - a graph version counter, bumped by every accepted insert
//!
//! ## Edge Direction
//!
//! Edges point from **dependent -> prerequisite**: if task A needs task B,
//! the edge is `A -> B`. Reachability from X therefore answers "what does X
//! (transitively) depend on".
//!
//! ## Task data
//!
//! Tasks are not stored here. Joins (`dependencies_of`, `dependents_of`,
//! `dependencies_of_project`) resolve the opposite task through the
//! [`TaskLookup`] given at construction, after the graph lock is released.
//!
//! # Thread Safety
//!
//! The graph sits behind `Arc<tokio::sync::Mutex<_>>`. Every mutation happens
//! inside one critical section, so a dropped future never leaves a partial
//! write behind.

mod graph;
mod inner;
mod jsonl;
mod trait_impl;

use crate::domain::DependencyEdge;
use crate::lookup::TaskLookup;
use inner::InMemoryStoreInner;
use std::sync::Arc;
use tokio::sync::Mutex;

pub use jsonl::{LoadWarning, load_from_jsonl, save_to_jsonl};
pub(crate) use jsonl::read_edges;

/// Thread-safe in-memory dependency store.
///
/// Cloning is cheap and yields a handle to the same graph.
#[derive(Clone)]
pub struct InMemoryStore {
    inner: Arc<Mutex<InMemoryStoreInner>>,
    tasks: Arc<dyn TaskLookup>,
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("tasks", &"<dyn TaskLookup>")
            .finish_non_exhaustive()
    }
}

impl InMemoryStore {
    /// Create an empty store that joins tasks through `tasks`.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use taskdeps::lookup::InMemoryTaskLookup;
    /// use taskdeps::storage::in_memory::InMemoryStore;
    ///
    /// let store = InMemoryStore::new(Arc::new(InMemoryTaskLookup::new()));
    /// # let _ = store;
    /// ```
    pub fn new(tasks: Arc<dyn TaskLookup>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(InMemoryStoreInner::new())),
            tasks,
        }
    }

    /// Replace the whole edge set with `edges`, as when reloading from disk.
    ///
    /// Edges are applied oldest first; the ones that cannot be applied are
    /// skipped and reported. The swap happens under the lock, so readers see
    /// either the old graph or the new one. The graph version keeps growing
    /// across the swap, so a version captured before it never matches after.
    pub async fn replace_all(&self, edges: Vec<DependencyEdge>) -> Vec<LoadWarning> {
        let mut fresh = InMemoryStoreInner::new();
        let warnings = fresh.import(edges);
        let mut inner = self.inner.lock().await;
        fresh.version += inner.version + 1;
        *inner = fresh;
        warnings
    }
}
