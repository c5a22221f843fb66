//! JSONL persistence for the in-memory store.
//!
//! Each line of the dependencies file is one serialized [`DependencyEdge`].

use super::InMemoryStore;
use crate::domain::{DependencyEdge, DependencyId, TaskId};
use crate::error::Result;
use crate::jsonl::{read_jsonl_resilient, write_jsonl_atomic};
use crate::lookup::TaskLookup;
use crate::storage::DependencyStore;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Non-fatal problems found while loading edges.
///
/// The offending line or edge is skipped; everything else still loads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// Line that couldn't be parsed as an edge
    MalformedJson {
        /// 1-based line number
        line_number: usize,
        /// Parser error text
        error: String,
    },

    /// Edge whose task depends on itself
    SelfReference {
        /// Skipped edge
        edge_id: DependencyId,
        /// The task on both ends
        task_id: TaskId,
    },

    /// Second edge for an already-loaded pair (or a repeated edge id)
    DuplicateDependency {
        /// Skipped edge
        edge_id: DependencyId,
        /// Dependent task
        task_id: TaskId,
        /// Prerequisite task
        depends_on_task_id: TaskId,
    },

    /// Edge that would close a cycle with the edges loaded before it
    CircularDependency {
        /// Skipped edge
        edge_id: DependencyId,
        /// Dependent task
        task_id: TaskId,
        /// Prerequisite task
        depends_on_task_id: TaskId,
    },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedJson { line_number, error } => {
                write!(f, "skipped malformed line {}: {}", line_number, error)
            }
            Self::SelfReference { edge_id, task_id } => {
                write!(f, "skipped self-referencing edge {} on {}", edge_id, task_id)
            }
            Self::DuplicateDependency {
                edge_id,
                task_id,
                depends_on_task_id,
            } => write!(
                f,
                "skipped duplicate edge {} ({} -> {})",
                edge_id, task_id, depends_on_task_id
            ),
            Self::CircularDependency {
                edge_id,
                task_id,
                depends_on_task_id,
            } => write!(
                f,
                "broke circular dependency by skipping edge {} ({} -> {})",
                edge_id, task_id, depends_on_task_id
            ),
        }
    }
}

/// Read edges from a JSONL file, including parse warnings.
pub(crate) async fn read_edges(path: &Path) -> Result<(Vec<DependencyEdge>, Vec<LoadWarning>)> {
    let (edges, malformed) = read_jsonl_resilient::<DependencyEdge>(path).await?;
    let warnings = malformed
        .into_iter()
        .map(|m| LoadWarning::MalformedJson {
            line_number: m.line_number,
            error: m.error,
        })
        .collect();
    Ok((edges, warnings))
}

/// Load an in-memory store from a JSONL file.
///
/// Malformed lines, self references, duplicates and cycle-closing edges are
/// skipped and reported in the returned warnings.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub async fn load_from_jsonl(
    path: &Path,
    tasks: Arc<dyn TaskLookup>,
) -> Result<(InMemoryStore, Vec<LoadWarning>)> {
    let (edges, mut warnings) = read_edges(path).await?;
    let store = InMemoryStore::new(tasks);
    warnings.extend(store.replace_all(edges).await);

    tracing::debug!(
        path = %path.display(),
        warnings = warnings.len(),
        "Loaded dependency edges"
    );

    Ok((store, warnings))
}

/// Atomically write every edge of `store` to a JSONL file, oldest first.
///
/// # Errors
///
/// Returns an error if the edges cannot be exported or written.
pub async fn save_to_jsonl(store: &dyn DependencyStore, path: &Path) -> Result<()> {
    let edges = store.export_all().await?;
    write_jsonl_atomic(path, &edges).await?;
    tracing::debug!(path = %path.display(), edges = edges.len(), "Saved dependency edges");
    Ok(())
}
