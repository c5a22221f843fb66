//! Domain types for the task dependency graph.
//!
//! Tasks are owned by an external collaborator and only ever read here.
//! The one relation this crate owns is the dependency edge: a directed
//! "depends-on" link from a dependent task to its prerequisite.

pub mod validation;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use validation::{CycleDetectionResult, ValidationCode, ValidationIssue, ValidationResult};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new identifier
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the identifier as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(
    /// Unique identifier for a task
    TaskId
);

string_id!(
    /// Unique identifier for a project
    ProjectId
);

string_id!(
    /// Unique identifier for a dependency edge
    DependencyId
);

/// Workflow status of a task.
///
/// Only [`TaskStatus::is_terminal`] matters to the dependency engine; the
/// transitions between statuses belong to the task owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started
    Todo,

    /// Being worked on
    InProgress,

    /// Waiting for review
    InReview,

    /// Flagged as blocked by its owner
    Blocked,

    /// Completed
    Done,

    /// Abandoned
    Cancelled,
}

impl TaskStatus {
    /// Whether the task has reached a final state.
    ///
    /// A `Blocks` dependency on a terminal prerequisite no longer blocks.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Cancelled)
    }

    /// The serialized (snake_case) name of the status
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::InReview => "in_review",
            Self::Blocked => "blocked",
            Self::Done => "done",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task as resolved through [`TaskLookup`](crate::lookup::TaskLookup).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,

    /// Short human-facing code (e.g. "WEB-12")
    pub code: String,

    /// Task title
    pub title: String,

    /// Current workflow status
    pub status: TaskStatus,

    /// Owning project
    pub project_id: ProjectId,
}

impl Task {
    /// Project this task down to the fields shown next to an edge or graph node
    pub fn summary(&self) -> TaskSummary {
        TaskSummary {
            id: self.id.clone(),
            code: self.code.clone(),
            title: self.title.clone(),
            status: self.status,
        }
    }
}

/// The identifying fields of a task, as joined onto edges and graph nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSummary {
    /// Task identifier
    pub id: TaskId,

    /// Task code
    pub code: String,

    /// Task title
    pub title: String,

    /// Task status at the time of the query
    pub status: TaskStatus,
}

/// Kind of dependency relationship.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DependencyType {
    /// Hard prerequisite: the dependent waits until the prerequisite is terminal
    #[default]
    Blocks,

    /// Informational link; does not block but still counts for acyclicity
    RelatesTo,
}

impl DependencyType {
    /// The serialized name (`BLOCKS` / `RELATES_TO`)
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blocks => "BLOCKS",
            Self::RelatesTo => "RELATES_TO",
        }
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DependencyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "BLOCKS" => Ok(Self::Blocks),
            "RELATES_TO" => Ok(Self::RelatesTo),
            other => Err(format!(
                "unknown dependency type '{}' (expected BLOCKS or RELATES_TO)",
                other
            )),
        }
    }
}

/// A persisted dependency edge.
///
/// Direction is dependent -> prerequisite: `task_id` needs `depends_on_task_id`.
/// Edges are never mutated in place; they are created and deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// Edge identifier
    pub id: DependencyId,

    /// The dependent task
    pub task_id: TaskId,

    /// The prerequisite task
    pub depends_on_task_id: TaskId,

    /// Relationship kind
    pub dependency_type: DependencyType,

    /// Who created the edge
    pub created_by: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Data for creating a new dependency edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDependency {
    /// The dependent task
    pub task_id: TaskId,

    /// The prerequisite task
    pub depends_on_task_id: TaskId,

    /// Relationship kind (defaults to `Blocks`)
    pub dependency_type: DependencyType,

    /// Who is creating the edge
    pub created_by: String,
}

impl NewDependency {
    /// A `Blocks` dependency of `task_id` on `depends_on_task_id`
    pub fn blocks(
        task_id: impl Into<TaskId>,
        depends_on_task_id: impl Into<TaskId>,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            depends_on_task_id: depends_on_task_id.into(),
            dependency_type: DependencyType::Blocks,
            created_by: created_by.into(),
        }
    }

    /// Replace the dependency type
    #[must_use]
    pub fn with_type(mut self, dependency_type: DependencyType) -> Self {
        self.dependency_type = dependency_type;
        self
    }
}

/// An edge joined with the task on its opposite side.
///
/// For `dependencies_of` the joined task is the prerequisite; for
/// `dependents_of` it is the dependent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedDependency {
    /// The edge itself
    #[serde(flatten)]
    pub edge: DependencyEdge,

    /// The task on the other end of the edge
    pub task: TaskSummary,
}

/// Result of a successful `add_dependency`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddedDependency {
    /// Identifier of the created edge
    pub id: DependencyId,

    /// Soft policy warnings raised during validation
    pub warnings: Vec<ValidationIssue>,
}

/// Answer to "is this task still waiting on a prerequisite?"
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockingStatus {
    /// True when at least one `Blocks` prerequisite is not terminal
    pub has_blocking: bool,

    /// The non-terminal `Blocks` prerequisites
    pub blocking_tasks: Vec<TaskSummary>,
}

/// An edge in the visualization view of a project graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Dependent task
    pub from: TaskId,

    /// Prerequisite task
    pub to: TaskId,

    /// Relationship kind
    #[serde(rename = "type")]
    pub dependency_type: DependencyType,
}

/// Node/edge projection of a project's dependency graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyGraph {
    /// Every resolvable task touched by an edge
    pub nodes: Vec<TaskSummary>,

    /// Every edge whose dependent belongs to the project
    pub edges: Vec<GraphEdge>,
}
