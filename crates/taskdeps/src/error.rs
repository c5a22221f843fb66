//! Error types for taskdeps operations.
//!
//! Errors fall into two kinds:
//!
//! - **Input errors**: the caller can correct them (`InvalidDependency`,
//!   `DuplicateDependency`, `SelfReference`, `CircularDependency`,
//!   `TaskNotFound`)
//! - **Infrastructure errors**: the backing store or task lookup failed
//!   (`Io`, `Json`, `Config`, `Storage`, `Lookup`, `VersionConflict`)
//!
//! Validation problems are normally returned as data in a
//! [`ValidationResult`]; only `add_dependency` turns them into an error.

use crate::domain::{TaskId, ValidationResult};
use std::io;
use thiserror::Error;

/// The error type for taskdeps operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Backend storage error.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The task lookup collaborator failed.
    #[error("Task lookup failed: {0}")]
    Lookup(String),

    /// Task not found.
    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    /// The proposed dependency failed validation.
    ///
    /// `message` joins every validation error; `result` carries the details.
    #[error("Invalid dependency: {message}")]
    InvalidDependency {
        /// Joined error messages
        message: String,
        /// Full validation outcome
        result: Box<ValidationResult>,
    },

    /// An edge for this pair already exists.
    #[error("Dependency already exists: {task_id} -> {depends_on_task_id}")]
    DuplicateDependency {
        /// The dependent task
        task_id: TaskId,
        /// The prerequisite task
        depends_on_task_id: TaskId,
    },

    /// A task cannot depend on itself.
    #[error("Task {0} cannot depend on itself")]
    SelfReference(TaskId),

    /// The edge would close a cycle; raised by the store itself.
    #[error("Dependency {task_id} -> {depends_on_task_id} would create a cycle")]
    CircularDependency {
        /// The dependent task
        task_id: TaskId,
        /// The prerequisite task
        depends_on_task_id: TaskId,
    },

    /// The graph changed between validation and write.
    #[error("Dependency graph changed concurrently (expected version {expected}, found {actual})")]
    VersionConflict {
        /// Version observed before validation
        expected: u64,
        /// Version found at write time
        actual: u64,
    },
}

impl Error {
    /// Whether this error comes from the store or lookup rather than the caller's input
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            Self::Io(_)
                | Self::Json(_)
                | Self::Config(_)
                | Self::Storage(_)
                | Self::Lookup(_)
                | Self::VersionConflict { .. }
        )
    }

    /// Whether the caller should retry the same request
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }

    /// The validation outcome behind an `InvalidDependency` error
    pub fn validation_result(&self) -> Option<&ValidationResult> {
        match self {
            Self::InvalidDependency { result, .. } => Some(result),
            _ => None,
        }
    }
}

/// A specialized Result type for taskdeps operations.
pub type Result<T> = std::result::Result<T, Error>;
