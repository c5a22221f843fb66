//! Validation and cycle-detection result types.

use super::TaskId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Machine-readable code attached to every validation error or warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationCode {
    /// The dependent task does not resolve
    TaskNotFound,

    /// The prerequisite task does not resolve
    DependsOnTaskNotFound,

    /// The (task, prerequisite) pair already has an edge
    DependencyExists,

    /// The edge would close a cycle
    CircularDependency,

    /// A task cannot depend on itself
    SelfReference,

    /// Warning: the tasks live in different projects
    CrossProjectDependency,

    /// Warning: the prerequisite is already terminal
    DependencyAlreadyCompleted,
}

impl ValidationCode {
    /// The serialized name of the code
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TaskNotFound => "TASK_NOT_FOUND",
            Self::DependsOnTaskNotFound => "DEPENDS_ON_TASK_NOT_FOUND",
            Self::DependencyExists => "DEPENDENCY_EXISTS",
            Self::CircularDependency => "CIRCULAR_DEPENDENCY",
            Self::SelfReference => "SELF_REFERENCE",
            Self::CrossProjectDependency => "CROSS_PROJECT_DEPENDENCY",
            Self::DependencyAlreadyCompleted => "DEPENDENCY_ALREADY_COMPLETED",
        }
    }
}

impl fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation error or warning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Input field the issue refers to
    pub field: String,

    /// Human-readable explanation
    pub message: String,

    /// Machine-readable code
    pub code: ValidationCode,
}

impl ValidationIssue {
    /// Create a new issue
    pub fn new(field: impl Into<String>, message: impl Into<String>, code: ValidationCode) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// Outcome of asking whether an edge would close a cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleDetectionResult {
    /// Whether the proposed edge closes a cycle
    pub has_cycle: bool,

    /// Task ids demonstrating the cycle, first and last entries equal
    pub cycle_path: Option<Vec<TaskId>>,

    /// Rendered path (`CODE (Title) → …`), empty when there is no cycle
    pub description: String,
}

impl CycleDetectionResult {
    /// The result for an edge that closes no cycle
    pub fn none() -> Self {
        Self {
            has_cycle: false,
            cycle_path: None,
            description: String::new(),
        }
    }
}

/// Result of validating a proposed dependency edge.
///
/// Errors make the edge invalid; warnings are informational and never
/// affect [`is_valid`](Self::is_valid).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Blocking problems
    pub errors: Vec<ValidationIssue>,

    /// Soft policy findings
    pub warnings: Vec<ValidationIssue>,

    /// Present when the cycle check ran and found a cycle
    pub cycle_detection: Option<CycleDetectionResult>,
}

impl ValidationResult {
    /// True iff there are no errors
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether any error or warning carries `code`
    pub fn has_code(&self, code: ValidationCode) -> bool {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .any(|issue| issue.code == code)
    }

    /// Error messages joined into one summary line
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub(crate) fn push_error(&mut self, issue: ValidationIssue) {
        self.errors.push(issue);
    }

    pub(crate) fn push_warning(&mut self, issue: ValidationIssue) {
        self.warnings.push(issue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warnings_do_not_affect_validity() {
        let mut result = ValidationResult::default();
        result.push_warning(ValidationIssue::new(
            "depends_on_task_id",
            "already done",
            ValidationCode::DependencyAlreadyCompleted,
        ));

        assert!(result.is_valid());
        assert!(result.has_code(ValidationCode::DependencyAlreadyCompleted));
    }

    #[test]
    fn test_error_summary_joins_messages() {
        let mut result = ValidationResult::default();
        result.push_error(ValidationIssue::new(
            "task_id",
            "Task a not found",
            ValidationCode::TaskNotFound,
        ));
        result.push_error(ValidationIssue::new(
            "depends_on_task_id",
            "Task b not found",
            ValidationCode::DependsOnTaskNotFound,
        ));

        assert!(!result.is_valid());
        assert_eq!(result.error_summary(), "Task a not found; Task b not found");
    }

    #[test]
    fn test_code_serializes_as_screaming_snake_case() {
        let json = serde_json::to_string(&ValidationCode::DependsOnTaskNotFound).unwrap();
        assert_eq!(json, format!("\"{}\"", ValidationCode::DependsOnTaskNotFound));
    }
}
