//! Validation of proposed dependency edges.
//!
//! Checks run in a fixed order and stop at the first failing stage:
//!
//! 1. Existence of both tasks
//! 2. Duplicate pair
//! 3. Cycle (self reference or circular path)
//! 4. Soft policy checks, which only ever add warnings
//!
//! The outcome is returned as data; nothing here raises an error for an
//! invalid edge. Errors are reserved for store and lookup failures.

use crate::cycle::CycleDetector;
use crate::domain::{Task, TaskId, ValidationCode, ValidationIssue, ValidationResult};
use crate::error::Result;
use crate::lookup::TaskLookup;
use crate::storage::DependencyStore;
use std::sync::Arc;
use tracing::debug;

const TASK_FIELD: &str = "task_id";
const DEPENDS_ON_FIELD: &str = "depends_on_task_id";

/// Validates proposed `task -> prerequisite` edges.
#[derive(Clone)]
pub struct DependencyValidator {
    store: Arc<dyn DependencyStore>,
    tasks: Arc<dyn TaskLookup>,
    cycles: CycleDetector,
}

impl DependencyValidator {
    /// Create a validator sharing the given store, lookup and cycle detector
    pub fn new(
        store: Arc<dyn DependencyStore>,
        tasks: Arc<dyn TaskLookup>,
        cycles: CycleDetector,
    ) -> Self {
        Self {
            store,
            tasks,
            cycles,
        }
    }

    /// Validate the edge `task_id -> depends_on_task_id`.
    ///
    /// # Errors
    ///
    /// Only infrastructure failures (store or lookup) are errors; every
    /// validation finding is reported in the returned [`ValidationResult`].
    pub async fn validate(
        &self,
        task_id: &TaskId,
        depends_on_task_id: &TaskId,
    ) -> Result<ValidationResult> {
        let mut result = ValidationResult::default();

        let (task, depends_on) = tokio::try_join!(
            self.tasks.get_task(task_id),
            self.tasks.get_task(depends_on_task_id)
        )?;

        if task.is_none() {
            result.push_error(ValidationIssue::new(
                TASK_FIELD,
                format!("Task {} not found", task_id),
                ValidationCode::TaskNotFound,
            ));
        }
        if depends_on.is_none() {
            result.push_error(ValidationIssue::new(
                DEPENDS_ON_FIELD,
                format!("Dependency task {} not found", depends_on_task_id),
                ValidationCode::DependsOnTaskNotFound,
            ));
        }
        let (Some(task), Some(depends_on)) = (task, depends_on) else {
            debug!(task_id = %task_id, depends_on_task_id = %depends_on_task_id, "Validation stopped: unknown task");
            return Ok(result);
        };

        if self.store.exists(task_id, depends_on_task_id).await? {
            result.push_error(ValidationIssue::new(
                DEPENDS_ON_FIELD,
                format!(
                    "{} already depends on {}",
                    task.code, depends_on.code
                ),
                ValidationCode::DependencyExists,
            ));
            return Ok(result);
        }

        if task_id == depends_on_task_id {
            let detection = self.cycles.detect(task_id, depends_on_task_id).await?;
            result.push_error(ValidationIssue::new(
                DEPENDS_ON_FIELD,
                "A task cannot depend on itself",
                ValidationCode::SelfReference,
            ));
            result.cycle_detection = Some(detection);
            return Ok(result);
        }

        let detection = self.cycles.detect(task_id, depends_on_task_id).await?;
        if detection.has_cycle {
            result.push_error(ValidationIssue::new(
                DEPENDS_ON_FIELD,
                format!(
                    "Adding this dependency would create a cycle: {}",
                    detection.description
                ),
                ValidationCode::CircularDependency,
            ));
            result.cycle_detection = Some(detection);
            return Ok(result);
        }

        policy_warnings(&task, &depends_on, &mut result);

        debug!(
            task_id = %task_id,
            depends_on_task_id = %depends_on_task_id,
            warnings = result.warnings.len(),
            "Dependency validated"
        );
        Ok(result)
    }
}

/// Soft checks that never make an edge invalid
fn policy_warnings(task: &Task, depends_on: &Task, result: &mut ValidationResult) {
    if task.project_id != depends_on.project_id {
        result.push_warning(ValidationIssue::new(
            DEPENDS_ON_FIELD,
            format!(
                "{} belongs to project {}, {} to project {}",
                task.code, task.project_id, depends_on.code, depends_on.project_id
            ),
            ValidationCode::CrossProjectDependency,
        ));
    }

    if depends_on.status.is_terminal() {
        result.push_warning(ValidationIssue::new(
            DEPENDS_ON_FIELD,
            format!(
                "{} is already {}; this dependency will not block",
                depends_on.code, depends_on.status
            ),
            ValidationCode::DependencyAlreadyCompleted,
        ));
    }
}
