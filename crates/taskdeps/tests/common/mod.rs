//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::process::{Command, Output};
use std::sync::Arc;
use taskdeps::domain::{ProjectId, Task, TaskId, TaskStatus};
use taskdeps::lookup::{InMemoryTaskLookup, TaskLookup};
use taskdeps::service::DependencyService;
use taskdeps::storage::DependencyStore;
use taskdeps::storage::in_memory::InMemoryStore;

/// A task whose code is the uppercased id and title "Task <id>"
pub fn task(id: &str, project: &str, status: TaskStatus) -> Task {
    Task {
        id: TaskId::new(id),
        code: id.to_uppercase(),
        title: format!("Task {}", id),
        status,
        project_id: ProjectId::new(project),
    }
}

/// `Todo` tasks in project `p1`
pub fn todo_tasks(ids: &[&str]) -> Vec<Task> {
    ids.iter().map(|id| task(id, "p1", TaskStatus::Todo)).collect()
}

/// Everything a test needs to drive the service and poke at its collaborators
pub struct Fixture {
    pub service: DependencyService,
    pub store: Arc<dyn DependencyStore>,
    pub tasks: InMemoryTaskLookup,
}

impl Fixture {
    pub fn new(tasks: Vec<Task>) -> Self {
        let lookup = InMemoryTaskLookup::with_tasks(tasks);
        let shared: Arc<dyn TaskLookup> = Arc::new(lookup.clone());
        let store: Arc<dyn DependencyStore> = Arc::new(InMemoryStore::new(shared.clone()));
        Self {
            service: DependencyService::new(store.clone(), shared),
            store,
            tasks: lookup,
        }
    }
}

pub fn id(s: &str) -> TaskId {
    TaskId::new(s)
}

/// Run the taskdeps binary in the specified directory
pub fn run_taskdeps_in_dir(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_taskdeps"))
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute taskdeps binary")
}
