//! taskdeps - a task dependency graph engine.
//!
//! Maintains a directed graph of "depends-on" relationships between tasks,
//! guarantees it never contains a cycle, explains why a proposed edge would
//! create one, and answers derived questions such as "is this task still
//! blocked?" or "what does this project's dependency graph look like?".
//!
//! The entry point is [`service::DependencyService`]. Tasks are resolved
//! through the [`lookup::TaskLookup`] trait; edges live behind the
//! [`storage::DependencyStore`] trait.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use taskdeps::domain::{NewDependency, ProjectId, Task, TaskId, TaskStatus};
//! use taskdeps::lookup::{InMemoryTaskLookup, TaskLookup};
//! use taskdeps::service::DependencyService;
//! use taskdeps::storage::in_memory::InMemoryStore;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> taskdeps::error::Result<()> {
//! let task = |id: &str| Task {
//!     id: TaskId::new(id),
//!     code: id.to_uppercase(),
//!     title: format!("Task {id}"),
//!     status: TaskStatus::Todo,
//!     project_id: ProjectId::new("web"),
//! };
//! let tasks: Arc<dyn TaskLookup> =
//!     Arc::new(InMemoryTaskLookup::with_tasks([task("a"), task("b")]));
//! let store = Arc::new(InMemoryStore::new(tasks.clone()));
//! let service = DependencyService::new(store, tasks);
//!
//! service.add_dependency(NewDependency::blocks("a", "b", "alice")).await?;
//! let cycle = service
//!     .detect_circular_dependency(&TaskId::new("b"), &TaskId::new("a"))
//!     .await?;
//! assert!(cycle.has_cycle);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod cycle;
pub mod domain;
pub mod error;
pub mod graph_builder;
pub mod id_generation;
pub mod jsonl;
pub mod lookup;
pub mod output;
pub mod service;
pub mod storage;
pub mod validator;
