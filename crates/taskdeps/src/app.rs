//! Application context for CLI command execution.
//!
//! [`App`] finds the repository, loads its configuration and task table, opens
//! the dependency store and builds the [`DependencyService`] the commands run
//! against.
//!
//! # Example
//!
//! ```no_run
//! use taskdeps::app::App;
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::from_directory(Path::new(".")).await?;
//!     let graph = app.service().get_dependency_graph(&"web".into()).await?;
//!     println!("{} edges", graph.edges.len());
//!     Ok(())
//! }
//! ```

use crate::config::{CONFIG_FILE_NAME, TASKDEPS_DIR_NAME, TaskdepsConfig, find_root};
use crate::domain::Task;
use crate::error::{Error, Result};
use crate::jsonl::read_jsonl_resilient;
use crate::lookup::{InMemoryTaskLookup, TaskLookup};
use crate::service::DependencyService;
use crate::storage::create_storage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

/// Application context for CLI operations.
pub struct App {
    service: DependencyService,
    tasks: InMemoryTaskLookup,
    root_dir: PathBuf,
    config: TaskdepsConfig,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("root_dir", &self.root_dir)
            .field("config", &self.config)
            .field("service", &"<DependencyService>")
            .finish()
    }
}

impl App {
    /// Create an App from the given working directory.
    ///
    /// Searches up the directory tree for `.taskdeps/`, loads the
    /// configuration, the task table and the dependency file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No taskdeps repository is found in the directory tree
    /// - Configuration cannot be loaded
    /// - The task or dependency file cannot be read
    pub async fn from_directory(working_dir: &Path) -> Result<Self> {
        let root_dir = find_root(working_dir).ok_or_else(|| {
            Error::Config(format!(
                "Not a taskdeps repository (or any parent). Run 'taskdeps init' to create '{}'",
                TASKDEPS_DIR_NAME
            ))
        })?;

        let config_path = root_dir.join(TASKDEPS_DIR_NAME).join(CONFIG_FILE_NAME);
        let config = TaskdepsConfig::load(&config_path).await?;

        let tasks = load_tasks(&config.tasks_path(&root_dir)).await?;
        let lookup: Arc<dyn TaskLookup> = Arc::new(tasks.clone());

        let store = create_storage(config.storage_backend(&root_dir), lookup.clone()).await?;
        let service =
            DependencyService::with_max_depth(store, lookup, config.max_traversal_depth);

        Ok(Self {
            service,
            tasks,
            root_dir,
            config,
        })
    }

    /// The dependency service
    pub fn service(&self) -> &DependencyService {
        &self.service
    }

    /// The task table loaded from the tasks file
    pub fn tasks(&self) -> &InMemoryTaskLookup {
        &self.tasks
    }

    /// Directory containing `.taskdeps/`
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Loaded configuration
    pub fn config(&self) -> &TaskdepsConfig {
        &self.config
    }

    /// Save the dependency edges to disk.
    ///
    /// On failure the in-memory state is reloaded from disk so it does not
    /// drift from what was persisted, and the save error is returned.
    pub async fn save(&self) -> Result<()> {
        let store = self.service.store();
        if let Err(e) = store.save().await {
            if let Err(reload_err) = store.reload().await {
                warn!(error = %reload_err, "Failed to reload dependencies after save error");
            }
            return Err(e);
        }
        Ok(())
    }
}

/// Load the task table, skipping malformed lines with a warning.
///
/// A missing file yields an empty table.
async fn load_tasks(path: &Path) -> Result<InMemoryTaskLookup> {
    if !path.exists() {
        warn!(path = %path.display(), "Task file not found; no tasks will resolve");
        return Ok(InMemoryTaskLookup::new());
    }

    let (tasks, malformed) = read_jsonl_resilient::<Task>(path).await?;
    for line in &malformed {
        warn!(
            path = %path.display(),
            line_number = line.line_number,
            error = %line.error,
            "Skipping malformed task line"
        );
    }
    Ok(InMemoryTaskLookup::with_tasks(tasks))
}
