//! Implementation of the `init` command.
//!
//! Creates the `.taskdeps/` directory with a default configuration and empty
//! task and dependency files.

use crate::config::{
    CONFIG_FILE_NAME, DEPENDENCIES_FILE_NAME, TASKDEPS_DIR_NAME, TASKS_FILE_NAME, TaskdepsConfig,
};
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Name of the gitignore file within .taskdeps
pub const GITIGNORE_FILE_NAME: &str = ".gitignore";

/// Result of the init command
#[derive(Debug)]
pub struct InitResult {
    /// Path to the created .taskdeps directory
    pub taskdeps_dir: PathBuf,
    /// Path to the created config file
    pub config_file: PathBuf,
    /// Path to the created task file
    pub tasks_file: PathBuf,
    /// Path to the created dependency file
    pub dependencies_file: PathBuf,
}

/// Initialize a new taskdeps repository in `base_dir`.
///
/// # Errors
///
/// Returns an error if:
/// - `.taskdeps/` already exists
/// - `max_traversal_depth` is zero
/// - File system operations fail
pub async fn init(base_dir: &Path, max_traversal_depth: Option<usize>) -> Result<InitResult> {
    let taskdeps_dir = base_dir.join(TASKDEPS_DIR_NAME);

    if taskdeps_dir.exists() {
        return Err(Error::Config(format!(
            "taskdeps is already initialized in this directory. Found existing '{}'",
            TASKDEPS_DIR_NAME
        )));
    }

    let mut config = TaskdepsConfig::default();
    if let Some(depth) = max_traversal_depth {
        config.max_traversal_depth = depth;
    }
    config.validate()?;

    fs::create_dir_all(&taskdeps_dir).await?;

    let config_file = taskdeps_dir.join(CONFIG_FILE_NAME);
    config.save(&config_file).await?;

    let tasks_file = taskdeps_dir.join(TASKS_FILE_NAME);
    fs::write(&tasks_file, "").await?;

    let dependencies_file = taskdeps_dir.join(DEPENDENCIES_FILE_NAME);
    fs::write(&dependencies_file, "").await?;

    let gitignore_content = "\
# Temp files left behind by an interrupted save
*.tmp
";
    fs::write(taskdeps_dir.join(GITIGNORE_FILE_NAME), gitignore_content).await?;

    tracing::info!(path = %taskdeps_dir.display(), "Initialized taskdeps repository");

    Ok(InitResult {
        taskdeps_dir,
        config_file,
        tasks_file,
        dependencies_file,
    })
}

/// Check if a directory has been initialized with taskdeps
pub fn is_initialized(base_dir: &Path) -> bool {
    base_dir.join(TASKDEPS_DIR_NAME).exists()
}
