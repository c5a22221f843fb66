//! Configuration for a taskdeps repository.
//!
//! A repository is a directory containing `.taskdeps/config.yaml`:
//!
//! ```yaml
//! tasks-file: .taskdeps/tasks.jsonl
//! dependencies-file: .taskdeps/dependencies.jsonl
//! max-traversal-depth: 100
//! ```
//!
//! Paths are relative to the directory holding `.taskdeps/`.

use crate::error::{Error, Result};
use crate::storage::{DEFAULT_MAX_DEPTH, StorageBackend};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Name of the taskdeps directory
pub const TASKDEPS_DIR_NAME: &str = ".taskdeps";

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Name of the task fixture file
pub const TASKS_FILE_NAME: &str = "tasks.jsonl";

/// Name of the dependency edge file
pub const DEPENDENCIES_FILE_NAME: &str = "dependencies.jsonl";

/// Maximum directory depth to traverse when searching for the repository root
pub const MAX_TRAVERSAL_DEPTH: usize = 256;

/// Contents of `.taskdeps/config.yaml`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct TaskdepsConfig {
    /// Task table read by the CLI's task lookup
    pub tasks_file: String,

    /// Dependency edge file
    pub dependencies_file: String,

    /// Bound on dependency traversals
    #[serde(default = "default_max_depth")]
    pub max_traversal_depth: usize,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for TaskdepsConfig {
    fn default() -> Self {
        Self {
            tasks_file: format!("{}/{}", TASKDEPS_DIR_NAME, TASKS_FILE_NAME),
            dependencies_file: format!("{}/{}", TASKDEPS_DIR_NAME, DEPENDENCIES_FILE_NAME),
            max_traversal_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl TaskdepsConfig {
    /// Load configuration from a file
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let config: Self =
            serde_yaml::from_str(&content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {}", e)))?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Check that the values are usable
    pub fn validate(&self) -> Result<()> {
        if self.tasks_file.trim().is_empty() {
            return Err(Error::Config("tasks-file cannot be empty".to_string()));
        }
        if self.dependencies_file.trim().is_empty() {
            return Err(Error::Config("dependencies-file cannot be empty".to_string()));
        }
        if self.max_traversal_depth == 0 {
            return Err(Error::Config(
                "max-traversal-depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Absolute path of the task table under `root`
    pub fn tasks_path(&self, root: &Path) -> PathBuf {
        root.join(&self.tasks_file)
    }

    /// Storage backend for the dependency file under `root`
    pub fn storage_backend(&self, root: &Path) -> StorageBackend {
        StorageBackend::Jsonl(root.join(&self.dependencies_file))
    }
}

/// Find the repository root by searching up the directory tree.
///
/// Returns the first directory (starting at `start_dir`) that contains
/// `.taskdeps/`, or `None` once the filesystem root or the traversal limit
/// is reached.
pub fn find_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    let mut depth = 0;

    loop {
        if current.join(TASKDEPS_DIR_NAME).is_dir() {
            return Some(current);
        }

        depth += 1;
        if depth > MAX_TRAVERSAL_DEPTH || !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[test]
    fn test_yaml_uses_kebab_case_keys() {
        let yaml = serde_yaml::to_string(&TaskdepsConfig::default()).unwrap();
        assert!(yaml.contains("tasks-file: .taskdeps/tasks.jsonl"));
        assert!(yaml.contains("dependencies-file: .taskdeps/dependencies.jsonl"));
        assert!(yaml.contains("max-traversal-depth: 100"));
    }

    #[test]
    fn test_max_depth_defaults_when_absent() {
        let yaml = "tasks-file: t.jsonl\ndependencies-file: d.jsonl\n";
        let config: TaskdepsConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.max_traversal_depth, DEFAULT_MAX_DEPTH);
    }

    #[rstest]
    #[case::empty_tasks("", "d.jsonl", 10)]
    #[case::empty_dependencies("t.jsonl", "  ", 10)]
    #[case::zero_depth("t.jsonl", "d.jsonl", 0)]
    fn test_validate_rejects(#[case] tasks: &str, #[case] deps: &str, #[case] depth: usize) {
        let config = TaskdepsConfig {
            tasks_file: tasks.to_string(),
            dependencies_file: deps.to_string(),
            max_traversal_depth: depth,
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        let config = TaskdepsConfig {
            max_traversal_depth: 25,
            ..TaskdepsConfig::default()
        };

        config.save(&path).await.unwrap();
        assert_eq!(TaskdepsConfig::load(&path).await.unwrap(), config);
    }

    #[tokio::test]
    async fn test_load_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "tasks-file: [unclosed").unwrap();

        assert!(matches!(
            TaskdepsConfig::load(&path).await,
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_find_root_from_subdirectory() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir(temp_dir.path().join(TASKDEPS_DIR_NAME)).unwrap();
        let nested = temp_dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_root(&nested), Some(temp_dir.path().to_path_buf()));
    }

    #[test]
    fn test_find_root_missing() {
        let temp_dir = TempDir::new().unwrap();
        // Any ancestor of a fresh temp dir could in theory hold .taskdeps,
        // so only check that a found root is never the temp dir itself
        assert_ne!(find_root(temp_dir.path()), Some(temp_dir.path().to_path_buf()));
    }
}
