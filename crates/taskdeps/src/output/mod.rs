//! Output formatting for CLI commands.
//!
//! Every command renders either human-readable text or JSON. Text renderers
//! write to any `io::Write` so they can be tested against a buffer; the
//! `print_*` dispatchers pick stdout and the mode.

pub mod color;

use crate::domain::{
    AddedDependency, BlockingStatus, CycleDetectionResult, DependencyGraph, LinkedDependency,
    TaskId, ValidationIssue, ValidationResult,
};
use serde::Serialize;
use std::env;
use std::io::{self, Write};

pub use color::{error, info, success, warning};

use color::{bold, colorize_status, dimmed, status_icon};

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

/// Settings that control text rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Whether to use ASCII-only icons instead of Unicode.
    pub use_ascii: bool,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create a new OutputConfig with explicit values.
    pub fn new(use_ascii: bool, use_colors: bool) -> Self {
        Self {
            use_ascii,
            use_colors,
        }
    }

    /// Create an OutputConfig by reading from environment variables.
    ///
    /// Reads:
    /// - `TASKDEPS_ASCII`: "1" or "true" for ASCII-only icons (default: false)
    /// - `NO_COLOR`: any value disables colors
    /// - `TASKDEPS_COLOR`: "0" or "false" disables colors (default: true)
    pub fn from_env() -> Self {
        let use_ascii = match env::var("TASKDEPS_ASCII") {
            Ok(v) if v == "1" || v.eq_ignore_ascii_case("true") => true,
            Ok(v) if v == "0" || v.eq_ignore_ascii_case("false") || v.is_empty() => false,
            Ok(v) => {
                tracing::warn!(
                    env_var = "TASKDEPS_ASCII",
                    value = %v,
                    "Invalid value (expected '1', 'true', '0', or 'false'), using default"
                );
                false
            }
            Err(_) => false,
        };

        // Respect NO_COLOR (https://no-color.org/)
        let use_colors = env::var("NO_COLOR").is_err()
            && env::var("TASKDEPS_COLOR")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true);

        Self {
            use_ascii,
            use_colors,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::new(false, true)
    }
}

// ============================================================================
// Public Dispatch Functions
// ============================================================================

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(handle, "{}", json)
}

/// Render to stdout as text, or print `value` as JSON
fn dispatch<T, F>(value: &T, mode: OutputMode, render: F) -> io::Result<()>
where
    T: Serialize,
    F: FnOnce(&mut io::StdoutLock<'static>, &OutputConfig) -> io::Result<()>,
{
    match mode {
        OutputMode::Json => print_json(value),
        OutputMode::Text => {
            let mut handle = io::stdout().lock();
            render(&mut handle, &OutputConfig::from_env())
        }
    }
}

/// Print the outcome of `add`
pub fn print_added(
    added: &AddedDependency,
    task_id: &TaskId,
    depends_on_task_id: &TaskId,
    mode: OutputMode,
) -> io::Result<()> {
    dispatch(added, mode, |w, config| {
        write_added(w, added, task_id, depends_on_task_id, config)
    })
}

/// Print a validation result
pub fn print_validation(result: &ValidationResult, mode: OutputMode) -> io::Result<()> {
    dispatch(result, mode, |w, config| write_validation(w, result, config))
}

/// Print a cycle detection result
pub fn print_cycle(result: &CycleDetectionResult, mode: OutputMode) -> io::Result<()> {
    dispatch(result, mode, |w, config| write_cycle(w, result, config))
}

/// Print a blocking status
pub fn print_blocking(task_id: &TaskId, status: &BlockingStatus, mode: OutputMode) -> io::Result<()> {
    dispatch(status, mode, |w, config| {
        write_blocking(w, task_id, status, config)
    })
}

/// Print a project graph
pub fn print_graph(project: &str, graph: &DependencyGraph, mode: OutputMode) -> io::Result<()> {
    dispatch(graph, mode, |w, config| write_graph(w, project, graph, config))
}

/// Print the dependencies (or dependents) of a task
pub fn print_linked(
    task_id: &TaskId,
    linked: &[LinkedDependency],
    dependents: bool,
    mode: OutputMode,
) -> io::Result<()> {
    dispatch(&linked, mode, |w, config| {
        write_linked(w, task_id, linked, dependents, config)
    })
}

// ============================================================================
// Text Formatting
// ============================================================================

fn write_issues<W: Write>(
    w: &mut W,
    issues: &[ValidationIssue],
    paint: fn(&str, &OutputConfig) -> String,
    config: &OutputConfig,
) -> io::Result<()> {
    for issue in issues {
        writeln!(
            w,
            "  {} {}",
            paint(issue.code.as_str(), config),
            issue.message
        )?;
    }
    Ok(())
}

pub(crate) fn write_added<W: Write>(
    w: &mut W,
    added: &AddedDependency,
    task_id: &TaskId,
    depends_on_task_id: &TaskId,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(
        w,
        "{} {} {} {} {}",
        success("Added dependency", config),
        info(added.id.as_str(), config),
        task_id,
        dimmed("->", config),
        depends_on_task_id
    )?;
    if !added.warnings.is_empty() {
        writeln!(w, "{}", bold("Warnings:", config))?;
        write_issues(w, &added.warnings, warning, config)?;
    }
    Ok(())
}

pub(crate) fn write_validation<W: Write>(
    w: &mut W,
    result: &ValidationResult,
    config: &OutputConfig,
) -> io::Result<()> {
    if result.is_valid() {
        writeln!(w, "{}", success("Valid", config))?;
    } else {
        writeln!(w, "{}", error("Invalid", config))?;
        write_issues(w, &result.errors, error, config)?;
    }
    if !result.warnings.is_empty() {
        writeln!(w, "{}", bold("Warnings:", config))?;
        write_issues(w, &result.warnings, warning, config)?;
    }
    Ok(())
}

pub(crate) fn write_cycle<W: Write>(
    w: &mut W,
    result: &CycleDetectionResult,
    config: &OutputConfig,
) -> io::Result<()> {
    if result.has_cycle {
        writeln!(w, "{}", error("Cycle detected:", config))?;
        writeln!(w, "  {}", result.description)?;
    } else {
        writeln!(w, "{}", success("No cycle", config))?;
    }
    Ok(())
}

pub(crate) fn write_blocking<W: Write>(
    w: &mut W,
    task_id: &TaskId,
    status: &BlockingStatus,
    config: &OutputConfig,
) -> io::Result<()> {
    if !status.has_blocking {
        writeln!(w, "{} is not blocked", info(task_id.as_str(), config))?;
        return Ok(());
    }

    writeln!(
        w,
        "{} is blocked by {} task(s):",
        info(task_id.as_str(), config),
        status.blocking_tasks.len()
    )?;
    for task in &status.blocking_tasks {
        writeln!(
            w,
            "  {} {}  {}  {}",
            status_icon(task.status, config),
            info(&task.code, config),
            colorize_status(task.status, config),
            task.title
        )?;
    }
    Ok(())
}

pub(crate) fn write_graph<W: Write>(
    w: &mut W,
    project: &str,
    graph: &DependencyGraph,
    config: &OutputConfig,
) -> io::Result<()> {
    if graph.edges.is_empty() {
        writeln!(w, "No dependencies in project {}.", project)?;
        return Ok(());
    }

    writeln!(
        w,
        "{}",
        bold(
            &format!(
                "Project {}: {} task(s), {} dependency edge(s)",
                project,
                graph.nodes.len(),
                graph.edges.len()
            ),
            config
        )
    )?;
    writeln!(w)?;
    for node in &graph.nodes {
        writeln!(
            w,
            "{} {}  {}",
            status_icon(node.status, config),
            info(&node.code, config),
            node.title
        )?;
    }
    writeln!(w)?;
    for edge in &graph.edges {
        writeln!(
            w,
            "{} --[{}]--> {}",
            edge.from,
            dimmed(edge.dependency_type.as_str(), config),
            edge.to
        )?;
    }
    Ok(())
}

pub(crate) fn write_linked<W: Write>(
    w: &mut W,
    task_id: &TaskId,
    linked: &[LinkedDependency],
    dependents: bool,
    config: &OutputConfig,
) -> io::Result<()> {
    let noun = if dependents { "dependents" } else { "dependencies" };
    if linked.is_empty() {
        writeln!(w, "{} has no {}.", task_id, noun)?;
        return Ok(());
    }

    writeln!(
        w,
        "{} has {} {}:",
        info(task_id.as_str(), config),
        linked.len(),
        noun
    )?;
    for dep in linked {
        writeln!(
            w,
            "  {} {}  {}  {}  {}",
            status_icon(dep.task.status, config),
            info(&dep.task.code, config),
            colorize_status(dep.task.status, config),
            dimmed(dep.edge.dependency_type.as_str(), config),
            dep.task.title
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        DependencyEdge, DependencyId, DependencyType, GraphEdge, TaskStatus, TaskSummary,
        ValidationCode,
    };
    use chrono::Utc;

    fn plain() -> OutputConfig {
        OutputConfig::new(true, false)
    }

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn summary(code: &str, status: TaskStatus) -> TaskSummary {
        TaskSummary {
            id: TaskId::new(code.to_lowercase()),
            code: code.to_string(),
            title: format!("Title {}", code),
            status,
        }
    }

    #[test]
    fn test_write_added_with_warnings() {
        let added = AddedDependency {
            id: DependencyId::new("dep-abc"),
            warnings: vec![ValidationIssue::new(
                "depends_on_task_id",
                "B is already done",
                ValidationCode::DependencyAlreadyCompleted,
            )],
        };
        let out = render(|w| {
            write_added(w, &added, &TaskId::new("a"), &TaskId::new("b"), &plain())
        });

        assert!(out.starts_with("Added dependency dep-abc a -> b"));
        assert!(out.contains("DEPENDENCY_ALREADY_COMPLETED B is already done"));
    }

    #[test]
    fn test_write_validation_invalid() {
        let mut result = ValidationResult::default();
        result.push_error(ValidationIssue::new(
            "task_id",
            "Task x not found",
            ValidationCode::TaskNotFound,
        ));
        let out = render(|w| write_validation(w, &result, &plain()));

        assert!(out.starts_with("Invalid"));
        assert!(out.contains("TASK_NOT_FOUND Task x not found"));
    }

    #[test]
    fn test_write_cycle() {
        let result = CycleDetectionResult {
            has_cycle: true,
            cycle_path: None,
            description: "B (b) → A (a) → B (b)".to_string(),
        };
        let out = render(|w| write_cycle(w, &result, &plain()));
        assert_eq!(out, "Cycle detected:\n  B (b) → A (a) → B (b)\n");

        let out = render(|w| write_cycle(w, &CycleDetectionResult::none(), &plain()));
        assert_eq!(out, "No cycle\n");
    }

    #[test]
    fn test_write_blocking() {
        let status = BlockingStatus {
            has_blocking: true,
            blocking_tasks: vec![summary("B", TaskStatus::InProgress)],
        };
        let out = render(|w| write_blocking(w, &TaskId::new("a"), &status, &plain()));
        assert!(out.contains("a is blocked by 1 task(s):"));
        assert!(out.contains("> B  in_progress  Title B"));
    }

    #[test]
    fn test_write_graph() {
        let graph = DependencyGraph {
            nodes: vec![summary("A", TaskStatus::Todo), summary("B", TaskStatus::Done)],
            edges: vec![GraphEdge {
                from: TaskId::new("a"),
                to: TaskId::new("b"),
                dependency_type: DependencyType::Blocks,
            }],
        };
        let out = render(|w| write_graph(w, "web", &graph, &plain()));
        assert!(out.contains("Project web: 2 task(s), 1 dependency edge(s)"));
        assert!(out.contains("a --[BLOCKS]--> b"));

        let out = render(|w| write_graph(w, "web", &DependencyGraph::default(), &plain()));
        assert_eq!(out, "No dependencies in project web.\n");
    }

    #[test]
    fn test_write_linked() {
        let linked = vec![LinkedDependency {
            edge: DependencyEdge {
                id: DependencyId::new("dep-1"),
                task_id: TaskId::new("a"),
                depends_on_task_id: TaskId::new("b"),
                dependency_type: DependencyType::RelatesTo,
                created_by: "u".to_string(),
                created_at: Utc::now(),
            },
            task: summary("B", TaskStatus::Todo),
        }];
        let out = render(|w| write_linked(w, &TaskId::new("a"), &linked, false, &plain()));
        assert!(out.contains("a has 1 dependencies:"));
        assert!(out.contains("RELATES_TO"));

        let out = render(|w| write_linked(w, &TaskId::new("a"), &[], true, &plain()));
        assert_eq!(out, "a has no dependents.\n");
    }
}
