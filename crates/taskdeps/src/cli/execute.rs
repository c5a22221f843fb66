//! Command execution logic.
//!
//! This module contains the implementation of all CLI commands. Mutating
//! commands save the dependency file before reporting success.

use anyhow::{Context, Result, bail};

use super::args::{AddArgs, BlockingArgs, DepsArgs, GraphArgs, InitArgs, PairArgs, RemoveArgs};
use crate::app::App;
use crate::domain::{DependencyId, NewDependency, ProjectId, TaskId};
use crate::error::Error;
use crate::output::{self, OutputMode};

/// Fallback author when neither `--by` nor `$USER` is set
const DEFAULT_CREATED_BY: &str = "taskdeps";

/// Execute the init command
pub async fn execute_init(args: &InitArgs) -> Result<()> {
    use crate::commands::init;

    let current_dir = std::env::current_dir()?;

    if !args.quiet {
        println!("Initializing taskdeps repository...");
    }

    let result = init::init(&current_dir, args.max_depth).await?;

    if !args.quiet {
        println!("Initialized taskdeps in {}", result.taskdeps_dir.display());
        println!("  Config:       {}", result.config_file.display());
        println!("  Tasks:        {}", result.tasks_file.display());
        println!("  Dependencies: {}", result.dependencies_file.display());
    }

    Ok(())
}

/// Execute the add command
pub async fn execute_add(app: &App, args: &AddArgs, output_mode: OutputMode) -> Result<()> {
    let task_id = TaskId::new(&args.task);
    let depends_on_task_id = TaskId::new(&args.depends_on);
    let created_by = args
        .by
        .clone()
        .or_else(|| std::env::var("USER").ok())
        .unwrap_or_else(|| DEFAULT_CREATED_BY.to_string());

    let dependency = NewDependency::blocks(task_id.clone(), depends_on_task_id.clone(), created_by)
        .with_type(args.dep_type.into());

    match app.service().add_dependency(dependency).await {
        Ok(added) => {
            app.save().await?;
            output::print_added(&added, &task_id, &depends_on_task_id, output_mode)?;
            Ok(())
        }
        Err(Error::InvalidDependency { message, result }) => {
            output::print_validation(&result, output_mode)?;
            bail!("Invalid dependency: {}", message)
        }
        Err(e) if e.is_retryable() => {
            Err(e).context("The dependency graph changed while adding; run the command again")
        }
        Err(e) => Err(e.into()),
    }
}

/// Execute the remove command
pub async fn execute_remove(app: &App, args: &RemoveArgs, output_mode: OutputMode) -> Result<()> {
    let removed = match (&args.id, &args.task, &args.on) {
        (Some(id), _, _) => app.service().remove_dependency(&DependencyId::new(id)).await?,
        (None, Some(task), Some(on)) => {
            app.service()
                .remove_dependency_by_tasks(&TaskId::new(task), &TaskId::new(on))
                .await?
        }
        _ => bail!("Specify a dependency id, or both --task and --on"),
    };

    if removed {
        app.save().await?;
    }

    match output_mode {
        OutputMode::Json => {
            output::print_json(&serde_json::json!({
                "action": "remove",
                "id": args.id,
                "task": args.task,
                "on": args.on,
                "removed": removed
            }))?;
        }
        OutputMode::Text => {
            if removed {
                println!("Removed dependency");
            } else {
                println!("No matching dependency; nothing removed");
            }
        }
    }

    Ok(())
}

/// Execute the validate command
pub async fn execute_validate(app: &App, args: &PairArgs, output_mode: OutputMode) -> Result<()> {
    let result = app
        .service()
        .validate_dependency(&TaskId::new(&args.task), &TaskId::new(&args.depends_on))
        .await?;
    output::print_validation(&result, output_mode)?;
    Ok(())
}

/// Execute the check-cycle command
pub async fn execute_check_cycle(
    app: &App,
    args: &PairArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let result = app
        .service()
        .detect_circular_dependency(&TaskId::new(&args.task), &TaskId::new(&args.depends_on))
        .await?;
    output::print_cycle(&result, output_mode)?;
    Ok(())
}

/// Execute the blocking command
pub async fn execute_blocking(
    app: &App,
    args: &BlockingArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let task_id = TaskId::new(&args.task);
    let status = app
        .service()
        .has_uncompleted_blocking_dependencies(&task_id)
        .await?;
    output::print_blocking(&task_id, &status, output_mode)?;
    Ok(())
}

/// Execute the graph command
pub async fn execute_graph(app: &App, args: &GraphArgs, output_mode: OutputMode) -> Result<()> {
    let graph = app
        .service()
        .get_dependency_graph(&ProjectId::new(&args.project))
        .await?;
    output::print_graph(&args.project, &graph, output_mode)?;
    Ok(())
}

/// Execute the deps command
pub async fn execute_deps(app: &App, args: &DepsArgs, output_mode: OutputMode) -> Result<()> {
    let task_id = TaskId::new(&args.task);
    let linked = if args.dependents {
        app.service().get_dependents(&task_id).await?
    } else {
        app.service().get_dependencies(&task_id).await?
    };
    output::print_linked(&task_id, &linked, args.dependents, output_mode)?;
    Ok(())
}
