//! CLI argument parsing and command dispatch.
//!
//! This module provides the command-line interface for taskdeps using clap's
//! derive API. Each command has its own argument struct with validation.
//!
//! # Commands
//!
//! - `init`: Initialize a new taskdeps repository
//! - `add`: Validate and add a dependency
//! - `remove`: Remove a dependency by id or by task pair
//! - `validate`: Validate a proposed dependency without adding it
//! - `check-cycle`: Check whether a proposed dependency closes a cycle
//! - `blocking`: Show the unfinished prerequisites blocking a task
//! - `graph`: Show a project's dependency graph
//! - `deps`: List a task's dependencies or dependents
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//!
//! # Example
//!
//! ```bash
//! taskdeps add web-12 web-7 --type blocks
//! taskdeps check-cycle web-7 web-12
//! taskdeps graph web --json
//! ```

mod args;
mod execute;
mod types;
mod validators;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub use args::{AddArgs, BlockingArgs, DepsArgs, GraphArgs, InitArgs, PairArgs, RemoveArgs};
pub use types::DependencyTypeArg;
pub use validators::{validate_edge_id, validate_identifier, validate_max_depth};

/// taskdeps - task dependency graph tool
///
/// Maintains an acyclic graph of depends-on relationships between tasks.
/// Edges are stored in `.taskdeps/dependencies.jsonl`; tasks are read from
/// `.taskdeps/tasks.jsonl`.
#[derive(Parser, Debug)]
#[command(name = "taskdeps")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Initialize a new taskdeps repository
    ///
    /// Creates the `.taskdeps/` directory with configuration and empty data files.
    Init(InitArgs),

    /// Add a dependency: TASK depends on DEPENDS_ON
    ///
    /// The dependency is validated first; it is rejected if either task is
    /// unknown, the pair already exists, or it would create a cycle.
    Add(AddArgs),

    /// Remove a dependency
    ///
    /// Removing a dependency that does not exist is not an error.
    Remove(RemoveArgs),

    /// Validate a proposed dependency without adding it
    Validate(PairArgs),

    /// Check whether a proposed dependency would create a cycle
    #[command(name = "check-cycle")]
    CheckCycle(PairArgs),

    /// Show unfinished blocking prerequisites of a task
    Blocking(BlockingArgs),

    /// Show the dependency graph of a project
    Graph(GraphArgs),

    /// List the dependencies (or dependents) of a task
    Deps(DepsArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    pub async fn execute(&self) -> Result<()> {
        use crate::app::App;
        use crate::output::OutputMode;

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        match &self.command {
            Some(Commands::Init(args)) => execute::execute_init(args).await,
            Some(Commands::Add(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_add(&app, args, output_mode).await
            }
            Some(Commands::Remove(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_remove(&app, args, output_mode).await
            }
            Some(Commands::Validate(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_validate(&app, args, output_mode).await
            }
            Some(Commands::CheckCycle(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_check_cycle(&app, args, output_mode).await
            }
            Some(Commands::Blocking(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_blocking(&app, args, output_mode).await
            }
            Some(Commands::Graph(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_graph(&app, args, output_mode).await
            }
            Some(Commands::Deps(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_deps(&app, args, output_mode).await
            }
            None => {
                println!("taskdeps task dependency graph");
                println!("Use --help for more information");
                Ok(())
            }
        }
    }
}
