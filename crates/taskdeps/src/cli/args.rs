//! CLI argument structs for all commands.
//!
//! Each command has its own argument struct with clap derive attributes
//! for parsing and validation.

use clap::Parser;

use super::types::DependencyTypeArg;
use super::validators::{validate_edge_id, validate_identifier, validate_max_depth};

/// Arguments for the `init` command
#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Bound on dependency traversals written to the config (default 100)
    #[arg(long, value_parser = validate_max_depth)]
    pub max_depth: Option<usize>,

    /// Suppress output messages
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the `add` command
#[derive(Parser, Debug, Clone)]
pub struct AddArgs {
    /// The dependent task
    #[arg(value_parser = validate_identifier)]
    pub task: String,

    /// The prerequisite task
    #[arg(value_parser = validate_identifier)]
    pub depends_on: String,

    /// Relationship kind
    #[arg(short = 't', long = "type", value_enum, default_value = "blocks")]
    pub dep_type: DependencyTypeArg,

    /// Who is creating the dependency (defaults to $USER)
    #[arg(long)]
    pub by: Option<String>,
}

/// Arguments for the `remove` command
///
/// Either an edge id, or both `--task` and `--on`.
#[derive(Parser, Debug, Clone)]
pub struct RemoveArgs {
    /// Dependency id to remove
    #[arg(
        value_parser = validate_edge_id,
        conflicts_with_all = ["task", "on"],
        required_unless_present_all = ["task", "on"]
    )]
    pub id: Option<String>,

    /// The dependent task of the pair
    #[arg(long, value_parser = validate_identifier, requires = "on")]
    pub task: Option<String>,

    /// The prerequisite task of the pair
    #[arg(long, value_parser = validate_identifier, requires = "task")]
    pub on: Option<String>,
}

/// Arguments naming a proposed edge (`validate`, `check-cycle`)
#[derive(Parser, Debug, Clone)]
pub struct PairArgs {
    /// The dependent task
    #[arg(value_parser = validate_identifier)]
    pub task: String,

    /// The prerequisite task
    #[arg(value_parser = validate_identifier)]
    pub depends_on: String,
}

/// Arguments for the `blocking` command
#[derive(Parser, Debug, Clone)]
pub struct BlockingArgs {
    /// Task to check
    #[arg(value_parser = validate_identifier)]
    pub task: String,
}

/// Arguments for the `graph` command
#[derive(Parser, Debug, Clone)]
pub struct GraphArgs {
    /// Project whose dependency graph to show
    #[arg(value_parser = validate_identifier)]
    pub project: String,
}

/// Arguments for the `deps` command
#[derive(Parser, Debug, Clone)]
pub struct DepsArgs {
    /// Task whose dependencies to list
    #[arg(value_parser = validate_identifier)]
    pub task: String,

    /// List the tasks that depend on it instead
    #[arg(short = 'r', long)]
    pub dependents: bool,
}
