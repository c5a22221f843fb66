//! CLI value enums and domain type conversions.

use clap::ValueEnum;

use crate::domain::DependencyType;

/// Dependency type for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DependencyTypeArg {
    /// Hard prerequisite: the task waits until it is done or cancelled
    #[default]
    Blocks,
    /// Informational link; never blocks
    #[value(name = "relates-to", alias = "relates_to")]
    RelatesTo,
}

impl std::fmt::Display for DependencyTypeArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blocks => write!(f, "blocks"),
            Self::RelatesTo => write!(f, "relates-to"),
        }
    }
}

impl From<DependencyTypeArg> for DependencyType {
    fn from(arg: DependencyTypeArg) -> Self {
        match arg {
            DependencyTypeArg::Blocks => DependencyType::Blocks,
            DependencyTypeArg::RelatesTo => DependencyType::RelatesTo,
        }
    }
}
