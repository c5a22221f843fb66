//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Success/Done:  green   (terminal statuses, accepted edges)
//!   - Warning/Active: yellow (in_progress/in_review, soft warnings)
//!   - Error/Blocked: red     (blocked status, validation errors, cycles)
//!   - Info/Reference: cyan   (task ids and codes)
//!   - Muted:         dimmed  (field labels, dependency types)
//!   - Emphasis:      bold    (section headers)

use crate::domain::TaskStatus;
use colored::Colorize;

use super::OutputConfig;

/// Apply semantic "success" color (green) to text.
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Apply semantic "error" color (red) to text.
pub fn error(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.red().to_string()
}

/// Apply semantic "warning" color (yellow) to text.
pub fn warning(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

/// Apply semantic "info" color (cyan) to text.
pub fn info(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.cyan().to_string()
}

/// Dim secondary text.
pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Bold section headers.
pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}

/// Apply color to status text based on task status.
pub(crate) fn colorize_status(status: TaskStatus, config: &OutputConfig) -> String {
    let text = status.to_string();
    if !config.use_colors {
        return text;
    }
    match status {
        TaskStatus::Todo => text.white().to_string(),
        TaskStatus::InProgress | TaskStatus::InReview => text.yellow().to_string(),
        TaskStatus::Blocked => text.red().to_string(),
        TaskStatus::Done => text.green().to_string(),
        TaskStatus::Cancelled => text.dimmed().to_string(),
    }
}

/// Status icon, with ASCII fallback.
pub(crate) fn status_icon(status: TaskStatus, config: &OutputConfig) -> &'static str {
    if config.use_ascii {
        match status {
            TaskStatus::Todo => "o",
            TaskStatus::InProgress | TaskStatus::InReview => ">",
            TaskStatus::Blocked => "x",
            TaskStatus::Done => "+",
            TaskStatus::Cancelled => "-",
        }
    } else {
        match status {
            TaskStatus::Todo => "○",
            TaskStatus::InProgress | TaskStatus::InReview => "▶",
            TaskStatus::Blocked => "✗",
            TaskStatus::Done => "✓",
            TaskStatus::Cancelled => "⊘",
        }
    }
}
