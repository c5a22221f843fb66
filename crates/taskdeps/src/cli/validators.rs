//! CLI input validation functions.
//!
//! These validators are used by clap's `value_parser` attribute to validate
//! user input at parse time, providing immediate feedback for invalid values.

use crate::id_generation::is_edge_id;

/// Validate a task or project identifier.
///
/// Identifiers are opaque to taskdeps, so the only rules are that they are
/// non-empty and contain no whitespace. Surrounding whitespace is trimmed.
pub fn validate_identifier(s: &str) -> Result<String, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err("Identifier cannot be empty".to_string());
    }

    if s.chars().any(char::is_whitespace) {
        return Err(format!("Identifier '{}' cannot contain whitespace", s));
    }

    Ok(s.to_string())
}

/// Validate a dependency edge id (`dep-` followed by the hash suffix).
pub fn validate_edge_id(s: &str) -> Result<String, String> {
    let s = s.trim();
    if !is_edge_id(s) {
        return Err(format!(
            "Invalid dependency id: '{}'. Expected format: dep-xxxxxxxx",
            s
        ));
    }
    Ok(s.to_string())
}

/// Validate a traversal depth (at least 1).
pub fn validate_max_depth(s: &str) -> Result<usize, String> {
    let depth: usize = s
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a valid depth", s))?;
    if depth == 0 {
        return Err("Depth must be at least 1".to_string());
    }
    Ok(depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::plain("task-1", "task-1")]
    #[case::trimmed("  WEB-12 ", "WEB-12")]
    #[case::uuid("6f1c2a9e-1b7d-4c1e-9d3a-0e6b2f4a8c11", "6f1c2a9e-1b7d-4c1e-9d3a-0e6b2f4a8c11")]
    fn test_validate_identifier_valid(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(validate_identifier(input).unwrap(), expected);
    }

    #[rstest]
    #[case::empty("")]
    #[case::blank("   ")]
    #[case::inner_space("task 1")]
    fn test_validate_identifier_invalid(#[case] input: &str) {
        assert!(validate_identifier(input).is_err());
    }

    #[rstest]
    #[case("1", Ok(1))]
    #[case("250", Ok(250))]
    #[case("0", Err(()))]
    #[case("-3", Err(()))]
    #[case("deep", Err(()))]
    fn test_validate_max_depth(#[case] input: &str, #[case] expected: Result<usize, ()>) {
        assert_eq!(validate_max_depth(input).map_err(|_| ()), expected);
    }

    #[test]
    fn test_validate_edge_id() {
        assert!(validate_edge_id("dep-a1b2c3d4").is_ok());
        assert!(validate_edge_id("a1b2c3d4").is_err());
    }
}
