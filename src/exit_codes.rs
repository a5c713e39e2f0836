//! Exit codes for jupyfmt, following Black's convention
//!
//! These exit codes allow users and CI/CD systems to distinguish between
//! clean notebooks, notebooks that need reformatting and broken input.

/// Success - Nothing errored and nothing changed
pub const SUCCESS: i32 = 0;

/// At least one notebook was (or would be) reformatted
pub const CHANGES_FOUND: i32 = 1;

/// Formatting error - A cell could not be parsed, or a file could not be processed
pub const FORMATTING_ERROR: i32 = 2;
