//! Configuration types for cell formatting.
//!
//! This module defines the options handed to every formatter call and the
//! schema for user-defined formatter commands.

use super::executor::DEFAULT_TIMEOUT_MS;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Black's default line length.
pub const DEFAULT_LINE_LENGTH: usize = 88;

/// Style options passed to every formatter call.
///
/// Formatters that have no equivalent for an option ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatterOptions {
    /// How many characters per line to allow.
    pub line_length: usize,
    /// Normalize string quotes and prefixes.
    pub string_normalization: bool,
}

impl Default for FormatterOptions {
    fn default() -> Self {
        Self {
            line_length: DEFAULT_LINE_LENGTH,
            string_normalization: true,
        }
    }
}

/// Configuration for the formatter registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct CellToolsConfig {
    /// Timeout per formatter execution in milliseconds (default: 30000, 0 disables)
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Extra cell-magic tags whose cells are never formatted
    #[serde(default)]
    pub skip_magics: Vec<String>,

    /// Formatter commands keyed by cell-magic tag (`python` replaces the primary formatter)
    #[serde(default)]
    pub formatters: BTreeMap<String, ToolDefinition>,
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for CellToolsConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            skip_magics: Vec::new(),
            formatters: BTreeMap::new(),
        }
    }
}

/// Replaced by the configured line length inside any argument.
pub const LINE_LENGTH_PLACEHOLDER: &str = "{line-length}";

/// An argument that becomes `--skip-string-normalization` when string
/// normalization is off, and is dropped otherwise.
pub const SKIP_STRING_NORMALIZATION_PLACEHOLDER: &str = "{skip-string-normalization}";

/// Definition of an external formatter command.
///
/// The command receives the cell source on stdin and must print the
/// formatted source on stdout. A non-zero exit status means the source was
/// rejected and stderr becomes the diagnostic.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ToolDefinition {
    /// Command to run (first element is the binary, rest are arguments)
    pub command: Vec<String>,
}

impl ToolDefinition {
    /// The command with style placeholders filled in from `options`.
    pub fn resolve(&self, options: &FormatterOptions) -> Vec<String> {
        let line_length = options.line_length.to_string();
        self.command
            .iter()
            .filter_map(|arg| {
                if arg == SKIP_STRING_NORMALIZATION_PLACEHOLDER {
                    (!options.string_normalization).then(|| "--skip-string-normalization".to_string())
                } else {
                    Some(arg.replace(LINE_LENGTH_PLACEHOLDER, &line_length))
                }
            })
            .collect()
    }
}
