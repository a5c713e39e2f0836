//! Formatter registry with the built-in language table.
//!
//! The registry is built once per run and passed explicitly to the router
//! and cell formatter. It holds the primary (kernel language) formatter,
//! formatters for secondary languages keyed by their cell-magic tag, and the
//! set of tags whose cells are never formatted.

use super::config::CellToolsConfig;
use super::executor::ToolExecutor;
use super::formatters::{BlackFormatter, CommandFormatter, Formatter, StylerFormatter};
use std::collections::{BTreeMap, BTreeSet};

/// The language every notebook is assumed to be written in.
pub const PRIMARY_LANGUAGE: &str = "python";

/// Cell-magic tags whose cells hold no primary-language code.
pub const SKIPPABLE_MAGICS: &[&str] = &[
    // non-python languages
    "bash",
    "html",
    "javascript",
    "js",
    "latex",
    "markdown",
    "perl",
    "ruby",
    "sh",
    "svg",
    // extra functionality
    "writefile",
];

/// Registry of formatters and skip tags.
pub struct FormatterRegistry {
    primary: Box<dyn Formatter>,
    secondary: BTreeMap<String, Box<dyn Formatter>>,
    skip_magics: BTreeSet<String>,
}

impl FormatterRegistry {
    /// Create a registry with only a primary formatter and the built-in skip list.
    pub fn new(primary: Box<dyn Formatter>) -> Self {
        Self {
            primary,
            secondary: BTreeMap::new(),
            skip_magics: SKIPPABLE_MAGICS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Build the registry used by the command line: Black for Python, styler
    /// for `%%R` cells, plus whatever the configuration adds or overrides.
    pub fn from_config(config: &CellToolsConfig) -> Self {
        let executor = ToolExecutor::new(config.timeout);

        let mut registry = Self::new(Box::new(BlackFormatter::new(executor.clone())))
            .with_secondary("R", Box::new(StylerFormatter::new(executor.clone())))
            .with_skip_magics(config.skip_magics.iter().cloned());

        for (language, tool) in &config.formatters {
            let formatter = Box::new(CommandFormatter::new(language, tool.clone(), executor.clone()));
            if language == PRIMARY_LANGUAGE {
                log::debug!("Using custom primary formatter: {:?}", tool.command);
                registry.primary = formatter;
            } else {
                log::debug!("Registering formatter for '%%{language}': {:?}", tool.command);
                registry.secondary.insert(language.clone(), formatter);
            }
        }

        registry
    }

    /// Register a formatter for cells starting with `%%<tag>`.
    pub fn with_secondary(mut self, tag: impl Into<String>, formatter: Box<dyn Formatter>) -> Self {
        self.secondary.insert(tag.into(), formatter);
        self
    }

    /// Add tags to the skip list.
    pub fn with_skip_magics<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip_magics.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn primary(&self) -> &dyn Formatter {
        self.primary.as_ref()
    }

    /// Get the formatter registered for a secondary-language tag.
    pub fn secondary(&self, tag: &str) -> Option<&dyn Formatter> {
        self.secondary.get(tag).map(|f| f.as_ref())
    }

    /// Whether a secondary-language formatter exists for `tag`.
    pub fn has_secondary(&self, tag: &str) -> bool {
        self.secondary.contains_key(tag)
    }

    /// Whether cells tagged `tag` are never formatted.
    pub fn is_skipped(&self, tag: &str) -> bool {
        self.skip_magics.contains(tag)
    }

    /// List all secondary-language tags.
    pub fn secondary_languages(&self) -> Vec<&str> {
        self.secondary.keys().map(String::as_str).collect()
    }
}

impl Default for FormatterRegistry {
    fn default() -> Self {
        Self::from_config(&CellToolsConfig::default())
    }
}

impl std::fmt::Debug for FormatterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatterRegistry")
            .field("secondary", &self.secondary_languages())
            .field("skip_magics", &self.skip_magics)
            .finish_non_exhaustive()
    }
}
