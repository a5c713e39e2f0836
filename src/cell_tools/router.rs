//! Language detection for notebook cells.
//!
//! A cell is routed by its first non-blank line. Only a cell magic
//! (`%%tag ...`) can move a cell away from the primary formatter; line
//! magics (`%time ...`) are left for the shield to hide.

use super::formatters::Formatter;
use super::registry::FormatterRegistry;
use crate::magic::MAGIC_MARKER;

/// Where a cell's source should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Leave the cell alone.
    Skip,
    /// Format with the primary-language formatter.
    Primary,
    /// Format with the secondary formatter registered for this tag.
    Secondary(String),
}

impl Route {
    /// Look up the formatter this route points at.
    pub fn formatter<'r>(&self, registry: &'r FormatterRegistry) -> Option<&'r dyn Formatter> {
        match self {
            Self::Skip => None,
            Self::Primary => Some(registry.primary()),
            Self::Secondary(tag) => registry.secondary(tag),
        }
    }
}

/// Extract the tag of a leading cell magic (`%%bash -s` yields `bash`).
pub fn cell_magic(source: &str) -> Option<&str> {
    let first_line = source.lines().find(|line| !line.trim().is_empty())?;
    let token = first_line.split_whitespace().next()?;
    let tag = token.strip_prefix(MAGIC_MARKER)?.strip_prefix(MAGIC_MARKER)?;
    (!tag.is_empty()).then_some(tag)
}

/// Decide how to format a cell.
///
/// With `exclude_nonkernel_languages`, cells in any language that has its
/// own secondary formatter are skipped instead of formatted.
pub fn route(source: &str, registry: &FormatterRegistry, exclude_nonkernel_languages: bool) -> Route {
    if source.is_empty() {
        return Route::Skip;
    }

    let Some(tag) = cell_magic(source) else {
        return Route::Primary;
    };

    if registry.is_skipped(tag) {
        log::debug!("Skipping %%{tag} cell");
        return Route::Skip;
    }

    if registry.has_secondary(tag) {
        if exclude_nonkernel_languages {
            log::debug!("Skipping non-kernel %%{tag} cell");
            return Route::Skip;
        }
        return Route::Secondary(tag.to_string());
    }

    Route::Primary
}
