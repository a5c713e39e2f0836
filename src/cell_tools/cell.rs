//! Formatting of a single cell's source.

use super::config::FormatterOptions;
use super::registry::FormatterRegistry;
use super::router::route;
use crate::error::FormatError;
use crate::magic;

/// Format the source of one code cell.
///
/// Returns `Ok(None)` when no formatter applies to the cell. The returned
/// text never ends with the newline that is added before calling the
/// formatter; notebook cells conventionally have no trailing newline.
pub fn format_cell(
    source: &str,
    registry: &FormatterRegistry,
    options: &FormatterOptions,
    exclude_nonkernel_languages: bool,
) -> Result<Option<String>, FormatError> {
    let target = route(source, registry, exclude_nonkernel_languages);
    let Some(formatter) = target.formatter(registry) else {
        return Ok(None);
    };

    let mut input = magic::shield(source);
    if !input.is_empty() && !input.ends_with('\n') {
        input.push('\n');
    }

    let formatted = formatter.format(&input, options)?;
    let mut formatted = magic::unshield(&formatted);

    let kept = formatted
        .strip_suffix("\r\n")
        .or_else(|| formatted.strip_suffix('\n'))
        .map(str::len);
    if let Some(kept) = kept {
        formatted.truncate(kept);
    }

    Ok(Some(formatted))
}
