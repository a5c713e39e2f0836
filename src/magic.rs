//! Shielding of IPython line magics and shell escapes.
//!
//! Formatters built for plain source files reject lines such as `%time f()`
//! or `!pip install x`. Before a cell is handed to a formatter, every line
//! that starts with `%` or `!` is turned into a comment carrying a sentinel
//! token; after formatting the sentinel is turned back into the marker.
//!
//! Shielding is an exact inverse of unshielding for any text that does not
//! already contain a sentinel at the start of a line. Cells that do contain
//! one will have it rewritten into a marker on the way out.

use regex::{NoExpand, Regex};
use std::sync::LazyLock;

/// Marker that starts a line magic (`%time`) or, doubled, a cell magic (`%%bash`).
pub const MAGIC_MARKER: char = '%';

/// Marker that starts a shell escape (`!ls`).
pub const SHELL_MARKER: char = '!';

/// Replaces a leading `%`. Starts with `#%` so it stays a comment most
/// formatters leave untouched.
pub const MAGIC_SENTINEL: &str = "#%#jupyfmt-3f9a#";

/// Replaces a leading `!`.
pub const SHELL_SENTINEL: &str = "#!#jupyfmt-3f9a#";

static MAGIC_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^%").expect("valid regex"));
static SHELL_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^!").expect("valid regex"));

static SHIELDED_MAGIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("(?m)^{}", regex::escape(MAGIC_SENTINEL))).expect("valid regex"));
static SHIELDED_SHELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("(?m)^{}", regex::escape(SHELL_SENTINEL))).expect("valid regex"));

/// Hide line-start magics and shell escapes from the formatter.
pub fn shield(source: &str) -> String {
    let source = MAGIC_LINE.replace_all(source, NoExpand(MAGIC_SENTINEL));
    SHELL_LINE.replace_all(&source, NoExpand(SHELL_SENTINEL)).into_owned()
}

/// Restore the markers hidden by [`shield`]. Only sentinels at the start of
/// a line are restored.
pub fn unshield(formatted: &str) -> String {
    let magic_marker = MAGIC_MARKER.to_string();
    let shell_marker = SHELL_MARKER.to_string();
    let formatted = SHIELDED_MAGIC.replace_all(formatted, NoExpand(&magic_marker));
    SHIELDED_SHELL
        .replace_all(&formatted, NoExpand(&shell_marker))
        .into_owned()
}
