//! Per-cell code formatting using pluggable formatters.
//!
//! This module turns the source of one notebook cell into formatted source:
//! the [`router`] picks a formatter from the cell magic on the first line,
//! the shield in [`crate::magic`] hides IPython syntax, and the formatter
//! itself is usually an external program run through the [`executor`].
//!
//! # Configuration
//!
//! ```toml
//! timeout = 30000                  # ms per formatter call
//! skip-magics = ["sql"]            # never format %%sql cells
//!
//! [formatters.python]              # replaces the built-in Black formatter
//! command = ["ruff", "format", "-"]
//!
//! [formatters.julia]               # formats %%julia cells
//! command = ["julia-format", "--stdin"]
//! ```
//!
//! # Built-in Formatters
//!
//! - `python` (primary): `black`
//! - `R`: `Rscript` with the styler package

pub mod cell;
pub mod config;
pub mod executor;
pub mod formatters;
pub mod registry;
pub mod router;

pub use cell::format_cell;
pub use config::{CellToolsConfig, DEFAULT_LINE_LENGTH, FormatterOptions, ToolDefinition};
pub use executor::{DEFAULT_TIMEOUT_MS, ExecutorError, ToolExecutor, ToolOutput};
pub use formatters::{BlackFormatter, CommandFormatter, Formatter, StylerFormatter};
pub use registry::{FormatterRegistry, PRIMARY_LANGUAGE, SKIPPABLE_MAGICS};
pub use router::{Route, cell_magic, route};
