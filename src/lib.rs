//! Formatting of Jupyter notebooks.
//!
//! Each code cell is routed to a formatter for its language, with IPython
//! magics and shell escapes shielded from the formatter. Everything outside
//! the code cells' source is preserved.

pub mod batch;
pub mod cell_tools;
pub mod config;
pub mod diff;
pub mod discovery;
pub mod error;
pub mod exit_codes;
pub mod magic;
pub mod notebook;
pub mod processor;

pub use batch::{BatchDriver, RunOutcome};
pub use cell_tools::{FormatterOptions, FormatterRegistry, format_cell};
pub use config::Config;
pub use diff::DiffMode;
pub use discovery::{DiscoveryOptions, find_notebooks};
pub use error::{ConfigError, Error, FormatError, Result};
pub use notebook::{Cell, CodeCell, Notebook};
pub use processor::{CellOutcome, FileOutcome, FileReport, FileStatus, NotebookProcessor, ProcessOptions};
