//! Error types shared across the formatting pipeline.

use crate::cell_tools::ExecutorError;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to format a single cell.
#[derive(Debug, Clone, Error)]
pub enum FormatError {
    /// The formatter refused the input, usually because it does not parse.
    #[error("{message}")]
    Rejected { language: String, message: String },

    /// The external formatter could not be run at all.
    #[error(transparent)]
    Tool(#[from] ExecutorError),
}

impl FormatError {
    pub fn rejected(language: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            language: language.into(),
            message: message.into(),
        }
    }
}

/// Errors raised while loading the project configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {p}: {source}", p = .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {p}: {message}", p = .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("invalid exclude pattern '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// File- and run-level errors.
#[derive(Debug, Error)]
pub enum Error {
    #[error("[{p}] Error while formatting cell {cell}: {source}", p = .path.display())]
    Format {
        path: PathBuf,
        cell: usize,
        #[source]
        source: FormatError,
    },

    #[error(
        "[{p}] Cell {cell} has inconsistent execution count (expected {expected}, found {actual})",
        p = .path.display(),
        actual = .found.map_or_else(|| "none".to_string(), |n| n.to_string())
    )]
    ExecutionOrder {
        path: PathBuf,
        cell: usize,
        expected: u64,
        found: Option<u64>,
    },

    #[error("{p}: {source}", p = .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{p}: not a valid notebook: {source}", p = .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{p}: not a valid notebook: {reason}", p = .path.display())]
    InvalidNotebook { path: PathBuf, reason: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
