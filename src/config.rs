//! Project configuration.
//!
//! Settings are read from `.jupyfmt.toml`, or from the `[tool.jupyfmt]`
//! table of a `pyproject.toml`. The first of those found while walking up
//! from the working directory is used; the search stops at a `.git`
//! directory. Command-line flags override every value set here.
//!
//! ```toml
//! line-length = 100
//! skip-string-normalization = true
//! exclude = "(/\\.git/|/build/|/scratch/)"
//! accepted-languages = ["python", "R"]
//! skip-magics = ["sql"]
//!
//! [formatters.python]
//! command = ["ruff", "format", "-"]
//! ```

use crate::cell_tools::{CellToolsConfig, ToolDefinition};
use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Dedicated configuration file name.
pub const CONFIG_FILE: &str = ".jupyfmt.toml";
const PYPROJECT_FILE: &str = "pyproject.toml";
/// Candidate files in each directory, in order of precedence.
const CONFIG_FILES: &[&str] = &[CONFIG_FILE, PYPROJECT_FILE];
const MAX_DEPTH: usize = 100;

/// Settings from a configuration file. Unset values fall back to the
/// command line or the built-in defaults.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    pub line_length: Option<usize>,
    pub skip_string_normalization: Option<bool>,
    /// Regex matched against absolute paths during directory discovery.
    pub exclude: Option<String>,
    /// Kernel languages of notebooks picked up during directory discovery.
    pub accepted_languages: Option<Vec<String>>,
    pub exclude_nonkernel_languages: Option<bool>,
    pub assert_consistent_execution: Option<bool>,
    pub respect_gitignore: Option<bool>,
    /// Formatter timeout in milliseconds.
    pub timeout: Option<u64>,
    #[serde(default)]
    pub skip_magics: Vec<String>,
    #[serde(default)]
    pub formatters: BTreeMap<String, ToolDefinition>,
}

impl Config {
    /// Parse the contents of a `.jupyfmt.toml` file.
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Parse the `[tool.jupyfmt]` table of a `pyproject.toml`. Returns
    /// `None` when the table is absent.
    pub fn from_pyproject_str(content: &str, path: &Path) -> Result<Option<Self>, ConfigError> {
        let parse_error = |message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        };

        let doc: toml::Value = toml::from_str(content).map_err(|e| parse_error(e.to_string()))?;
        let Some(table) = doc.get("tool").and_then(|tool| tool.get("jupyfmt")) else {
            return Ok(None);
        };

        Self::deserialize(table.clone())
            .map(Some)
            .map_err(|e| parse_error(format!("[tool.jupyfmt]: {e}")))
    }

    /// Load an explicit configuration file. A `pyproject.toml` without a
    /// `[tool.jupyfmt]` table yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        if is_pyproject(path) {
            Ok(Self::from_pyproject_str(&content, path)?.unwrap_or_default())
        } else {
            Self::from_toml_str(&content, path)
        }
    }

    /// Search `start` and its ancestors for a configuration file.
    pub fn discover(start: &Path) -> Result<Option<(PathBuf, Self)>, ConfigError> {
        let mut current = start.to_path_buf();

        for _ in 0..MAX_DEPTH {
            log::debug!("Searching for config in: {}", current.display());

            for name in CONFIG_FILES {
                let candidate = current.join(name);
                if !candidate.is_file() {
                    continue;
                }

                let content = fs::read_to_string(&candidate).map_err(|source| ConfigError::Read {
                    path: candidate.clone(),
                    source,
                })?;
                let config = if is_pyproject(&candidate) {
                    match Self::from_pyproject_str(&content, &candidate)? {
                        Some(config) => config,
                        None => {
                            log::debug!("Found {} but no [tool.jupyfmt] table", candidate.display());
                            continue;
                        }
                    }
                } else {
                    Self::from_toml_str(&content, &candidate)?
                };

                log::debug!("Found config file: {}", candidate.display());
                return Ok(Some((candidate, config)));
            }

            if current.join(".git").exists() {
                log::debug!("Stopping at .git directory");
                break;
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => break,
            }
        }

        Ok(None)
    }

    /// Formatter registry settings carried by this file.
    pub fn cell_tools(&self) -> CellToolsConfig {
        let defaults = CellToolsConfig::default();
        CellToolsConfig {
            timeout: self.timeout.unwrap_or(defaults.timeout),
            skip_magics: self.skip_magics.clone(),
            formatters: self.formatters.clone(),
        }
    }
}

fn is_pyproject(path: &Path) -> bool {
    path.file_name().is_some_and(|name| name == PYPROJECT_FILE)
}
