//! Expansion of command-line paths into the notebooks to format.

use crate::error::{ConfigError, Error, Result};
use crate::notebook::Notebook;
use ignore::WalkBuilder;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Directories never searched unless a different pattern is given.
pub const DEFAULT_EXCLUDE: &str = r"(/\.git/|/\.ipynb_checkpoints/|/build/|/dist/)";

/// Only notebooks with one of these kernel languages are picked up from
/// directories by default.
pub const DEFAULT_ACCEPTED_LANGUAGES: &[&str] = &["python"];

const NOTEBOOK_EXTENSION: &str = "ipynb";

#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Matched against the absolute, `/`-separated path of every entry
    /// below a directory argument. Directories get a trailing `/`.
    pub exclude: Regex,
    pub accepted_languages: Vec<String>,
    pub respect_gitignore: bool,
}

impl DiscoveryOptions {
    pub fn new(exclude: &str, accepted_languages: Vec<String>, respect_gitignore: bool) -> Result<Self, ConfigError> {
        let exclude = Regex::new(exclude).map_err(|source| ConfigError::InvalidRegex {
            pattern: exclude.to_string(),
            source,
        })?;
        Ok(Self {
            exclude,
            accepted_languages,
            respect_gitignore,
        })
    }
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            exclude: Regex::new(DEFAULT_EXCLUDE).expect("valid regex"),
            accepted_languages: DEFAULT_ACCEPTED_LANGUAGES.iter().map(|s| s.to_string()).collect(),
            respect_gitignore: false,
        }
    }
}

/// Resolve `paths` into a sorted list of notebook files without
/// duplicates.
///
/// Files named on the command line are always kept. Directories are
/// searched recursively for `.ipynb` files whose path does not match the
/// exclude pattern and whose kernel language is accepted.
pub fn find_notebooks(paths: &[PathBuf], options: &DiscoveryOptions) -> Result<Vec<PathBuf>> {
    // canonical path -> path as it will be reported
    let mut found: BTreeMap<PathBuf, PathBuf> = BTreeMap::new();

    for path in paths {
        let metadata = path.metadata().map_err(|e| Error::io(path, e))?;
        if metadata.is_dir() {
            for notebook in walk_directory(path, options)? {
                found.entry(canonical(&notebook)).or_insert(notebook);
            }
        } else {
            found.entry(canonical(path)).or_insert_with(|| path.clone());
        }
    }

    Ok(found.into_values().collect())
}

fn walk_directory(root: &Path, options: &DiscoveryOptions) -> Result<Vec<PathBuf>> {
    let mut walk_builder = WalkBuilder::new(root);
    walk_builder.standard_filters(false);
    if options.respect_gitignore {
        walk_builder.git_ignore(true);
        walk_builder.git_global(true);
        walk_builder.git_exclude(true);
        walk_builder.parents(true);
        walk_builder.require_git(false);
    }

    let exclude = options.exclude.clone();
    walk_builder.filter_entry(move |entry| {
        let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
        let excluded = entry.depth() > 0 && is_excluded(entry.path(), is_dir, &exclude);
        if excluded {
            log::debug!("Excluding {}", entry.path().display());
        }
        !excluded
    });

    let mut notebooks = Vec::new();
    for result in walk_builder.build() {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("Error walking directory {}: {err}", root.display());
                continue;
            }
        };

        let path = entry.path();
        let is_file = entry.file_type().is_some_and(|t| t.is_file());
        if !is_file || path.extension().is_none_or(|ext| ext != NOTEBOOK_EXTENSION) {
            continue;
        }

        // An unreadable notebook stays a candidate so processing reports it.
        let notebook = match Notebook::load(path) {
            Ok(notebook) => notebook,
            Err(err) => {
                log::warn!("Cannot read kernel language of {}: {err}", path.display());
                notebooks.push(path.to_path_buf());
                continue;
            }
        };
        match notebook.kernel_language() {
            Some(language) if options.accepted_languages.iter().any(|l| l == language) => {
                notebooks.push(path.to_path_buf());
            }
            language => {
                log::debug!(
                    "Skipping {}: kernel language {} not accepted",
                    path.display(),
                    language.unwrap_or("<unknown>")
                );
            }
        }
    }

    Ok(notebooks)
}

/// Whether `path` matches the exclude pattern. An empty match never counts.
fn is_excluded(path: &Path, is_dir: bool, exclude: &Regex) -> bool {
    let absolute = canonical(path);
    let mut text = absolute.to_string_lossy().replace('\\', "/");
    if is_dir {
        text.push('/');
    }
    exclude.find(&text).is_some_and(|m| !m.as_str().is_empty())
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
