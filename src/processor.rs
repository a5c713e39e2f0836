//! Formatting of one notebook: the per-cell state machine, diffs, the
//! check-mode report, and the decision to write the file back.

use crate::cell_tools::{FormatterOptions, FormatterRegistry, format_cell};
use crate::diff::{self, DiffMode};
use crate::error::{Error, Result};
use crate::notebook::{Cell, Notebook};
use colored::Colorize;
use std::path::Path;

/// Options shared by every notebook in a run.
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// Report instead of writing; cell errors are counted, not fatal.
    pub check: bool,
    /// Print a diff for every changed cell. Never writes files.
    pub diff: Option<DiffMode>,
    /// Require code cells to have been executed in order.
    pub assert_consistent_execution: bool,
    /// Skip cells in languages other than the kernel's.
    pub exclude_nonkernel_languages: bool,
    pub formatter: FormatterOptions,
}

impl ProcessOptions {
    /// Whether notebooks may be rewritten in place.
    pub fn writes_files(&self) -> bool {
        !self.check && self.diff.is_none()
    }
}

/// What happened to one code cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellOutcome {
    /// A formatter ran and produced identical text.
    Unchanged,
    /// A formatter ran and produced this new text.
    Changed(String),
    /// No formatter applies to the cell.
    Skipped,
    /// The cell could not be formatted.
    Errored(String),
}

/// File-level status derived from the cell counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Errored,
    Changed,
    Unchanged,
}

/// Per-notebook cell counts. Skipped cells count as unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileOutcome {
    pub errored: usize,
    pub changed: usize,
    pub unchanged: usize,
}

impl FileOutcome {
    pub fn record(&mut self, outcome: &CellOutcome) {
        match outcome {
            CellOutcome::Errored(_) => self.errored += 1,
            CellOutcome::Changed(_) => self.changed += 1,
            CellOutcome::Unchanged | CellOutcome::Skipped => self.unchanged += 1,
        }
    }

    pub fn status(&self) -> FileStatus {
        if self.errored > 0 {
            FileStatus::Errored
        } else if self.changed > 0 {
            FileStatus::Changed
        } else {
            FileStatus::Unchanged
        }
    }
}

/// Result of processing one notebook.
#[derive(Debug, Clone, Default)]
pub struct FileReport {
    pub outcome: FileOutcome,
    /// Text for stdout: cell errors, diffs and the check-mode summary.
    pub output: String,
    /// Whether the notebook was written back.
    pub written: bool,
}

/// Applies the cell formatter to every code cell of a notebook.
pub struct NotebookProcessor<'a> {
    registry: &'a FormatterRegistry,
    options: &'a ProcessOptions,
}

impl<'a> NotebookProcessor<'a> {
    pub fn new(registry: &'a FormatterRegistry, options: &'a ProcessOptions) -> Self {
        Self { registry, options }
    }

    pub fn options(&self) -> &ProcessOptions {
        self.options
    }

    /// Load, format and (if allowed and nothing errored) rewrite a notebook.
    pub fn process_file(&self, path: &Path) -> Result<FileReport> {
        let mut notebook = Notebook::load(path)?;
        let mut report = self.process_notebook(path, &mut notebook)?;

        if report.outcome.errored == 0 && self.options.writes_files() {
            notebook.save(path)?;
            report.written = true;
            log::info!(
                "Wrote {} ({} cell(s) changed)",
                path.display(),
                report.outcome.changed
            );
        }

        Ok(report)
    }

    /// Format the code cells of an in-memory notebook. `path` is only used
    /// for messages.
    ///
    /// Outside check mode, the first formatting or execution-order error is
    /// returned and the notebook should be discarded.
    pub fn process_notebook(&self, path: &Path, notebook: &mut Notebook) -> Result<FileReport> {
        let mut report = FileReport::default();
        let mut expected_count: u64 = 1;

        for index in 0..notebook.cells().len() {
            let Some(cell) = notebook.cells()[index].as_code() else {
                continue;
            };

            let expected = expected_count;
            expected_count += 1;

            let outcome = if self.options.assert_consistent_execution && cell.execution_count() != Some(expected) {
                let err = Error::ExecutionOrder {
                    path: path.to_path_buf(),
                    cell: index,
                    expected,
                    found: cell.execution_count(),
                };
                if !self.options.check {
                    return Err(err);
                }
                CellOutcome::Errored(err.to_string())
            } else {
                match format_cell(
                    cell.source(),
                    self.registry,
                    &self.options.formatter,
                    self.options.exclude_nonkernel_languages,
                ) {
                    Ok(None) => CellOutcome::Skipped,
                    Ok(Some(formatted)) if formatted == cell.source() => CellOutcome::Unchanged,
                    Ok(Some(formatted)) => CellOutcome::Changed(formatted),
                    Err(source) => {
                        let err = Error::Format {
                            path: path.to_path_buf(),
                            cell: index,
                            source,
                        };
                        if !self.options.check {
                            return Err(err);
                        }
                        CellOutcome::Errored(err.to_string())
                    }
                }
            };
            log::debug!("{} cell {index}: {outcome:?}", path.display());

            match &outcome {
                CellOutcome::Errored(message) => {
                    report.output.push_str(&format!("{message}\n"));
                }
                CellOutcome::Changed(formatted) => {
                    if let Some(mode) = self.options.diff {
                        report.output.push_str(&self.cell_diff(mode, path, index, cell.source(), formatted));
                        report.output.push_str("\n\n");
                    }
                    let updated = cell.with_source(formatted.as_str());
                    notebook.replace_cell(index, Cell::Code(updated));
                }
                CellOutcome::Unchanged | CellOutcome::Skipped => {}
            }

            report.outcome.record(&outcome);
        }

        if self.options.check {
            report.output.push_str(&self.summary(path, &report.outcome));
        }

        Ok(report)
    }

    fn cell_diff(&self, mode: DiffMode, path: &Path, index: usize, original: &str, formatted: &str) -> String {
        match mode {
            DiffMode::Full => diff::full_diff(original, formatted),
            DiffMode::Compact => diff::unified_diff(
                original,
                formatted,
                &format!("{} - Cell {index} (original)", path.display()),
                &format!("{} - Cell {index} (formatted)", path.display()),
            ),
        }
    }

    /// The check-mode block for one notebook. The path is omitted when
    /// diffs already identify the cells.
    fn summary(&self, path: &Path, outcome: &FileOutcome) -> String {
        let mut summary = String::new();
        if self.options.diff.is_none() {
            summary.push_str(&format!("{}\n", path.display().to_string().bold()));
        }
        if outcome.errored > 0 {
            summary.push_str(&format!("{} cell(s) raised parsing errors\n", outcome.errored));
        }
        if outcome.changed > 0 {
            summary.push_str(&format!("{} cell(s) would be changed\n", outcome.changed));
        }
        if outcome.unchanged > 0 {
            summary.push_str(&format!("{} cell(s) would be left unchanged\n", outcome.unchanged));
        }
        summary.push('\n');
        summary
    }
}
