//! Runs the notebook processor over a list of files and aggregates the
//! outcome into an exit status.

use crate::error::{Error, Result};
use crate::exit_codes;
use crate::processor::{FileReport, FileStatus, NotebookProcessor};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Minimum number of files before work is spread over threads.
#[cfg(feature = "parallel")]
const MIN_PARALLEL_FILES: usize = 2;

/// File counts for a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOutcome {
    pub errored: usize,
    pub changed: usize,
    pub unchanged: usize,
}

impl RunOutcome {
    pub fn record(&mut self, status: FileStatus) {
        match status {
            FileStatus::Errored => self.errored += 1,
            FileStatus::Changed => self.changed += 1,
            FileStatus::Unchanged => self.unchanged += 1,
        }
    }

    /// 2 if any file errored, else 1 if any file changed (or would change),
    /// else 0.
    pub fn exit_code(&self) -> i32 {
        if self.errored > 0 {
            exit_codes::FORMATTING_ERROR
        } else if self.changed > 0 {
            exit_codes::CHANGES_FOUND
        } else {
            exit_codes::SUCCESS
        }
    }

    /// The check-mode summary; only non-zero counts are listed.
    pub fn summary(&self) -> String {
        let mut summary = String::new();
        if self.errored > 0 {
            summary.push_str(&format!("{} file(s) raised parsing errors\n", self.errored));
        }
        if self.changed > 0 {
            summary.push_str(&format!("{} file(s) would be changed\n", self.changed));
        }
        if self.unchanged > 0 {
            summary.push_str(&format!("{} file(s) would be left unchanged\n", self.unchanged));
        }
        summary
    }
}

pub struct BatchDriver<'a> {
    processor: NotebookProcessor<'a>,
    #[cfg_attr(not(feature = "parallel"), allow(dead_code))]
    parallel: bool,
}

impl<'a> BatchDriver<'a> {
    pub fn new(processor: NotebookProcessor<'a>) -> Self {
        Self {
            processor,
            parallel: cfg!(feature = "parallel"),
        }
    }

    /// Force sequential processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Process `files`, printing reports to stdout.
    pub fn run(&self, files: &[PathBuf]) -> Result<RunOutcome> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.run_with_output(files, &mut out)
    }

    /// Process `files`, writing reports to `out`.
    ///
    /// In check mode a failing file is reported and counted as errored.
    /// Otherwise the first error aborts the run; files already written stay
    /// written.
    pub fn run_with_output<W: Write>(&self, files: &[PathBuf], out: &mut W) -> Result<RunOutcome> {
        let check = self.processor.options().check;
        let mut outcome = RunOutcome::default();

        for (path, result) in self.process_all(files) {
            let report = match result {
                Ok(report) => report,
                Err(err) if check => {
                    log::debug!("Failed to process {}: {err}", path.display());
                    emit(out, &format!("Error while formatting file \"{}\": {err}\n", path.display()))?;
                    outcome.record(FileStatus::Errored);
                    continue;
                }
                Err(err) => return Err(err),
            };

            emit(out, &report.output)?;
            outcome.record(report.outcome.status());
        }

        if check {
            emit(out, &outcome.summary())?;
        }

        log::debug!("Run finished: {outcome:?}");
        Ok(outcome)
    }

    /// Reports in the same order as `files`. Runs that may write files are
    /// always sequential so a fatal error stops further writes.
    fn process_all<'f>(&self, files: &'f [PathBuf]) -> Vec<(&'f Path, Result<FileReport>)> {
        #[cfg(feature = "parallel")]
        if self.parallel && !self.processor.options().writes_files() && files.len() >= MIN_PARALLEL_FILES {
            use rayon::prelude::*;

            log::debug!("Processing {} files in parallel", files.len());
            return files
                .par_iter()
                .map(|path| (path.as_path(), self.processor.process_file(path)))
                .collect();
        }

        let mut reports = Vec::with_capacity(files.len());
        for path in files {
            let result = self.processor.process_file(path);
            let fatal = result.is_err() && !self.processor.options().check;
            reports.push((path.as_path(), result));
            if fatal {
                break;
            }
        }
        reports
    }
}

fn emit<W: Write>(out: &mut W, text: &str) -> Result<()> {
    out.write_all(text.as_bytes())
        .map_err(|e| Error::io("<stdout>", e))
}
