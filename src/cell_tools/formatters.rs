//! Formatter implementations.
//!
//! A [`Formatter`] turns the (shielded) source of one cell into formatted
//! source, or rejects it with a diagnostic. The built-in formatters wrap
//! external programs: Black for Python and styler for R. Any other program
//! that reads stdin and writes stdout can be plugged in as a
//! [`CommandFormatter`].

use super::config::{FormatterOptions, ToolDefinition};
use super::executor::{ExecutorError, ToolExecutor, ToolOutput};
use crate::error::FormatError;
use crate::magic::{MAGIC_SENTINEL, SHELL_SENTINEL};
use regex::Regex;
use std::sync::LazyLock;

/// Something that can format the source of a cell.
pub trait Formatter: Send + Sync {
    /// Format `source`, which always ends with a newline when non-empty.
    fn format(&self, source: &str, options: &FormatterOptions) -> Result<String, FormatError>;
}

impl<F> Formatter for F
where
    F: Fn(&str, &FormatterOptions) -> Result<String, FormatError> + Send + Sync,
{
    fn format(&self, source: &str, options: &FormatterOptions) -> Result<String, FormatError> {
        self(source, options)
    }
}

/// Turn a finished tool run into formatted text or a rejection.
fn finish(language: &str, output: ToolOutput) -> Result<String, FormatError> {
    if output.success() {
        Ok(output.stdout)
    } else {
        let stderr = output.stderr.trim();
        let message = if !stderr.is_empty() {
            stderr.to_string()
        } else if let Some(code) = output.exit_code {
            format!("exit code {code}")
        } else {
            "terminated by a signal".to_string()
        };
        Err(FormatError::rejected(language, message))
    }
}

/// Python formatting through the `black` executable.
#[derive(Debug, Clone)]
pub struct BlackFormatter {
    program: String,
    executor: ToolExecutor,
}

impl BlackFormatter {
    pub fn new(executor: ToolExecutor) -> Self {
        Self {
            program: "black".to_string(),
            executor,
        }
    }

    /// Use a different `black` binary (for example one inside a virtualenv).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn command(&self, options: &FormatterOptions) -> Vec<String> {
        let mut command = vec![
            self.program.clone(),
            "--quiet".to_string(),
            format!("--line-length={}", options.line_length),
        ];
        if !options.string_normalization {
            command.push("--skip-string-normalization".to_string());
        }
        command.push("-".to_string());
        command
    }
}

impl Formatter for BlackFormatter {
    fn format(&self, source: &str, options: &FormatterOptions) -> Result<String, FormatError> {
        let output = self.executor.run(&self.command(options), Some(source))?;
        finish("python", output)
    }
}

/// styler puts a space after the `#` of every comment, which breaks the
/// shield sentinels.
static STYLED_SENTINEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "(?m)^# ({}|{})",
        regex::escape(&MAGIC_SENTINEL[1..]),
        regex::escape(&SHELL_SENTINEL[1..])
    ))
    .expect("valid regex")
});

/// R formatting through `Rscript` and the styler package.
#[derive(Debug, Clone)]
pub struct StylerFormatter {
    executor: ToolExecutor,
}

impl StylerFormatter {
    pub fn new(executor: ToolExecutor) -> Self {
        Self { executor }
    }

    fn command(source: &str) -> Result<Vec<String>, FormatError> {
        // A JSON string literal is also a valid R string literal.
        let quoted = serde_json::to_string(source).map_err(|e| ExecutorError::Io {
            program: "Rscript".to_string(),
            message: format!("quoting the source failed: {e}"),
        })?;
        Ok(vec![
            "Rscript".to_string(),
            "-e".to_string(),
            format!("styler::style_text({quoted})"),
        ])
    }
}

impl Formatter for StylerFormatter {
    fn format(&self, source: &str, _options: &FormatterOptions) -> Result<String, FormatError> {
        let output = self.executor.run(&Self::command(source)?, None)?;
        let styled = finish("R", output)?;
        Ok(STYLED_SENTINEL.replace_all(&styled, "#$1").into_owned())
    }
}

/// A user-configured stdin/stdout formatter. Style options reach the
/// command through the placeholders of [`ToolDefinition::resolve`].
#[derive(Debug, Clone)]
pub struct CommandFormatter {
    language: String,
    tool: ToolDefinition,
    executor: ToolExecutor,
}

impl CommandFormatter {
    pub fn new(language: impl Into<String>, tool: ToolDefinition, executor: ToolExecutor) -> Self {
        Self {
            language: language.into(),
            tool,
            executor,
        }
    }
}

impl Formatter for CommandFormatter {
    fn format(&self, source: &str, options: &FormatterOptions) -> Result<String, FormatError> {
        let output = self.executor.run(&self.tool.resolve(options), Some(source))?;
        finish(&self.language, output)
    }
}
