//! Runs external formatter programs.
//!
//! A formatter run is one child process: the cell source goes in on stdin,
//! the formatted source comes back on stdout and diagnostics on stderr.
//! Runs are bounded by a deadline, and whether a program is on `PATH` is
//! looked up once per program and remembered.

use std::collections::HashMap;
use std::io::{self, Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Default formatter deadline in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// What a finished program produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the program was killed by a signal.
    pub exit_code: Option<i32>,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Why a program could not be run to completion.
#[derive(Debug, Clone, Error)]
pub enum ExecutorError {
    #[error("'{program}' was not found on PATH")]
    NotFound { program: String },

    #[error("formatter command is empty")]
    EmptyCommand,

    #[error("'{program}' did not finish within {timeout_ms}ms")]
    TimedOut { program: String, timeout_ms: u64 },

    #[error("could not run '{program}': {message}")]
    Io { program: String, message: String },
}

impl ExecutorError {
    fn io(program: &str, context: &str, err: impl std::fmt::Display) -> Self {
        Self::Io {
            program: program.to_string(),
            message: format!("{context}: {err}"),
        }
    }
}

/// Spawns formatter programs. Clones share the `PATH` lookup cache.
#[derive(Debug, Clone)]
pub struct ToolExecutor {
    on_path: Arc<Mutex<HashMap<String, bool>>>,
    /// Zero means no deadline.
    timeout_ms: u64,
}

impl ToolExecutor {
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            on_path: Arc::default(),
            timeout_ms,
        }
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Whether `program` can be started.
    pub fn is_available(&self, program: &str) -> bool {
        let mut on_path = self.on_path.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *on_path.entry(program.to_string()).or_insert_with(|| {
            let found = lookup(program);
            log::debug!("'{program}' on PATH: {found}");
            found
        })
    }

    /// Run `command` (program, then arguments). `input` is written to
    /// stdin; without it stdin is closed.
    pub fn run(&self, command: &[String], input: Option<&str>) -> Result<ToolOutput, ExecutorError> {
        let (program, args) = command.split_first().ok_or(ExecutorError::EmptyCommand)?;
        if !self.is_available(program) {
            return Err(ExecutorError::NotFound {
                program: program.clone(),
            });
        }

        log::trace!("Running {command:?}");
        let mut child = Command::new(program)
            .args(args)
            .stdin(if input.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ExecutorError::io(program, "spawn failed", e))?;

        let stdout = child.stdout.take().map(collect);
        let stderr = child.stderr.take().map(collect);

        // Fed from its own thread so a program that never reads stdin still
        // runs into the deadline.
        let writer = match (input, child.stdin.take()) {
            (Some(input), Some(mut stdin)) => {
                let input = input.to_string();
                Some(thread::spawn(move || stdin.write_all(input.as_bytes())))
            }
            _ => None,
        };

        let Some(status) = self.wait(program, &mut child)? else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(ExecutorError::TimedOut {
                program: program.clone(),
                timeout_ms: self.timeout_ms,
            });
        };

        // Exiting without reading all of stdin is up to the program; its exit
        // status decides.
        if let Some(writer) = writer
            && let Ok(Err(e)) = writer.join()
            && e.kind() != io::ErrorKind::BrokenPipe
        {
            return Err(ExecutorError::io(program, "writing stdin failed", e));
        }

        Ok(ToolOutput {
            stdout: finish_collect(program, stdout)?,
            stderr: finish_collect(program, stderr)?,
            exit_code: status.code(),
        })
    }

    /// Wait for `child`, giving up (with `None`) once the deadline passes.
    fn wait(&self, program: &str, child: &mut Child) -> Result<Option<ExitStatus>, ExecutorError> {
        if self.timeout_ms == 0 {
            return child
                .wait()
                .map(Some)
                .map_err(|e| ExecutorError::io(program, "wait failed", e));
        }

        let deadline = Instant::now() + Duration::from_millis(self.timeout_ms);
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(Some(status)),
                Ok(None) if Instant::now() >= deadline => return Ok(None),
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => return Err(ExecutorError::io(program, "wait failed", e)),
            }
        }
    }
}

impl Default for ToolExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT_MS)
    }
}

fn lookup(program: &str) -> bool {
    let finder = if cfg!(windows) { "where" } else { "which" };
    Command::new(finder)
        .arg(program)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success())
}

/// Drain a pipe on its own thread so a chatty program cannot block on a
/// full pipe while we wait for it.
fn collect<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<io::Result<String>> {
    thread::spawn(move || {
        let mut bytes = Vec::new();
        pipe.read_to_end(&mut bytes)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    })
}

fn finish_collect(program: &str, reader: Option<JoinHandle<io::Result<String>>>) -> Result<String, ExecutorError> {
    let Some(reader) = reader else {
        return Ok(String::new());
    };
    match reader.join() {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(ExecutorError::io(program, "reading output failed", e)),
        Err(_) => Err(ExecutorError::io(program, "reading output failed", "reader thread panicked")),
    }
}
