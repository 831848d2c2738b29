//! Line-oriented user output.
//!
//! Everything the user is meant to read (listings, notices, error lines and
//! renderer output) goes through a [`Console`]; diagnostics go to `tracing`.

use std::sync::{Mutex, PoisonError};

use console::Term;

/// Sink for user-facing lines.
pub trait Console: Send + Sync {
    /// Write a line to the output channel.
    fn log(&self, line: &str);

    /// Write a line to the error channel.
    fn error(&self, line: &str);
}

/// [`Console`] writing to the process stdout and stderr.
#[derive(Debug, Clone)]
pub struct TermConsole {
    out: Term,
    err: Term,
}

impl TermConsole {
    /// Console over the process streams.
    #[must_use]
    pub fn new() -> Self {
        Self {
            out: Term::stdout(),
            err: Term::stderr(),
        }
    }
}

impl Default for TermConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for TermConsole {
    fn log(&self, line: &str) {
        if let Err(err) = self.out.write_line(line) {
            tracing::warn!("Failed to write to stdout: {err}");
        }
    }

    fn error(&self, line: &str) {
        if let Err(err) = self.err.write_line(line) {
            tracing::warn!("Failed to write to stderr: {err}");
        }
    }
}

/// [`Console`] that keeps lines in memory.
#[derive(Debug, Default)]
pub struct MemoryConsole {
    logs: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl MemoryConsole {
    /// Empty console.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines written with [`Console::log`].
    pub fn logs(&self) -> Vec<String> {
        self.logs.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Lines written with [`Console::error`].
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Console for MemoryConsole {
    fn log(&self, line: &str) {
        self.logs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_owned());
    }

    fn error(&self, line: &str) {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_owned());
    }
}
