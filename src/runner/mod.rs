//! Subprocess runner for the package-manager CLI.
//!
//! - `buffer` - bounded line store for captured output
//! - `winget` - the real runner that spawns the executable

mod buffer;
mod winget;

use std::io;

use async_trait::async_trait;
use thiserror::Error;

pub use buffer::{LineBuffer, MAX_LINES};
pub use winget::{DEFAULT_PROGRAM, WingetRunner};

/// Why a subprocess call produced no result.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to start {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed while waiting for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} was started without a {stream} pipe")]
    MissingPipe {
        program: String,
        stream: &'static str,
    },
}

/// Recent output of one subprocess invocation, oldest line first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    lines: Vec<String>,
}

impl CommandResult {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The retained lines joined with `\n`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

impl From<&str> for CommandResult {
    fn from(text: &str) -> Self {
        Self::new(text.lines().map(str::to_string).collect())
    }
}

/// Runs the package manager with the given arguments and waits for it to exit.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Runner: Send + Sync {
    /// Run once and return the captured output. When `stream_to_log` is set,
    /// every accepted line is also appended to the progress log as it arrives.
    async fn run(&self, args: &[String], stream_to_log: bool) -> Result<CommandResult, RunError>;
}
