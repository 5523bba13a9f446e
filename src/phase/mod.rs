//! Phase orchestrators - one pass over the catalog per user action.
//!
//! Entries are processed strictly one after another so that at most one
//! package-manager process is alive and the log reads in catalog order.
//! Failures are contained per entry: they are logged and the pass moves on.
//!
//! - `clean` - remove installed redistributables
//! - `install` - install missing redistributables without elevation
//! - `update` - upgrade installed redistributables without elevation
//! - `status` - report which redistributables are present
//! - `gate` - keeps two phases from overlapping

mod clean;
mod gate;
mod install;
mod status;
mod update;

use std::fmt;
use std::sync::Arc;

use log::{debug, warn};
use thiserror::Error;

use crate::catalog::PackageEntry;
use crate::config::Config;
use crate::log_sink::LogSink;
use crate::runner::{RunError, Runner};

pub use gate::{PhaseGate, PhaseGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Clean,
    Install,
    Update,
    Status,
}

impl Phase {
    pub fn title(self) -> &'static str {
        match self {
            Phase::Clean => "Clean",
            Phase::Install => "Install",
            Phase::Update => "Update",
            Phase::Status => "Status",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PhaseError {
    #[error("cannot start {requested}: {running} is still running")]
    AlreadyRunning { requested: Phase, running: Phase },
}

/// Which variant of a command achieved the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// `--scope user`
    User,
    /// No scope flag; the package manager picks.
    Default,
    /// `--force`
    Forced,
}

/// How one catalog entry ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    NotFound,
    Removed(Scope),
    AlreadyInstalled,
    Installed(Scope),
    NoUpdates,
    Upgraded,
    Present,
    Absent,
    /// The installer would have asked for administrator rights.
    SkippedElevation,
    /// Output matched no known phrase, or the attempt errored.
    Failed(String),
}

impl Outcome {
    pub fn is_change(&self) -> bool {
        matches!(
            self,
            Outcome::Removed(_) | Outcome::Installed(_) | Outcome::Upgraded
        )
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, Outcome::SkippedElevation)
    }
}

/// Per-entry results of one phase, in processing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseReport {
    pub phase: Phase,
    pub entries: Vec<(PackageEntry, Outcome)>,
}

impl PhaseReport {
    fn new(phase: Phase) -> Self {
        Self {
            phase,
            entries: Vec::new(),
        }
    }

    pub fn outcome(&self, identifier: &str) -> Option<&Outcome> {
        self.entries
            .iter()
            .find(|(entry, _)| entry.identifier == identifier)
            .map(|(_, outcome)| outcome)
    }

    pub fn changed(&self) -> usize {
        self.entries.iter().filter(|(_, o)| o.is_change()).count()
    }

    pub fn skipped(&self) -> usize {
        self.entries.iter().filter(|(_, o)| o.is_skip()).count()
    }

    pub fn failed(&self) -> usize {
        self.entries.iter().filter(|(_, o)| o.is_failure()).count()
    }

    pub fn unchanged(&self) -> usize {
        self.entries.len() - self.changed() - self.skipped() - self.failed()
    }

    pub fn summary(&self) -> String {
        format!(
            "Summary: {} changed, {} unchanged, {} skipped, {} failed",
            self.changed(),
            self.unchanged(),
            self.skipped(),
            self.failed()
        )
    }
}

/// Build `<subcommand> --id <id> <flags...>`.
fn winget_args(subcommand: &str, id: &str, flags: &[&str]) -> Vec<String> {
    [subcommand, "--id", id]
        .iter()
        .chain(flags)
        .map(|s| s.to_string())
        .collect()
}

/// Drives the package manager over the catalog, one phase at a time.
pub struct Orchestrator<R: Runner> {
    runner: R,
    sink: Arc<LogSink>,
    packages: Vec<PackageEntry>,
    stream_output: bool,
    gate: PhaseGate,
}

impl<R: Runner> Orchestrator<R> {
    pub fn new(
        runner: R,
        sink: Arc<LogSink>,
        packages: Vec<PackageEntry>,
        stream_output: bool,
    ) -> Self {
        Self {
            runner,
            sink,
            packages,
            stream_output,
            gate: PhaseGate::new(),
        }
    }

    pub fn from_config(runner: R, sink: Arc<LogSink>, config: &Config) -> Self {
        Self::new(runner, sink, config.packages.clone(), config.stream_output)
    }

    /// True while a phase is running; front ends disable their triggers.
    pub fn is_busy(&self) -> bool {
        self.gate.current().is_some()
    }

    pub fn gate(&self) -> &PhaseGate {
        &self.gate
    }

    /// Run `phase` over every configured entry.
    ///
    /// Fails only when another phase holds the gate; per-entry problems end
    /// up in the log and in the report.
    #[tracing::instrument(skip(self))]
    pub async fn run(&self, phase: Phase) -> Result<PhaseReport, PhaseError> {
        let _guard = self.gate.try_enter(phase)?;
        debug!("Starting {} over {} package(s)", phase, self.packages.len());

        self.log(&format!("=== {} ===", phase));
        let mut report = PhaseReport::new(phase);

        for entry in &self.packages {
            let result = match phase {
                Phase::Clean => self.clean(entry).await,
                Phase::Install => self.install(entry).await,
                Phase::Update => self.update(entry).await,
                Phase::Status => self.status(entry).await,
            };
            let outcome = result.unwrap_or_else(|e| {
                warn!("{} failed for {}: {}", phase, entry.identifier, e);
                self.log(&format!("  ⚠ Error: {}", e));
                Outcome::Failed(e.to_string())
            });
            report.entries.push((entry.clone(), outcome));
        }

        self.log(&format!("{} finished.", phase));
        self.log(&report.summary());
        Ok(report)
    }

    fn log(&self, line: &str) {
        self.sink.append(line);
    }

    /// Run one package-manager command and return its captured text.
    ///
    /// A launch failure is reported to the log and yields empty output, which
    /// every classifier treats as "no actionable signal".
    async fn step(&self, args: Vec<String>) -> Result<String, RunError> {
        match self.runner.run(&args, self.stream_output).await {
            Ok(result) => Ok(result.text()),
            Err(e @ RunError::Launch { .. }) => {
                warn!("{}", e);
                self.log(&format!("  ⚠ {}", e));
                Ok(String::new())
            }
            Err(e) => Err(e),
        }
    }
}
