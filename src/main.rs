use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use log::debug;
use vcredist::catalog;
use vcredist::config::Config;
use vcredist::log_sink::LogSink;
use vcredist::phase::{Orchestrator, Phase};
use vcredist::privilege::is_privileged;
use vcredist::runner::WingetRunner;

/// vcredist - Visual C++ Redistributable manager
///
/// Removes, installs and upgrades the Microsoft Visual C++ 2005-2022
/// redistributables by driving winget. Never triggers an elevation prompt:
/// packages whose installer wants administrator rights are skipped.
///
/// Examples:
///   vcredist status                                  # What is installed
///   vcredist install                                 # Install what is missing
///   vcredist update --id Microsoft.VCRedist.2015+.x64
#[derive(Parser, Debug)]
#[command(author, version = env!("VCREDIST_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Only process this package id (repeatable; defaults to the whole catalog)
    #[arg(long = "id", value_name = "ID", global = true)]
    pub ids: Vec<String>,

    /// Package-manager executable (defaults to winget on PATH)
    #[arg(long, env = "VCREDIST_WINGET", value_name = "PATH", global = true)]
    pub winget: Option<PathBuf>,

    /// Show live package-manager output in the log
    #[arg(long, env = "VCREDIST_STREAM", global = true)]
    pub stream: bool,

    /// Maximum size of the in-memory log, in characters
    #[arg(
        long = "log-capacity",
        env = "VCREDIST_LOG_CAPACITY",
        value_name = "CHARS",
        global = true
    )]
    pub log_capacity: Option<usize>,
}

#[derive(clap::Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Remove installed redistributables
    Clean,

    /// Install missing redistributables
    Install,

    /// Upgrade installed redistributables
    Update,

    /// Show which redistributables are installed
    Status,

    /// List the supported package ids
    Catalog,
}

impl Commands {
    fn phase(&self) -> Option<Phase> {
        match self {
            Commands::Clean => Some(Phase::Clean),
            Commands::Install => Some(Phase::Install),
            Commands::Update => Some(Phase::Update),
            Commands::Status => Some(Phase::Status),
            Commands::Catalog => None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let Some(phase) = cli.command.phase() else {
        for entry in catalog::list() {
            println!("{:<30} {}", entry.identifier, entry.display_name);
        }
        return Ok(());
    };

    let config = Config::new(cli.winget, cli.stream, cli.log_capacity, &cli.ids)?;
    let sink = Arc::new(LogSink::with_listener(config.log_capacity, |line| {
        println!("{}", line)
    }));

    if is_privileged() {
        sink.append("Running with administrator rights.");
    }

    let runner = WingetRunner::new(config.winget.clone(), Arc::clone(&sink));
    let orchestrator = Orchestrator::from_config(runner, Arc::clone(&sink), &config);
    let report = orchestrator.run(phase).await?;
    debug!("{} done: {}", phase, report.summary());

    Ok(())
}
