//! Runtime settings resolved from command-line flags and environment.

use std::path::PathBuf;

use log::debug;
use thiserror::Error;

use crate::catalog::{self, PackageEntry};
use crate::log_sink::DEFAULT_CAPACITY;
use crate::runner::DEFAULT_PROGRAM;

/// Smallest log capacity that still leaves room for one character after trimming.
pub const MIN_LOG_CAPACITY: usize = 2;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown package id '{0}'; run `vcredist catalog` to see the supported ids")]
    UnknownPackage(String),

    #[error("log capacity must be at least 2 characters, got {0}")]
    CapacityTooSmall(usize),
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Package-manager executable.
    pub winget: PathBuf,
    /// Forward live subprocess output to the log.
    pub stream_output: bool,
    pub log_capacity: usize,
    /// Catalog entries to process, in catalog order.
    pub packages: Vec<PackageEntry>,
}

impl Config {
    pub fn new(
        winget: Option<PathBuf>,
        stream_output: bool,
        log_capacity: Option<usize>,
        ids: &[String],
    ) -> Result<Self, ConfigError> {
        let log_capacity = log_capacity.unwrap_or(DEFAULT_CAPACITY);
        if log_capacity < MIN_LOG_CAPACITY {
            return Err(ConfigError::CapacityTooSmall(log_capacity));
        }

        let packages = select_packages(ids)?;
        let winget = winget.unwrap_or_else(|| PathBuf::from(DEFAULT_PROGRAM));
        debug!(
            "Using {:?}, {} package(s), log capacity {}",
            winget,
            packages.len(),
            log_capacity
        );

        Ok(Self {
            winget,
            stream_output,
            log_capacity,
            packages,
        })
    }
}

/// Resolve `ids` against the catalog; an empty selection means every entry.
/// The result keeps catalog order and holds no duplicates.
fn select_packages(ids: &[String]) -> Result<Vec<PackageEntry>, ConfigError> {
    if ids.is_empty() {
        return Ok(catalog::list());
    }

    let mut wanted = Vec::with_capacity(ids.len());
    for id in ids {
        let entry = catalog::find(id).ok_or_else(|| ConfigError::UnknownPackage(id.clone()))?;
        wanted.push(entry.identifier);
    }

    Ok(catalog::list()
        .into_iter()
        .filter(|entry| wanted.contains(&entry.identifier))
        .collect())
}
