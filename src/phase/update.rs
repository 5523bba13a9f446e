use crate::catalog::PackageEntry;
use crate::classify::{
    Verb, failure_summary, is_no_upgrade_available, is_success, requires_elevation,
};
use crate::runner::{RunError, Runner};

use super::{Orchestrator, Outcome, winget_args};

const CHECK_FLAGS: &[&str] = &[
    "--accept-package-agreements",
    "--accept-source-agreements",
    "--scope",
    "user",
];

const UPGRADE_FLAGS: &[&str] = &[
    "--silent",
    "--disable-interactivity",
    "--accept-package-agreements",
    "--accept-source-agreements",
];

impl<R: Runner> Orchestrator<R> {
    /// Upgrade one redistributable if the package manager offers a newer version.
    pub(super) async fn update(&self, entry: &PackageEntry) -> Result<Outcome, RunError> {
        let id = entry.identifier;
        self.log(&format!("Checking for updates: {}", entry.display_name));

        let check = self.step(winget_args("upgrade", id, CHECK_FLAGS)).await?;
        if is_no_upgrade_available(&check) {
            self.log("  ✓ No updates");
            return Ok(Outcome::NoUpdates);
        }
        if requires_elevation(&check) {
            self.log("  ⚠ Administrator rights required for update, skipped");
            return Ok(Outcome::SkippedElevation);
        }

        self.log("  → Upgrading...");
        let output = self.step(winget_args("upgrade", id, UPGRADE_FLAGS)).await?;
        if is_success(&output, Verb::Upgraded) {
            self.log("  ✓ Updated");
            return Ok(Outcome::Upgraded);
        }

        let summary = failure_summary(&output);
        self.log(&format!("  ⚠ Update not confirmed: {}", summary));
        Ok(Outcome::Failed(summary))
    }
}
