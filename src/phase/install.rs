use crate::catalog::PackageEntry;
use crate::classify::{
    Verb, failure_summary, is_not_installed, is_success, requires_elevation,
};
use crate::runner::{RunError, Runner};

use super::{Orchestrator, Outcome, Scope, winget_args};

const INSTALL_FLAGS: &[&str] = &[
    "--silent",
    "--disable-interactivity",
    "--accept-package-agreements",
    "--accept-source-agreements",
];

const INSTALL_FLAGS_USER: &[&str] = &[
    "--silent",
    "--disable-interactivity",
    "--accept-package-agreements",
    "--accept-source-agreements",
    "--scope",
    "user",
];

impl<R: Runner> Orchestrator<R> {
    /// Install one redistributable, never triggering an elevation prompt.
    pub(super) async fn install(&self, entry: &PackageEntry) -> Result<Outcome, RunError> {
        let id = entry.identifier;
        self.log(&format!("Installing: {}", entry.display_name));

        let listing = self.step(winget_args("list", id, &[])).await?;
        if !is_not_installed(&listing) {
            self.log("  ✓ Already installed");
            return Ok(Outcome::AlreadyInstalled);
        }

        let output = self
            .step(winget_args("install", id, INSTALL_FLAGS_USER))
            .await?;
        if is_success(&output, Verb::Installed) {
            self.log("  ✓ Installed (user scope)");
            return Ok(Outcome::Installed(Scope::User));
        }
        if requires_elevation(&output) {
            self.log("  ⚠ Administrator rights required, skipped (avoiding elevation prompt)");
            return Ok(Outcome::SkippedElevation);
        }

        let output = self.step(winget_args("install", id, INSTALL_FLAGS)).await?;
        if is_success(&output, Verb::Installed) {
            self.log("  ✓ Installed");
            return Ok(Outcome::Installed(Scope::Default));
        }

        let summary = failure_summary(&output);
        self.log(&format!("  ⚠ Installation not confirmed: {}", summary));
        Ok(Outcome::Failed(summary))
    }
}
