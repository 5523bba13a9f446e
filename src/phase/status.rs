use crate::catalog::PackageEntry;
use crate::classify::is_not_installed;
use crate::runner::{RunError, Runner};

use super::{Orchestrator, Outcome, winget_args};

impl<R: Runner> Orchestrator<R> {
    /// Report whether one redistributable is present. Changes nothing.
    pub(super) async fn status(&self, entry: &PackageEntry) -> Result<Outcome, RunError> {
        let listing = self
            .step(winget_args("list", entry.identifier, &[]))
            .await?;
        if is_not_installed(&listing) {
            self.log(&format!("  · {}: not installed", entry.display_name));
            Ok(Outcome::Absent)
        } else {
            self.log(&format!("  ✓ {}: installed", entry.display_name));
            Ok(Outcome::Present)
        }
    }
}
