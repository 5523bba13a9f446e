use crate::catalog::PackageEntry;
use crate::classify::{Verb, failure_summary, is_not_installed, is_success};
use crate::runner::{RunError, Runner};

use super::{Orchestrator, Outcome, Scope, winget_args};

const UNINSTALL_FLAGS_USER: &[&str] = &[
    "--silent",
    "--disable-interactivity",
    "--accept-source-agreements",
    "--all-versions",
    "--scope",
    "user",
];

const UNINSTALL_FLAGS_FORCE: &[&str] = &[
    "--silent",
    "--disable-interactivity",
    "--accept-source-agreements",
    "--all-versions",
    "--force",
];

impl<R: Runner> Orchestrator<R> {
    /// Remove one redistributable: user scope first, then forced.
    pub(super) async fn clean(&self, entry: &PackageEntry) -> Result<Outcome, RunError> {
        let id = entry.identifier;
        self.log(&format!("Checking: {}", entry.display_name));

        let listing = self.step(winget_args("list", id, &[])).await?;
        if is_not_installed(&listing) {
            self.log(&format!("  ✓ Not found: {}", entry.display_name));
            return Ok(Outcome::NotFound);
        }

        self.log(&format!("Removing: {}", entry.display_name));
        let output = self
            .step(winget_args("uninstall", id, UNINSTALL_FLAGS_USER))
            .await?;
        if is_success(&output, Verb::Uninstalled) {
            self.log("  ✓ Removed (user scope)");
            return Ok(Outcome::Removed(Scope::User));
        }

        let output = self
            .step(winget_args("uninstall", id, UNINSTALL_FLAGS_FORCE))
            .await?;
        if is_success(&output, Verb::Uninstalled) {
            self.log("  ✓ Removed (force)");
            return Ok(Outcome::Removed(Scope::Forced));
        }

        let summary = failure_summary(&output);
        self.log(&format!("  ⚠ Could not remove: {}", summary));
        Ok(Outcome::Failed(summary))
    }
}

#[cfg(test)]
mod tests {
    use super::super::Phase;
    use super::super::test_support::*;
    use super::*;
    use crate::runner::MockRunner;
    use mockall::Sequence;

    fn list() -> String {
        format!("list --id {}", ID)
    }

    fn uninstall_user() -> String {
        format!(
            "uninstall --id {} --silent --disable-interactivity --accept-source-agreements --all-versions --scope user",
            ID
        )
    }

    fn uninstall_force() -> String {
        format!(
            "uninstall --id {} --silent --disable-interactivity --accept-source-agreements --all-versions --force",
            ID
        )
    }

    #[tokio::test]
    async fn test_not_installed_is_skipped() {
        let mut runner = MockRunner::new();
        let mut seq = Sequence::new();
        expect_run(
            &mut runner,
            &mut seq,
            list(),
            "No installed package found matching input criteria.",
        );
        let (orchestrator, sink) = orchestrator(runner, vec![entry()]);

        let report = orchestrator.run(Phase::Clean).await.unwrap();

        assert_eq!(report.outcome(ID), Some(&Outcome::NotFound));
        assert!(sink.contents().contains("✓ Not found: VC++ 2013 x64"));
    }

    #[tokio::test]
    async fn test_user_scope_uninstall() {
        let mut runner = MockRunner::new();
        let mut seq = Sequence::new();
        expect_run(
            &mut runner,
            &mut seq,
            list(),
            "Microsoft.VCRedist.2013.x64 12.0.40664.0",
        );
        expect_run(
            &mut runner,
            &mut seq,
            uninstall_user(),
            "Successfully uninstalled",
        );
        let (orchestrator, sink) = orchestrator(runner, vec![entry()]);

        let report = orchestrator.run(Phase::Clean).await.unwrap();

        assert_eq!(report.outcome(ID), Some(&Outcome::Removed(Scope::User)));
        assert!(sink.contents().contains("✓ Removed (user scope)"));
    }

    #[tokio::test]
    async fn test_falls_back_to_forced_uninstall() {
        let mut runner = MockRunner::new();
        let mut seq = Sequence::new();
        expect_run(
            &mut runner,
            &mut seq,
            list(),
            "Microsoft.VCRedist.2013.x64 12.0.40664.0",
        );
        expect_run(
            &mut runner,
            &mut seq,
            uninstall_user(),
            "No installed package found matching input criteria.",
        );
        expect_run(
            &mut runner,
            &mut seq,
            uninstall_force(),
            "Successfully uninstalled",
        );
        let (orchestrator, sink) = orchestrator(runner, vec![entry()]);

        let report = orchestrator.run(Phase::Clean).await.unwrap();

        assert_eq!(report.outcome(ID), Some(&Outcome::Removed(Scope::Forced)));
        assert!(sink.contents().contains("✓ Removed (force)"));
    }

    #[test_log::test(tokio::test)]
    async fn test_failure_logs_summary_and_continues() {
        let packages: Vec<_> = crate::catalog::list()
            .into_iter()
            .filter(|e| e.identifier.starts_with("Microsoft.VCRedist.2013"))
            .collect();
        let x86 = packages[0].identifier;

        let mut runner = MockRunner::new();
        let mut seq = Sequence::new();
        expect_run(
            &mut runner,
            &mut seq,
            format!("list --id {}", x86),
            "Found VC++ 2013 x86",
        );
        expect_run(
            &mut runner,
            &mut seq,
            format!(
                "uninstall --id {} --silent --disable-interactivity --accept-source-agreements --all-versions --scope user",
                x86
            ),
            "Uninstall failed with exit code: 1603",
        );
        expect_run(
            &mut runner,
            &mut seq,
            format!(
                "uninstall --id {} --silent --disable-interactivity --accept-source-agreements --all-versions --force",
                x86
            ),
            "|\n\\\nStarting package uninstall...\n█▒░\nline 2\nline 3\nline 4\nline 5\nline 6\nline 7\nline 8",
        );
        expect_run(&mut runner, &mut seq, list(), "No installed package found");
        let (orchestrator, sink) = orchestrator(runner, packages);

        let report = orchestrator.run(Phase::Clean).await.unwrap();

        let expected = "Starting package uninstall...\nline 2\nline 3\nline 4\nline 5\nline 6";
        assert_eq!(
            report.outcome(x86),
            Some(&Outcome::Failed(expected.to_string()))
        );
        assert_eq!(report.outcome(ID), Some(&Outcome::NotFound));

        let log = sink.contents();
        assert!(log.contains(&format!("⚠ Could not remove: {}", expected)));
        assert!(!log.contains("line 7"));
        assert!(log.contains("Clean finished."));
    }
}
