//! Aggregation of unit outcomes into an exit code.

use crate::orchestrator::{UnitReport, UnitState};

/// Outcome of a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    succeeded: usize,
    skipped: usize,
    failures: Vec<String>,
}

impl Summary {
    /// Summarise settled reports, keeping failing titles in list order.
    pub fn from_reports(reports: &[UnitReport]) -> Self {
        reports.iter().fold(Self::default(), |mut summary, report| {
            match report.state {
                UnitState::Succeeded => summary.succeeded += 1,
                UnitState::Skipped => summary.skipped += 1,
                UnitState::Failed => summary.failures.push(report.title.clone()),
                UnitState::Pending | UnitState::Running => {
                    tracing::warn!("{} never settled", report.title);
                }
            }
            summary
        })
    }

    /// Titles of failed units.
    pub fn failures(&self) -> &[String] {
        &self.failures
    }

    /// Whether any unit failed.
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Number of units that succeeded.
    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    /// Number of units that were skipped.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// `0` when nothing failed, `1` otherwise.
    pub fn exit_code(&self) -> i32 {
        i32::from(self.has_failures())
    }

    /// Message naming every failed command, `None` when nothing failed.
    pub fn failure_message(&self) -> Option<String> {
        if !self.has_failures() {
            return None;
        }

        let mut message = String::from("\nThe following commands failed:");
        for title in &self.failures {
            message.push_str("\n* ");
            message.push_str(title);
        }
        Some(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskTarget;
    use core::time::Duration;

    fn report(title: &str, state: UnitState) -> UnitReport {
        UnitReport {
            title: title.to_owned(),
            target: TaskTarget::workspace(title),
            state,
            output: None,
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn test_all_succeeded() {
        let summary = Summary::from_reports(&[
            report("a", UnitState::Succeeded),
            report("b", UnitState::Skipped),
        ]);
        assert_eq!(summary.exit_code(), 0);
        assert_eq!(summary.succeeded(), 1);
        assert_eq!(summary.skipped(), 1);
        assert!(summary.failure_message().is_none());
    }

    #[test]
    fn test_failures_listed_in_order() {
        let summary = Summary::from_reports(&[
            report("npm run test --workspace ws/b", UnitState::Failed),
            report("npm run test --workspace ws/a", UnitState::Succeeded),
            report("npm run test --workspace ws/c", UnitState::Failed),
        ]);

        assert_eq!(summary.exit_code(), 1);
        assert_eq!(
            summary.failures(),
            ["npm run test --workspace ws/b", "npm run test --workspace ws/c"]
        );
        assert_eq!(
            summary.failure_message().unwrap(),
            "\nThe following commands failed:\n* npm run test --workspace ws/b\n* npm run test --workspace ws/c"
        );
    }

    #[test]
    fn test_empty_run_has_no_failures() {
        let summary = Summary::from_reports(&[]);
        assert_eq!(summary.exit_code(), 0);
        assert!(!summary.has_failures());
    }
}
