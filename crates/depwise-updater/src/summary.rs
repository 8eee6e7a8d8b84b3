use crate::classify::{ErrorType, JobError};
use crate::outcome::{ChangeAction, Outcome};
use serde::{Deserialize, Serialize};
use std::fmt;

const CHANGES_HEADER: &str = "Changes to pull requests:";
const NO_CHANGES: &str = "No changes to pull requests";

/// Everything a finished job produced, in processing order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobSummary {
    pub outcomes: Vec<Outcome>,
    pub errors: Vec<JobError>,
}

impl JobSummary {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Outcomes with the given action, in order
    pub fn with_action(&self, action: ChangeAction) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(move |o| o.action == action)
    }

    /// Number of recorded errors of `error_type`
    pub fn count_errors(&self, error_type: ErrorType) -> usize {
        self.errors
            .iter()
            .filter(|e| e.error_type == error_type)
            .count()
    }

    /// Summary lines: one per action group, then error counts
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();

        if !self.outcomes.is_empty() {
            lines.push(CHANGES_HEADER.to_string());
            for action in [
                ChangeAction::Created,
                ChangeAction::Updated,
                ChangeAction::Closed,
            ] {
                let described: Vec<String> =
                    self.with_action(action).map(Outcome::describe).collect();
                if !described.is_empty() {
                    lines.push(format!("{}: {}", action, described.join(", ")));
                }
            }
        }

        if !self.errors.is_empty() {
            lines.push(format!(
                "Encountered '{}' error(s) during execution",
                self.errors.len()
            ));

            let mut seen: Vec<ErrorType> = Vec::new();
            for err in &self.errors {
                if !seen.contains(&err.error_type) {
                    seen.push(err.error_type);
                    lines.push(format!(
                        "  {}: {}",
                        err.error_type,
                        self.count_errors(err.error_type)
                    ));
                }
            }
        }

        if lines.is_empty() {
            lines.push(NO_CHANGES.to_string());
        }

        lines
    }
}

impl fmt::Display for JobSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines().join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::UpdatedDependency;
    use depwise_deps::{Dependency, Requirement, Scope};

    fn updated(name: &str, from: &str, to: &str) -> UpdatedDependency {
        let requirements = vec![Requirement::new("*", "composer.json", Scope::Runtime)];
        let dep = Dependency::new(name, Some(from.to_string()), requirements, "composer").unwrap();
        UpdatedDependency::new(&dep, to)
    }

    #[test]
    fn test_empty_summary_still_reports() {
        assert_eq!(JobSummary::default().to_string(), NO_CHANGES);
    }

    #[test]
    fn test_grouped_lines() {
        let summary = JobSummary {
            outcomes: vec![
                Outcome::changed(
                    ChangeAction::Created,
                    vec![updated("vendor/a", "1.1.0", "1.2.0")],
                ),
                Outcome::closed(vec!["vendor/c".to_string()]),
                Outcome::changed(
                    ChangeAction::Created,
                    vec![updated("vendor/b", "2.0.0", "3.0.0")],
                ),
            ],
            errors: vec![
                JobError::new(ErrorType::PrivateSourceTimedOut),
                JobError::unknown(),
                JobError::new(ErrorType::PrivateSourceTimedOut),
            ],
        };

        assert_eq!(
            summary.lines(),
            vec![
                "Changes to pull requests:",
                "created: vendor/a ( from 1.1.0 to 1.2.0 ), vendor/b ( from 2.0.0 to 3.0.0 )",
                "closed: vendor/c",
                "Encountered '3' error(s) during execution",
                "  private_source_timed_out: 2",
                "  unknown_error: 1",
            ]
        );
        assert!(!summary.is_clean());
    }

    #[test]
    fn test_errors_only() {
        let summary = JobSummary {
            outcomes: Vec::new(),
            errors: vec![JobError::unknown()],
        };
        let rendered = summary.to_string();
        assert!(!rendered.contains(CHANGES_HEADER));
        assert!(rendered.contains("Encountered '1' error(s)"));
    }
}
