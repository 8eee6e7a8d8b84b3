//! Mapping captured failures onto reportable error records

use crate::error::Error;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// Reportable error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    UnknownError,
    MalformedVersion,
    DependencyFileNotParseable,
    DependencyFileNotFound,
    PrivateSourceAuthenticationFailure,
    PrivateSourceTimedOut,
    JobCancelled,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::UnknownError => "unknown_error",
            ErrorType::MalformedVersion => "malformed_version",
            ErrorType::DependencyFileNotParseable => "dependency_file_not_parseable",
            ErrorType::DependencyFileNotFound => "dependency_file_not_found",
            ErrorType::PrivateSourceAuthenticationFailure => {
                "private_source_authentication_failure"
            }
            ErrorType::PrivateSourceTimedOut => "private_source_timed_out",
            ErrorType::JobCancelled => "job_cancelled",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error record sent to the job-tracking service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobError {
    pub error_type: ErrorType,
    pub error_details: Option<Value>,
}

impl JobError {
    pub fn new(error_type: ErrorType) -> Self {
        Self {
            error_type,
            error_details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.error_details = Some(details);
        self
    }

    /// Catch-all for anything that could not be classified
    pub fn unknown() -> Self {
        Self::new(ErrorType::UnknownError)
    }
}

/// Classify a collaborator failure
///
/// Walks the error chain looking for a known typed error; anything else
/// becomes `unknown_error` without details.
pub fn classify(err: &anyhow::Error) -> JobError {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<depwise_registry::Error>() {
            if let Some(record) = classify_registry(e) {
                return record;
            }
        }
        if let Some(e) = cause.downcast_ref::<depwise_deps::Error>() {
            if let Some(record) = classify_deps(e) {
                return record;
            }
        }
        if let Some(e) = cause.downcast_ref::<Error>() {
            if let Some(record) = classify_job(e) {
                return record;
            }
        }
    }

    JobError::unknown()
}

/// Whether `err` is a misconfiguration that must abort the job
pub fn is_fatal(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<depwise_registry::Error>()
            .is_some_and(depwise_registry::Error::is_fatal)
            || cause
                .downcast_ref::<depwise_deps::Error>()
                .is_some_and(depwise_deps::Error::is_fatal)
    })
}

fn classify_registry(err: &depwise_registry::Error) -> Option<JobError> {
    use depwise_registry::Error as E;

    match err {
        E::PrivateSourceAuthenticationFailure { source_url } => Some(
            JobError::new(ErrorType::PrivateSourceAuthenticationFailure)
                .with_details(json!({ "source": source_url })),
        ),
        E::PrivateSourceTimedOut { source_url } => Some(
            JobError::new(ErrorType::PrivateSourceTimedOut)
                .with_details(json!({ "source": source_url })),
        ),
        _ => None,
    }
}

fn classify_deps(err: &depwise_deps::Error) -> Option<JobError> {
    use depwise_deps::Error as E;

    match err {
        E::MalformedVersion { .. } => Some(JobError::new(ErrorType::MalformedVersion)),
        E::DependencyFileNotParseable { path, .. } => Some(
            JobError::new(ErrorType::DependencyFileNotParseable)
                .with_details(json!({ "file-path": path })),
        ),
        E::DependencyFileNotFound(path) => Some(
            JobError::new(ErrorType::DependencyFileNotFound)
                .with_details(json!({ "file-path": path })),
        ),
        _ => None,
    }
}

fn classify_job(err: &Error) -> Option<JobError> {
    match err {
        Error::JobCancelled { .. } => Some(JobError::new(ErrorType::JobCancelled)),
        Error::Deps(e) => classify_deps(e),
        Error::Registry(e) => classify_registry(e),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_private_source_errors_carry_source() {
        let err = anyhow::Error::new(depwise_registry::Error::PrivateSourceTimedOut {
            source_url: "https://nuget.example.com/v3/index.json".to_string(),
        });
        let record = classify(&err);
        assert_eq!(record.error_type, ErrorType::PrivateSourceTimedOut);
        assert_eq!(
            record.error_details,
            Some(json!({ "source": "https://nuget.example.com/v3/index.json" }))
        );
    }

    #[test]
    fn test_file_errors_carry_path() {
        let err = anyhow::Error::new(depwise_deps::Error::DependencyFileNotParseable {
            path: "/composer.lock".to_string(),
            message: "expected value".to_string(),
        });
        let record = classify(&err);
        assert_eq!(record.error_type, ErrorType::DependencyFileNotParseable);
        assert_eq!(record.error_details, Some(json!({ "file-path": "/composer.lock" })));
    }

    #[test]
    fn test_classification_sees_through_context() {
        let err = Err::<(), _>(depwise_registry::Error::PrivateSourceAuthenticationFailure {
            source_url: "https://private.example.com/index.json".to_string(),
        })
        .context("looking up vendor/pkg")
        .unwrap_err();

        assert_eq!(
            classify(&err).error_type,
            ErrorType::PrivateSourceAuthenticationFailure
        );
    }

    #[test]
    fn test_unknown_errors() {
        let record = classify(&anyhow::anyhow!("oh no!"));
        assert_eq!(record, JobError::unknown());
        assert_eq!(record.error_details, None);
    }

    #[test]
    fn test_fatal_errors() {
        assert!(is_fatal(&anyhow::Error::new(
            depwise_registry::Error::UnknownRepositoryType("v4".to_string())
        )));
        assert!(is_fatal(&anyhow::Error::new(depwise_deps::Error::UnknownScope(
            "optional".to_string()
        ))));
        assert!(!is_fatal(&anyhow::anyhow!("transient")));
    }

    #[test]
    fn test_error_type_serializes_snake_case() {
        let value = serde_json::to_value(JobError::new(ErrorType::PrivateSourceTimedOut)).unwrap();
        assert_eq!(value["error_type"], "private_source_timed_out");
        assert_eq!(value["error_details"], Value::Null);
    }
}
