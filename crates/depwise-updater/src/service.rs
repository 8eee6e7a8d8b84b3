//! Collaborators the job orchestrator drives
//!
//! Fetching files from source control, deciding on target versions,
//! rewriting files and talking to the tracking API all live outside this
//! crate. Each is an async trait so runs can be wired to real services or to
//! in-memory fakes.

use crate::classify::JobError;
use crate::job::Job;
use crate::outcome::{ChangedFile, UpdatedDependency};
use async_trait::async_trait;
use depwise_deps::{Dependency, DependencyFile};
use std::collections::BTreeSet;

/// Files fetched for a job, plus the commit they were read from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedFiles {
    pub files: Vec<DependencyFile>,
    pub base_commit_sha: String,
}

#[async_trait]
pub trait FileFetcher: Send + Sync {
    /// Fetch manifest, lockfile and support files for the job's directory
    async fn fetch_files(&self, job: &Job) -> anyhow::Result<FetchedFiles>;
}

#[async_trait]
pub trait VersionLister: Send + Sync {
    /// Every version available for `dependency`
    ///
    /// `None` means no registry gave a trustworthy answer. Callers must not
    /// read it as "no newer version".
    async fn list_versions(
        &self,
        dependency: &Dependency,
    ) -> anyhow::Result<Option<BTreeSet<String>>>;
}

/// Ecosystem-specific update policy
#[async_trait]
pub trait UpdateDecider: Send + Sync {
    /// Version to move `dependency` to, or `None` when it is up to date
    fn latest_version(
        &self,
        dependency: &Dependency,
        available: &BTreeSet<String>,
    ) -> Option<String>;

    /// Rewrite `files` so they pin `update`
    async fn updated_files(
        &self,
        files: &[DependencyFile],
        update: &UpdatedDependency,
    ) -> anyhow::Result<Vec<ChangedFile>>;
}

/// Job-tracking and change-proposal API
#[async_trait]
pub trait ApiService: Send + Sync {
    async fn create_pull_request(
        &self,
        job_id: u64,
        dependencies: &[UpdatedDependency],
        files: &[ChangedFile],
        base_commit_sha: &str,
    ) -> anyhow::Result<()>;

    async fn update_pull_request(
        &self,
        job_id: u64,
        dependencies: &[UpdatedDependency],
        files: &[ChangedFile],
        base_commit_sha: &str,
    ) -> anyhow::Result<()>;

    async fn close_pull_request(
        &self,
        job_id: u64,
        dependency_names: &[String],
        reason: &str,
    ) -> anyhow::Result<()>;

    async fn record_update_job_error(&self, job_id: u64, error: &JobError) -> anyhow::Result<()>;

    async fn mark_job_as_processed(&self, job_id: u64, base_commit_sha: &str) -> anyhow::Result<()>;
}
