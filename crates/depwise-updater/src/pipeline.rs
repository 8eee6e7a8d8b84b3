//! Job orchestration
//!
//! A job moves through `Fetching → Parsing → Resolving → Updating →
//! Summarizing → Done`. Failures tied to one dependency are classified,
//! reported and recorded while the job carries on; misconfiguration aborts
//! the job at once.

use crate::cancel::CancellationHandle;
use crate::classify::{self, ErrorType, JobError};
use crate::error::{Error, Result};
use crate::job::Job;
use crate::outcome::{ChangeAction, Outcome, UpdatedDependency};
use crate::service::{ApiService, FetchedFiles, FileFetcher, UpdateDecider, VersionLister};
use crate::summary::JobSummary;
use depwise_config::Settings;
use depwise_deps::{Dependency, FileParser};
use futures::stream::{self, StreamExt};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Instrument};

/// Close reason sent for proposals whose dependency no longer needs updating
pub const UP_TO_DATE: &str = "up_to_date";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobPhase {
    Fetching,
    Parsing,
    Resolving,
    Updating,
    Summarizing,
    Done,
}

impl JobPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobPhase::Fetching => "fetching",
            JobPhase::Parsing => "parsing",
            JobPhase::Resolving => "resolving",
            JobPhase::Updating => "updating",
            JobPhase::Summarizing => "summarizing",
            JobPhase::Done => "done",
        }
    }
}

impl fmt::Display for JobPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// External services a job run is wired to
#[derive(Clone)]
pub struct Collaborators {
    pub fetcher: Arc<dyn FileFetcher>,
    pub parser: Arc<dyn FileParser>,
    pub lister: Arc<dyn VersionLister>,
    pub decider: Arc<dyn UpdateDecider>,
    pub api: Arc<dyn ApiService>,
}

/// Runs update jobs against a fixed set of collaborators
pub struct Updater {
    collaborators: Collaborators,
    settings: Settings,
    cancellation: CancellationHandle,
}

enum Lookup {
    Found(BTreeSet<String>),
    Unknown,
    Failed(anyhow::Error),
    Cancelled,
}

/// Mutable bookkeeping for one run
struct JobState {
    job_id: u64,
    phase: JobPhase,
    base_commit_sha: Option<String>,
    outcomes: Vec<Outcome>,
    errors: Vec<JobError>,
}

impl JobState {
    fn new(job_id: u64) -> Self {
        Self {
            job_id,
            phase: JobPhase::Fetching,
            base_commit_sha: None,
            outcomes: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn enter(&mut self, phase: JobPhase) {
        debug!("Job {}: {} -> {}", self.job_id, self.phase, phase);
        self.phase = phase;
    }

    fn take_summary(&mut self) -> JobSummary {
        JobSummary {
            outcomes: std::mem::take(&mut self.outcomes),
            errors: std::mem::take(&mut self.errors),
        }
    }
}

impl Updater {
    pub fn new(collaborators: Collaborators, settings: Settings) -> Self {
        Self {
            collaborators,
            settings,
            cancellation: CancellationHandle::new(),
        }
    }

    /// Use an externally owned cancellation handle
    pub fn with_cancellation(mut self, handle: CancellationHandle) -> Self {
        self.cancellation = handle;
        self
    }

    pub fn cancellation(&self) -> &CancellationHandle {
        &self.cancellation
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run one job to completion
    ///
    /// Returns the summary of proposals and recorded errors. Fails with
    /// `JobCancelled` on cancellation or timeout (after summarizing), with
    /// `RunFailure` in strict CI mode when any error was recorded (after
    /// reporting it), and with the underlying error on misconfiguration.
    pub async fn run(&self, job: &Job) -> Result<JobSummary> {
        let span = info_span!("job", job_id = job.id, package_manager = %job.package_manager);
        self.run_job(job).instrument(span).await
    }

    async fn run_job(&self, job: &Job) -> Result<JobSummary> {
        let mut state = JobState::new(job.id);

        let processed = match self.settings.job_timeout() {
            Some(limit) => {
                let bounded = tokio::time::timeout(limit, self.process(job, &mut state)).await;
                bounded.unwrap_or_else(|_| {
                    warn!("Job {} exceeded its {:?} time limit", job.id, limit);
                    Err(Error::JobCancelled { job_id: job.id })
                })
            }
            None => self.process(job, &mut state).await,
        };

        let cancelled = match processed {
            Ok(()) => false,
            Err(Error::JobCancelled { .. }) => {
                warn!("Job {} cancelled during {}", job.id, state.phase);
                self.report(job, &mut state, JobError::new(ErrorType::JobCancelled))
                    .await;
                true
            }
            Err(err) => {
                error!("Job {} aborted: {}", job.id, err);
                return Err(err);
            }
        };

        state.enter(JobPhase::Summarizing);
        let summary = state.take_summary();
        info!("{}", summary);

        let base_commit_sha = state.base_commit_sha.clone().unwrap_or_default();
        if let Err(err) = self
            .collaborators
            .api
            .mark_job_as_processed(job.id, &base_commit_sha)
            .await
        {
            warn!("Failed to mark job {} as processed: {:#}", job.id, err);
        }
        state.enter(JobPhase::Done);

        if cancelled {
            return Err(Error::JobCancelled { job_id: job.id });
        }

        if self.settings.is_strict() && !summary.is_clean() {
            return Err(Error::RunFailure {
                job_id: job.id,
                error_count: summary.errors.len(),
            });
        }

        Ok(summary)
    }

    async fn process(&self, job: &Job, state: &mut JobState) -> Result<()> {
        state.enter(JobPhase::Fetching);
        self.ensure_not_cancelled(job)?;

        let fetched = match self.collaborators.fetcher.fetch_files(job).await {
            Ok(fetched) => fetched,
            Err(err) => return self.capture(job, state, err).await,
        };
        state.base_commit_sha = Some(fetched.base_commit_sha.clone());
        debug!("Fetched {} files", fetched.files.len());

        state.enter(JobPhase::Parsing);
        self.ensure_not_cancelled(job)?;

        let dependencies = match self.collaborators.parser.parse(&fetched.files) {
            Ok(dependencies) => dependencies,
            Err(err) if err.is_fatal() => return Err(Error::Deps(err)),
            Err(err) => return self.capture(job, state, anyhow::Error::new(err)).await,
        };

        let candidates: Vec<Dependency> = dependencies
            .into_iter()
            .filter(|dep| job.allows(dep))
            .filter(|dep| {
                let known = dep.version.is_some();
                if !known {
                    debug!("Skipping {}: no resolved version", dep.name);
                }
                known
            })
            .collect();
        info!("{} dependencies to check", candidates.len());

        state.enter(JobPhase::Resolving);
        let mut resolved = Vec::with_capacity(candidates.len());
        for (dependency, lookup) in self.resolve(candidates).await {
            match lookup {
                Lookup::Found(versions) => resolved.push((dependency, versions)),
                Lookup::Unknown => {
                    info!("Skipping {}: no registry gave a usable answer", dependency.name)
                }
                Lookup::Failed(err) => {
                    let err = err.context(format!("looking up versions of {}", dependency.name));
                    self.capture(job, state, err).await?;
                }
                Lookup::Cancelled => return Err(Error::JobCancelled { job_id: job.id }),
            }
        }

        state.enter(JobPhase::Updating);
        for (dependency, versions) in resolved {
            self.ensure_not_cancelled(job)?;
            let span = info_span!("dependency", name = %dependency.name);
            self.update_dependency(job, &fetched, &dependency, &versions, state)
                .instrument(span)
                .await?;
        }

        Ok(())
    }

    /// Look up versions for every candidate, bounded and in input order
    async fn resolve(&self, candidates: Vec<Dependency>) -> Vec<(Dependency, Lookup)> {
        let lister = &self.collaborators.lister;
        let cancellation = &self.cancellation;

        stream::iter(candidates)
            .map(|dependency| async move {
                if cancellation.is_cancelled() {
                    return (dependency, Lookup::Cancelled);
                }

                let lookup = tokio::select! {
                    result = lister.list_versions(&dependency) => match result {
                        Ok(Some(versions)) => {
                            debug!("{} has {} versions", dependency.name, versions.len());
                            Lookup::Found(versions)
                        }
                        Ok(None) => Lookup::Unknown,
                        Err(err) => Lookup::Failed(err),
                    },
                    _ = cancellation.cancelled() => Lookup::Cancelled,
                };
                (dependency, lookup)
            })
            .buffered(self.settings.concurrency())
            .collect()
            .await
    }

    async fn update_dependency(
        &self,
        job: &Job,
        fetched: &FetchedFiles,
        dependency: &Dependency,
        versions: &BTreeSet<String>,
        state: &mut JobState,
    ) -> Result<()> {
        let api = &self.collaborators.api;

        let Some(version) = self
            .collaborators
            .decider
            .latest_version(dependency, versions)
        else {
            debug!("{} is up to date", dependency.name);
            for pr in job.pull_requests_for(&dependency.name) {
                let names = pr.dependency_names();
                match api.close_pull_request(job.id, &names, UP_TO_DATE).await {
                    Ok(()) => {
                        info!("Closed pull request for {}", names.join(", "));
                        state.outcomes.push(Outcome::closed(names));
                    }
                    Err(err) => self.capture(job, state, err).await?,
                }
            }
            return Ok(());
        };

        if !job.updating_a_pull_request
            && job
                .existing_pull_requests
                .iter()
                .any(|pr| pr.proposes(&dependency.name, &version))
        {
            info!(
                "Pull request already exists for {} {}",
                dependency.name, version
            );
            return Ok(());
        }

        let update = UpdatedDependency::new(dependency, version);
        let files = match self
            .collaborators
            .decider
            .updated_files(&fetched.files, &update)
            .await
        {
            Ok(files) => files,
            Err(err) => return self.capture(job, state, err).await,
        };

        let updates = vec![update];
        let (action, result) = if job.updating_a_pull_request {
            (
                ChangeAction::Updated,
                api.update_pull_request(job.id, &updates, &files, &fetched.base_commit_sha)
                    .await,
            )
        } else {
            (
                ChangeAction::Created,
                api.create_pull_request(job.id, &updates, &files, &fetched.base_commit_sha)
                    .await,
            )
        };

        match result {
            Ok(()) => {
                let outcome = Outcome::changed(action, updates);
                info!("{} pull request: {}", action, outcome.describe());
                state.outcomes.push(outcome);
                Ok(())
            }
            Err(err) => self.capture(job, state, err).await,
        }
    }

    /// Record a non-fatal failure and carry on; misconfiguration aborts
    async fn capture(&self, job: &Job, state: &mut JobState, err: anyhow::Error) -> Result<()> {
        if classify::is_fatal(&err) {
            return Err(into_fatal(err));
        }

        warn!("{:#}", err);
        let record = classify::classify(&err);
        self.report(job, state, record).await;
        Ok(())
    }

    /// Counted before the API call so a run cut short mid-report still
    /// includes it
    async fn report(&self, job: &Job, state: &mut JobState, record: JobError) {
        state.errors.push(record.clone());
        if let Err(err) = self
            .collaborators
            .api
            .record_update_job_error(job.id, &record)
            .await
        {
            warn!("Failed to record {} for job {}: {:#}", record.error_type, job.id, err);
        }
    }

    fn ensure_not_cancelled(&self, job: &Job) -> Result<()> {
        if self.cancellation.is_cancelled() {
            Err(Error::JobCancelled { job_id: job.id })
        } else {
            Ok(())
        }
    }
}

fn into_fatal(err: anyhow::Error) -> Error {
    let err = match err.downcast::<depwise_registry::Error>() {
        Ok(registry) => return Error::Registry(registry),
        Err(err) => err,
    };
    match err.downcast::<depwise_deps::Error>() {
        Ok(deps) => Error::Deps(deps),
        Err(err) => Error::Collaborator(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobSource;
    use crate::outcome::ChangedFile;
    use async_trait::async_trait;
    use depwise_deps::{ComposerFileParser, DependencyFile};
    use std::time::Duration;

    /// Collaborators whose error reporting never completes
    struct StalledApi;

    #[async_trait]
    impl FileFetcher for StalledApi {
        async fn fetch_files(&self, _job: &Job) -> anyhow::Result<FetchedFiles> {
            anyhow::bail!("no files")
        }
    }

    #[async_trait]
    impl VersionLister for StalledApi {
        async fn list_versions(
            &self,
            _dependency: &Dependency,
        ) -> anyhow::Result<Option<BTreeSet<String>>> {
            Ok(None)
        }
    }

    #[async_trait]
    impl UpdateDecider for StalledApi {
        fn latest_version(
            &self,
            _dependency: &Dependency,
            _available: &BTreeSet<String>,
        ) -> Option<String> {
            None
        }

        async fn updated_files(
            &self,
            _files: &[DependencyFile],
            _update: &UpdatedDependency,
        ) -> anyhow::Result<Vec<ChangedFile>> {
            Ok(Vec::new())
        }
    }

    #[async_trait]
    impl ApiService for StalledApi {
        async fn create_pull_request(
            &self,
            _job_id: u64,
            _dependencies: &[UpdatedDependency],
            _files: &[ChangedFile],
            _base_commit_sha: &str,
        ) -> anyhow::Result<()> {
            Ok(())
        }

        async fn update_pull_request(
            &self,
            _job_id: u64,
            _dependencies: &[UpdatedDependency],
            _files: &[ChangedFile],
            _base_commit_sha: &str,
        ) -> anyhow::Result<()> {
            Ok(())
        }

        async fn close_pull_request(
            &self,
            _job_id: u64,
            _dependency_names: &[String],
            _reason: &str,
        ) -> anyhow::Result<()> {
            Ok(())
        }

        async fn record_update_job_error(
            &self,
            _job_id: u64,
            _error: &JobError,
        ) -> anyhow::Result<()> {
            std::future::pending().await
        }

        async fn mark_job_as_processed(
            &self,
            _job_id: u64,
            _base_commit_sha: &str,
        ) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn stalled_updater() -> Updater {
        let stalled = Arc::new(StalledApi);
        Updater::new(
            Collaborators {
                fetcher: stalled.clone(),
                parser: Arc::new(ComposerFileParser::new()),
                lister: stalled.clone(),
                decider: stalled.clone(),
                api: stalled,
            },
            Settings {
                strict_ci: Some(false),
                ..Settings::default()
            },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_report_counts_error_when_cut_short() {
        let updater = stalled_updater();
        let job = Job::new(9, "composer", JobSource::new("acme/app"));
        let mut state = JobState::new(job.id);

        let reported = tokio::time::timeout(
            Duration::from_secs(1),
            updater.report(&job, &mut state, JobError::unknown()),
        )
        .await;

        assert!(reported.is_err());
        assert_eq!(state.errors, vec![JobError::unknown()]);
    }

    #[test]
    fn test_phase_names() {
        assert_eq!(JobPhase::Resolving.to_string(), "resolving");
        assert_eq!(JobPhase::Done.as_str(), "done");
    }

    #[test]
    fn test_into_fatal_keeps_typed_errors() {
        let err = into_fatal(anyhow::Error::new(
            depwise_registry::Error::UnknownRepositoryType("v9".to_string()),
        ));
        assert!(matches!(
            err,
            Error::Registry(depwise_registry::Error::UnknownRepositoryType(_))
        ));

        let err = into_fatal(anyhow::Error::new(depwise_deps::Error::UnknownScope(
            "optional".to_string(),
        )));
        assert!(matches!(err, Error::Deps(depwise_deps::Error::UnknownScope(_))));

        assert!(matches!(
            into_fatal(anyhow::anyhow!("other")),
            Error::Collaborator(_)
        ));
    }

    #[test]
    fn test_state_summary() {
        let mut state = JobState::new(3);
        state.errors.push(JobError::unknown());
        state.enter(JobPhase::Summarizing);

        let summary = state.take_summary();
        assert_eq!(summary.errors.len(), 1);
        assert!(state.errors.is_empty());
        assert_eq!(state.phase, JobPhase::Summarizing);
    }
}
