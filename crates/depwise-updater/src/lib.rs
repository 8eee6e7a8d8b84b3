//! # depwise-updater
//!
//! Orchestrates one dependency update job end to end: fetch the manifest and
//! lockfile, extract dependencies, look up available versions concurrently,
//! propose updates, and report every failure to the job-tracking service
//! without letting one dependency sink the rest.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   files    ┌──────────────┐  dependencies  ┌───────────────┐
//! │ FileFetcher  │ ─────────▶ │  FileParser  │ ─────────────▶ │ VersionLister │
//! └──────────────┘            └──────────────┘                └───────┬───────┘
//!                                                                     │ versions
//!                             ┌──────────────┐   proposals    ┌───────▼───────┐
//!                             │  ApiService  │ ◀───────────── │ UpdateDecider │
//!                             └──────────────┘                └───────────────┘
//! ```
//!
//! Every collaborator is a trait in [`service`]; [`Updater`] drives them
//! through the job phases and returns a [`JobSummary`].
//!
//! ## Example
//!
//! ```no_run
//! use depwise_config::{ConfigManager, Environment};
//! use depwise_updater::{Collaborators, Job, JobSource, RegistryVersionLister, Updater};
//! use std::sync::Arc;
//!
//! # async fn example(
//! #     fetcher: Arc<dyn depwise_updater::FileFetcher>,
//! #     decider: Arc<dyn depwise_updater::UpdateDecider>,
//! #     api: Arc<dyn depwise_updater::ApiService>,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! depwise_updater::logging::init(0);
//!
//! let config = ConfigManager::load_from("depwise.toml".as_ref())
//!     .await?
//!     .with_environment(&Environment::capture())
//!     .into_config();
//!
//! let updater = Updater::new(
//!     Collaborators {
//!         fetcher,
//!         parser: Arc::new(depwise_deps::ComposerFileParser::new()),
//!         lister: Arc::new(RegistryVersionLister::from_config(&config)?),
//!         decider,
//!         api,
//!     },
//!     config.settings.clone(),
//! );
//!
//! let summary = updater.run(&Job::new(1, "composer", JobSource::new("acme/app"))).await?;
//! println!("{}", summary);
//! # Ok(())
//! # }
//! ```

pub mod cancel;
pub mod classify;
pub mod error;
pub mod job;
pub mod logging;
pub mod lookup;
pub mod outcome;
pub mod pipeline;
pub mod service;
pub mod summary;

pub use cancel::CancellationHandle;
pub use classify::{classify, ErrorType, JobError};
pub use error::{Error, Result};
pub use job::{ExistingPullRequest, Job, JobSource, PullRequestDependency};
pub use lookup::RegistryVersionLister;
pub use outcome::{ChangeAction, ChangedFile, FileOperation, Outcome, UpdatedDependency};
pub use pipeline::{Collaborators, JobPhase, Updater, UP_TO_DATE};
pub use service::{ApiService, FetchedFiles, FileFetcher, UpdateDecider, VersionLister};
pub use summary::JobSummary;
