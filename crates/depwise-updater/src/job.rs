use depwise_deps::Dependency;
use serde::{Deserialize, Serialize};

/// One update job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Job {
    /// Job identifier, reported with every collaborator call
    pub id: u64,

    /// Package manager tag the job updates (e.g. "composer")
    pub package_manager: String,

    /// Restrict the job to these dependency names; `None` means every
    /// top-level dependency
    #[serde(default)]
    pub dependencies: Option<Vec<String>>,

    /// Proposals already open for this repository
    #[serde(default)]
    pub existing_pull_requests: Vec<ExistingPullRequest>,

    /// Refresh an existing proposal instead of opening new ones
    #[serde(default)]
    pub updating_a_pull_request: bool,

    /// Where the files come from
    pub source: JobSource,
}

impl Job {
    /// Create a job over every top-level dependency
    pub fn new(id: u64, package_manager: impl Into<String>, source: JobSource) -> Self {
        Self {
            id,
            package_manager: package_manager.into(),
            dependencies: None,
            existing_pull_requests: Vec::new(),
            updating_a_pull_request: false,
            source,
        }
    }

    pub fn with_dependencies<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_existing_pull_request(mut self, pr: ExistingPullRequest) -> Self {
        self.existing_pull_requests.push(pr);
        self
    }

    pub fn updating_pull_request(mut self) -> Self {
        self.updating_a_pull_request = true;
        self
    }

    /// Whether `dependency` is in scope for this job
    ///
    /// An explicit allow-list matches names case-insensitively and may name
    /// transitive entries; otherwise only top-level dependencies qualify.
    pub fn allows(&self, dependency: &Dependency) -> bool {
        match &self.dependencies {
            Some(names) => names
                .iter()
                .any(|n| n.eq_ignore_ascii_case(&dependency.name)),
            None => dependency.is_top_level(),
        }
    }

    /// Open proposals that touch `name`
    pub fn pull_requests_for<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a ExistingPullRequest> + 'a {
        self.existing_pull_requests
            .iter()
            .filter(move |pr| pr.touches(name))
    }
}

/// Repository coordinates of a job
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSource {
    /// `owner/name`
    pub repo: String,
    /// Directory holding the manifest
    #[serde(default = "default_directory")]
    pub directory: String,
    /// Target branch, `None` for the default branch
    #[serde(default)]
    pub branch: Option<String>,
}

impl JobSource {
    pub fn new(repo: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            directory: default_directory(),
            branch: None,
        }
    }
}

/// An open proposal and the dependency versions it moves to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingPullRequest {
    pub dependencies: Vec<PullRequestDependency>,
}

impl ExistingPullRequest {
    /// Proposal moving a single dependency to `version`
    pub fn single(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            dependencies: vec![PullRequestDependency {
                name: name.into(),
                version: Some(version.into()),
            }],
        }
    }

    pub fn touches(&self, name: &str) -> bool {
        self.dependencies
            .iter()
            .any(|d| d.name.eq_ignore_ascii_case(name))
    }

    /// Whether this proposal already moves `name` to exactly `version`
    pub fn proposes(&self, name: &str, version: &str) -> bool {
        self.dependencies
            .iter()
            .any(|d| d.name.eq_ignore_ascii_case(name) && d.version.as_deref() == Some(version))
    }

    /// Names of every dependency in the proposal
    pub fn dependency_names(&self) -> Vec<String> {
        self.dependencies.iter().map(|d| d.name.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PullRequestDependency {
    #[serde(rename = "dependency-name")]
    pub name: String,
    #[serde(rename = "dependency-version", default)]
    pub version: Option<String>,
}

fn default_directory() -> String {
    "/".to_string()
}
