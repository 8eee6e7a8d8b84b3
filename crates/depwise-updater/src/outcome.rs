//! Change proposals produced by a job

use depwise_deps::{Dependency, Requirement};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What happened to a change proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    Created,
    Updated,
    Closed,
}

impl ChangeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeAction::Created => "created",
            ChangeAction::Updated => "updated",
            ChangeAction::Closed => "closed",
        }
    }
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileOperation {
    Create,
    Update,
    Delete,
}

/// A file as it should look after the update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    pub name: String,
    pub content: String,
    pub directory: String,
    pub operation: FileOperation,
    #[serde(default = "default_encoding")]
    pub content_encoding: String,
}

impl ChangedFile {
    /// An in-place, utf-8 update of an existing file
    pub fn updated(
        name: impl Into<String>,
        content: impl Into<String>,
        directory: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            directory: directory.into(),
            operation: FileOperation::Update,
            content_encoding: default_encoding(),
        }
    }
}

/// A dependency after the update, with what it was before
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatedDependency {
    pub dependency: Dependency,
    pub previous_version: Option<String>,
    pub previous_requirements: Vec<Requirement>,
}

impl UpdatedDependency {
    /// Move `current` to `version`, keeping its requirements
    pub fn new(current: &Dependency, version: impl Into<String>) -> Self {
        let mut dependency = current.clone();
        dependency.version = Some(version.into());

        Self {
            dependency,
            previous_version: current.version.clone(),
            previous_requirements: current.requirements.clone(),
        }
    }

    /// Replace the new requirements, e.g. after a constraint bump
    pub fn with_requirements(mut self, requirements: Vec<Requirement>) -> Self {
        self.dependency.requirements = requirements;
        self
    }

    pub fn name(&self) -> &str {
        &self.dependency.name
    }

    /// `name ( from 1.1.0 to 1.2.0 )`
    pub fn describe(&self) -> String {
        format!(
            "{} ( from {} to {} )",
            self.dependency.name,
            self.previous_version.as_deref().unwrap_or("unknown"),
            self.dependency.version.as_deref().unwrap_or("unknown"),
        )
    }
}

/// One proposal-level result of a job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub action: ChangeAction,
    /// Dependencies carried by the proposal
    pub dependencies: Vec<UpdatedDependency>,
    /// Names of the dependencies when nothing moved (closed proposals)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependency_names: Vec<String>,
}

impl Outcome {
    pub fn changed(action: ChangeAction, dependencies: Vec<UpdatedDependency>) -> Self {
        let dependency_names = dependencies.iter().map(|d| d.name().to_string()).collect();
        Self {
            action,
            dependencies,
            dependency_names,
        }
    }

    pub fn closed(dependency_names: Vec<String>) -> Self {
        Self {
            action: ChangeAction::Closed,
            dependencies: Vec::new(),
            dependency_names,
        }
    }

    /// Human-readable description of what the proposal carries
    pub fn describe(&self) -> String {
        if self.dependencies.is_empty() {
            self.dependency_names.join(", ")
        } else {
            self.dependencies
                .iter()
                .map(UpdatedDependency::describe)
                .collect::<Vec<_>>()
                .join(", ")
        }
    }
}

fn default_encoding() -> String {
    "utf-8".to_string()
}
