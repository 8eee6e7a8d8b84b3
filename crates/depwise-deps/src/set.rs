//! Order-preserving accumulator of canonical dependencies

use crate::types::Dependency;
use std::collections::HashMap;
use std::ops::AddAssign;

/// One canonical [`Dependency`] per name
///
/// Lookup is by name; iteration follows first-insertion order so output is
/// deterministic regardless of how the entries were discovered.
///
/// Merging is order-significant: requirements are concatenated (existing
/// first), while `version` and `subdependency_metadata` are taken from the
/// incoming side whenever it defines them.
#[derive(Debug, Clone, Default)]
pub struct DependencySet {
    entries: Vec<Dependency>,
    index: HashMap<String, usize>,
}

impl DependencySet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a dependency or merge it into the existing entry of the same name
    pub fn add(&mut self, dependency: Dependency) {
        match self.index.get(&dependency.name) {
            Some(&position) => merge_into(&mut self.entries[position], dependency),
            None => {
                self.index
                    .insert(dependency.name.clone(), self.entries.len());
                self.entries.push(dependency);
            }
        }
    }

    /// Canonical entries in first-insertion order
    pub fn dependencies(&self) -> &[Dependency] {
        &self.entries
    }

    /// Consume the set, returning its entries in order
    pub fn into_dependencies(self) -> Vec<Dependency> {
        self.entries
    }

    /// Find an entry by name
    pub fn get(&self, name: &str) -> Option<&Dependency> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    /// Number of distinct names
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn merge_into(existing: &mut Dependency, incoming: Dependency) {
    existing.requirements.extend(incoming.requirements);

    if incoming.version.is_some() {
        existing.version = incoming.version;
    }

    if incoming.subdependency_metadata.is_some() {
        existing.subdependency_metadata = incoming.subdependency_metadata;
    }
}

impl Extend<Dependency> for DependencySet {
    fn extend<T: IntoIterator<Item = Dependency>>(&mut self, iter: T) {
        for dependency in iter {
            self.add(dependency);
        }
    }
}

impl FromIterator<Dependency> for DependencySet {
    fn from_iter<T: IntoIterator<Item = Dependency>>(iter: T) -> Self {
        let mut set = DependencySet::new();
        set.extend(iter);
        set
    }
}

impl AddAssign<DependencySet> for DependencySet {
    fn add_assign(&mut self, other: DependencySet) {
        self.extend(other.entries);
    }
}
