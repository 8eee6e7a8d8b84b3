//! Version lookup backed by the registry client

use crate::service::VersionLister;
use async_trait::async_trait;
use depwise_config::UpdaterConfig;
use depwise_deps::Dependency;
use depwise_registry::{RegistryClient, RegistryDescriptor};
use std::collections::BTreeSet;
use tracing::debug;

/// Queries configured registries in order; the first one that offers any
/// version wins
#[derive(Clone)]
pub struct RegistryVersionLister {
    client: RegistryClient,
    descriptors: Vec<RegistryDescriptor>,
}

impl RegistryVersionLister {
    pub fn new(client: RegistryClient, descriptors: Vec<RegistryDescriptor>) -> Self {
        Self {
            client,
            descriptors,
        }
    }

    /// Build the client and descriptors from configuration
    ///
    /// # Errors
    ///
    /// Fails with `UnknownRepositoryType` or `InvalidUrl` when a registry
    /// entry is misconfigured.
    pub fn from_config(config: &UpdaterConfig) -> depwise_registry::Result<Self> {
        let descriptors = config
            .registries
            .iter()
            .map(RegistryDescriptor::try_from)
            .collect::<depwise_registry::Result<Vec<_>>>()?;

        Ok(Self::new(
            RegistryClient::from_settings(&config.settings)?,
            descriptors,
        ))
    }

    pub fn client(&self) -> &RegistryClient {
        &self.client
    }
}

#[async_trait]
impl VersionLister for RegistryVersionLister {
    async fn list_versions(
        &self,
        dependency: &Dependency,
    ) -> anyhow::Result<Option<BTreeSet<String>>> {
        let mut answered = false;
        for template in &self.descriptors {
            let descriptor = template.for_package(&dependency.name);
            match self
                .client
                .get_package_versions(&dependency.name, &descriptor)
                .await?
            {
                Some(versions) if !versions.is_empty() => return Ok(Some(versions)),
                Some(_) => {
                    answered = true;
                    debug!(
                        "No versions for {} on {}",
                        dependency.name, descriptor.repository_url
                    );
                }
                None => debug!(
                    "No usable answer for {} from {}",
                    dependency.name, descriptor.repository_url
                ),
            }
        }

        Ok(answered.then(BTreeSet::new))
    }
}
