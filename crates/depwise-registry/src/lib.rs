//! Package registry version lookup
//!
//! This library answers one question for the update pipeline: which versions
//! of a package does a registry offer? It speaks the XML feed dialect (`v2`)
//! and the JSON dialect (`v3`, via registration, search or flat versions
//! endpoints) and routes every request through a single fetch primitive that
//! owns caching, authentication and timeout classification.
//!
//! # Example
//!
//! ```no_run
//! use depwise_registry::{RegistryClient, RegistryDescriptor, ResponseCache};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RegistryClient::with_http(Arc::new(ResponseCache::new()))?;
//!
//!     let descriptor = RegistryDescriptor::from_details(
//!         "v3",
//!         depwise_registry::DEFAULT_REPOSITORY_URL,
//!     )?
//!     .with_versions_url("https://api.nuget.org/v3-flatcontainer/newtonsoft.json/index.json")?;
//!
//!     if let Some(versions) = client.get_package_versions("Newtonsoft.Json", &descriptor).await? {
//!         println!("{} versions available", versions.len());
//!     }
//!
//!     Ok(())
//! }
//! ```

mod cache;
mod client;
mod error;
mod strategy;
mod types;
pub mod v2;
pub mod v3;

pub use cache::{CachedResponse, ResponseCache};
pub use client::{HttpTransport, RegistryRateLimiter, Transport};
pub use error::{Error, Result, TransportError};
pub use strategy::VersionStrategy;
pub use types::{
    Protocol, RawResponse, RegistryDescriptor, DEFAULT_REPOSITORY_URL, PACKAGE_PLACEHOLDER,
};

use depwise_config::Settings;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Main client for registry version lookups
///
/// Cheap to clone; clones share the transport and the response cache, so
/// one client can serve many concurrent lookups.
#[derive(Clone)]
pub struct RegistryClient {
    transport: Arc<dyn Transport>,
    cache: Arc<ResponseCache>,
}

impl RegistryClient {
    /// Create a client over an arbitrary transport
    pub fn new(transport: Arc<dyn Transport>, cache: Arc<ResponseCache>) -> Self {
        Self { transport, cache }
    }

    /// Create a client backed by [`HttpTransport`] with default settings
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn with_http(cache: Arc<ResponseCache>) -> Result<Self> {
        Ok(Self::new(Arc::new(HttpTransport::new()?), cache))
    }

    /// Create a client from updater settings, honouring the caching switch
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self::new(
            Arc::new(HttpTransport::from_settings(settings)?),
            Arc::new(ResponseCache::from_switch(settings.caching_disabled)),
        ))
    }

    /// Shared response cache
    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    /// List the versions `descriptor` offers for package `name`
    ///
    /// `Ok(None)` means nothing trustworthy came back: a non-200 answer, no
    /// usable endpoint, no matching search hit, or a feed entry with an empty
    /// id. Private-source authentication failures and timeouts are errors.
    pub async fn get_package_versions(
        &self,
        name: &str,
        descriptor: &RegistryDescriptor,
    ) -> Result<Option<BTreeSet<String>>> {
        let Some(strategy) = VersionStrategy::select(descriptor) else {
            debug!(
                "No version endpoint configured for {} on {}",
                name, descriptor.repository_url
            );
            return Ok(None);
        };

        debug!(
            "Looking up {} on {} via {}",
            name,
            descriptor.repository_url,
            strategy.name()
        );

        match strategy {
            VersionStrategy::Feed { url } => {
                let Some(body) = self.fetch_body(&url, descriptor).await? else {
                    return Ok(None);
                };
                v2::parse_feed(&body, name)
            }
            VersionStrategy::Registration { url } => {
                self.registration_versions(&url, descriptor).await
            }
            VersionStrategy::Search { url } => {
                let Some(body) = self.fetch_body(&url, descriptor).await? else {
                    return Ok(None);
                };
                let response: v3::SearchResponse = v3::parse_json(&body)?;
                Ok(v3::search_versions(&response, name))
            }
            VersionStrategy::VersionsList { url } => {
                let Some(body) = self.fetch_body(&url, descriptor).await? else {
                    return Ok(None);
                };
                let response: v3::VersionsResponse = v3::parse_json(&body)?;
                Ok(Some(response.versions.into_iter().collect()))
            }
        }
    }

    /// Fetch `url` through the shared cache
    ///
    /// - A cached response is returned without touching the transport.
    /// - 401/402/403 from a private registry fails with
    ///   `PrivateSourceAuthenticationFailure`.
    /// - Timeouts and socket errors fail with `PrivateSourceTimedOut`, except
    ///   for the default registry where the raw transport error propagates.
    /// - Only status-200 responses are cached, and only when caching is on.
    pub async fn execute_request(
        &self,
        url: &str,
        descriptor: &RegistryDescriptor,
    ) -> Result<RawResponse> {
        if let Some(cached) = self.cache.get(url) {
            debug!("Cache hit for {}", url);
            return Ok(cached);
        }

        let response = match self.transport.get(url, &descriptor.headers()).await {
            Ok(response) => response,
            Err(err) if err.is_network_failure() && !descriptor.is_default_registry() => {
                warn!("Private source {} timed out: {}", descriptor.repository_url, err);
                return Err(Error::PrivateSourceTimedOut {
                    source_url: descriptor.repository_url.clone(),
                });
            }
            Err(err) => return Err(Error::Transport(err)),
        };

        if response.is_auth_failure() && !descriptor.is_default_registry() {
            warn!(
                "Authentication failed ({}) for {}",
                response.status, descriptor.repository_url
            );
            return Err(Error::PrivateSourceAuthenticationFailure {
                source_url: descriptor.repository_url.clone(),
            });
        }

        if response.is_ok() {
            self.cache.insert(url, response.clone());
        }

        Ok(response)
    }

    async fn fetch_body(
        &self,
        url: &str,
        descriptor: &RegistryDescriptor,
    ) -> Result<Option<String>> {
        let response = self.execute_request(url, descriptor).await?;
        if response.is_ok() {
            Ok(Some(response.body))
        } else {
            debug!("{} answered with status {}", url, response.status);
            Ok(None)
        }
    }

    async fn registration_versions(
        &self,
        url: &str,
        descriptor: &RegistryDescriptor,
    ) -> Result<Option<BTreeSet<String>>> {
        let Some(body) = self.fetch_body(url, descriptor).await? else {
            return Ok(None);
        };
        let index: v3::RegistrationIndex = v3::parse_json(&body)?;

        let mut versions = BTreeSet::new();
        for page in index.items {
            match page.items {
                Some(leaves) => versions.extend(v3::inlined_versions(&leaves)),
                None => {
                    let page_url = page.id.ok_or_else(|| {
                        Error::other("registration page has neither items nor @id")
                    })?;
                    let Some(page_body) = self.fetch_body(&page_url, descriptor).await? else {
                        return Ok(None);
                    };
                    let page: v3::RegistrationPageBody = v3::parse_json(&page_body)?;
                    versions.extend(v3::paged_versions(&page.items));
                }
            }
        }

        Ok(Some(versions))
    }
}
