use crate::error::{Error, Result};
use depwise_config::RegistryConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Index URL of the well-known public registry
///
/// Failures talking to it are never reported as a private-source problem.
pub const DEFAULT_REPOSITORY_URL: &str = "https://api.nuget.org/v3/index.json";

/// Placeholder for the package name in configured endpoint URLs
pub const PACKAGE_PLACEHOLDER: &str = "{package}";

/// Registry protocol dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// XML feed dialect
    V2,
    /// JSON dialect with registration, search and flat versions endpoints
    V3,
}

impl Protocol {
    /// Tag as written in configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::V2 => "v2",
            Protocol::V3 => "v3",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "v2" => Ok(Protocol::V2),
            "v3" => Ok(Protocol::V3),
            other => Err(Error::UnknownRepositoryType(other.to_string())),
        }
    }
}

/// Everything needed to query one registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryDescriptor {
    /// Protocol dialect
    pub protocol: Protocol,
    /// Index URL; identifies the registry in error reports
    pub repository_url: String,
    /// Feed (v2) or flat versions (v3) endpoint
    pub versions_url: Option<String>,
    /// Paginated registration endpoint (v3)
    pub registration_url: Option<String>,
    /// Search endpoint (v3)
    pub search_url: Option<String>,
    /// Value for the `Authorization` header
    pub auth_header: Option<String>,
}

impl RegistryDescriptor {
    /// Build a descriptor from a raw protocol tag and index URL
    ///
    /// Fails with `UnknownRepositoryType` for tags other than `v2`/`v3`.
    pub fn from_details(repository_type: &str, repository_url: impl Into<String>) -> Result<Self> {
        let repository_url = repository_url.into();
        validate_url(&repository_url)?;

        Ok(Self {
            protocol: repository_type.parse()?,
            repository_url,
            versions_url: None,
            registration_url: None,
            search_url: None,
            auth_header: None,
        })
    }

    /// Set the feed / flat versions endpoint
    pub fn with_versions_url(mut self, url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        validate_url(&url)?;
        self.versions_url = Some(url);
        Ok(self)
    }

    /// Set the registration endpoint
    pub fn with_registration_url(mut self, url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        validate_url(&url)?;
        self.registration_url = Some(url);
        Ok(self)
    }

    /// Set the search endpoint
    pub fn with_search_url(mut self, url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        validate_url(&url)?;
        self.search_url = Some(url);
        Ok(self)
    }

    /// Set the authorization header value
    pub fn with_auth_header(mut self, value: impl Into<String>) -> Self {
        self.auth_header = Some(value.into());
        self
    }

    /// Descriptor with `{package}` in every endpoint replaced by the
    /// lowercased package name
    ///
    /// Lets one configured registry serve lookups for many packages.
    pub fn for_package(&self, name: &str) -> Self {
        let lowered = name.to_lowercase();
        let expand = |url: &Option<String>| {
            url.as_ref()
                .map(|u| u.replace(PACKAGE_PLACEHOLDER, &lowered))
        };

        Self {
            versions_url: expand(&self.versions_url),
            registration_url: expand(&self.registration_url),
            search_url: expand(&self.search_url),
            ..self.clone()
        }
    }

    /// Whether this descriptor points at the public default registry
    pub fn is_default_registry(&self) -> bool {
        self.repository_url == DEFAULT_REPOSITORY_URL
    }

    /// Request headers derived from the descriptor
    pub fn headers(&self) -> Vec<(String, String)> {
        self.auth_header
            .iter()
            .map(|value| ("Authorization".to_string(), value.clone()))
            .collect()
    }
}

impl TryFrom<&RegistryConfig> for RegistryDescriptor {
    type Error = Error;

    fn try_from(config: &RegistryConfig) -> Result<Self> {
        let mut descriptor = Self::from_details(&config.repository_type, &config.repository_url)?;

        if let Some(url) = &config.versions_url {
            descriptor = descriptor.with_versions_url(url)?;
        }
        if let Some(url) = &config.registration_url {
            descriptor = descriptor.with_registration_url(url)?;
        }
        if let Some(url) = &config.search_url {
            descriptor = descriptor.with_search_url(url)?;
        }
        if let Some(value) = &config.auth_header {
            descriptor = descriptor.with_auth_header(value);
        }

        Ok(descriptor)
    }
}

/// Status and body of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

impl RawResponse {
    /// Create a response
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is exactly 200
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Whether the status signals an authentication or authorization failure
    pub fn is_auth_failure(&self) -> bool {
        matches!(self.status, 401 | 402 | 403)
    }
}

fn validate_url(raw: &str) -> Result<()> {
    let parsed = url::Url::parse(raw).map_err(|e| Error::InvalidUrl(format!("{}: {}", raw, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(Error::InvalidUrl(format!(
            "{}: unsupported scheme '{}'",
            raw, scheme
        ))),
    }
}
