//! HTTP transport with rate limiting

use crate::error::{Result, TransportError};
use crate::types::RawResponse;
use async_trait::async_trait;
use depwise_config::Settings;
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

/// Rate limiter shared by every request of a transport
pub type RegistryRateLimiter = Arc<
    RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
>;

/// Raw GET seam between the registry client and the network
///
/// Implementations return every completed response, whatever its status;
/// only failures to get a response at all are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform a GET request with the given extra headers
    async fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> std::result::Result<RawResponse, TransportError>;
}

/// reqwest-backed transport with a per-request timeout and optional rate limit
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    rate_limiter: Option<RegistryRateLimiter>,
}

impl HttpTransport {
    /// Create a transport with default configuration (no rate limiting)
    pub fn new() -> Result<Self> {
        Self::build(&default_user_agent(), Duration::from_secs(30), None)
    }

    /// Create a transport with rate limiting
    ///
    /// A limit of zero disables rate limiting.
    pub fn with_rate_limit(requests_per_second: u32) -> Result<Self> {
        Self::build(
            &default_user_agent(),
            Duration::from_secs(30),
            Some(requests_per_second),
        )
    }

    /// Create a transport from updater settings
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::build(
            &settings.user_agent,
            settings.request_timeout(),
            settings.requests_per_second,
        )
    }

    fn build(
        user_agent: &str,
        timeout: Duration,
        requests_per_second: Option<u32>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        let rate_limiter = requests_per_second
            .and_then(NonZeroU32::new)
            .map(|rps| Arc::new(RateLimiter::direct(Quota::per_second(rps))));

        Ok(Self {
            client,
            rate_limiter,
        })
    }

    /// Wait for rate limiter if enabled
    async fn wait_for_rate_limit(&self) {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> std::result::Result<RawResponse, TransportError> {
        self.wait_for_rate_limit().await;

        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await.map_err(classify)?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            tracing::warn!("Registry rate limit exceeded for {}", url);
        }

        let body = response.text().await.map_err(classify)?;
        Ok(RawResponse::new(status.as_u16(), body))
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(err.to_string())
    } else if err.is_connect() {
        TransportError::Connection(err.to_string())
    } else {
        TransportError::Other(err.to_string())
    }
}

fn default_user_agent() -> String {
    format!("depwise/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_rate_limit_disables_limiter() {
        let transport = HttpTransport::with_rate_limit(0).unwrap();
        assert!(transport.rate_limiter.is_none());

        let transport = HttpTransport::with_rate_limit(5).unwrap();
        assert!(transport.rate_limiter.is_some());
    }

    #[test]
    fn test_from_settings() {
        let settings = Settings {
            requests_per_second: Some(2),
            ..Settings::default()
        };
        let transport = HttpTransport::from_settings(&settings).unwrap();
        assert!(transport.rate_limiter.is_some());
    }

    #[test]
    fn test_network_failure_classification() {
        assert!(TransportError::Timeout("t".into()).is_network_failure());
        assert!(TransportError::Connection("c".into()).is_network_failure());
        assert!(!TransportError::Other("o".into()).is_network_failure());
    }
}
