//! Shared registry response cache

use crate::types::RawResponse;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;

/// A cached response and when it was fetched
#[derive(Debug, Clone)]
pub struct CachedResponse {
    /// Request URL
    pub url: String,
    /// Response as received
    pub response: RawResponse,
    /// Fetch time
    pub fetched_at: DateTime<Utc>,
}

/// URL-keyed cache of successful registry responses
///
/// Scoped to a job (or process) and shared through an `Arc`. The lock is
/// never held across an await point.
#[derive(Debug)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CachedResponse>>,
    enabled: bool,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseCache {
    /// Create an enabled, empty cache
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            enabled: true,
        }
    }

    /// Create a cache that never stores anything
    pub fn disabled() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            enabled: false,
        }
    }

    /// Enabled unless `caching_disabled` is set
    pub fn from_switch(caching_disabled: bool) -> Self {
        if caching_disabled {
            Self::disabled()
        } else {
            Self::new()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Look up a cached response for `url`
    pub fn get(&self, url: &str) -> Option<RawResponse> {
        self.entries
            .lock()
            .get(url)
            .map(|entry| entry.response.clone())
    }

    /// Full entry, including its fetch time
    pub fn entry(&self, url: &str) -> Option<CachedResponse> {
        self.entries.lock().get(url).cloned()
    }

    /// Store a response; a disabled cache ignores the call
    ///
    /// Returns whether the response was stored.
    pub fn insert(&self, url: &str, response: RawResponse) -> bool {
        if !self.enabled {
            return false;
        }

        self.entries.lock().insert(
            url.to_string(),
            CachedResponse {
                url: url.to_string(),
                response,
                fetched_at: Utc::now(),
            },
        );
        true
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}
