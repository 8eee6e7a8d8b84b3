use crate::types::{Protocol, RegistryDescriptor};

/// How versions are fetched from a registry, chosen once per descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionStrategy {
    /// v2 XML feed
    Feed { url: String },
    /// v3 registration index, honouring listed flags
    Registration { url: String },
    /// v3 search endpoint
    Search { url: String },
    /// v3 flat versions list; includes unlisted versions
    VersionsList { url: String },
}

impl VersionStrategy {
    /// Pick the strategy for a descriptor
    ///
    /// v3 prefers registration, then search, then the flat list. `None` when
    /// the descriptor names no usable endpoint.
    pub fn select(descriptor: &RegistryDescriptor) -> Option<Self> {
        match descriptor.protocol {
            Protocol::V2 => descriptor
                .versions_url
                .clone()
                .map(|url| Self::Feed { url }),
            Protocol::V3 => {
                if let Some(url) = &descriptor.registration_url {
                    Some(Self::Registration { url: url.clone() })
                } else if let Some(url) = &descriptor.search_url {
                    Some(Self::Search { url: url.clone() })
                } else {
                    descriptor
                        .versions_url
                        .clone()
                        .map(|url| Self::VersionsList { url })
                }
            }
        }
    }

    /// Endpoint the strategy starts from
    pub fn url(&self) -> &str {
        match self {
            Self::Feed { url }
            | Self::Registration { url }
            | Self::Search { url }
            | Self::VersionsList { url } => url,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Feed { .. } => "feed",
            Self::Registration { .. } => "registration",
            Self::Search { .. } => "search",
            Self::VersionsList { .. } => "versions_list",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v3() -> RegistryDescriptor {
        RegistryDescriptor::from_details("v3", "https://nuget.example.com/v3/index.json").unwrap()
    }

    #[test]
    fn test_v3_preference_order() {
        let all = v3()
            .with_versions_url("https://nuget.example.com/flat/pkg/index.json")
            .unwrap()
            .with_search_url("https://nuget.example.com/query?q=pkg")
            .unwrap()
            .with_registration_url("https://nuget.example.com/reg/pkg/index.json")
            .unwrap();
        assert_eq!(
            VersionStrategy::select(&all).map(|s| s.name()),
            Some("registration")
        );

        let mut no_registration = all.clone();
        no_registration.registration_url = None;
        assert_eq!(
            VersionStrategy::select(&no_registration).map(|s| s.name()),
            Some("search")
        );

        no_registration.search_url = None;
        let strategy = VersionStrategy::select(&no_registration).unwrap();
        assert_eq!(strategy.name(), "versions_list");
        assert_eq!(strategy.url(), "https://nuget.example.com/flat/pkg/index.json");
    }

    #[test]
    fn test_no_endpoint() {
        assert_eq!(VersionStrategy::select(&v3()), None);

        let v2 = RegistryDescriptor::from_details("v2", "https://feed.example.com/api/v2").unwrap();
        assert_eq!(VersionStrategy::select(&v2), None);
    }

    #[test]
    fn test_v2_uses_feed() {
        let v2 = RegistryDescriptor::from_details("v2", "https://feed.example.com/api/v2")
            .unwrap()
            .with_versions_url("https://feed.example.com/api/v2/FindPackagesById()?id='Pkg'")
            .unwrap();
        assert_eq!(VersionStrategy::select(&v2).map(|s| s.name()), Some("feed"));
    }
}
