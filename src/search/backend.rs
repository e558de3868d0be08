use async_trait::async_trait;
use serde_json::{Value, json};
use std::fmt;
use std::sync::Arc;

use super::result::SearchResult;
use super::{v2::V2Backend, v6::V6Backend};
use crate::query::{QueryNode, QueryOptions};
use crate::{Error, Result};

/// Server protocol versions with a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolVersion {
    V2,
    V6,
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolVersion::V2 => write!(f, "2.x"),
            ProtocolVersion::V6 => write!(f, "6.x"),
        }
    }
}

struct Registration {
    prefix: &'static str,
    protocol: ProtocolVersion,
}

/// Version prefixes each backend claims. A backend only appears here for
/// versions whose wire format it actually speaks.
const REGISTRY: &[Registration] = &[
    Registration {
        prefix: "2.",
        protocol: ProtocolVersion::V2,
    },
    Registration {
        prefix: "6.",
        protocol: ProtocolVersion::V6,
    },
];

/// Pick the backend for a version string reported by the server.
pub fn select_protocol(version: &str) -> Result<ProtocolVersion> {
    REGISTRY
        .iter()
        .find(|registration| version.starts_with(registration.prefix))
        .map(|registration| registration.protocol)
        .ok_or_else(|| Error::UnsupportedVersion(version.to_string()))
}

impl ProtocolVersion {
    pub fn prefix(self) -> &'static str {
        REGISTRY
            .iter()
            .find(|registration| registration.protocol == self)
            .map(|registration| registration.prefix)
            .unwrap_or_default()
    }

    /// Open a backend of this version against `base_url`.
    pub fn connect(self, base_url: &str) -> Result<Arc<dyn Backend>> {
        let backend: Arc<dyn Backend> = match self {
            ProtocolVersion::V2 => Arc::new(V2Backend::new(base_url)?),
            ProtocolVersion::V6 => Arc::new(V6Backend::new(base_url)?),
        };
        Ok(backend)
    }
}

/// One server protocol version: translates query trees into its query DSL
/// and runs searches, adapting the response into a [`SearchResult`].
#[async_trait]
pub trait Backend: Send + Sync + fmt::Debug {
    fn protocol(&self) -> ProtocolVersion;

    /// Translate a query tree into the native query DSL.
    fn translate(&self, node: &QueryNode) -> Result<Value>;

    /// Full search request body for `node`.
    fn search_body(&self, node: &QueryNode, options: &QueryOptions) -> Result<Value> {
        Ok(json!({
            "query": self.translate(node)?,
            "from": options.offset,
            "size": options.limit,
            "sort": [
                { options.sort_field.as_str(): { "order": options.sort_order() } }
            ],
        }))
    }

    /// Run a search against `index` with an already-built body.
    async fn search(&self, index: &str, body: &Value) -> Result<SearchResult>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_select_known_versions() {
        assert_eq!(select_protocol("2.4.6").unwrap(), ProtocolVersion::V2);
        assert_eq!(select_protocol("6.8.23").unwrap(), ProtocolVersion::V6);
    }

    #[test]
    fn test_unsupported_version_is_named() {
        let err = select_protocol("7.10.2").unwrap_err();
        assert!(matches!(&err, Error::UnsupportedVersion(v) if v == "7.10.2"));
        assert_eq!(err.to_string(), "Unsupported server version 7.10.2");
    }

    #[test]
    fn test_prefix_is_not_a_bare_major() {
        // 20.x must not be claimed by the 2.x backend.
        assert!(select_protocol("20.1.0").is_err());
        assert!(select_protocol("2").is_err());
        assert!(select_protocol("").is_err());
    }

    #[test]
    fn test_prefix_round_trip() {
        assert_eq!(ProtocolVersion::V2.prefix(), "2.");
        assert_eq!(ProtocolVersion::V6.prefix(), "6.");
    }

    #[test]
    fn test_connect_rejects_bad_url() {
        assert!(ProtocolVersion::V6.connect("::nope").is_err());
        let backend = ProtocolVersion::V2.connect("http://localhost:9200").unwrap();
        assert_eq!(backend.protocol(), ProtocolVersion::V2);
    }

    proptest! {
        #[test]
        fn prop_selects_backend_whose_prefix_matches(
            version in "[0-9]{1,2}\\.[0-9]{1,2}\\.[0-9]{1,2}",
        ) {
            match select_protocol(&version) {
                Ok(protocol) => prop_assert!(version.starts_with(protocol.prefix())),
                Err(Error::UnsupportedVersion(v)) => {
                    prop_assert_eq!(&v, &version);
                    prop_assert!(REGISTRY.iter().all(|r| !version.starts_with(r.prefix)));
                }
                Err(other) => prop_assert!(false, "unexpected error {}", other),
            }
        }
    }
}
