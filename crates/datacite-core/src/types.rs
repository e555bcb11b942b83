//! Core DataCite domain types.
//!
//! This module names the resource collections exposed by the API and the
//! parts of a JSON:API response envelope the client reads: `data`, `meta`
//! and `links.next`. Everything else in a response is left untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Resource collections served by the DataCite REST API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Digital Object Identifiers
    Dois,
    /// Repositories (DataCite clients)
    Clients,
    /// Prefix assignments of clients
    ClientPrefixes,
    /// Usage and citation events
    Events,
    /// DOI prefixes
    Prefixes,
    /// Member organisations
    Providers,
    /// Prefix assignments of providers
    ProviderPrefixes,
}

impl ResourceKind {
    /// Returns the resource name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Dois => "DOIs",
            Self::Clients => "Clients",
            Self::ClientPrefixes => "ClientPrefixes",
            Self::Events => "Events",
            Self::Prefixes => "Prefixes",
            Self::Providers => "Providers",
            Self::ProviderPrefixes => "ProviderPrefixes",
        }
    }

    /// Returns the URL path segment of the collection.
    ///
    /// This is the lowercase resource name, except for the two prefix
    /// assignment collections whose routes are hyphenated.
    #[must_use]
    pub const fn collection_name(&self) -> &'static str {
        match self {
            Self::Dois => "dois",
            Self::Clients => "clients",
            Self::ClientPrefixes => "client-prefixes",
            Self::Events => "events",
            Self::Prefixes => "prefixes",
            Self::Providers => "providers",
            Self::ProviderPrefixes => "provider-prefixes",
        }
    }

    /// Whether the collection accepts `query` and `sort`.
    #[must_use]
    pub const fn supports_query(&self) -> bool {
        !matches!(self, Self::Prefixes)
    }

    /// Whether the collection accepts `random` sampling.
    #[must_use]
    pub const fn supports_random(&self) -> bool {
        matches!(self, Self::Dois)
    }

    /// Returns all collections.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Dois,
            Self::Clients,
            Self::ClientPrefixes,
            Self::Events,
            Self::Prefixes,
            Self::Providers,
            Self::ProviderPrefixes,
        ]
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection_name())
    }
}

impl FromStr for ResourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.to_ascii_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|kind| {
                kind.collection_name() == wanted || kind.name().to_ascii_lowercase() == wanted
            })
            .ok_or_else(|| Error::InvalidArgument(format!("Unknown resource kind: {s}")))
    }
}

/// The `meta` member of a collection response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    /// Total number of matching records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    /// Current page number (page-number paging only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    /// Total number of pages
    #[serde(
        default,
        rename = "totalPages",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_pages: Option<u64>,
    /// Facets and any other metadata, kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The parts of a collection response the client consumes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageEnvelope {
    /// Raw records from the `data` array
    pub data: Vec<Value>,
    /// Response metadata
    pub meta: Meta,
    /// URL of the next page, when the server supplied one
    pub next: Option<String>,
}

impl PageEnvelope {
    /// Extract `data`, `meta` and `links.next` from a response body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if `data` is missing or not an array, or if
    /// `meta` is malformed.
    pub fn from_value(mut body: Value) -> Result<Self> {
        let data = match body.get_mut("data").map(Value::take) {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(Error::Decode(format!(
                    "expected `data` to be an array, found {}",
                    json_type(&other)
                )))
            }
            None => return Err(Error::Decode("response has no `data` member".to_string())),
        };

        let meta = match body.get_mut("meta").map(Value::take) {
            Some(Value::Null) | None => Meta::default(),
            Some(value) => serde_json::from_value(value)?,
        };

        let next = body
            .pointer("/links/next")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Self { data, meta, next })
    }
}

/// Extract the single record of a lookup response.
///
/// # Errors
///
/// Returns [`Error::Decode`] if `data` is missing or not an object.
pub fn single_record(mut body: Value) -> Result<Map<String, Value>> {
    match body.get_mut("data").map(Value::take) {
        Some(Value::Object(record)) => Ok(record),
        Some(other) => Err(Error::Decode(format!(
            "expected `data` to be an object, found {}",
            json_type(&other)
        ))),
        None => Err(Error::Decode("response has no `data` member".to_string())),
    }
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collection_names_follow_lowercase_names() {
        for kind in ResourceKind::all() {
            match kind {
                ResourceKind::ClientPrefixes => {
                    assert_eq!(kind.collection_name(), "client-prefixes");
                }
                ResourceKind::ProviderPrefixes => {
                    assert_eq!(kind.collection_name(), "provider-prefixes");
                }
                _ => assert_eq!(kind.collection_name(), kind.name().to_lowercase()),
            }
        }
    }

    #[test]
    fn test_capabilities() {
        assert!(ResourceKind::Dois.supports_random());
        assert!(!ResourceKind::Clients.supports_random());
        assert!(ResourceKind::Events.supports_query());
        assert!(!ResourceKind::Prefixes.supports_query());
    }

    #[test]
    fn test_resource_kind_from_str() {
        assert_eq!("dois".parse::<ResourceKind>().unwrap(), ResourceKind::Dois);
        assert_eq!(
            "client-prefixes".parse::<ResourceKind>().unwrap(),
            ResourceKind::ClientPrefixes
        );
        assert_eq!(
            "ProviderPrefixes".parse::<ResourceKind>().unwrap(),
            ResourceKind::ProviderPrefixes
        );
        assert!(matches!(
            "reports".parse::<ResourceKind>(),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_resource_kind_display() {
        assert_eq!(ResourceKind::ProviderPrefixes.to_string(), "provider-prefixes");
    }

    #[test]
    fn test_envelope_extracts_data_meta_and_next() {
        let body = json!({
            "data": [{"id": "10.5438/0001"}, {"id": "10.5438/0002"}],
            "meta": {"total": 321, "page": 2, "totalPages": 13, "states": []},
            "links": {"self": "https://api.datacite.org/dois", "next": "https://api.datacite.org/dois?page[cursor]=abc"}
        });

        let envelope = PageEnvelope::from_value(body).unwrap();
        assert_eq!(envelope.data.len(), 2);
        assert_eq!(envelope.meta.total, Some(321));
        assert_eq!(envelope.meta.page, Some(2));
        assert_eq!(envelope.meta.total_pages, Some(13));
        assert!(envelope.meta.extra.contains_key("states"));
        assert_eq!(
            envelope.next.as_deref(),
            Some("https://api.datacite.org/dois?page[cursor]=abc")
        );
    }

    #[test]
    fn test_envelope_without_links_or_meta() {
        let envelope = PageEnvelope::from_value(json!({"data": []})).unwrap();
        assert!(envelope.data.is_empty());
        assert_eq!(envelope.meta, Meta::default());
        assert!(envelope.next.is_none());
    }

    #[test]
    fn test_envelope_requires_data_array() {
        assert!(matches!(
            PageEnvelope::from_value(json!({"meta": {}})),
            Err(Error::Decode(_))
        ));
        assert!(matches!(
            PageEnvelope::from_value(json!({"data": {"id": "x"}})),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn test_single_record() {
        let record = single_record(json!({"data": {"id": "10.14454/fxws-0523"}})).unwrap();
        assert_eq!(record["id"], "10.14454/fxws-0523");
        assert!(single_record(json!({"data": []})).is_err());
    }
}
