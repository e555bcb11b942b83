//! Result records for each DataCite collection.
//!
//! Records are opaque: each wraps the JSON object from the response `data`
//! array, keys kept in server order, and serializes back to that object.
//! The wrapper type records which collection it came from and, through the
//! marker traits, which query operations that collection supports.

use datacite_core::{Error, ResourceKind, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::ops::{Deref, DerefMut};

/// Order-preserving JSON object backing every record.
pub type Record = Map<String, Value>;

/// A record type returned by one DataCite collection.
pub trait Resource: From<Record> + Into<Record> + Send + Sync + Sized + 'static {
    /// Collection the record belongs to.
    const KIND: ResourceKind;
}

/// Collections accepting `query` and `sort`.
pub trait Searchable: Resource {}

/// Collections accepting `random` sampling.
pub trait Sampleable: Resource {}

/// Decode one element of a `data` array into a record.
pub(crate) fn decode_record<R: Resource>(value: Value) -> Result<R> {
    match value {
        Value::Object(record) => Ok(R::from(record)),
        other => Err(Error::Decode(format!(
            "expected {} record to be an object, found `{other}`",
            R::KIND.collection_name()
        ))),
    }
}

/// Macro to generate record wrapper types.
macro_rules! record_type {
    ($name:ident, $kind:expr, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Record);

        impl $name {
            /// Returns the record identifier.
            #[must_use]
            pub fn id(&self) -> Option<&str> {
                self.0.get("id").and_then(Value::as_str)
            }

            /// Returns the JSON:API `attributes` object.
            #[must_use]
            pub fn attributes(&self) -> Option<&Record> {
                self.0.get("attributes").and_then(Value::as_object)
            }

            /// Returns a single attribute.
            #[must_use]
            pub fn attribute(&self, name: &str) -> Option<&Value> {
                self.attributes().and_then(|attributes| attributes.get(name))
            }

            /// Converts to the inner JSON object.
            #[must_use]
            pub fn into_record(self) -> Record {
                self.0
            }
        }

        impl Resource for $name {
            const KIND: ResourceKind = $kind;
        }

        impl From<Record> for $name {
            fn from(record: Record) -> Self {
                Self(record)
            }
        }

        impl From<$name> for Record {
            fn from(wrapper: $name) -> Self {
                wrapper.0
            }
        }

        impl Deref for $name {
            type Target = Record;

            fn deref(&self) -> &Record {
                &self.0
            }
        }

        impl DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Record {
                &mut self.0
            }
        }
    };
}

record_type!(Doi, ResourceKind::Dois, "DataCite DOI record");
record_type!(Client, ResourceKind::Clients, "Repository (client) record");
record_type!(
    ClientPrefix,
    ResourceKind::ClientPrefixes,
    "Client prefix assignment record"
);
record_type!(Event, ResourceKind::Events, "Usage or citation event record");
record_type!(Prefix, ResourceKind::Prefixes, "DOI prefix record");
record_type!(Provider, ResourceKind::Providers, "Member (provider) record");
record_type!(
    ProviderPrefix,
    ResourceKind::ProviderPrefixes,
    "Provider prefix assignment record"
);

impl Searchable for Doi {}
impl Searchable for Client {}
impl Searchable for ClientPrefix {}
impl Searchable for Event {}
impl Searchable for Provider {}
impl Searchable for ProviderPrefix {}

impl Sampleable for Doi {}
