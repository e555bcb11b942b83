//! Query builder and paginator for the DataCite REST API.
//!
//! [`DataCiteClient`] hands out one [`Collection`] per resource kind (DOIs,
//! clients, client prefixes, events, prefixes, providers, provider
//! prefixes). Collections accumulate filters, free-text and field queries,
//! sort keys and random sampling, then fetch a page, a count, a single
//! record, or a [`Paginator`] over every match.
//!
//! ```no_run
//! # async fn run() -> datacite::Result<()> {
//! use datacite::{DataCiteClient, GetOptions};
//!
//! datacite::set_email(Some("me@example.org".to_string()))?;
//!
//! let client = DataCiteClient::new()?;
//! let total = client.dois().query("climate change").count().await?;
//! let latest = client
//!     .dois()
//!     .filter([("prefix", "10.5438")])
//!     .sort("created", false)
//!     .get(GetOptions::new().with_per_page(10))
//!     .await?;
//! println!("{total} matches, newest: {:?}", latest.first().and_then(|doi| doi.id()));
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

pub mod client;
pub mod collection;
pub mod models;
pub mod paginator;

pub use client::{DataCiteClient, DataCiteClientBuilder};
pub use collection::{Collection, GetOptions, PaginateOptions, PaginationMethod};
pub use models::{
    Client, ClientPrefix, Doi, Event, Prefix, Provider, ProviderPrefix, Record, Resource,
    Sampleable, Searchable,
};
pub use paginator::Paginator;

pub use datacite_core::config::{config, set_api_url, set_email, update_config, DataCiteConfig};
pub use datacite_core::{
    param_map, ClientConfig, Error, Meta, ParamMap, ParamTree, ParamValue, QueryErrorClassifier,
    ResourceKind, Transport,
};

/// Convenient result alias that reuses the shared DataCite error type.
pub type Result<T> = datacite_core::Result<T>;
