//! # datacite-core
//!
//! Core types and utilities for working with the DataCite REST API.
//!
//! This crate provides the mergeable parameter model behind collection
//! queries, its serialization into DataCite's query-string dialect, the
//! process-wide configuration, error handling, and the HTTP transport.
//!
//! ## Modules
//!
//! - [`error`] - Error taxonomy and conversions
//! - [`config`] - Process-wide configuration (`email`, `api_url`)
//! - [`params`] - Parameter values, maps and the mergeable [`ParamTree`]
//! - [`flatten`] - `field:value+field:value` serialization
//! - [`query`] - Query-string and URL assembly
//! - [`types`] - Resource kinds and the response envelope
//! - [`client`] - Transport trait, HTTP implementation and status mapping

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod flatten;
pub mod params;
pub mod query;
pub mod types;

// Re-export commonly used types
pub use client::{ClientConfig, HttpTransport, QueryErrorClassifier, Transport};
pub use config::{config, DataCiteConfig};
pub use error::{Error, Result};
pub use params::{ParamMap, ParamTree, ParamValue};
pub use types::{Meta, PageEnvelope, ResourceKind};
