//! Chainable query builder over one DataCite collection.
//!
//! A [`Collection`] accumulates filters, `query` and `sort` expressions and
//! the `random` flag in a [`ParamTree`]. Builder methods mutate the
//! collection in place and return `&mut Self`, so repeated calls compose:
//!
//! ```
//! use datacite::DataCiteClient;
//!
//! let client = DataCiteClient::new().unwrap();
//! let url = client
//!     .dois()
//!     .filter([("prefix", "10.5438")])
//!     .filter([("client_id", "datacite.datacite")])
//!     .url();
//! assert_eq!(
//!     url,
//!     "https://api.datacite.org/dois?prefix=10.5438&client_id=datacite.datacite"
//! );
//! ```
//!
//! Clone the collection before branching when two queries must not share
//! state.

use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::Arc;

use datacite_core::client::{fetch_page, ClientConfig, Transport};
use datacite_core::query::build_url;
use datacite_core::types::single_record;
use datacite_core::{Error, Meta, ParamMap, ParamTree, ParamValue, Result};
use tracing::debug;

use crate::models::{decode_record, Resource, Sampleable, Searchable};
use crate::paginator::Paginator;

/// Largest page size the service accepts.
pub const MAX_PER_PAGE: u32 = 200;

/// Default record cap for [`Collection::paginate`].
pub const DEFAULT_N_MAX: usize = 10_000;

const PAGE_SIZE: &str = "page[size]";
const PAGE_NUMBER: &str = "page[number]";
const PAGE_CURSOR: &str = "page[cursor]";

/// Paging controls for a single [`Collection::get`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetOptions {
    /// 1-based page number
    pub page: Option<u64>,
    /// Records per page, between 1 and 200
    pub per_page: Option<u32>,
    /// Cursor token
    pub cursor: Option<String>,
}

impl GetOptions {
    /// No paging controls.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a page number.
    #[must_use]
    pub const fn with_page(mut self, page: u64) -> Self {
        self.page = Some(page);
        self
    }

    /// Request a page size.
    #[must_use]
    pub const fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    /// Request a cursor position.
    #[must_use]
    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }
}

/// Pagination strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaginationMethod {
    /// Server-issued cursor tokens (`page[cursor]`)
    #[default]
    Cursor,
    /// 1-based page numbers (`page[number]`)
    Number,
}

impl PaginationMethod {
    /// Returns the method name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Cursor => "cursor",
            Self::Number => "number",
        }
    }
}

impl FromStr for PaginationMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cursor" => Ok(Self::Cursor),
            "number" => Ok(Self::Number),
            _ => Err(Error::InvalidArgument(
                "Method should be 'cursor' or 'number'".to_string(),
            )),
        }
    }
}

/// Settings for [`Collection::paginate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginateOptions {
    /// Paging strategy
    pub method: PaginationMethod,
    /// First page for page-number paging
    pub page: u64,
    /// Records per page
    pub per_page: Option<u32>,
    /// First cursor for cursor paging
    pub cursor: String,
    /// Cap on the number of records; `None` pages to the end
    pub n_max: Option<usize>,
}

impl PaginateOptions {
    /// Cursor paging from the start, capped at 10 000 records.
    #[must_use]
    pub fn cursor() -> Self {
        Self::default()
    }

    /// Page-number paging from page 1, capped at 10 000 records.
    #[must_use]
    pub fn number() -> Self {
        Self {
            method: PaginationMethod::Number,
            ..Self::default()
        }
    }

    /// Build options from a method name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] unless `method` is `cursor` or
    /// `number`.
    pub fn from_method(method: &str) -> Result<Self> {
        Ok(Self {
            method: method.parse()?,
            ..Self::default()
        })
    }

    /// Set the first page for page-number paging.
    #[must_use]
    pub const fn with_page(mut self, page: u64) -> Self {
        self.page = page;
        self
    }

    /// Set the page size.
    #[must_use]
    pub const fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    /// Set the first cursor for cursor paging.
    #[must_use]
    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = cursor.into();
        self
    }

    /// Set or remove the record cap.
    #[must_use]
    pub const fn with_n_max(mut self, n_max: Option<usize>) -> Self {
        self.n_max = n_max;
        self
    }
}

impl Default for PaginateOptions {
    fn default() -> Self {
        Self {
            method: PaginationMethod::Cursor,
            page: 1,
            per_page: None,
            cursor: "*".to_string(),
            n_max: Some(DEFAULT_N_MAX),
        }
    }
}

fn validate_per_page(per_page: Option<u32>) -> Result<()> {
    match per_page {
        Some(n) if !(1..=MAX_PER_PAGE).contains(&n) => Err(Error::InvalidArgument(format!(
            "per_page should be a number between 1 and {MAX_PER_PAGE}, got {n}"
        ))),
        _ => Ok(()),
    }
}

/// Mutable, chainable query against one collection.
pub struct Collection<R> {
    transport: Arc<dyn Transport>,
    config: Arc<ClientConfig>,
    params: ParamTree,
    _marker: PhantomData<fn() -> R>,
}

impl<R: Resource> Collection<R> {
    /// Create a query over the collection of `R`, starting from `params`.
    #[must_use]
    pub fn with_params(
        transport: Arc<dyn Transport>,
        config: Arc<ClientConfig>,
        params: ParamTree,
    ) -> Self {
        Self {
            transport,
            config,
            params,
            _marker: PhantomData,
        }
    }

    /// Accumulated parameters.
    #[must_use]
    pub const fn params(&self) -> &ParamTree {
        &self.params
    }

    /// Collection URL without any parameters.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!(
            "{}/{}",
            self.config.resolved_api_url(),
            R::KIND.collection_name()
        )
    }

    /// Request URL for the current state of the query.
    #[must_use]
    pub fn url(&self) -> String {
        build_url(&self.base_url(), &self.params)
    }

    fn add_param(&mut self, name: &str, value: impl Into<ParamValue>) -> &mut Self {
        self.params.add(name, value);
        self
    }

    /// Add attribute filters, one top-level parameter per entry.
    ///
    /// Names are passed through verbatim; the server validates them.
    pub fn filter<I, K, V>(&mut self, filters: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ParamValue>,
    {
        for (name, value) in filters {
            self.params.add(name, value);
        }
        self
    }

    /// Sort by `by`, descending when `ascending` is false.
    pub fn sort(&mut self, by: &str, ascending: bool) -> &mut Self
    where
        R: Searchable,
    {
        if ascending {
            self.add_param("sort", by)
        } else {
            self.add_param("sort", format!("-{by}"))
        }
    }

    /// Free-text search.
    pub fn query(&mut self, text: impl Into<String>) -> &mut Self
    where
        R: Searchable,
    {
        self.add_param("query", text.into())
    }

    /// Field-scoped search, merged into earlier field queries.
    pub fn query_fields(&mut self, fields: ParamMap) -> &mut Self
    where
        R: Searchable,
    {
        self.add_param("query", fields)
    }

    /// General form of [`Collection::query`] and [`Collection::query_fields`].
    ///
    /// Accepts at most one free-text term, or field queries, but not both.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for more than one term, or for a
    /// term combined with field queries.
    pub fn query_args(&mut self, terms: &[&str], fields: ParamMap) -> Result<&mut Self>
    where
        R: Searchable,
    {
        match terms {
            [] if fields.is_empty() => Ok(self),
            [] => Ok(self.query_fields(fields)),
            [text] if fields.is_empty() => Ok(self.query(*text)),
            [_] => Err(Error::InvalidArgument(
                "Free-text and field queries cannot be combined".to_string(),
            )),
            _ => Err(Error::InvalidArgument(
                "Maximal 1 positional argument possible".to_string(),
            )),
        }
    }

    /// Sample records at random.
    pub fn random(&mut self) -> &mut Self
    where
        R: Sampleable,
    {
        self.add_param("random", true)
    }

    /// Fetch one page of records.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for an out-of-range `per_page`
    /// before any request, and otherwise propagates transport errors.
    pub async fn get(&mut self, options: GetOptions) -> Result<Vec<R>> {
        self.get_with_meta(options).await.map(|(records, _)| records)
    }

    /// Fetch one page of records together with the response `meta`.
    ///
    /// The paging controls are stored on the collection and replace any
    /// earlier ones.
    ///
    /// # Errors
    ///
    /// Same as [`Collection::get`].
    pub async fn get_with_meta(&mut self, options: GetOptions) -> Result<(Vec<R>, Meta)> {
        validate_per_page(options.per_page)?;

        self.params.set(PAGE_SIZE, options.per_page);
        self.params.set(PAGE_NUMBER, options.page);
        self.params.set(PAGE_CURSOR, options.cursor);

        let envelope = fetch_page(self.transport.as_ref(), &self.url()).await?;
        let records = envelope
            .data
            .into_iter()
            .map(decode_record::<R>)
            .collect::<Result<Vec<R>>>()?;

        debug!(
            collection = R::KIND.collection_name(),
            records = records.len(),
            total = ?envelope.meta.total,
            "collection page fetched"
        );

        Ok((records, envelope.meta))
    }

    /// Number of matching records reported by the server.
    ///
    /// Costs one request with a page size of 1.
    ///
    /// # Errors
    ///
    /// Propagates request errors and fails with [`Error::Decode`] when the
    /// response carries no `meta.total`.
    pub async fn count(&mut self) -> Result<u64> {
        let (_, meta) = self
            .get_with_meta(GetOptions::new().with_per_page(1))
            .await?;
        meta.total
            .ok_or_else(|| Error::Decode("response has no `meta.total`".to_string()))
    }

    /// Page through every matching record.
    ///
    /// Selects cursor or page-number paging by setting the matching
    /// parameter (and clearing the other), then returns a [`Paginator`]
    /// bound to the resulting URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for an out-of-range `per_page`.
    pub fn paginate(&mut self, options: PaginateOptions) -> Result<Paginator<R>> {
        validate_per_page(options.per_page)?;

        self.params.set(PAGE_SIZE, options.per_page);
        match options.method {
            PaginationMethod::Cursor => {
                self.params.remove(PAGE_NUMBER);
                self.params.set(PAGE_CURSOR, options.cursor);
            }
            PaginationMethod::Number => {
                self.params.remove(PAGE_CURSOR);
                self.params.set(PAGE_NUMBER, options.page);
            }
        }

        Ok(Paginator::from_url(
            Arc::clone(&self.transport),
            self.url(),
            options.n_max,
        ))
    }

    /// Fetch one record by identifier.
    ///
    /// The query parameters are not used. A missing record surfaces as
    /// [`Error::HttpStatus`] with status 404.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for an empty identifier and
    /// otherwise propagates transport errors.
    pub async fn find(&self, id: &str) -> Result<R> {
        if id.is_empty() {
            return Err(Error::InvalidArgument(
                "record identifier must not be empty".to_string(),
            ));
        }

        let url = format!("{}/{id}", self.base_url());
        let body = self.transport.get_json(&url).await?;
        single_record(body).map(R::from)
    }
}

impl<R> Clone for Collection<R> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            config: Arc::clone(&self.config),
            params: self.params.clone(),
            _marker: PhantomData,
        }
    }
}

impl<R> std::fmt::Debug for Collection<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}
