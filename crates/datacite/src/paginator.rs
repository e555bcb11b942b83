//! Lazy, page-at-a-time traversal of a collection query.
//!
//! A [`Paginator`] starts from a fully built request URL and follows the
//! server's `links.next` until there is none or the number of records handed
//! out reaches `n_max`. An empty page counts zero records and does not stop
//! the traversal on its own. The cap is checked before each fetch, so the last
//! page is always returned whole.
//!
//! ```no_run
//! # async fn run() -> datacite_core::Result<()> {
//! use datacite::{DataCiteClient, PaginateOptions};
//!
//! let client = DataCiteClient::new()?;
//! let mut pager = client
//!     .dois()
//!     .filter([("prefix", "10.5438")])
//!     .paginate(PaginateOptions::cursor().with_per_page(100))?;
//!
//! while let Some(page) = pager.next_page().await? {
//!     for doi in page {
//!         println!("{:?}", doi.id());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use std::marker::PhantomData;
use std::sync::Arc;

use datacite_core::client::{fetch_page, Transport};
use datacite_core::Result;
use tracing::debug;

use crate::models::{decode_record, Resource};

/// Pull-based sequence of result pages.
pub struct Paginator<R> {
    transport: Arc<dyn Transport>,
    link: Option<String>,
    n: usize,
    n_max: Option<usize>,
    _marker: PhantomData<fn() -> R>,
}

impl<R: Resource> Paginator<R> {
    /// Start paging from `url`.
    ///
    /// Any URL of a collection page works, which lets a traversal resume from
    /// a saved `links.next` value.
    #[must_use]
    pub fn from_url(
        transport: Arc<dyn Transport>,
        url: impl Into<String>,
        n_max: Option<usize>,
    ) -> Self {
        Self {
            transport,
            link: Some(url.into()),
            n: 0,
            n_max,
            _marker: PhantomData,
        }
    }

    /// Returns true once no further page will be fetched.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.link.is_none() || self.n_max.is_some_and(|max| self.n >= max)
    }

    /// URL of the next page to fetch.
    #[must_use]
    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }

    /// Number of records returned so far.
    #[must_use]
    pub const fn records_yielded(&self) -> usize {
        self.n
    }

    /// Cap on the number of records, if any.
    #[must_use]
    pub const fn n_max(&self) -> Option<usize> {
        self.n_max
    }

    /// Fetch the next page.
    ///
    /// Returns `Ok(None)` once the paginator is exhausted. A failed fetch
    /// leaves the paginator exhausted; resume with [`Paginator::from_url`].
    ///
    /// # Errors
    ///
    /// Propagates transport, status and decode errors.
    pub async fn next_page(&mut self) -> Result<Option<Vec<R>>> {
        if self.is_exhausted() {
            return Ok(None);
        }
        let Some(link) = self.link.take() else {
            return Ok(None);
        };

        let envelope = fetch_page(self.transport.as_ref(), &link).await?;
        let records = envelope
            .data
            .into_iter()
            .map(decode_record::<R>)
            .collect::<Result<Vec<R>>>()?;

        self.n += records.len();
        self.link = envelope.next;

        debug!(
            collection = R::KIND.collection_name(),
            page_len = records.len(),
            yielded = self.n,
            has_next = self.link.is_some(),
            "paginator advanced"
        );

        Ok(Some(records))
    }

    /// Drain the remaining pages into one vector.
    ///
    /// # Errors
    ///
    /// Returns the first error hit; records from earlier pages are dropped.
    pub async fn collect_records(mut self) -> Result<Vec<R>> {
        let mut records = Vec::new();
        while let Some(page) = self.next_page().await? {
            records.extend(page);
        }
        Ok(records)
    }
}

impl<R> std::fmt::Debug for Paginator<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Paginator")
            .field("link", &self.link)
            .field("n", &self.n)
            .field("n_max", &self.n_max)
            .finish_non_exhaustive()
    }
}
