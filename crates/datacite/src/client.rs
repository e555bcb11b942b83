//! Entry point handing out one [`Collection`] per DataCite resource kind.

use std::sync::Arc;
use std::time::Duration;

use datacite_core::client::{ClientConfig, HttpTransport, QueryErrorClassifier, Transport};
use datacite_core::ParamTree;

use crate::collection::Collection;
use crate::models::{Client, ClientPrefix, Doi, Event, Prefix, Provider, ProviderPrefix, Resource};
use crate::paginator::Paginator;
use crate::Result;

/// Builder for [`DataCiteClient`].
#[derive(Default)]
pub struct DataCiteClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
}

impl DataCiteClientBuilder {
    /// Create a builder reading `api_url` and `email` from the process-wide
    /// configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `api_url` instead of the process-wide API root.
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.config = self.config.with_api_url(api_url);
        self
    }

    /// Send `email` instead of the process-wide contact address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.config = self.config.with_email(email);
        self
    }

    /// Override the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_timeout(timeout);
        self
    }

    /// Override how 403 responses are classified as query errors.
    #[must_use]
    pub fn with_query_errors(mut self, classifier: QueryErrorClassifier) -> Self {
        self.config = self.config.with_query_errors(classifier);
        self
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Send requests through `transport` instead of HTTP.
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn build(self) -> Result<DataCiteClient> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(self.config.clone())?),
        };

        Ok(DataCiteClient {
            transport,
            config: Arc::new(self.config),
        })
    }
}

/// Asynchronous DataCite client.
///
/// Cheap to clone; every collection it hands out shares one connection pool.
#[derive(Clone)]
pub struct DataCiteClient {
    transport: Arc<dyn Transport>,
    config: Arc<ClientConfig>,
}

impl DataCiteClient {
    /// Construct a client from the process-wide configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        DataCiteClientBuilder::new().build()
    }

    /// Start building a client.
    #[must_use]
    pub fn builder() -> DataCiteClientBuilder {
        DataCiteClientBuilder::new()
    }

    /// Construct a client over an existing transport.
    #[must_use]
    pub fn from_transport(transport: Arc<dyn Transport>, config: ClientConfig) -> Self {
        Self {
            transport,
            config: Arc::new(config),
        }
    }

    /// Client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fresh query over the collection of `R`.
    #[must_use]
    pub fn collection<R: Resource>(&self) -> Collection<R> {
        self.collection_with_params(ParamTree::new())
    }

    /// Query over the collection of `R`, seeded with `params`.
    #[must_use]
    pub fn collection_with_params<R: Resource>(&self, params: ParamTree) -> Collection<R> {
        Collection::with_params(Arc::clone(&self.transport), Arc::clone(&self.config), params)
    }

    /// Resume paging from a known page URL, such as a saved
    /// [`Paginator::link`].
    #[must_use]
    pub fn paginator_from_url<R: Resource>(
        &self,
        url: impl Into<String>,
        n_max: Option<usize>,
    ) -> Paginator<R> {
        Paginator::from_url(Arc::clone(&self.transport), url, n_max)
    }

    /// Query the `dois` collection.
    #[must_use]
    pub fn dois(&self) -> Collection<Doi> {
        self.collection()
    }

    /// Query the `clients` collection.
    #[must_use]
    pub fn clients(&self) -> Collection<Client> {
        self.collection()
    }

    /// Query the `client-prefixes` collection.
    #[must_use]
    pub fn client_prefixes(&self) -> Collection<ClientPrefix> {
        self.collection()
    }

    /// Query the `events` collection.
    #[must_use]
    pub fn events(&self) -> Collection<Event> {
        self.collection()
    }

    /// Query the `prefixes` collection.
    #[must_use]
    pub fn prefixes(&self) -> Collection<Prefix> {
        self.collection()
    }

    /// Query the `providers` collection.
    #[must_use]
    pub fn providers(&self) -> Collection<Provider> {
        self.collection()
    }

    /// Query the `provider-prefixes` collection.
    #[must_use]
    pub fn provider_prefixes(&self) -> Collection<ProviderPrefix> {
        self.collection()
    }
}

impl std::fmt::Debug for DataCiteClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataCiteClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
