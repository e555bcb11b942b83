//! HTTP transport for the DataCite REST API.
//!
//! Requests are plain GETs returning JSON. The [`Transport`] trait is the
//! seam the query layer depends on; [`HttpTransport`] implements it with
//! `reqwest`, adding the `User-Agent` and contact `email` headers and mapping
//! non-success statuses to [`Error`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, StatusCode};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::config;
use crate::error::{Error, Result};
use crate::types::PageEnvelope;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT: u64 = 30;

/// Default connect timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT: u64 = 10;

/// Default idle timeout for connection pools
pub const DEFAULT_POOL_IDLE_TIMEOUT: u64 = 90;

/// Default maximum idle connections per host
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 10;

/// `User-Agent` sent with every request
pub const USER_AGENT: &str = concat!("datacite-rs/", env!("CARGO_PKG_VERSION"));

/// Substring of the 403 `error` field that marks a malformed query.
pub const QUERY_ERROR_NEEDLE: &str = "query parameters";

/// Classifies 403 responses as query errors.
///
/// DataCite reports malformed filter or query syntax as a 403 whose JSON
/// `error` field mentions "query parameters". The wording is not part of any
/// published contract, so the needle can be replaced or the check disabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryErrorClassifier {
    needle: Option<String>,
}

impl QueryErrorClassifier {
    /// Classifier matching the given substring.
    #[must_use]
    pub fn new(needle: impl Into<String>) -> Self {
        Self {
            needle: Some(needle.into()),
        }
    }

    /// Classifier that never reports query errors.
    #[must_use]
    pub const fn disabled() -> Self {
        Self { needle: None }
    }

    /// Returns the query error for this response, if it is one.
    #[must_use]
    pub fn classify(&self, status: StatusCode, body: &str) -> Option<Error> {
        let needle = self.needle.as_deref()?;
        if status != StatusCode::FORBIDDEN {
            return None;
        }

        let json: Value = serde_json::from_str(body).ok()?;
        let error = json.get("error").and_then(Value::as_str)?;
        if !error.contains(needle) {
            return None;
        }

        let message = json
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or(error);
        Some(Error::Query(message.to_string()))
    }
}

impl Default for QueryErrorClassifier {
    fn default() -> Self {
        Self::new(QUERY_ERROR_NEEDLE)
    }
}

/// Map a non-success response to an [`Error`].
#[must_use]
pub fn map_status_to_error(
    classifier: &QueryErrorClassifier,
    status: StatusCode,
    body: String,
) -> Error {
    if let Some(error) = classifier.classify(status, &body) {
        warn!(%status, %error, "DataCite rejected query parameters");
        return error;
    }

    Error::HttpStatus {
        status: status.as_u16(),
        body,
    }
}

/// HTTP client configuration.
///
/// `api_url` and `email` override the process-wide configuration for clients
/// built from this value; when unset, the process-wide values are read at the
/// time each URL is built or each request is sent.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout
    pub timeout: Duration,

    /// Connect timeout
    pub connect_timeout: Duration,

    /// Connection pool idle timeout
    pub pool_idle_timeout: Duration,

    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,

    /// `User-Agent` header value
    pub user_agent: String,

    /// API root overriding the process-wide value
    pub api_url: Option<String>,

    /// Contact email overriding the process-wide value
    pub email: Option<String>,

    /// Classifier for query errors
    pub query_errors: QueryErrorClassifier,
}

impl ClientConfig {
    /// Create a new client configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT),
            pool_idle_timeout: Duration::from_secs(DEFAULT_POOL_IDLE_TIMEOUT),
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            user_agent: USER_AGENT.to_string(),
            api_url: None,
            email: None,
            query_errors: QueryErrorClassifier::default(),
        }
    }

    /// Set request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set connection pool idle timeout.
    #[must_use]
    pub const fn with_pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = timeout;
        self
    }

    /// Set maximum idle connections per host.
    #[must_use]
    pub const fn with_pool_max_idle(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    /// Set the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Pin the API root for this client.
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }

    /// Pin the contact email for this client.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Replace the query error classifier.
    #[must_use]
    pub fn with_query_errors(mut self, classifier: QueryErrorClassifier) -> Self {
        self.query_errors = classifier;
        self
    }

    /// API root in effect right now, without a trailing slash.
    #[must_use]
    pub fn resolved_api_url(&self) -> String {
        self.api_url.as_ref().map_or_else(
            || config().api_root().to_string(),
            |url| url.trim_end_matches('/').to_string(),
        )
    }

    /// Contact email in effect right now.
    #[must_use]
    pub fn resolved_email(&self) -> Option<String> {
        self.email.clone().or_else(|| config().email)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Source of JSON documents for a URL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET for `url` and return the parsed JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure, on a non-success status, or if
    /// the body is not JSON.
    async fn get_json(&self, url: &str) -> Result<Value>;
}

/// Fetch one collection page and extract its envelope.
///
/// # Errors
///
/// Propagates transport errors and fails with [`Error::Decode`] when the body
/// is not a collection response.
pub async fn fetch_page(transport: &dyn Transport, url: &str) -> Result<PageEnvelope> {
    let body = transport.get_json(url).await?;
    PageEnvelope::from_value(body)
}

/// `reqwest`-backed [`Transport`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
    config: ClientConfig,
}

impl HttpTransport {
    /// Build a transport from the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = ClientBuilder::new()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .build()
            .map_err(|err| Error::ConfigError(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self { http, config })
    }

    /// Access the configuration this transport was built from.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, url: &str) -> Result<Value> {
        let mut request = self.http.get(url).header("Accept", "application/json");
        if let Some(email) = self.config.resolved_email() {
            request = request.header("email", email);
        }

        info!(%url, "Sending DataCite request");

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            debug!(%url, bytes = body.len(), "DataCite response received");
            return serde_json::from_str(&body).map_err(|err| {
                Error::Decode(format!("Failed to parse DataCite response for `{url}`: {err}"))
            });
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        Err(map_status_to_error(&self.config.query_errors, status, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn transport() -> HttpTransport {
        HttpTransport::new(ClientConfig::new().with_email("tests@example.com")).unwrap()
    }

    #[test]
    fn test_client_config_new() {
        let config = ClientConfig::new();
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT));
        assert_eq!(config.connect_timeout, Duration::from_secs(DEFAULT_CONNECT_TIMEOUT));
        assert_eq!(config.user_agent, USER_AGENT);
        assert!(config.api_url.is_none());
        assert_eq!(config.query_errors, QueryErrorClassifier::default());
    }

    #[test]
    fn test_client_config_builder() {
        let config = ClientConfig::new()
            .with_timeout(Duration::from_secs(45))
            .with_connect_timeout(Duration::from_secs(5))
            .with_pool_idle_timeout(Duration::from_secs(75))
            .with_pool_max_idle(4)
            .with_user_agent("my-harvester/1.0")
            .with_api_url("http://localhost:8080/")
            .with_email("me@example.com")
            .with_query_errors(QueryErrorClassifier::disabled());

        assert_eq!(config.timeout, Duration::from_secs(45));
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.pool_idle_timeout, Duration::from_secs(75));
        assert_eq!(config.pool_max_idle_per_host, 4);
        assert_eq!(config.user_agent, "my-harvester/1.0");
        assert_eq!(config.resolved_api_url(), "http://localhost:8080");
        assert_eq!(config.resolved_email().as_deref(), Some("me@example.com"));
    }

    #[test]
    fn test_classifier_matches_query_parameter_errors() {
        let body = json!({"error": "Invalid query parameters", "message": "Unknown field publicationYear_error"})
            .to_string();
        let error = QueryErrorClassifier::default().classify(StatusCode::FORBIDDEN, &body);
        assert_eq!(
            error,
            Some(Error::Query("Unknown field publicationYear_error".to_string()))
        );
    }

    #[test]
    fn test_classifier_ignores_other_responses() {
        let classifier = QueryErrorClassifier::default();
        let body = json!({"error": "Invalid query parameters", "message": "m"}).to_string();

        assert!(classifier.classify(StatusCode::NOT_FOUND, &body).is_none());
        assert!(classifier
            .classify(StatusCode::FORBIDDEN, r#"{"error": "Forbidden"}"#)
            .is_none());
        assert!(classifier
            .classify(StatusCode::FORBIDDEN, r#"{"error": {"status": 403}}"#)
            .is_none());
        assert!(classifier.classify(StatusCode::FORBIDDEN, "not json").is_none());
        assert!(QueryErrorClassifier::disabled()
            .classify(StatusCode::FORBIDDEN, &body)
            .is_none());
    }

    #[test]
    fn test_classifier_custom_needle() {
        let classifier = QueryErrorClassifier::new("bad search");
        let body = json!({"error": "bad search syntax"}).to_string();
        assert_eq!(
            classifier.classify(StatusCode::FORBIDDEN, &body),
            Some(Error::Query("bad search syntax".to_string()))
        );
    }

    #[test]
    fn test_map_status_to_error_generic() {
        let err = map_status_to_error(
            &QueryErrorClassifier::default(),
            StatusCode::NOT_FOUND,
            "missing".to_string(),
        );
        assert_eq!(
            err,
            Error::HttpStatus {
                status: 404,
                body: "missing".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_get_json_sends_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/dois"))
            .and(header("email", "tests@example.com"))
            .and(header("user-agent", USER_AGENT))
            .and(header_exists("accept"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .expect(1)
            .mount(&server)
            .await;

        let body = transport()
            .get_json(&format!("{}/dois", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, json!({"data": []}));
    }

    #[tokio::test]
    async fn test_get_json_maps_query_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": "Invalid query parameters",
                "message": "Filter publicationYear_error is not supported"
            })))
            .mount(&server)
            .await;

        let err = transport()
            .get_json(&format!("{}/dois?publicationYear_error=2020", server.uri()))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            Error::Query("Filter publicationYear_error is not supported".to_string())
        );
    }

    #[tokio::test]
    async fn test_get_json_maps_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
            .mount(&server)
            .await;

        let err = transport()
            .get_json(&format!("{}/dois/NotAWorkID", server.uri()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn test_get_json_rejects_non_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let err = transport().get_json(&server.uri()).await.unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[tokio::test]
    async fn test_fetch_page_uses_transport() {
        let mut mock = MockTransport::new();
        mock.expect_get_json()
            .with(mockall::predicate::eq("https://api.datacite.org/dois?page[size]=1"))
            .times(1)
            .returning(|_| Ok(json!({"data": [{"id": "a"}], "meta": {"total": 7}})));

        let page = fetch_page(&mock, "https://api.datacite.org/dois?page[size]=1")
            .await
            .unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.meta.total, Some(7));
        assert!(page.next.is_none());
    }

    #[tokio::test]
    async fn test_fetch_page_propagates_errors() {
        let mut mock = MockTransport::new();
        mock.expect_get_json()
            .returning(|_| Err(Error::Transport("connection reset".to_string())));

        let err = fetch_page(&mock, "https://api.datacite.org/dois")
            .await
            .unwrap_err();
        assert_eq!(err, Error::Transport("connection reset".to_string()));
    }
}
