//! Error types for DataCite operations.
//!
//! Three kinds of failure surface to callers: invalid arguments detected
//! locally before any request is sent, query errors reported by the service
//! for malformed filter/query syntax, and transport or HTTP status failures.

use thiserror::Error;

/// Main error type for DataCite operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Argument rejected before any network call was made
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Filter or query syntax rejected by the service
    #[error("Query error: {0}")]
    Query(String),

    /// Non-success HTTP status returned by the service
    #[error("HTTP status {status}: {body}")]
    HttpStatus {
        /// Response status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Network failure while talking to the service
    #[error("Transport error: {0}")]
    Transport(String),

    /// Request timed out
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Response body could not be decoded
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Invalid endpoint URL
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Specialized result type for DataCite operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::Query(_) => "QUERY_ERROR",
            Self::HttpStatus { .. } => "HTTP_STATUS",
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::Decode(_) => "DECODE_ERROR",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
            Self::ConfigError(_) => "CONFIG_ERROR",
        }
    }

    /// Returns the HTTP status code when the service answered with one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if the service rejected the query syntax.
    #[must_use]
    pub const fn is_query_error(&self) -> bool {
        matches!(self, Self::Query(_))
    }

    /// Returns true if the error was detected locally, before any request.
    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            Error::InvalidArgument("test".to_string()).error_code(),
            "INVALID_ARGUMENT"
        );
        assert_eq!(Error::Query("test".to_string()).error_code(), "QUERY_ERROR");
        assert_eq!(
            Error::HttpStatus {
                status: 404,
                body: "missing".to_string()
            }
            .error_code(),
            "HTTP_STATUS"
        );
        assert_eq!(
            Error::Transport("test".to_string()).error_code(),
            "TRANSPORT_ERROR"
        );
        assert_eq!(Error::Timeout("test".to_string()).error_code(), "TIMEOUT");
        assert_eq!(Error::Decode("test".to_string()).error_code(), "DECODE_ERROR");
        assert_eq!(
            Error::InvalidEndpoint("test".to_string()).error_code(),
            "INVALID_ENDPOINT"
        );
        assert_eq!(
            Error::ConfigError("test".to_string()).error_code(),
            "CONFIG_ERROR"
        );
    }

    #[test]
    fn test_error_display() {
        let err = Error::Query("Invalid query parameters".to_string());
        assert_eq!(err.to_string(), "Query error: Invalid query parameters");

        let err = Error::HttpStatus {
            status: 404,
            body: "not found".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP status 404: not found");
    }

    #[test]
    fn test_status_only_for_http_errors() {
        let err = Error::HttpStatus {
            status: 500,
            body: String::new(),
        };
        assert_eq!(err.status(), Some(500));
        assert_eq!(Error::Query("x".to_string()).status(), None);
    }

    #[test]
    fn test_classification_helpers() {
        assert!(Error::Query("bad".to_string()).is_query_error());
        assert!(!Error::InvalidArgument("bad".to_string()).is_query_error());
        assert!(Error::InvalidArgument("bad".to_string()).is_invalid_argument());
        assert!(!Error::Transport("down".to_string()).is_invalid_argument());
    }

    #[test]
    fn test_from_url_parse_error() {
        let err = url::Url::parse("not a url").unwrap_err();
        let datacite_err: Error = err.into();
        assert!(matches!(datacite_err, Error::InvalidEndpoint(_)));
    }

    #[test]
    fn test_from_serde_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let datacite_err: Error = err.into();
        assert!(matches!(datacite_err, Error::Decode(_)));
    }

    #[test]
    fn test_error_partial_eq() {
        let err1 = Error::Query("test".to_string());
        let err2 = Error::Query("test".to_string());
        let err3 = Error::Query("other".to_string());

        assert_eq!(err1, err2.clone());
        assert_ne!(err1, err3);
    }
}
