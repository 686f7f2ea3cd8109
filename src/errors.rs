use thiserror::Error;

/// Result type alias for Alertmanager provider operations
pub type Result<T> = std::result::Result<T, AlertmanagerError>;

/// Errors that can occur while resolving configuration for, or delivering
/// alerts to, Alertmanager
#[derive(Debug, Error)]
pub enum AlertmanagerError {
    /// No URL left after applying every override layer
    #[error("alertmanager URL not set")]
    UrlNotSet,

    /// The alerts endpoint derived from the configured URL is not a valid URL
    #[error("invalid Alertmanager URL {url:?}: {source}")]
    InvalidUrl {
        /// Normalized URL that failed to parse
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The alert-level provider override does not match the provider schema
    #[error("invalid provider override: {0}")]
    ParseOverride(#[source] serde_yaml::Error),

    /// Failed to build HTTP client
    #[error("failed to build HTTP client: {0}")]
    BuildHttpClient(#[source] reqwest::Error),

    /// Failed to serialize alerts
    #[error("failed to marshal alerts: {0}")]
    Serialize(#[source] serde_json::Error),

    /// HTTP request failed before a response was received
    #[error("failed to send request to Alertmanager: {0}")]
    Request(#[source] reqwest_middleware::Error),

    /// Alertmanager answered with a non-2xx status
    #[error("Alertmanager returned status {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body, verbatim
        message: String,
    },
}

impl AlertmanagerError {
    /// Check if the error is retryable
    ///
    /// Returns `true` for:
    /// - Connection errors
    /// - Timeout errors
    /// - Server errors (5xx status codes)
    ///
    /// The provider itself never retries. This only informs the caller.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(reqwest_middleware::Error::Reqwest(err)) => {
                err.is_connect() || err.is_timeout()
            }
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Whether the error stems from provider or override configuration
    /// rather than from delivery.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::UrlNotSet | Self::InvalidUrl { .. } | Self::ParseOverride(_)
        )
    }
}
