//! REST directory error types.
//!
//! ## Security Note
//!
//! Transport diagnostics stay inside [`TransportError`], which is only ever
//! logged. What leaves the gateway is [`RestError`], whose backend variants
//! carry no message text.

use kc_federation::FederationError;
use thiserror::Error;

/// Errors returned by the REST directory provider.
#[derive(Debug, Error)]
pub enum RestError {
    /// Invalid settings or unreachable base URL.
    #[error("REST directory configuration error: {0}")]
    Configuration(String),

    /// The directory answered a required operation with a non-success status.
    #[error("REST directory returned status {status}")]
    Backend {
        /// HTTP status code received.
        status: u16,
    },

    /// Timeout, pool exhaustion, I/O failure or unreadable response.
    #[error("{}", kc_federation::BACKEND_AUTHENTICATION_ERROR)]
    BackendAuthentication,
}

impl RestError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates a backend status error.
    #[must_use]
    pub const fn backend(status: u16) -> Self {
        Self::Backend { status }
    }

    /// Checks if this is a configuration error.
    #[must_use]
    pub const fn is_configuration_error(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Checks if this is any remote failure.
    #[must_use]
    pub const fn is_backend_error(&self) -> bool {
        matches!(self, Self::Backend { .. } | Self::BackendAuthentication)
    }
}

/// Result type for REST directory operations.
pub type RestResult<T> = Result<T, RestError>;

/// Transport-level failure detail. Logged, never returned.
#[derive(Debug, Error)]
pub enum TransportError {
    /// No pooled connection became free in time.
    #[error("connection pool timeout after {0:?}")]
    PoolTimeout(std::time::Duration),

    /// The pool was shut down while waiting for a lease.
    #[error("connection pool closed")]
    PoolClosed,

    /// Connection could not be established in time.
    #[error("connect timeout: {0}")]
    ConnectTimeout(reqwest::Error),

    /// No data arrived in time.
    #[error("socket timeout: {0}")]
    SocketTimeout(reqwest::Error),

    /// Anything else on the wire.
    #[error("I/O error: {0}")]
    Io(reqwest::Error),

    /// Response body did not have the expected JSON shape.
    #[error("malformed response body: {0}")]
    Body(#[from] serde_json::Error),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() && err.is_connect() {
            Self::ConnectTimeout(err)
        } else if err.is_timeout() {
            Self::SocketTimeout(err)
        } else {
            Self::Io(err)
        }
    }
}

impl From<TransportError> for RestError {
    fn from(err: TransportError) -> Self {
        tracing::error!(error = %err, "REST directory call failed");
        Self::BackendAuthentication
    }
}

impl From<RestError> for FederationError {
    fn from(err: RestError) -> Self {
        match err {
            RestError::Configuration(msg) => FederationError::Configuration(msg),
            RestError::Backend { .. } | RestError::BackendAuthentication => {
                FederationError::BackendAuthentication
            }
        }
    }
}
