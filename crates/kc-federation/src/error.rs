//! Federation error types.
//!
//! ## NIST 800-53 Rev5: IA-6 (Authentication Feedback)
//!
//! Errors raised by a remote user store reach the host as one opaque kind.
//! The host cannot tell a network outage from a rejected request or a
//! server fault, so login screens never reveal backend topology.
//! Diagnostic detail belongs in the log, not in the error value.

use thiserror::Error;

/// Message key shown to the host for any remote failure.
pub const BACKEND_AUTHENTICATION_ERROR: &str = "BACKEND_AUTHENTICATION_ERROR";

/// Errors that can occur during federation operations.
#[derive(Debug, Error)]
pub enum FederationError {
    /// Provider configuration is invalid or the backend is unreachable at setup.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Any failure talking to the external store after setup.
    ///
    /// Carries no detail.
    #[error("{}", BACKEND_AUTHENTICATION_ERROR)]
    BackendAuthentication,
}

impl FederationError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Checks if this is a configuration error.
    #[must_use]
    pub const fn is_configuration_error(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Checks if this is the opaque backend error.
    #[must_use]
    pub const fn is_backend_error(&self) -> bool {
        matches!(self, Self::BackendAuthentication)
    }
}

/// Result type for federation operations.
pub type FederationResult<T> = Result<T, FederationError>;
