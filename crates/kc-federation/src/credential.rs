//! Credential input passed to federation providers for validation.

use std::fmt;

/// Credential type string for passwords.
pub const PASSWORD: &str = "password";

/// A credential presented by a user during authentication.
///
/// The challenge response is secret and is redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialInput {
    credential_type: String,
    challenge_response: String,
}

impl CredentialInput {
    /// Creates a credential input of the given type.
    #[must_use]
    pub fn new(credential_type: impl Into<String>, challenge_response: impl Into<String>) -> Self {
        Self {
            credential_type: credential_type.into(),
            challenge_response: challenge_response.into(),
        }
    }

    /// Creates a password credential input.
    #[must_use]
    pub fn password(value: impl Into<String>) -> Self {
        Self::new(PASSWORD, value)
    }

    /// Returns the credential type.
    #[must_use]
    pub fn credential_type(&self) -> &str {
        &self.credential_type
    }

    /// Returns the secret value presented by the user.
    #[must_use]
    pub fn challenge_response(&self) -> &str {
        &self.challenge_response
    }

    /// Checks if this is a password credential.
    #[must_use]
    pub fn is_password(&self) -> bool {
        self.credential_type == PASSWORD
    }
}

impl fmt::Debug for CredentialInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialInput")
            .field("credential_type", &self.credential_type)
            .field("challenge_response", &"[REDACTED]")
            .finish()
    }
}
