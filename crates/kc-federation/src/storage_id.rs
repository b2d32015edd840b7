//! Federated user identifiers.
//!
//! Users served by a federation provider are known to the host by an id of
//! the form `f:<component-id>:<external-id>`. Local users carry plain ids.

use std::fmt;

const FEDERATED_PREFIX: &str = "f:";

/// A host-side user id that may point into a federation component.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageId {
    provider_id: Option<String>,
    external_id: String,
}

impl StorageId {
    /// Builds the id of a user owned by the given component.
    #[must_use]
    pub fn federated(provider_id: impl Into<String>, external_id: impl Into<String>) -> Self {
        Self {
            provider_id: Some(provider_id.into()),
            external_id: external_id.into(),
        }
    }

    /// Parses a host-side id.
    ///
    /// Anything not starting with `f:` is a local id. The external part is
    /// everything after the second colon, so it may itself contain colons.
    #[must_use]
    pub fn parse(id: &str) -> Self {
        if let Some(rest) = id.strip_prefix(FEDERATED_PREFIX) {
            if let Some((provider, external)) = rest.split_once(':') {
                return Self::federated(provider, external);
            }
        }
        Self {
            provider_id: None,
            external_id: id.to_string(),
        }
    }

    /// Returns the external part of a host-side id.
    #[must_use]
    pub fn external_id_of(id: &str) -> String {
        Self::parse(id).external_id
    }

    /// Returns the owning component, if federated.
    #[must_use]
    pub fn provider_id(&self) -> Option<&str> {
        self.provider_id.as_deref()
    }

    /// Returns the id inside the external store.
    #[must_use]
    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    /// Checks if this id belongs to a federation component.
    #[must_use]
    pub const fn is_federated(&self) -> bool {
        self.provider_id.is_some()
    }
}

impl fmt::Display for StorageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.provider_id {
            Some(provider) => write!(f, "{FEDERATED_PREFIX}{provider}:{}", self.external_id),
            None => f.write_str(&self.external_id),
        }
    }
}
