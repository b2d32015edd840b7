//! User storage provider traits.
//!
//! ## NIST 800-53 Rev5 Controls
//!
//! - IA-2: Identification and Authentication (Organizational Users)
//! - IA-5: Authenticator Management
//!
//! These traits let the host resolve, authenticate and manage users that
//! live in an external store instead of local storage.

use std::collections::HashMap;

use uuid::Uuid;

use crate::config::{ComponentModel, ConfigProperty};
use crate::credential::{CredentialInput, PASSWORD};
use crate::error::FederationResult;

/// Search parameter carrying the free-text user query.
pub const SEARCH_PARAM: &str = "keycloak.session.realm.users.query.search";

// ============================================================================
// User Storage Provider
// ============================================================================

/// Base trait for user storage federation providers.
///
/// One provider instance serves one unit of work (a host request or
/// transaction) and is dropped at its end. Anything it caches dies with it.
pub trait UserStorageProvider: Send + Sync {
    /// The user handle returned to the host.
    type User: Send + Sync;

    /// Called at the end of the unit of work.
    fn close(&self) {}
}

/// Point lookups of single users.
#[allow(async_fn_in_trait)]
pub trait UserLookupProvider: UserStorageProvider {
    /// Gets a user by host-side id (see [`crate::StorageId`]).
    async fn get_user_by_id(&self, realm_id: Uuid, id: &str) -> FederationResult<Option<Self::User>>;

    /// Gets a user by username.
    async fn get_user_by_username(
        &self,
        realm_id: Uuid,
        username: &str,
    ) -> FederationResult<Option<Self::User>>;

    /// Gets a user by email.
    async fn get_user_by_email(
        &self,
        realm_id: Uuid,
        email: &str,
    ) -> FederationResult<Option<Self::User>>;
}

/// Multi-user queries.
#[allow(async_fn_in_trait)]
pub trait UserQueryProvider: UserStorageProvider {
    /// Searches for users.
    ///
    /// The free-text query is read from [`SEARCH_PARAM`]. Results are the
    /// window `[first, first + max)` of the store's answer.
    async fn search_users(
        &self,
        realm_id: Uuid,
        params: &HashMap<String, String>,
        first: usize,
        max: usize,
    ) -> FederationResult<Vec<Self::User>>;

    /// Searches users by an exact attribute value.
    async fn search_users_by_attribute(
        &self,
        _realm_id: Uuid,
        _name: &str,
        _value: &str,
    ) -> FederationResult<Vec<Self::User>> {
        Ok(Vec::new())
    }

    /// Lists members of a group.
    async fn group_members(
        &self,
        _realm_id: Uuid,
        _group_id: &str,
        _first: usize,
        _max: usize,
    ) -> FederationResult<Vec<Self::User>> {
        Ok(Vec::new())
    }

    /// Counts users in the store.
    async fn users_count(&self, _realm_id: Uuid) -> FederationResult<usize> {
        Ok(0)
    }
}

/// Creation and removal of users in the external store.
#[allow(async_fn_in_trait)]
pub trait UserRegistrationProvider: UserStorageProvider {
    /// Creates a user and returns its handle.
    async fn add_user(&self, realm_id: Uuid, username: &str) -> FederationResult<Self::User>;

    /// Removes a user. Returns true if the user was removed.
    async fn remove_user(&self, realm_id: Uuid, username: &str) -> FederationResult<bool>;
}

// ============================================================================
// Credential Validator
// ============================================================================

/// Validates credentials against the external store.
///
/// ## Security
///
/// Implementations must never log or store the challenge response.
#[allow(async_fn_in_trait)]
pub trait CredentialValidator: Send + Sync {
    /// Checks if the provider can validate the given credential type.
    fn supports_credential_type(&self, credential_type: &str) -> bool {
        credential_type == PASSWORD
    }

    /// Checks if the given user has a credential of this type.
    fn is_configured_for(&self, _realm_id: Uuid, _username: &str, credential_type: &str) -> bool {
        self.supports_credential_type(credential_type)
    }

    /// Validates a credential for a user.
    async fn is_valid(
        &self,
        realm_id: Uuid,
        username: &str,
        input: &CredentialInput,
    ) -> FederationResult<bool>;
}

// ============================================================================
// Factory
// ============================================================================

/// Creates providers for configured components.
///
/// The factory lives as long as the host. It may hold expensive shared
/// resources (pools, clients) keyed by component configuration, but the
/// providers it returns are per unit of work.
#[allow(async_fn_in_trait)]
pub trait UserStorageProviderFactory: Send + Sync {
    /// The provider type created.
    type Provider: UserStorageProvider;

    /// Unique identifier of this factory.
    fn id(&self) -> &'static str;

    /// Configuration options this factory understands.
    fn config_properties(&self) -> Vec<ConfigProperty>;

    /// Validates a component configuration before it is saved.
    async fn validate_configuration(&self, model: &ComponentModel) -> FederationResult<()>;

    /// Creates a provider for one unit of work.
    async fn create(&self, model: &ComponentModel) -> FederationResult<Self::Provider>;
}
