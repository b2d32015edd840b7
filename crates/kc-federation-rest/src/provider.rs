//! REST directory storage provider.
//!
//! One provider serves one unit of work. Lookups go through its
//! [`UserCache`]; credential checks, searches and writes go straight to the
//! gateway.

use std::collections::HashMap;
use std::sync::Arc;

use kc_federation::{
    CredentialInput, CredentialValidator, FederationResult, StorageId, UserLookupProvider,
    UserQueryProvider, UserRegistrationProvider, UserStorageProvider, SEARCH_PARAM,
};
use uuid::Uuid;

use crate::adapter::RestUserAdapter;
use crate::cache::UserCache;
use crate::gateway::DirectoryGateway;
use crate::record::DirectoryRecord;

/// User storage provider backed by a REST directory.
#[derive(Debug)]
pub struct RestUserStorageProvider {
    component_id: String,
    gateway: Arc<DirectoryGateway>,
    cache: UserCache,
}

impl RestUserStorageProvider {
    /// Creates a provider with an empty cache.
    #[must_use]
    pub fn new(component_id: impl Into<String>, gateway: Arc<DirectoryGateway>) -> Self {
        let component_id = component_id.into();
        tracing::info!(component_id = %component_id, "Initializing new REST user storage provider");
        Self {
            cache: UserCache::new(Arc::clone(&gateway), component_id.clone()),
            component_id,
            gateway,
        }
    }

    /// Returns the shared gateway.
    #[must_use]
    pub const fn gateway(&self) -> &Arc<DirectoryGateway> {
        &self.gateway
    }

    /// Returns this unit of work's cache.
    #[must_use]
    pub const fn cache(&self) -> &UserCache {
        &self.cache
    }

    async fn get_user(&self, realm_id: Uuid, query: &str) -> FederationResult<Option<Arc<RestUserAdapter>>> {
        Ok(self.cache.get(realm_id, query).await?)
    }

    fn adapt(&self, realm_id: Uuid, record: DirectoryRecord) -> Arc<RestUserAdapter> {
        Arc::new(RestUserAdapter::new(
            record,
            Arc::clone(&self.gateway),
            realm_id,
            &self.component_id,
        ))
    }
}

impl UserStorageProvider for RestUserStorageProvider {
    type User = Arc<RestUserAdapter>;

    fn close(&self) {
        tracing::debug!(component_id = %self.component_id, cached = self.cache.len(), "Closing provider");
        self.cache.clear();
    }
}

impl UserLookupProvider for RestUserStorageProvider {
    async fn get_user_by_id(&self, realm_id: Uuid, id: &str) -> FederationResult<Option<Self::User>> {
        tracing::info!(id = %id, "Getting user by id");
        self.get_user(realm_id, &StorageId::external_id_of(id)).await
    }

    async fn get_user_by_username(
        &self,
        realm_id: Uuid,
        username: &str,
    ) -> FederationResult<Option<Self::User>> {
        tracing::info!(username = %username, "Getting user by username");
        self.get_user(realm_id, username).await
    }

    async fn get_user_by_email(
        &self,
        realm_id: Uuid,
        email: &str,
    ) -> FederationResult<Option<Self::User>> {
        tracing::info!(email = %email, "Getting user by email");
        self.get_user(realm_id, email).await
    }
}

impl UserQueryProvider for RestUserStorageProvider {
    async fn search_users(
        &self,
        realm_id: Uuid,
        params: &HashMap<String, String>,
        first: usize,
        max: usize,
    ) -> FederationResult<Vec<Self::User>> {
        let query = params.get(SEARCH_PARAM).map(String::as_str);
        tracing::info!(query = ?query, first, max, "Searching users");

        let records = self.gateway.find_users(query).await?;
        tracing::info!(found = records.len(), "Found users");

        let end = records.len().min(first.saturating_add(max));
        Ok(records
            .into_iter()
            .take(end)
            .skip(first)
            .map(|record| self.adapt(realm_id, record))
            .collect())
    }
}

impl UserRegistrationProvider for RestUserStorageProvider {
    async fn add_user(&self, realm_id: Uuid, username: &str) -> FederationResult<Self::User> {
        let record = self.gateway.create_user(username).await?;
        let adapter = self.adapt(realm_id, record);
        self.cache.put(username, Arc::clone(&adapter));
        Ok(adapter)
    }

    async fn remove_user(&self, _realm_id: Uuid, username: &str) -> FederationResult<bool> {
        self.gateway.delete_user(username).await?;
        self.cache.remove(username);
        Ok(true)
    }
}

impl CredentialValidator for RestUserStorageProvider {
    async fn is_valid(
        &self,
        _realm_id: Uuid,
        username: &str,
        input: &CredentialInput,
    ) -> FederationResult<bool> {
        tracing::info!(username = %username, "Validating user");
        if !self.supports_credential_type(input.credential_type()) {
            return Ok(false);
        }
        Ok(self
            .gateway
            .authenticate(username, input.challenge_response())
            .await?)
    }
}
