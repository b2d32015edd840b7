//! Per unit-of-work user cache.
//!
//! Memoizes directory lookups by the exact string the host queried with
//! (username, email or external id). Different keys that resolve to the
//! same directory user are not coalesced.
//!
//! A cache lives exactly as long as the provider of one unit of work. It is
//! safe to call concurrently from within that unit of work: when two
//! lookups for the same key race, the first adapter stored wins and both
//! callers get it.

use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use crate::adapter::RestUserAdapter;
use crate::error::RestResult;
use crate::gateway::DirectoryGateway;

/// Lookup cache bound to one gateway.
#[derive(Debug)]
pub struct UserCache {
    gateway: Arc<DirectoryGateway>,
    component_id: String,
    entries: DashMap<String, Arc<RestUserAdapter>>,
}

impl UserCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new(gateway: Arc<DirectoryGateway>, component_id: impl Into<String>) -> Self {
        Self {
            gateway,
            component_id: component_id.into(),
            entries: DashMap::new(),
        }
    }

    /// Returns the cached user for `key`, fetching it on first use.
    ///
    /// A miss in the directory yields `None` and is not remembered.
    ///
    /// ## Errors
    ///
    /// Returns a backend error if the directory cannot be reached.
    pub async fn get(&self, realm_id: Uuid, key: &str) -> RestResult<Option<Arc<RestUserAdapter>>> {
        tracing::debug!(size = self.entries.len(), "Cache size");

        if let Some(adapter) = self.entries.get(key) {
            tracing::debug!(key = %key, "Returning user from cache");
            return Ok(Some(Arc::clone(adapter.value())));
        }

        let Some(mut record) = self.gateway.find_user_by_username(key).await? else {
            tracing::debug!(key = %key, "User not found in repo");
            return Ok(None);
        };
        if record.ensure_username(key) {
            tracing::warn!(key = %key, "Directory record has no username, using lookup key");
        }

        let adapter = Arc::new(RestUserAdapter::new(
            record,
            Arc::clone(&self.gateway),
            realm_id,
            &self.component_id,
        ));
        let stored = self
            .entries
            .entry(key.to_string())
            .or_insert(adapter)
            .value()
            .clone();
        Ok(Some(stored))
    }

    /// Stores an adapter under `key`, replacing any previous entry.
    pub fn put(&self, key: impl Into<String>, adapter: Arc<RestUserAdapter>) {
        self.entries.insert(key.into(), adapter);
    }

    /// Evicts the entry for `key`.
    pub fn remove(&self, key: &str) -> Option<Arc<RestUserAdapter>> {
        self.entries.remove(key).map(|(_, adapter)| adapter)
    }

    /// Checks if `key` is cached.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks if the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Returns the gateway lookups go through.
    #[must_use]
    pub const fn gateway(&self) -> &Arc<DirectoryGateway> {
        &self.gateway
    }

    /// Returns the component the cached users belong to.
    #[must_use]
    pub fn component_id(&self) -> &str {
        &self.component_id
    }
}
