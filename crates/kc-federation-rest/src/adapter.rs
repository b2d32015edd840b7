//! User handle bound to the directory gateway.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use kc_federation::{StorageId, PASSWORD};
use rand::distr::{Alphanumeric, SampleString};
use uuid::Uuid;

use crate::error::RestResult;
use crate::gateway::DirectoryGateway;
use crate::record::DirectoryRecord;

/// Length of the random password written by [`RestUserAdapter::disable`].
///
/// 64 alphanumeric characters carry about 381 bits of entropy.
const LOCKOUT_SECRET_LEN: usize = 64;

/// A directory user as seen by the host.
///
/// Reads come from the snapshot taken at fetch time. Writes are forwarded
/// to the directory as patch calls and are not reflected in the snapshot.
/// An adapter belongs to the unit of work that fetched it.
#[derive(Clone)]
pub struct RestUserAdapter {
    record: DirectoryRecord,
    gateway: Arc<DirectoryGateway>,
    realm_id: Uuid,
    storage_id: StorageId,
}

impl RestUserAdapter {
    /// Binds a record to the gateway that serves it.
    #[must_use]
    pub fn new(
        record: DirectoryRecord,
        gateway: Arc<DirectoryGateway>,
        realm_id: Uuid,
        component_id: &str,
    ) -> Self {
        if record.username().is_empty() {
            tracing::warn!(component_id = %component_id, "Directory record has no username");
        }
        let storage_id = StorageId::federated(component_id, record.username());
        Self {
            record,
            gateway,
            realm_id,
            storage_id,
        }
    }

    /// Host-side id, `f:<component-id>:<username>`.
    #[must_use]
    pub fn id(&self) -> String {
        self.storage_id.to_string()
    }

    /// Returns the storage id.
    #[must_use]
    pub const fn storage_id(&self) -> &StorageId {
        &self.storage_id
    }

    /// Realm the user was fetched for.
    #[must_use]
    pub const fn realm_id(&self) -> Uuid {
        self.realm_id
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        self.record.username()
    }

    /// Returns the email address.
    #[must_use]
    pub fn email(&self) -> Option<String> {
        self.record.email()
    }

    /// Returns the first name.
    #[must_use]
    pub fn first_name(&self) -> Option<String> {
        self.record.first_name()
    }

    /// Returns the last name.
    #[must_use]
    pub fn last_name(&self) -> Option<String> {
        self.record.last_name()
    }

    /// Returns whether the account is enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.record.enabled()
    }

    /// Returns whether the email is verified.
    #[must_use]
    pub fn is_email_verified(&self) -> bool {
        self.record.email_verified()
    }

    /// Returns the first value of an attribute.
    #[must_use]
    pub fn first_attribute(&self, name: &str) -> Option<String> {
        self.record.get_str(name)
    }

    /// Returns all attributes.
    #[must_use]
    pub fn attributes(&self) -> HashMap<String, Vec<String>> {
        self.record.attributes()
    }

    /// Returns the underlying record.
    #[must_use]
    pub const fn record(&self) -> &DirectoryRecord {
        &self.record
    }

    /// Sets one attribute in the directory.
    ///
    /// ## Errors
    ///
    /// Returns a backend error if the directory rejects the patch or cannot
    /// be reached.
    pub async fn set_attribute(&self, name: &str, value: &str) -> RestResult<()> {
        self.gateway
            .set_user_attribute(self.username(), name, value)
            .await
    }

    /// Sets the user's password in the directory.
    ///
    /// ## Errors
    ///
    /// See [`Self::set_attribute`].
    pub async fn set_password(&self, value: &str) -> RestResult<()> {
        self.set_attribute(PASSWORD, value).await
    }

    /// Locks the user out of password login without deleting the account.
    ///
    /// Overwrites the password with a random value nobody knows.
    ///
    /// ## Errors
    ///
    /// See [`Self::set_attribute`].
    pub async fn disable(&self) -> RestResult<()> {
        tracing::info!(username = %self.username(), "Disabling password login");
        self.set_password(&lockout_secret()).await
    }
}

impl fmt::Debug for RestUserAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestUserAdapter")
            .field("id", &self.storage_id)
            .field("realm_id", &self.realm_id)
            .field("record", &self.record)
            .finish_non_exhaustive()
    }
}

/// Generates an unguessable password from the thread-local CSPRNG.
fn lockout_secret() -> String {
    Alphanumeric.sample_string(&mut rand::rng(), LOCKOUT_SECRET_LEN)
}
