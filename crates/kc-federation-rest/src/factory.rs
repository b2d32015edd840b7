//! Factory for REST directory providers.
//!
//! The factory outlives every unit of work. It keeps one gateway (and so
//! one connection pool) per component and rebuilds it only when that
//! component's settings change by value. A replaced gateway is dropped
//! from the table; providers still holding it finish their calls on it.

use std::collections::HashMap;
use std::sync::Arc;

use kc_federation::{ComponentModel, ConfigProperty, FederationResult, UserStorageProviderFactory};
use tokio::sync::RwLock;

use crate::config::RestConfig;
use crate::error::RestResult;
use crate::gateway::DirectoryGateway;
use crate::provider::RestUserStorageProvider;

/// Factory identifier.
pub const PROVIDER_ID: &str = "rest-repo-provider";

/// Creates [`RestUserStorageProvider`]s and owns their shared gateways.
#[derive(Debug, Default)]
pub struct RestProviderFactory {
    gateways: RwLock<HashMap<String, Arc<DirectoryGateway>>>,
}

impl RestProviderFactory {
    /// Creates a factory with no gateways.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the gateway for a component, building it if needed.
    ///
    /// ## Errors
    ///
    /// Returns a configuration error if the settings are invalid or, when a
    /// new gateway has to be built, the base URL is unreachable.
    pub async fn gateway(&self, model: &ComponentModel) -> RestResult<Arc<DirectoryGateway>> {
        let config = RestConfig::from_properties(&model.config)?;

        if let Some(gateway) = self.cached(&model.id, &config).await {
            tracing::debug!(component_id = %model.id, "Gateway already instantiated");
            return Ok(gateway);
        }

        // Probing may take up to the connect timeout; no lock is held meanwhile.
        tracing::info!(component_id = %model.id, base_url = %config.base_url, "Creating a new gateway instance");
        config.probe().await?;
        let built = Arc::new(DirectoryGateway::new(config)?);

        let mut gateways = self.gateways.write().await;
        if let Some(existing) = gateways.get(&model.id) {
            if existing.config() == built.config() {
                tracing::debug!(component_id = %model.id, "Gateway built concurrently, keeping the first one");
                return Ok(Arc::clone(existing));
            }
        }
        gateways.insert(model.id.clone(), Arc::clone(&built));
        Ok(built)
    }

    async fn cached(&self, component_id: &str, config: &RestConfig) -> Option<Arc<DirectoryGateway>> {
        self.gateways
            .read()
            .await
            .get(component_id)
            .filter(|gateway| gateway.config() == config)
            .map(Arc::clone)
    }

    /// Forgets the gateway of a removed component.
    pub async fn remove_component(&self, component_id: &str) -> bool {
        self.gateways.write().await.remove(component_id).is_some()
    }

    /// Number of gateways currently held.
    pub async fn gateway_count(&self) -> usize {
        self.gateways.read().await.len()
    }
}

impl UserStorageProviderFactory for RestProviderFactory {
    type Provider = RestUserStorageProvider;

    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn config_properties(&self) -> Vec<ConfigProperty> {
        RestConfig::properties()
    }

    async fn validate_configuration(&self, model: &ComponentModel) -> FederationResult<()> {
        RestConfig::load(&model.config).await?;
        Ok(())
    }

    async fn create(&self, model: &ComponentModel) -> FederationResult<Self::Provider> {
        let gateway = self.gateway(model).await?;
        tracing::debug!(stats = ?gateway.stats(), "Connection pool stats");
        Ok(RestUserStorageProvider::new(model.id.clone(), gateway))
    }
}
