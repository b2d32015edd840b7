//! Federation component configuration.
//!
//! A component is one configured instance of a provider inside a realm.
//! Its settings arrive from the host as a flat string map.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Configuration of one federation component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentModel {
    /// Component identifier, stable across configuration edits.
    pub id: String,

    /// Realm this component belongs to.
    pub realm_id: Uuid,

    /// Factory identifier (e.g., "rest-repo-provider").
    pub provider_id: String,

    /// Display name.
    pub name: String,

    /// Provider-specific configuration.
    pub config: HashMap<String, String>,
}

impl ComponentModel {
    /// Creates a new component builder.
    #[must_use]
    pub fn builder() -> ComponentModelBuilder {
        ComponentModelBuilder::default()
    }

    /// Gets a config value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.config.get(key).map(String::as_str)
    }
}

/// Builder for [`ComponentModel`].
#[derive(Debug, Default)]
pub struct ComponentModelBuilder {
    id: Option<String>,
    realm_id: Option<Uuid>,
    provider_id: Option<String>,
    name: Option<String>,
    config: HashMap<String, String>,
}

impl ComponentModelBuilder {
    /// Sets the component ID.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the realm ID.
    #[must_use]
    pub const fn realm_id(mut self, realm_id: Uuid) -> Self {
        self.realm_id = Some(realm_id);
        self
    }

    /// Sets the factory identifier.
    #[must_use]
    pub fn provider_id(mut self, provider_id: impl Into<String>) -> Self {
        self.provider_id = Some(provider_id.into());
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Adds a config value.
    #[must_use]
    pub fn config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// Builds the component.
    ///
    /// Unset identifiers are generated; an unset name falls back to the
    /// provider id.
    #[must_use]
    pub fn build(self) -> ComponentModel {
        let provider_id = self.provider_id.unwrap_or_default();
        ComponentModel {
            id: self.id.unwrap_or_else(|| Uuid::now_v7().to_string()),
            realm_id: self.realm_id.unwrap_or_else(Uuid::now_v7),
            name: self.name.unwrap_or_else(|| provider_id.clone()),
            provider_id,
            config: self.config,
        }
    }
}

/// Rendering type of a configuration property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyType {
    /// Free text.
    #[default]
    String,
    /// Masked text.
    Password,
    /// One of a fixed list.
    List,
}

/// Metadata describing one configuration option a factory accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigProperty {
    /// Key in the component config map.
    pub name: &'static str,
    /// Short label.
    pub label: &'static str,
    /// Longer explanation.
    pub help_text: &'static str,
    /// Rendering type.
    pub property_type: PropertyType,
    /// Value used when the option is not set.
    pub default_value: Option<&'static str>,
}

impl ConfigProperty {
    /// Creates a string property.
    #[must_use]
    pub const fn string(name: &'static str, label: &'static str, help_text: &'static str) -> Self {
        Self {
            name,
            label,
            help_text,
            property_type: PropertyType::String,
            default_value: None,
        }
    }

    /// Sets the default value.
    #[must_use]
    pub const fn with_default(mut self, value: &'static str) -> Self {
        self.default_value = Some(value);
        self
    }
}
