//! Directory user records.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field holding the unique username.
pub const USERNAME: &str = "username";
const EMAIL: &str = "email";
const FIRST_NAME: &str = "firstName";
const LAST_NAME: &str = "lastName";
const ENABLED: &str = "enabled";
const EMAIL_VERIFIED: &str = "emailVerified";

/// A snapshot of one user as returned by the directory.
///
/// The document is opaque apart from a handful of well-known fields.
/// Nothing here is written back; changes go through explicit patch calls.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DirectoryRecord(Map<String, Value>);

impl DirectoryRecord {
    /// Wraps a JSON object.
    #[must_use]
    pub const fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Builds the minimal record for a username.
    #[must_use]
    pub fn for_username(username: &str) -> Self {
        let mut fields = Map::new();
        fields.insert(USERNAME.to_string(), Value::String(username.to_string()));
        Self(fields)
    }

    /// Converts a JSON value, if it is an object.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    /// Gets a raw field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Gets a field rendered as a string.
    ///
    /// Numbers and booleans are rendered; nulls, arrays and objects are not.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<String> {
        self.0.get(name).and_then(scalar_to_string)
    }

    /// Returns the username, or an empty string if the directory omitted it.
    #[must_use]
    pub fn username(&self) -> &str {
        self.0.get(USERNAME).and_then(Value::as_str).unwrap_or_default()
    }

    /// Fills in the username when the directory left it out.
    ///
    /// Returns true if the fallback was applied.
    pub fn ensure_username(&mut self, fallback: &str) -> bool {
        if !self.username().is_empty() {
            return false;
        }
        self.0
            .insert(USERNAME.to_string(), Value::String(fallback.to_string()));
        true
    }

    /// Returns the email address.
    #[must_use]
    pub fn email(&self) -> Option<String> {
        self.get_str(EMAIL)
    }

    /// Returns the first name.
    #[must_use]
    pub fn first_name(&self) -> Option<String> {
        self.get_str(FIRST_NAME)
    }

    /// Returns the last name.
    #[must_use]
    pub fn last_name(&self) -> Option<String> {
        self.get_str(LAST_NAME)
    }

    /// Returns whether the account is enabled. Defaults to true.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.0.get(ENABLED).and_then(Value::as_bool).unwrap_or(true)
    }

    /// Returns whether the email is verified. Defaults to false.
    #[must_use]
    pub fn email_verified(&self) -> bool {
        self.0
            .get(EMAIL_VERIFIED)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Returns all scalar fields as single-valued attributes.
    ///
    /// Array fields of scalars become multi-valued attributes.
    #[must_use]
    pub fn attributes(&self) -> HashMap<String, Vec<String>> {
        self.0
            .iter()
            .filter_map(|(name, value)| {
                let values: Vec<String> = match value {
                    Value::Array(items) => items.iter().filter_map(scalar_to_string).collect(),
                    other => scalar_to_string(other).into_iter().collect(),
                };
                (!values.is_empty()).then(|| (name.clone(), values))
            })
            .collect()
    }

    /// Returns the underlying document.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
