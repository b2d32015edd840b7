//! REST directory gateway.
//!
//! Translates directory operations into HTTP calls over the pool.
//!
//! Two kinds of outcome are kept apart:
//!
//! - Lookups (`authenticate`, `find_user_by_username`) read any non-success
//!   status as a negative answer. A miss is a normal result.
//! - Every other operation requires a success status and fails with
//!   [`RestError::Backend`] otherwise.
//!
//! Transport faults (pool, connect or socket timeout, I/O, unreadable body)
//! are logged with full detail and surface as the opaque
//! [`RestError::BackendAuthentication`]. Nothing is retried.

use reqwest::header::{ACCEPT, CONNECTION, CONTENT_TYPE};
use reqwest::Method;
use serde_json::{json, Value};
use url::Url;

use crate::config::RestConfig;
use crate::error::{RestError, RestResult, TransportError};
use crate::pool::{ConnectionPool, PoolStats};
use crate::record::{DirectoryRecord, USERNAME};

const APPLICATION_JSON: &str = "application/json";
const KEEP_ALIVE: &str = "keep-alive";

/// Status and body of one HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Body text.
    pub body: String,
}

impl RawResponse {
    /// Checks if the status is in the 2xx class.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Client for one REST user directory.
///
/// Shared by every provider built from the same settings.
#[derive(Debug)]
pub struct DirectoryGateway {
    config: RestConfig,
    base: Url,
    pool: ConnectionPool,
}

impl DirectoryGateway {
    /// Creates a gateway and its connection pool.
    ///
    /// ## Errors
    ///
    /// Returns [`RestError::Configuration`] if the base URL cannot carry
    /// paths or the HTTP client cannot be built.
    pub fn new(config: RestConfig) -> RestResult<Self> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| RestError::config(format!("Invalid base url: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(RestError::config("Base url cannot carry paths"));
        }
        let pool = ConnectionPool::new(&config)?;

        Ok(Self { config, base, pool })
    }

    /// Returns the settings this gateway was built from.
    #[must_use]
    pub const fn config(&self) -> &RestConfig {
        &self.config
    }

    /// Checks a username and password against the directory.
    ///
    /// Returns false for any non-success status.
    ///
    /// ## Errors
    ///
    /// Returns [`RestError::BackendAuthentication`] on transport failure.
    pub async fn authenticate(&self, username: &str, password: &str) -> RestResult<bool> {
        tracing::info!(username = %username, "Authenticating user");
        let url = self.url(&["authenticate"], None);
        let body = json!({ "username": username, "password": password });

        let response = self.execute(Method::POST, url, Some(body)).await?;
        Ok(response.is_success())
    }

    /// Fetches one user by username, email or id.
    ///
    /// Any non-success status, including a server error, reads as not found.
    ///
    /// ## Errors
    ///
    /// Returns [`RestError::BackendAuthentication`] on transport failure or
    /// when a success body is not a JSON object.
    pub async fn find_user_by_username(&self, username: &str) -> RestResult<Option<DirectoryRecord>> {
        tracing::info!(username = %username, "Finding user by username");
        let url = self.url(&["users", username], None);

        let response = self.execute(Method::GET, url, None).await?;
        if !response.is_success() {
            tracing::debug!(username = %username, status = response.status, "User not found in directory");
            return Ok(None);
        }
        Ok(Some(parse(&response.body)?))
    }

    /// Searches users by username filter.
    ///
    /// Without a filter the whole collection is requested.
    ///
    /// ## Errors
    ///
    /// Returns [`RestError::Backend`] on a non-success status and
    /// [`RestError::BackendAuthentication`] on transport failure or when the
    /// body is not a JSON array of objects.
    pub async fn find_users(&self, filter: Option<&str>) -> RestResult<Vec<DirectoryRecord>> {
        tracing::info!(filter = ?filter, "Finding users");
        let url = self.url(&["users"], filter.map(|f| (USERNAME, f)));
        tracing::debug!(url = %url, "Using url to search users");

        let response = stop_on_error(self.execute(Method::GET, url, None).await?)?;
        Ok(parse(&response.body)?)
    }

    /// Sets one attribute of a user.
    ///
    /// ## Errors
    ///
    /// Returns [`RestError::Backend`] on a non-success status and
    /// [`RestError::BackendAuthentication`] on transport failure.
    pub async fn set_user_attribute(&self, username: &str, attribute: &str, value: &str) -> RestResult<()> {
        // The value may be a credential; only the name is logged.
        tracing::info!(username = %username, attribute = %attribute, "Setting user attribute");
        let url = self.url(&["users", username], None);
        let mut body = serde_json::Map::new();
        body.insert(attribute.to_string(), Value::String(value.to_string()));

        stop_on_error(self.execute(Method::PATCH, url, Some(Value::Object(body))).await?)?;
        Ok(())
    }

    /// Creates a user.
    ///
    /// Returns the record the directory answered with, or a record holding
    /// only the username when the answer carries no JSON object.
    ///
    /// ## Errors
    ///
    /// Returns [`RestError::Backend`] on a non-success status and
    /// [`RestError::BackendAuthentication`] on transport failure.
    pub async fn create_user(&self, username: &str) -> RestResult<DirectoryRecord> {
        tracing::info!(username = %username, "Creating user");
        let url = self.url(&["users"], None);
        let body = json!({ "username": username });

        let response = stop_on_error(self.execute(Method::POST, url, Some(body)).await?)?;
        let created = serde_json::from_str::<Value>(&response.body)
            .ok()
            .and_then(DirectoryRecord::from_value);
        Ok(created.unwrap_or_else(|| {
            tracing::debug!(username = %username, "Create answer has no record, using username only");
            DirectoryRecord::for_username(username)
        }))
    }

    /// Deletes a user.
    ///
    /// ## Errors
    ///
    /// Returns [`RestError::Backend`] on a non-success status and
    /// [`RestError::BackendAuthentication`] on transport failure.
    pub async fn delete_user(&self, username: &str) -> RestResult<()> {
        tracing::info!(username = %username, "Deleting user");
        let url = self.url(&["users", username], None);

        stop_on_error(self.execute(Method::DELETE, url, None).await?)?;
        Ok(())
    }

    /// Returns connection pool usage.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.pool.stats()
    }

    /// Builds `{base}/{segments...}[?name=value]` with each part encoded.
    fn url(&self, segments: &[&str], query: Option<(&str, &str)>) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if let Some((name, value)) = query {
            url.query_pairs_mut().append_pair(name, value);
        }
        url
    }

    /// Executes one request on a leased connection.
    async fn execute(&self, method: Method, url: Url, body: Option<Value>) -> RestResult<RawResponse> {
        tracing::debug!(method = %method, url = %url, "Executing HTTP request");
        Ok(self.send(method, url, body).await?)
    }

    async fn send(&self, method: Method, url: Url, body: Option<Value>) -> Result<RawResponse, TransportError> {
        let conn = self.pool.get().await?;

        let mut request = conn
            .client()
            .request(method, url)
            .header(ACCEPT, APPLICATION_JSON)
            .header(CONTENT_TYPE, APPLICATION_JSON)
            .header(CONNECTION, KEEP_ALIVE);
        if let Some(body) = body {
            request = request.body(body.to_string());
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        tracing::debug!(status, body = %body, "Response obtained from server");

        Ok(RawResponse { status, body })
    }
}

fn stop_on_error(response: RawResponse) -> RestResult<RawResponse> {
    if response.is_success() {
        return Ok(response);
    }
    tracing::error!(
        status = response.status,
        body = %response.body,
        "Response status code was not success"
    );
    Err(RestError::backend(response.status))
}

fn parse<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, TransportError> {
    Ok(serde_json::from_str(body)?)
}
