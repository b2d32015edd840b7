//! REST directory connection settings.
//!
//! Settings arrive from the host as a flat string map. Parsing is all or
//! nothing: a value that is present but invalid rejects the whole map, and
//! only absent numeric options fall back to their defaults.

use std::collections::HashMap;
use std::time::Duration;

use kc_federation::ConfigProperty;
use tokio::net::TcpStream;
use url::{Host, Url};

use crate::error::{RestError, RestResult};

/// Base URL of the directory.
pub const PROPERTY_BASE_URL: &str = "baseURL";
/// Maximum pooled HTTP connections.
pub const PROPERTY_MAX_HTTP_CONNECTIONS: &str = "maxHttpConnections";
/// Milliseconds to wait for response data.
pub const API_SOCKET_TIMEOUT: &str = "apiSocketTimeout";
/// Milliseconds to wait for connection establishment.
pub const API_CONNECT_TIMEOUT: &str = "apiConnectTimeout";
/// Milliseconds to wait for a free pooled connection.
pub const API_CONNECTION_REQUEST_TIMEOUT: &str = "apiConnectionRequestTimeout";

const DEFAULT_BASE_URL: &str = "http://rest-users-api:8081/";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_TIMEOUT_MS: u64 = 1000;

/// Validated settings for one REST directory.
///
/// Equality is by value; two components configured identically produce
/// equal settings and may share a gateway.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RestConfig {
    /// Absolute base URL without trailing slash.
    pub base_url: String,

    /// Pool size, total and per host.
    pub max_connections: u32,

    /// Limit on waiting for response data.
    pub socket_timeout: Duration,

    /// Limit on establishing a connection.
    pub connect_timeout: Duration,

    /// Limit on waiting for a free pooled connection.
    pub connection_request_timeout: Duration,
}

impl RestConfig {
    /// Parses and validates settings without touching the network.
    ///
    /// ## Errors
    ///
    /// Returns [`RestError::Configuration`] if the base URL is missing or not
    /// an absolute http(s) URL, if the pool size is not a positive integer,
    /// or if a timeout is not an integer.
    pub fn from_properties(props: &HashMap<String, String>) -> RestResult<Self> {
        let raw_url = props
            .get(PROPERTY_BASE_URL)
            .ok_or_else(|| RestError::config("BaseURL is not specified"))?;
        let base_url = normalize_base_url(raw_url)?;
        tracing::info!(base_url = %base_url, "Loaded baseURL from component properties");

        let max_connections = parse_max_connections(props.get(PROPERTY_MAX_HTTP_CONNECTIONS))?;
        let socket_timeout = parse_timeout(props, API_SOCKET_TIMEOUT)?;
        let connect_timeout = parse_timeout(props, API_CONNECT_TIMEOUT)?;
        let connection_request_timeout = parse_timeout(props, API_CONNECTION_REQUEST_TIMEOUT)?;

        Ok(Self {
            base_url,
            max_connections,
            socket_timeout,
            connect_timeout,
            connection_request_timeout,
        })
    }

    /// Parses settings and probes the base URL.
    ///
    /// The probe opens a TCP connection to the directory host and closes it
    /// immediately.
    ///
    /// ## Errors
    ///
    /// Everything [`Self::from_properties`] rejects, plus an unreachable
    /// base URL.
    pub async fn load(props: &HashMap<String, String>) -> RestResult<Self> {
        let config = Self::from_properties(props)?;
        config.probe().await?;
        Ok(config)
    }

    /// Opens and closes one connection to the base URL.
    ///
    /// ## Errors
    ///
    /// Returns [`RestError::Configuration`] when no connection can be made
    /// within the connect timeout.
    pub async fn probe(&self) -> RestResult<()> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| RestError::config(format!("Invalid base url: {e}")))?;
        let host = url
            .host()
            .ok_or_else(|| RestError::config("Base url has no host"))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| RestError::config("Base url has no port"))?;

        // IP literals are connected to directly; `host_str` keeps IPv6 brackets.
        let connect = async {
            match &host {
                Host::Domain(domain) => TcpStream::connect((*domain, port)).await,
                Host::Ipv4(addr) => TcpStream::connect((*addr, port)).await,
                Host::Ipv6(addr) => TcpStream::connect((*addr, port)).await,
            }
        };
        match tokio::time::timeout(self.connect_timeout, connect).await {
            Ok(Ok(stream)) => {
                drop(stream);
                tracing::debug!(host = %host, port, "Base url probe succeeded");
                Ok(())
            }
            Ok(Err(e)) => {
                tracing::warn!(host = %host, port, error = %e, "Base url probe failed");
                Err(RestError::config("Error accessing the base url"))
            }
            Err(_) => {
                tracing::warn!(host = %host, port, "Base url probe timed out");
                Err(RestError::config("Error accessing the base url"))
            }
        }
    }

    /// Configuration options presented to the host.
    #[must_use]
    pub fn properties() -> Vec<ConfigProperty> {
        vec![
            ConfigProperty::string(
                PROPERTY_BASE_URL,
                "Base URL",
                "Api url base to authenticate users",
            )
            .with_default(DEFAULT_BASE_URL),
            ConfigProperty::string(
                PROPERTY_MAX_HTTP_CONNECTIONS,
                "Max pool connections",
                "Max http connections in pool",
            )
            .with_default("5"),
            ConfigProperty::string(
                API_SOCKET_TIMEOUT,
                "API Socket Timeout",
                "Max time [milliseconds] to wait for response",
            )
            .with_default("1000"),
            ConfigProperty::string(
                API_CONNECT_TIMEOUT,
                "API Connect Timeout",
                "Max time [milliseconds] to establish the connection",
            )
            .with_default("1000"),
            ConfigProperty::string(
                API_CONNECTION_REQUEST_TIMEOUT,
                "API Connection Request Timeout",
                "Max time [milliseconds] to wait until a connection in the pool is assigned to the requesting thread",
            )
            .with_default("1000"),
        ]
    }
}

/// Validates an absolute http(s) URL and strips one trailing slash.
fn normalize_base_url(raw: &str) -> RestResult<String> {
    let parsed = Url::parse(raw).map_err(|e| RestError::config(format!("Invalid base url: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(RestError::config("Base url must be an absolute http(s) url"));
    }

    match raw.strip_suffix('/') {
        Some(stripped) => {
            tracing::info!(base_url = %stripped, "Removing trailing slash from URL");
            Ok(stripped.to_string())
        }
        None => Ok(raw.to_string()),
    }
}

fn parse_max_connections(value: Option<&String>) -> RestResult<u32> {
    let Some(value) = value else {
        return Ok(DEFAULT_MAX_CONNECTIONS);
    };

    let parsed = if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
        value.parse::<u32>().ok().filter(|n| *n > 0)
    } else {
        None
    };

    parsed.ok_or_else(|| {
        tracing::warn!(value = %value, "maxHttpConnections property is not valid");
        RestError::config("Max pool connections should be a number")
    })
}

/// Parses a timeout in milliseconds. Zero and negative values are rejected.
fn parse_timeout(props: &HashMap<String, String>, key: &str) -> RestResult<Duration> {
    let Some(value) = props.get(key) else {
        return Ok(Duration::from_millis(DEFAULT_TIMEOUT_MS));
    };

    match value.trim().parse::<i64>() {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms.unsigned_abs())),
        Ok(_) => {
            tracing::warn!(key = %key, value = %value, "Timeout must be positive");
            Err(RestError::config(format!("{key} should be a positive number of milliseconds")))
        }
        Err(_) => Err(RestError::config(format!("{key} should be a number of milliseconds"))),
    }
}
