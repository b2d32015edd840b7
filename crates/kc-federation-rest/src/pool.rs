//! Bounded HTTP connection pool.
//!
//! The underlying `reqwest` client keeps idle keep-alive connections per
//! host. Leases are counted with a semaphore of `max_connections` permits,
//! so at most that many requests are on the wire at once and a caller
//! waits at most `connection_request_timeout` for a slot.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use reqwest::Client;
use serde::Serialize;
use tokio::sync::{Semaphore, SemaphorePermit};

use crate::config::RestConfig;
use crate::error::{RestError, RestResult, TransportError};

/// Snapshot of pool usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Total leases allowed.
    pub max: usize,
    /// Leases allowed per target host.
    pub default_max_per_route: usize,
    /// Leases that can be granted right now.
    pub available: usize,
    /// Leases currently held.
    pub leased: usize,
    /// Callers waiting for a lease.
    pub pending: usize,
}

/// Bounded pool of HTTP connections to one directory.
#[derive(Debug)]
pub struct ConnectionPool {
    client: Client,
    semaphore: Arc<Semaphore>,
    max: usize,
    pending: AtomicUsize,
    acquire_timeout: std::time::Duration,
}

impl ConnectionPool {
    /// Creates a pool from settings.
    ///
    /// ## Errors
    ///
    /// Returns [`RestError::Configuration`] if a limit is zero or the HTTP
    /// client cannot be built.
    pub fn new(config: &RestConfig) -> RestResult<Self> {
        if config.max_connections == 0 {
            return Err(RestError::config("Max pool connections must be positive"));
        }
        let timeouts = [
            ("socket_timeout", config.socket_timeout),
            ("connect_timeout", config.connect_timeout),
            ("connection_request_timeout", config.connection_request_timeout),
        ];
        if let Some((name, _)) = timeouts.iter().find(|(_, t)| t.is_zero()) {
            return Err(RestError::config(format!("{name} must be positive")));
        }

        let max = config.max_connections as usize;
        tracing::info!(
            max_connections = max,
            connection_request_timeout = ?config.connection_request_timeout,
            connect_timeout = ?config.connect_timeout,
            socket_timeout = ?config.socket_timeout,
            "Initializing HTTP pool"
        );

        let client = Client::builder()
            .pool_max_idle_per_host(max)
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.socket_timeout)
            .build()
            .map_err(|e| RestError::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            semaphore: Arc::new(Semaphore::new(max)),
            max,
            pending: AtomicUsize::new(0),
            acquire_timeout: config.connection_request_timeout,
        })
    }

    /// Leases a connection slot.
    ///
    /// The slot is returned when the [`PooledConnection`] is dropped, on
    /// every exit path.
    pub(crate) async fn get(&self) -> Result<PooledConnection<'_>, TransportError> {
        let _waiting = PendingGuard::enter(&self.pending);

        let permit = tokio::time::timeout(self.acquire_timeout, self.semaphore.acquire())
            .await
            .map_err(|_| TransportError::PoolTimeout(self.acquire_timeout))?
            .map_err(|_| TransportError::PoolClosed)?;

        Ok(PooledConnection {
            client: &self.client,
            _permit: permit,
        })
    }

    /// Returns current usage.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let available = self.semaphore.available_permits();
        PoolStats {
            max: self.max,
            default_max_per_route: self.max,
            available,
            leased: self.max.saturating_sub(available),
            pending: self.pending.load(Ordering::Acquire),
        }
    }
}

/// A leased slot in the pool.
pub(crate) struct PooledConnection<'a> {
    client: &'a Client,
    _permit: SemaphorePermit<'a>,
}

impl PooledConnection<'_> {
    /// Returns the HTTP client to issue the request with.
    pub(crate) const fn client(&self) -> &Client {
        self.client
    }
}

/// Counts a caller as pending until dropped.
struct PendingGuard<'a>(&'a AtomicUsize);

impl<'a> PendingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(counter)
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}
