//! Shared fixtures for REST directory tests.

#![allow(dead_code)]

use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use kc_federation::ComponentModel;
use kc_federation_rest::config::{
    API_CONNECTION_REQUEST_TIMEOUT, API_SOCKET_TIMEOUT, PROPERTY_BASE_URL,
    PROPERTY_MAX_HTTP_CONNECTIONS,
};
use kc_federation_rest::{DirectoryGateway, RestConfig, RestUserStorageProvider, PROVIDER_ID};
use wiremock::MockServer;

/// Component id used by every fixture.
pub const COMPONENT_ID: &str = "rest-1";

/// Installs a test subscriber once per binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("kc_federation_rest=debug")
        .with_test_writer()
        .try_init();
}

/// Settings pointing at the mock server.
pub fn config(server: &MockServer) -> RestConfig {
    RestConfig {
        base_url: server.uri(),
        max_connections: 5,
        socket_timeout: Duration::from_millis(1000),
        connect_timeout: Duration::from_millis(1000),
        connection_request_timeout: Duration::from_millis(1000),
    }
}

/// Gateway over [`config`].
pub fn gateway(server: &MockServer) -> Arc<DirectoryGateway> {
    gateway_with(config(server))
}

/// Gateway over custom settings.
pub fn gateway_with(config: RestConfig) -> Arc<DirectoryGateway> {
    Arc::new(DirectoryGateway::new(config).unwrap())
}

/// Provider for one unit of work.
pub fn provider(server: &MockServer) -> RestUserStorageProvider {
    RestUserStorageProvider::new(COMPONENT_ID, gateway(server))
}

/// Component model the host would hand the factory.
pub fn component(server: &MockServer, max_connections: &str) -> ComponentModel {
    ComponentModel::builder()
        .id(COMPONENT_ID)
        .provider_id(PROVIDER_ID)
        .config(PROPERTY_BASE_URL, format!("{}/", server.uri()))
        .config(PROPERTY_MAX_HTTP_CONNECTIONS, max_connections)
        .config(API_SOCKET_TIMEOUT, "1000")
        .config(API_CONNECTION_REQUEST_TIMEOUT, "1000")
        .build()
}

/// A listener that never accepts, with its backlog filled so new
/// connection attempts hang until the client gives up.
pub struct Unresponsive {
    /// Address that stalls connects.
    pub addr: SocketAddr,
    _listener: TcpListener,
    _queued: Vec<TcpStream>,
}

impl Unresponsive {
    /// Base URL pointing at the stalled address.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

/// Fills a listener's backlog. Returns `None` if the host's TCP stack
/// keeps completing handshakes regardless.
pub fn unresponsive() -> Option<Unresponsive> {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let mut queued = Vec::new();

    for _ in 0..4096 {
        match TcpStream::connect_timeout(&addr, Duration::from_millis(200)) {
            Ok(stream) => queued.push(stream),
            Err(e) if e.kind() == ErrorKind::TimedOut => {
                return Some(Unresponsive {
                    addr,
                    _listener: listener,
                    _queued: queued,
                })
            }
            Err(_) => return None,
        }
    }
    None
}
