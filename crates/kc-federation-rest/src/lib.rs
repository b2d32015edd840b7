//! # kc-federation-rest
//!
//! User federation provider backed by a remote REST user directory.
//!
//! The directory is reached over HTTP/JSON:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | authenticate | `POST {base}/authenticate` |
//! | find one | `GET {base}/users/{key}` |
//! | search | `GET {base}/users[?username=q]` |
//! | set attribute | `PATCH {base}/users/{username}` |
//! | create | `POST {base}/users` |
//! | delete | `DELETE {base}/users/{username}` |
//!
//! ## Structure
//!
//! - [`RestProviderFactory`] keeps one [`DirectoryGateway`] per component
//!   and rebuilds it only when the component's settings change.
//! - [`RestUserStorageProvider`] serves one unit of work and owns a
//!   [`UserCache`] of the users it has looked up.
//! - [`RestUserAdapter`] is a fetched user; writes go back through the
//!   gateway.
//!
//! ## Errors
//!
//! Invalid settings surface as configuration errors with a message. Every
//! remote failure reaches the host as the opaque
//! `BACKEND_AUTHENTICATION_ERROR`; detail is only logged.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod adapter;
pub mod cache;
pub mod config;
pub mod error;
pub mod factory;
pub mod gateway;
pub mod pool;
pub mod provider;
pub mod record;

pub use adapter::RestUserAdapter;
pub use cache::UserCache;
pub use config::RestConfig;
pub use error::{RestError, RestResult, TransportError};
pub use factory::{RestProviderFactory, PROVIDER_ID};
pub use gateway::{DirectoryGateway, RawResponse};
pub use pool::{ConnectionPool, PoolStats};
pub use provider::RestUserStorageProvider;
pub use record::DirectoryRecord;
