//! # kc-federation
//!
//! User federation framework for Keycloak Rust.
//!
//! This crate provides the traits a user federation provider implements,
//! the component configuration model, and the error type the host sees.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod config;
pub mod credential;
pub mod error;
pub mod provider;
pub mod storage_id;

pub use config::{ComponentModel, ConfigProperty, PropertyType};
pub use credential::{CredentialInput, PASSWORD};
pub use error::{FederationError, FederationResult, BACKEND_AUTHENTICATION_ERROR};
pub use provider::{
    CredentialValidator, UserLookupProvider, UserQueryProvider, UserRegistrationProvider,
    UserStorageProvider, UserStorageProviderFactory, SEARCH_PARAM,
};
pub use storage_id::StorageId;
