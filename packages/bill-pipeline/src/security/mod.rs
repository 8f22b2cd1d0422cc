//! Credential handling.

pub mod credentials;

pub use credentials::{DelegateCredentials, SecretString};
