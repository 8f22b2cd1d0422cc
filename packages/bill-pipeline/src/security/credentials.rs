//! Delegate credentials held in secure memory.
//!
//! Uses the `secrecy` crate so the API key never reaches logs, debug output,
//! or serialized run records.

use secrecy::{ExposeSecret, SecretBox};
use std::fmt;

/// A secret string that won't be logged or displayed.
pub struct SecretString(SecretBox<str>);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretBox::new(value.into().into_boxed_str()))
    }

    /// Expose the secret value.
    ///
    /// Only call this at the point of use (request headers).
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// True when the secret is empty or whitespace.
    pub fn is_blank(&self) -> bool {
        self.expose().trim().is_empty()
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self::new(self.expose())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Everything a delegate needs to authenticate with its provider.
#[derive(Clone)]
pub struct DelegateCredentials {
    /// API key (secret)
    pub api_key: SecretString,

    /// Override for the provider endpoint (proxies, test servers)
    pub base_url: Option<String>,
}

impl DelegateCredentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key),
            base_url: None,
        }
    }

    /// Point the delegate at a different endpoint.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }
}

impl fmt::Debug for DelegateCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelegateCredentials")
            .field("api_key", &self.api_key)
            .field("base_url", &self.base_url)
            .finish()
    }
}
