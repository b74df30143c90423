use serde::Deserialize;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Secret key cannot be empty")]
    EmptySecretKey,

    #[error("Public host cannot be empty")]
    EmptyPublicHost,
}

/// Edge API configuration.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Listener for incoming requests
    pub listener: Listener,
    /// Shared secret guarding the write-protected routes
    pub secret_key: String,
    /// Public hostname this deployment is served under; anchors the canonical
    /// cache URL so the write path knows what to evict
    pub public_host: String,
    /// Origin allowed to read the download endpoint cross-site
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,
    /// Key-value backend holding the version registry
    pub kv: KvConfig,
    /// Purge API for dropping cached responses across all edge nodes
    pub purge: Option<PurgeConfig>,
}

fn default_allowed_origin() -> String {
    "https://framed-app.com".to_string()
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;

        if self.secret_key.is_empty() {
            return Err(ValidationError::EmptySecretKey);
        }

        if self.public_host.is_empty() {
            return Err(ValidationError::EmptyPublicHost);
        }

        Ok(())
    }
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    /// Host address to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

impl Listener {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

/// Key-value backend selection
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KvConfig {
    /// In-process map; single-node deployments and tests only
    Memory,
    /// Remote key-value service reached over REST
    ///
    /// Note: Uses the `url::Url` type so invalid URLs are rejected during
    /// config deserialization.
    Rest { url: Url, token: String },
}

/// Purge API credentials
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct PurgeConfig {
    pub endpoint: Url,
    pub token: String,
}
