//! Key-value backends for the version registry.
//!
//! The registry lives in an external, eventually-consistent key-value
//! service. The trait keeps the store pluggable: production deployments talk
//! to the service over its REST surface, tests and single-node setups use the
//! in-process map.

use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::HashMap;
use tokio::sync::Mutex;
use url::Url;

#[derive(thiserror::Error, Debug)]
pub enum KvError {
    #[error("kv request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("kv store returned unexpected status: {0}")]
    UnexpectedStatus(StatusCode),

    #[error("invalid kv url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read a key. `None` means the key has never been written; transport
    /// failures are surfaced as errors and never conflated with absence.
    async fn get(&self, key: &str) -> Result<Option<String>, KvError>;

    async fn put(&self, key: &str, value: &str) -> Result<(), KvError>;
}

/// In-process store for tests and single-node deployments.
#[derive(Default)]
pub struct MemoryKv {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), KvError> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Client for a remote key-value service exposing `GET`/`PUT
/// {base}/values/{key}` with bearer-token auth.
pub struct RestKv {
    client: reqwest::Client,
    base_url: Url,
    token: String,
}

impl RestKv {
    pub fn new(base_url: Url, token: String) -> Self {
        RestKv {
            client: reqwest::Client::new(),
            base_url,
            token,
        }
    }

    fn value_url(&self, key: &str) -> Result<Url, KvError> {
        Ok(self.base_url.join(&format!("values/{key}"))?)
    }
}

#[async_trait]
impl KvStore for RestKv {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let response = self
            .client
            .get(self.value_url(key)?)
            .bearer_auth(&self.token)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.text().await?)),
            status => Err(KvError::UnexpectedStatus(status)),
        }
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), KvError> {
        let response = self
            .client
            .put(self.value_url(key)?)
            .bearer_auth(&self.token)
            .body(value.to_string())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(KvError::UnexpectedStatus(status));
        }
        Ok(())
    }
}
