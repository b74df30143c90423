//! Client for the edge platform's cache purge API.
//!
//! Local eviction only covers one node, so correctness across a distributed
//! edge cache requires asking the platform to purge everything.

use crate::metrics_defs::{CACHE_PURGE_FAILURES, CACHE_PURGE_REQUESTS};
use reqwest::StatusCode;
use shared::counter;
use url::Url;

#[derive(thiserror::Error, Debug)]
pub enum PurgeError {
    #[error("purge request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("purge api returned status: {0}")]
    Rejected(StatusCode),
}

impl PurgeError {
    fn is_transient(&self) -> bool {
        match self {
            PurgeError::Transport(_) => true,
            PurgeError::Rejected(status) => status.is_server_error(),
        }
    }
}

#[derive(Clone)]
pub struct PurgeClient {
    client: reqwest::Client,
    endpoint: Url,
    token: String,
}

impl PurgeClient {
    pub fn new(endpoint: Url, token: String) -> Self {
        PurgeClient {
            client: reqwest::Client::new(),
            endpoint,
            token,
        }
    }

    /// Request an edge-wide purge of all cached content.
    ///
    /// Retried once on transport errors and 5xx responses; auth and client
    /// errors fail immediately.
    pub async fn purge_all(&self) -> Result<(), PurgeError> {
        counter!(CACHE_PURGE_REQUESTS).increment(1);

        let result = match self.send().await {
            Err(err) if err.is_transient() => {
                tracing::warn!(error = %err, "cache purge failed, retrying once");
                self.send().await
            }
            other => other,
        };

        if result.is_err() {
            counter!(CACHE_PURGE_FAILURES).increment(1);
        }
        result
    }

    async fn send(&self) -> Result<(), PurgeError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "purge_everything": true }))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(PurgeError::Rejected(status))
        }
    }
}
