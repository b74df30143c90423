pub mod api;
pub mod cache;
pub mod config;
pub mod errors;
pub mod metrics_defs;
pub mod purge;
pub mod router;
#[cfg(test)]
pub mod testutils;

use crate::cache::ResponseCache;
use crate::config::{Config, KvConfig};
use crate::errors::ApiError;
use crate::metrics_defs::HTTP_REQUEST_DURATION;
use crate::purge::PurgeClient;
use http_body_util::BodyExt;
use http_body_util::combinators::BoxBody;
use hyper::body::{Bytes, Incoming};
use hyper::service::Service;
use hyper::{Request, Response};
use registry::RegistryStore;
use registry::kv::{KvStore, MemoryKv, RestKv};
use shared::http::{full_body, run_http_service};
use shared::histogram;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

#[derive(thiserror::Error, Debug)]
pub enum EdgeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything a request handler needs, passed in explicitly rather than
/// living in module-level globals. All mutable state is external (the KV
/// store and the response cache); the struct itself is shared read-only.
pub struct AppState {
    pub store: RegistryStore,
    pub cache: ResponseCache,
    pub purge: Option<PurgeClient>,
    pub secret_key: String,
    pub public_host: String,
    pub allowed_origin: String,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        let kv: Arc<dyn KvStore> = match &config.kv {
            KvConfig::Memory => Arc::new(MemoryKv::new()),
            KvConfig::Rest { url, token } => Arc::new(RestKv::new(url.clone(), token.clone())),
        };

        AppState {
            store: RegistryStore::new(kv),
            cache: ResponseCache::new(),
            purge: config
                .purge
                .as_ref()
                .map(|p| PurgeClient::new(p.endpoint.clone(), p.token.clone())),
            secret_key: config.secret_key.clone(),
            public_host: config.public_host.clone(),
            allowed_origin: config.allowed_origin.clone(),
        }
    }

    /// Canonical URL the latest-download response is cached under. Fixed per
    /// deployment so the write path knows exactly what to evict.
    pub fn download_cache_key(&self) -> String {
        format!("https://{}/latest-download", self.public_host)
    }
}

pub async fn run(config: Config) -> Result<(), EdgeError> {
    let state = Arc::new(AppState::from_config(&config));
    let service = EdgeService { state };
    run_http_service(&config.listener.host, config.listener.port, service).await
}

#[derive(Clone)]
pub struct EdgeService {
    state: Arc<AppState>,
}

impl EdgeService {
    pub fn new(state: Arc<AppState>) -> Self {
        EdgeService { state }
    }
}

impl Service<Request<Incoming>> for EdgeService {
    type Response = Response<BoxBody<Bytes, EdgeError>>;
    type Error = EdgeError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let state = self.state.clone();

        Box::pin(async move {
            let started = Instant::now();

            // Collect the body up front so handlers work on Bytes and stay
            // unit-testable without a live connection.
            let (parts, body) = req.into_parts();
            let response = match body.collect().await {
                Ok(collected) => {
                    let req = Request::from_parts(parts, collected.to_bytes());
                    router::route(&state, req).await
                }
                Err(err) => {
                    tracing::warn!(error = %err, "failed to read request body");
                    ApiError::BadBody.into_response()
                }
            };

            histogram!(HTTP_REQUEST_DURATION).record(started.elapsed().as_secs_f64());

            Ok(response.map(full_body))
        })
    }
}
