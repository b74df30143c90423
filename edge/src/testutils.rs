//! Shared helpers for handler and router tests.

use crate::AppState;
use crate::cache::ResponseCache;
use hyper::body::Bytes;
use hyper::header::CONTENT_TYPE;
use hyper::{Method, Request, Response};
use registry::kv::MemoryKv;
use registry::{Channel, RegistryStore, VersionTag};
use std::sync::Arc;

/// State backed by an in-memory KV store and no purge client.
pub fn test_state() -> AppState {
    AppState {
        store: RegistryStore::new(Arc::new(MemoryKv::new())),
        cache: ResponseCache::new(),
        purge: None,
        secret_key: "hunter2".to_string(),
        public_host: "api.framed-app.com".to_string(),
        allowed_origin: "https://framed-app.com".to_string(),
    }
}

/// State pre-populated with the given releases, registered in order.
pub async fn seeded_state(releases: &[(&str, Channel)]) -> AppState {
    let state = test_state();
    for (tag, channel) in releases {
        let tag: VersionTag = tag.parse().unwrap();
        state.store.register(tag, *channel).await.unwrap();
    }
    state
}

pub fn get(uri: &str) -> Request<Bytes> {
    Request::builder().uri(uri).body(Bytes::new()).unwrap()
}

pub fn post_json(uri: &str, body: &serde_json::Value) -> Request<Bytes> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Bytes::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

pub fn parse_body(response: Response<Bytes>) -> serde_json::Value {
    serde_json::from_slice(response.body()).unwrap()
}
