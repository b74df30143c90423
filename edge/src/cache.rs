//! Response cache keyed by canonical request URL.
//!
//! Entries go stale the moment the registry changes, so there is no TTL;
//! staleness is handled by explicit invalidation from the write path. This
//! cache only covers the local node — dropping stale copies on other edge
//! nodes goes through the purge API.

use crate::metrics_defs::{RESPONSE_CACHE_HIT, RESPONSE_CACHE_MISS};
use hyper::body::Bytes;
use hyper::header::{HeaderName, HeaderValue};
use hyper::{Response, StatusCode};
use moka::sync::Cache;
use shared::counter;

const SIZE: u64 = 64;

/// A materialized HTTP response: status, headers, body bytes.
#[derive(Clone, Debug)]
pub struct CachedResponse {
    status: StatusCode,
    headers: Vec<(HeaderName, HeaderValue)>,
    body: Bytes,
}

impl CachedResponse {
    pub fn from_response(response: &Response<Bytes>) -> Self {
        CachedResponse {
            status: response.status(),
            headers: response
                .headers()
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
            body: response.body().clone(),
        }
    }

    pub fn into_response(self) -> Response<Bytes> {
        let mut response = Response::new(self.body);
        *response.status_mut() = self.status;
        for (name, value) in self.headers {
            response.headers_mut().append(name, value);
        }
        response
    }
}

#[derive(Clone)]
pub struct ResponseCache {
    cache: Cache<String, CachedResponse>,
}

impl ResponseCache {
    pub fn new() -> Self {
        let cache = Cache::builder().max_capacity(SIZE).build();
        ResponseCache { cache }
    }

    pub fn lookup(&self, key: &str) -> Option<CachedResponse> {
        let entry = self.cache.get(key);
        let metric_def = if entry.is_some() {
            RESPONSE_CACHE_HIT
        } else {
            RESPONSE_CACHE_MISS
        };
        counter!(metric_def).increment(1);
        entry
    }

    pub fn store(&self, key: String, response: CachedResponse) {
        self.cache.insert(key, response);
    }

    pub fn invalidate(&self, key: &str) {
        self.cache.invalidate(key);
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}
