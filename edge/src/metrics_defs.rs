//! Metrics definitions for the edge API.

use shared::metrics_defs::{MetricDef, MetricType};

pub const RESPONSE_CACHE_HIT: MetricDef = MetricDef {
    name: "response_cache.hit",
    metric_type: MetricType::Counter,
    description: "Number of lookups served from the response cache",
};

pub const RESPONSE_CACHE_MISS: MetricDef = MetricDef {
    name: "response_cache.miss",
    metric_type: MetricType::Counter,
    description: "Number of lookups that missed the response cache",
};

pub const CACHE_PURGE_REQUESTS: MetricDef = MetricDef {
    name: "cache_purge.requests",
    metric_type: MetricType::Counter,
    description: "Number of edge-wide purge requests issued",
};

pub const CACHE_PURGE_FAILURES: MetricDef = MetricDef {
    name: "cache_purge.failures",
    metric_type: MetricType::Counter,
    description: "Number of purge requests that failed after retry",
};

pub const HTTP_REQUEST_DURATION: MetricDef = MetricDef {
    name: "http.request.duration",
    metric_type: MetricType::Histogram,
    description: "Time to serve a request in seconds",
};

// Every metric must be listed here so describe_all picks it up.
pub const ALL_METRICS: &[MetricDef] = &[
    RESPONSE_CACHE_HIT,
    RESPONSE_CACHE_MISS,
    CACHE_PURGE_REQUESTS,
    CACHE_PURGE_FAILURES,
    HTTP_REQUEST_DURATION,
];
