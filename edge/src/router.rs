use crate::AppState;
use crate::api;
use crate::errors::ApiError;
use hyper::body::Bytes;
use hyper::{Request, Response};

/// Dispatch a request to its handler by exact path match. Query strings are
/// not part of the route; handlers pull what they need from the URI.
pub async fn route(state: &AppState, req: Request<Bytes>) -> Response<Bytes> {
    let path = req.uri().path().to_string();
    tracing::debug!(method = %req.method(), path = %path, "dispatching request");

    let result = match path.as_str() {
        "/latest-version" => api::latest_version::handle(state, req).await,
        "/latest-download" => api::latest_download::handle(state, req).await,
        "/update-version" => api::update_version::handle(state, req).await,
        "/clear-cache" => api::clear_cache::handle(state, req).await,
        "/get-location" => api::location::handle(state, req).await,
        _ => Err(ApiError::UnknownRoute),
    };

    result.unwrap_or_else(|err| err.into_response())
}
