use crate::AppState;
use crate::api::utils::json_response;
use crate::cache::CachedResponse;
use crate::errors::ApiError;
use hyper::body::Bytes;
use hyper::header::{ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue};
use hyper::{Request, Response, StatusCode};
use registry::{Channel, resolve_download};
use serde::Serialize;

#[derive(Serialize)]
struct DownloadResponse {
    success: bool,
    version: String,
    branch: Channel,
}

/// Read-through cached download lookup.
///
/// Served from the response cache when possible; on a miss the result is
/// computed from the registry and the cache is populated off the response
/// path so the client never waits on it.
pub async fn handle(state: &AppState, _req: Request<Bytes>) -> Result<Response<Bytes>, ApiError> {
    let key = state.download_cache_key();

    if let Some(cached) = state.cache.lookup(&key) {
        return Ok(cached.into_response());
    }

    let registry = state
        .store
        .get_all()
        .await
        .map_err(ApiError::from)?
        .unwrap_or_default();

    let (version, branch) = resolve_download(&registry)?;

    let mut response = json_response(
        StatusCode::OK,
        &DownloadResponse {
            success: true,
            version: version.as_str().to_string(),
            branch,
        },
    )?;

    let origin =
        HeaderValue::from_str(&state.allowed_origin).map_err(|_| ApiError::Internal)?;
    response
        .headers_mut()
        .insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);

    let cached = CachedResponse::from_response(&response);
    let cache = state.cache.clone();
    tokio::spawn(async move {
        cache.store(key, cached);
    });

    Ok(response)
}
