use crate::AppState;
use crate::api::utils::{StatusBody, json_response, require_key, require_post};
use crate::errors::ApiError;
use hyper::body::Bytes;
use hyper::{Request, Response, StatusCode};

/// Operator-triggered cache flush: drop every locally cached response, then
/// purge the rest of the edge. Unlike the post-update purge this one runs on
/// the response path, so the caller learns whether the purge went through.
pub async fn handle(state: &AppState, req: Request<Bytes>) -> Result<Response<Bytes>, ApiError> {
    require_post(&req)?;
    require_key(state, &req)?;

    state.cache.invalidate_all();

    if let Some(purge) = &state.purge {
        purge.purge_all().await.map_err(ApiError::PurgeFailed)?;
    }

    json_response(
        StatusCode::OK,
        &StatusBody {
            success: true,
            message: "Cache cleared",
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CachedResponse;
    use crate::testutils::{parse_body, post_json, test_state};
    use serde_json::json;

    #[tokio::test]
    async fn test_clears_local_cache() {
        let state = test_state();
        let key = state.download_cache_key();
        state.cache.store(
            key.clone(),
            CachedResponse::from_response(&hyper::Response::new(Bytes::from_static(b"stale"))),
        );

        let response = handle(&state, post_json("/clear-cache?key=hunter2", &json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = parse_body(response);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Cache cleared");
        assert!(state.cache.lookup(&key).is_none());
    }

    #[tokio::test]
    async fn test_requires_post_and_key() {
        let state = test_state();

        let mut req = post_json("/clear-cache?key=hunter2", &json!({}));
        *req.method_mut() = hyper::Method::GET;
        assert!(matches!(
            handle(&state, req).await.unwrap_err(),
            ApiError::MethodNotAllowed
        ));

        assert!(matches!(
            handle(&state, post_json("/clear-cache", &json!({})))
                .await
                .unwrap_err(),
            ApiError::MissingKey
        ));

        assert!(matches!(
            handle(&state, post_json("/clear-cache?key=wrong", &json!({})))
                .await
                .unwrap_err(),
            ApiError::InvalidKey
        ));
    }
}
