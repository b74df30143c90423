use crate::AppState;
use crate::api::utils::{StatusBody, json_response, require_key, require_post};
use crate::errors::ApiError;
use hyper::body::Bytes;
use hyper::{Request, Response, StatusCode};
use registry::{Channel, VersionTag};
use serde::Deserialize;

/// Webhook payload sent by the release pipeline.
#[derive(Deserialize)]
struct ReleasePayload {
    release: Release,
}

#[derive(Deserialize)]
struct Release {
    tag_name: String,
    #[serde(default)]
    prerelease: bool,
    #[serde(default)]
    draft: bool,
}

pub async fn handle(state: &AppState, req: Request<Bytes>) -> Result<Response<Bytes>, ApiError> {
    require_post(&req)?;
    require_key(state, &req)?;

    let payload: ReleasePayload =
        serde_json::from_slice(req.body()).map_err(|_| ApiError::BadBody)?;
    let release = payload.release;

    if release.draft {
        // Acknowledged with 200 so the upstream webhook does not treat an
        // ignored draft as a delivery failure.
        return json_response(
            StatusCode::OK,
            &StatusBody {
                success: false,
                message: "That's a draft",
            },
        );
    }

    let tag: VersionTag = release
        .tag_name
        .parse()
        .map_err(|_| ApiError::InvalidVersion)?;
    let channel = Channel::from_release(release.prerelease);

    state.store.register(tag, channel).await?;

    invalidate_caches(state);

    json_response(
        StatusCode::OK,
        &StatusBody {
            success: true,
            message: "Version updated",
        },
    )
}

/// Drop cached responses that now reflect stale "latest" data.
///
/// The local evict only covers this node; the purge API call is what removes
/// stale copies from the rest of the edge. The purge runs off the response
/// path and a failure is a warning only: the registry write has already
/// succeeded.
fn invalidate_caches(state: &AppState) {
    state.cache.invalidate(&state.download_cache_key());

    match state.purge.clone() {
        Some(purge) => {
            tokio::spawn(async move {
                if let Err(err) = purge.purge_all().await {
                    tracing::warn!(error = %err, "global cache purge failed after registry update");
                }
            });
        }
        None => tracing::debug!("no purge client configured, skipping global purge"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils::{parse_body, post_json, test_state};
    use serde_json::json;

    fn release(tag: &str, prerelease: bool, draft: bool) -> serde_json::Value {
        json!({"release": {"tag_name": tag, "prerelease": prerelease, "draft": draft}})
    }

    #[tokio::test]
    async fn test_registers_stable_release() {
        let state = test_state();
        let req = post_json(
            "/update-version?key=hunter2",
            &release("v1.0.0", false, false),
        );

        let response = handle(&state, req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = parse_body(response);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Version updated");

        let registry = state.store.get_all().await.unwrap().unwrap();
        assert_eq!(
            registry.channel_of(&"v1.0.0".parse().unwrap()),
            Some(Channel::Stable)
        );
    }

    #[tokio::test]
    async fn test_prerelease_goes_to_beta() {
        let state = test_state();
        let req = post_json(
            "/update-version?key=hunter2",
            &release("v1.1.0-beta.1", true, false),
        );
        handle(&state, req).await.unwrap();

        let registry = state.store.get_all().await.unwrap().unwrap();
        assert_eq!(
            registry.channel_of(&"v1.1.0-beta.1".parse().unwrap()),
            Some(Channel::Beta)
        );
    }

    #[tokio::test]
    async fn test_draft_is_acknowledged_but_ignored() {
        let state = test_state();
        let req = post_json(
            "/update-version?key=hunter2",
            &release("v1.0.0", false, true),
        );

        let response = handle(&state, req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = parse_body(response);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "That's a draft");

        assert!(state.store.get_all().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalid_and_duplicate_tags() {
        let state = test_state();

        let err = handle(
            &state,
            post_json("/update-version?key=hunter2", &release("1.0.0", false, false)),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidVersion));

        handle(
            &state,
            post_json(
                "/update-version?key=hunter2",
                &release("v1.0.0", false, false),
            ),
        )
        .await
        .unwrap();

        let err = handle(
            &state,
            post_json(
                "/update-version?key=hunter2",
                &release("v1.0.0", false, false),
            ),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::AlreadyExists));
    }

    #[tokio::test]
    async fn test_auth_and_method_checks() {
        let state = test_state();

        let mut req = post_json("/update-version?key=hunter2", &release("v1.0.0", false, false));
        *req.method_mut() = hyper::Method::GET;
        assert!(matches!(
            handle(&state, req).await.unwrap_err(),
            ApiError::MethodNotAllowed
        ));

        let req = post_json("/update-version", &release("v1.0.0", false, false));
        assert!(matches!(
            handle(&state, req).await.unwrap_err(),
            ApiError::MissingKey
        ));

        let req = post_json(
            "/update-version?key=nope",
            &release("v1.0.0", false, false),
        );
        assert!(matches!(
            handle(&state, req).await.unwrap_err(),
            ApiError::InvalidKey
        ));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let state = test_state();
        let mut req = post_json("/update-version?key=hunter2", &json!({}));
        *req.body_mut() = Bytes::from_static(b"not json");
        assert!(matches!(
            handle(&state, req).await.unwrap_err(),
            ApiError::BadBody
        ));
    }

    #[tokio::test]
    async fn test_update_evicts_cached_download() {
        let state = test_state();
        let key = state.download_cache_key();
        state.cache.store(
            key.clone(),
            crate::cache::CachedResponse::from_response(&hyper::Response::new(
                Bytes::from_static(b"stale"),
            )),
        );

        handle(
            &state,
            post_json(
                "/update-version?key=hunter2",
                &release("v1.0.0", false, false),
            ),
        )
        .await
        .unwrap();

        assert!(state.cache.lookup(&key).is_none());
    }
}
