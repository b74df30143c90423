use crate::AppState;
use crate::api::utils::{json_response, query_param};
use crate::errors::ApiError;
use hyper::body::Bytes;
use hyper::{Request, Response, StatusCode};
use registry::{Channel, VersionTag, resolve};
use serde::Serialize;

#[derive(Serialize)]
struct LatestVersionResponse {
    success: bool,
    /// The resolved latest tag for the queried version's channel.
    message: String,
    /// Channel the queried version was released on.
    branch: Channel,
    /// Whether the resolved latest is newer than the queried version, by
    /// semver precedence.
    newer: bool,
    #[serde(rename = "betaHasNewerStable")]
    beta_has_newer_stable: bool,
}

pub async fn handle(state: &AppState, req: Request<Bytes>) -> Result<Response<Bytes>, ApiError> {
    let raw = query_param(req.uri(), "version").ok_or(ApiError::MissingVersion)?;
    let queried: VersionTag = raw.parse().map_err(|_| ApiError::InvalidVersion)?;

    let registry = state
        .store
        .get_all()
        .await
        .map_err(ApiError::from)?
        .ok_or(ApiError::NoVersionsExist)?;

    let branch = registry
        .channel_of(&queried)
        .ok_or(ApiError::UnknownVersion)?;

    let resolution = resolve(&registry, branch)?;

    json_response(
        StatusCode::OK,
        &LatestVersionResponse {
            success: true,
            newer: resolution.newer_than(&queried),
            message: resolution.latest.as_str().to_string(),
            branch,
            beta_has_newer_stable: resolution.beta_has_newer_stable,
        },
    )
}
