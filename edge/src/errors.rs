use crate::purge::PurgeError;
use hyper::body::Bytes;
use hyper::header::{CONTENT_TYPE, HeaderValue};
use hyper::{Response, StatusCode};
use registry::{ResolveError, StoreError};
use thiserror::Error;

/// Request-terminal errors for the API.
///
/// The `Display` text is the client-facing `message`; sources are kept for
/// logging only. Every error renders as `{"success": false, "message": ...}`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Version is required")]
    MissingVersion,

    #[error("Invalid version")]
    InvalidVersion,

    #[error("Version does not exist")]
    UnknownVersion,

    #[error("No versions exist")]
    NoVersionsExist,

    #[error("Version already exists")]
    AlreadyExists,

    #[error("Key value is required")]
    MissingKey,

    #[error("Invalid key")]
    InvalidKey,

    #[error("This route only supports POST")]
    MethodNotAllowed,

    #[error("API route does not exist")]
    UnknownRoute,

    #[error("Invalid request body")]
    BadBody,

    #[error("Registry unavailable")]
    Store(#[source] StoreError),

    #[error("Cache purge failed")]
    PurgeFailed(#[source] PurgeError),

    #[error("Internal error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingVersion
            | ApiError::InvalidVersion
            | ApiError::UnknownVersion
            | ApiError::NoVersionsExist
            | ApiError::AlreadyExists
            | ApiError::BadBody => StatusCode::BAD_REQUEST,
            ApiError::MissingKey | ApiError::InvalidKey => StatusCode::FORBIDDEN,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::UnknownRoute => StatusCode::NOT_FOUND,
            ApiError::Store(_) | ApiError::PurgeFailed(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn into_response(self) -> Response<Bytes> {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        } else {
            tracing::debug!(error = %self, status = %status, "request rejected");
        }
        error_response(status, &self.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AlreadyExists(_) => ApiError::AlreadyExists,
            other => ApiError::Store(other),
        }
    }
}

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::NoVersionsExist => ApiError::NoVersionsExist,
        }
    }
}

/// Build a `{"success": false, "message": ...}` response. Infallible by
/// construction so the error path cannot itself error.
pub fn error_response(status: StatusCode, message: &str) -> Response<Bytes> {
    let body = serde_json::json!({
        "success": false,
        "message": message,
    })
    .to_string();

    let mut response = Response::new(Bytes::from(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::MissingVersion.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::InvalidVersion.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NoVersionsExist.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::MissingKey.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::InvalidKey.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::MethodNotAllowed.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(ApiError::UnknownRoute.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_error_response_body() {
        let response = ApiError::UnknownRoute.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let parsed: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(parsed["success"], false);
        assert_eq!(parsed["message"], "API route does not exist");
    }
}
