use crate::AppState;
use crate::errors::ApiError;
use hyper::body::Bytes;
use hyper::header::{CONTENT_TYPE, HeaderValue};
use hyper::{Method, Request, Response, StatusCode, Uri};
use serde::Serialize;

/// Shared `{success, message}` response body.
#[derive(Serialize)]
pub struct StatusBody {
    pub success: bool,
    pub message: &'static str,
}

/// First value of a query parameter, url-decoded. Empty values count as
/// absent.
pub fn query_param(uri: &Uri, name: &str) -> Option<String> {
    let query = uri.query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

pub fn require_post(req: &Request<Bytes>) -> Result<(), ApiError> {
    if req.method() != Method::POST {
        return Err(ApiError::MethodNotAllowed);
    }
    Ok(())
}

/// Shared-secret check for the write-protected routes: `?key=<secret>`.
pub fn require_key(state: &AppState, req: &Request<Bytes>) -> Result<(), ApiError> {
    match query_param(req.uri(), "key") {
        None => Err(ApiError::MissingKey),
        Some(key) if key == state.secret_key => Ok(()),
        Some(_) => Err(ApiError::InvalidKey),
    }
}

/// Serialize `value` into a JSON response.
pub fn json_response<T: Serialize>(
    status: StatusCode,
    value: &T,
) -> Result<Response<Bytes>, ApiError> {
    let body = serde_json::to_vec(value).map_err(|_| ApiError::Internal)?;

    let mut response = Response::new(Bytes::from(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(response)
}
