use crate::AppState;
use crate::api::utils::json_response;
use crate::errors::ApiError;
use hyper::body::Bytes;
use hyper::{Request, Response, StatusCode};
use serde::Serialize;

// Geolocation headers injected by the edge platform in front of this service.
const COUNTRY_HEADER: &str = "cf-ipcountry";
const CITY_HEADER: &str = "cf-ipcity";
const CONTINENT_HEADER: &str = "cf-ipcontinent";

#[derive(Serialize)]
struct LocationResponse {
    success: bool,
    country: Option<String>,
    city: Option<String>,
    continent: Option<String>,
}

/// Echo the request's geolocation metadata. Always 200; headers the platform
/// did not set serialize as null.
pub async fn handle(_state: &AppState, req: Request<Bytes>) -> Result<Response<Bytes>, ApiError> {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };

    json_response(
        StatusCode::OK,
        &LocationResponse {
            success: true,
            country: header(COUNTRY_HEADER),
            city: header(CITY_HEADER),
            continent: header(CONTINENT_HEADER),
        },
    )
}
