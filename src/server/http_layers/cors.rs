use axum::http::{header, HeaderName, HeaderValue, Method};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::error;

pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

const CORS_MAX_AGE: Duration = Duration::from_secs(12 * 3600);

fn parse_origins(origins: &[String]) -> Vec<HeaderValue> {
    let mut allowed = Vec::with_capacity(origins.len());
    for origin in origins {
        match HeaderValue::from_str(origin.trim()) {
            Ok(value) => allowed.push(value),
            Err(_) => error!("Ignoring invalid CORS origin {:?}", origin),
        }
    }
    allowed
}

/// Browser frontends on `origins` may call the API with credentials.
///
/// Credentialed CORS cannot use a wildcard origin, so every origin is listed explicitly.
pub fn build_cors_layer(origins: &[String]) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(parse_origins(origins)))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::CONTENT_LENGTH,
            header::ACCEPT_ENCODING,
            HeaderName::from_static("x-csrf-token"),
        ])
        .allow_credentials(true)
        .max_age(CORS_MAX_AGE)
}
