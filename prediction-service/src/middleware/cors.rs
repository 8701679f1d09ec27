//! Per-route CORS policies. Origins are validated in
//! [`crate::config::PredictionConfig::validate`].

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::CorsLayer;

fn origins(allowed: &[String]) -> Vec<HeaderValue> {
    allowed
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!("Invalid CORS origin '{}': {}. Skipping.", o, e);
                None
            }
        })
        .collect()
}

/// `/predict`: POST from the configured frontends, with credentials.
pub fn predict_cors(allowed: &[String]) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origins(allowed))
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// `/`: read-only info route.
pub fn home_cors(allowed: &[String]) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origins(allowed))
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}
