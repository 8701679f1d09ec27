pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;

use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::middleware::{
    metrics::metrics_middleware, security_headers::security_headers_middleware,
    tracing::request_id_middleware,
};
use tower_http::trace::TraceLayer;

use crate::config::PredictionConfig;
use crate::middleware::{home_cors, predict_cors, preflight_no_content_middleware};
use crate::services::Predictor;

#[derive(Clone)]
pub struct AppState {
    pub config: PredictionConfig,
    pub predictor: Predictor,
}

pub fn build_router(state: AppState) -> Router {
    let origins = &state.config.security.allowed_origins;

    let predict_routes = Router::new()
        .route("/predict", post(handlers::predict::predict))
        .layer(predict_cors(origins));

    let home_routes = Router::new()
        .route("/", get(handlers::home::home))
        .layer(home_cors(origins));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::metrics))
        .merge(home_routes)
        .merge(predict_routes)
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            },
        ))
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(preflight_no_content_middleware))
}
