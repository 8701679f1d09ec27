//! HTTP handlers for the prediction service.

pub mod health;
pub mod home;
pub mod metrics;
pub mod predict;

use axum::http::Uri;
use service_core::error::AppError;

/// JSON 404 for any route the service does not serve.
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(anyhow::anyhow!("No route for {}", uri.path()))
}
