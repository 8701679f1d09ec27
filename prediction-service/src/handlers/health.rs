use crate::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};

/// Liveness plus a summary of the loaded model.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let artifacts = state.predictor.artifacts();

    Json(json!({
        "status": "ok",
        "service": state.config.service_name,
        "version": state.config.service_version,
        "model": {
            "kind": artifacts.model().kind(),
            "n_classes": artifacts.model().n_classes(),
            "categories": artifacts.category_encoder().classes(),
        }
    }))
}
