use crate::dtos::PredictResponse;
use crate::services::metrics::record_prediction_error;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;

/// `POST /predict`: survey answers in, category label out.
pub async fn predict(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<PredictResponse>, AppError> {
    let body = body.map_err(body_rejection)?;

    let prediction = state.predictor.predict_body(&body).map_err(|e| {
        if e.is_client_error() {
            tracing::warn!(error = %e, kind = e.kind(), "Rejected prediction request");
        }
        AppError::from(e)
    })?;

    tracing::info!(category = %prediction, "Prediction served");

    Ok(Json(PredictResponse { prediction }))
}

/// Body buffering failures (oversized or aborted uploads) still answer in JSON.
fn body_rejection(rejection: BytesRejection) -> AppError {
    let message = anyhow::anyhow!(rejection.body_text());
    tracing::warn!(error = %message, status = %rejection.status(), "Rejected prediction body");
    record_prediction_error("unreadable_body");

    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(message)
    } else {
        AppError::BadRequest(message)
    }
}
