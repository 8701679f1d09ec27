use crate::dtos::HomeResponse;
use axum::Json;

/// Existing clients match on this exact string.
pub const HOME_MESSAGE: &str = "Flask Prediction API";

pub async fn home() -> Json<HomeResponse> {
    Json(HomeResponse {
        message: HOME_MESSAGE.to_string(),
    })
}
