use serde::{Deserialize, Serialize};

/// Body of `GET /`.
#[derive(Debug, Serialize, Deserialize)]
pub struct HomeResponse {
    pub message: String,
}

/// Successful `POST /predict` body.
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub prediction: String,
}
