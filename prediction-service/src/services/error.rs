use crate::services::classifier::ModelError;
use service_core::error::AppError;
use thiserror::Error;

/// Everything that can go wrong between receiving a `/predict` body and
/// producing a label.
#[derive(Error, Debug)]
pub enum PredictionError {
    #[error("No JSON data provided")]
    EmptyPayload,

    #[error("Invalid JSON body: {0}")]
    InvalidJson(String),

    #[error("JSON body must be an object")]
    NotAnObject,

    #[error("Missing field: '{0}'")]
    MissingField(&'static str),

    #[error("Invalid numeric value for '{field}': {value}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Invalid gender value: {0}")]
    InvalidGender(String),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Model predicted class {0}, which has no category label")]
    UnknownClass(usize),
}

impl PredictionError {
    /// Stable label for the `prediction_errors_total` metric.
    pub fn kind(&self) -> &'static str {
        match self {
            PredictionError::EmptyPayload
            | PredictionError::InvalidJson(_)
            | PredictionError::NotAnObject => "payload",
            PredictionError::MissingField(_) => "missing_field",
            PredictionError::InvalidNumber { .. } => "invalid_number",
            PredictionError::InvalidGender(_) => "invalid_gender",
            PredictionError::Model(_) | PredictionError::UnknownClass(_) => "internal",
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.kind() != "internal"
    }
}

impl From<PredictionError> for AppError {
    fn from(err: PredictionError) -> Self {
        if err.is_client_error() {
            AppError::BadRequest(anyhow::anyhow!(err.to_string()))
        } else {
            AppError::InternalError(anyhow::Error::new(err))
        }
    }
}
