pub mod artifacts;
pub mod classifier;
pub mod encoder;
pub mod error;
pub mod metrics;
pub mod predictor;
pub mod scaler;

pub use artifacts::{ArtifactBundle, ArtifactError};
pub use classifier::{Classifier, ModelArtifact, ModelError};
pub use error::PredictionError;
pub use metrics::{get_metrics, init_metrics};
pub use predictor::Predictor;
