//! Startup loading of the fitted artifacts into one immutable bundle.

use crate::config::ArtifactConfig;
use crate::services::classifier::{Classifier, ModelArtifact};
use crate::services::encoder::{LabelEncoder, LabelEncoderArtifact};
use crate::services::scaler::{ScalerArtifact, StandardScaler};
use serde::de::DeserializeOwned;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Model,
    Scaler,
    GenderEncoder,
    CategoryEncoder,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtifactKind::Model => "model",
            ArtifactKind::Scaler => "scaler",
            ArtifactKind::GenderEncoder => "gender encoder",
            ArtifactKind::CategoryEncoder => "category encoder",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Failed to read {kind} artifact at {}: {source}", path.display())]
    Io {
        kind: ArtifactKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode {kind} artifact at {}: {source}", path.display())]
    Decode {
        kind: ArtifactKind,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid {kind} artifact: {reason}")]
    Invalid { kind: ArtifactKind, reason: String },
}

/// Model, scaler and both encoders. Built once at startup and never mutated.
pub struct ArtifactBundle {
    model: Arc<dyn Classifier>,
    scaler: StandardScaler,
    gender_encoder: LabelEncoder,
    category_encoder: LabelEncoder,
}

impl fmt::Debug for ArtifactBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactBundle")
            .field("model", &self.model.kind())
            .field("n_classes", &self.model.n_classes())
            .field("genders", &self.gender_encoder.classes())
            .field("categories", &self.category_encoder.classes())
            .finish()
    }
}

impl ArtifactBundle {
    pub fn load(config: &ArtifactConfig) -> Result<Self, ArtifactError> {
        let model: ModelArtifact = read_json(ArtifactKind::Model, &config.model_path)?;
        model.validate().map_err(|e| ArtifactError::Invalid {
            kind: ArtifactKind::Model,
            reason: e.to_string(),
        })?;

        let scaler: ScalerArtifact = read_json(ArtifactKind::Scaler, &config.scaler_path)?;
        let scaler = StandardScaler::from_artifact(scaler).map_err(|reason| {
            ArtifactError::Invalid {
                kind: ArtifactKind::Scaler,
                reason,
            }
        })?;

        let gender_encoder =
            load_encoder(ArtifactKind::GenderEncoder, &config.gender_encoder_path)?;
        let category_encoder =
            load_encoder(ArtifactKind::CategoryEncoder, &config.category_encoder_path)?;

        let bundle = Self::new(Arc::new(model), scaler, gender_encoder, category_encoder)?;

        tracing::info!(
            model = %bundle.model.kind(),
            n_classes = bundle.model.n_classes(),
            genders = ?bundle.gender_encoder.classes(),
            categories = ?bundle.category_encoder.classes(),
            "Loaded prediction artifacts"
        );

        Ok(bundle)
    }

    /// Assemble a bundle from already-built parts, checking that every class
    /// the model can emit has a label.
    pub fn new(
        model: Arc<dyn Classifier>,
        scaler: StandardScaler,
        gender_encoder: LabelEncoder,
        category_encoder: LabelEncoder,
    ) -> Result<Self, ArtifactError> {
        if model.n_classes() > category_encoder.len() {
            return Err(ArtifactError::Invalid {
                kind: ArtifactKind::CategoryEncoder,
                reason: format!(
                    "model emits {} classes but the encoder only labels {}",
                    model.n_classes(),
                    category_encoder.len()
                ),
            });
        }

        Ok(Self {
            model,
            scaler,
            gender_encoder,
            category_encoder,
        })
    }

    pub fn model(&self) -> &dyn Classifier {
        self.model.as_ref()
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn gender_encoder(&self) -> &LabelEncoder {
        &self.gender_encoder
    }

    pub fn category_encoder(&self) -> &LabelEncoder {
        &self.category_encoder
    }
}

fn load_encoder(kind: ArtifactKind, path: &Path) -> Result<LabelEncoder, ArtifactError> {
    let artifact: LabelEncoderArtifact = read_json(kind, path)?;
    LabelEncoder::from_artifact(artifact).map_err(|reason| ArtifactError::Invalid { kind, reason })
}

fn read_json<T: DeserializeOwned>(kind: ArtifactKind, path: &Path) -> Result<T, ArtifactError> {
    let bytes = std::fs::read(path).map_err(|source| ArtifactError::Io {
        kind,
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Decode {
        kind,
        path: path.to_path_buf(),
        source,
    })
}
