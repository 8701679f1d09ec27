//! Fitted label encoder: a fixed bidirectional lookup between category
//! strings and integer codes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// On-disk form: `{"classes": [...]}`; a class's code is its index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelEncoderArtifact {
    pub classes: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct LabelEncoder {
    classes: Vec<String>,
    codes: HashMap<String, usize>,
}

impl LabelEncoder {
    pub fn from_artifact(artifact: LabelEncoderArtifact) -> Result<Self, String> {
        if artifact.classes.is_empty() {
            return Err("encoder has no classes".to_string());
        }

        let mut codes = HashMap::with_capacity(artifact.classes.len());
        for (code, class) in artifact.classes.iter().enumerate() {
            if codes.insert(class.clone(), code).is_some() {
                return Err(format!("duplicate class '{}'", class));
            }
        }

        Ok(Self {
            classes: artifact.classes,
            codes,
        })
    }

    /// Label -> code.
    pub fn transform(&self, label: &str) -> Option<usize> {
        self.codes.get(label).copied()
    }

    /// Code -> label.
    pub fn inverse_transform(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
