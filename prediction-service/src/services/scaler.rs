//! Fitted standard scaler over the numeric survey columns.

use crate::models::{N_NUMERIC, NUMERIC_COLUMNS};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerArtifact {
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// `(x - mean) / scale`, column by column.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: [f64; N_NUMERIC],
    scale: [f64; N_NUMERIC],
}

impl StandardScaler {
    pub fn from_artifact(artifact: ScalerArtifact) -> Result<Self, String> {
        if let Some(names) = &artifact.feature_names {
            if names.iter().map(String::as_str).ne(NUMERIC_COLUMNS.iter().copied()) {
                return Err(format!(
                    "feature_names {:?} do not match expected columns {:?}",
                    names, NUMERIC_COLUMNS
                ));
            }
        }

        let mean = fixed_width("mean", &artifact.mean)?;
        let mut scale = fixed_width("scale", &artifact.scale)?;

        // A constant column was fitted with zero variance; leave it unscaled.
        for s in scale.iter_mut() {
            if *s == 0.0 {
                *s = 1.0;
            }
        }

        Ok(Self { mean, scale })
    }

    pub fn transform(&self, values: &[f64; N_NUMERIC]) -> [f64; N_NUMERIC] {
        let mut out = [0.0; N_NUMERIC];
        for (i, v) in values.iter().enumerate() {
            out[i] = (v - self.mean[i]) / self.scale[i];
        }
        out
    }
}

fn fixed_width(name: &str, values: &[f64]) -> Result<[f64; N_NUMERIC], String> {
    let arr: [f64; N_NUMERIC] = values.try_into().map_err(|_| {
        format!(
            "{} has {} entries, expected {}",
            name,
            values.len(),
            N_NUMERIC
        )
    })?;

    if let Some(i) = arr.iter().position(|v| !v.is_finite()) {
        return Err(format!("{}[{}] is not a finite number", name, i));
    }

    Ok(arr)
}
