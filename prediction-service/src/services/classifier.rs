//! Classifier abstraction and the model families the offline pipeline can
//! export.
//!
//! The service treats the model as opaque: anything that maps a
//! [`N_FEATURES`]-wide vector to a class index can sit behind
//! [`Classifier`]. The concrete families below are plain data loaded from
//! JSON and validated once, so prediction itself cannot fail on a
//! well-formed input.

use crate::models::N_FEATURES;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Invalid model: {0}")]
    Invalid(String),

    #[error("Input feature {index} is not a finite number")]
    NonFiniteInput { index: usize },
}

/// A fitted model mapping a feature vector to a class index.
pub trait Classifier: Send + Sync {
    fn predict(&self, features: &[f64; N_FEATURES]) -> Result<usize, ModelError>;

    fn n_classes(&self) -> usize;

    /// Short model family name for logs and `/health`.
    fn kind(&self) -> &'static str;
}

/// Exported model, tagged by `"kind"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    DecisionTree(DecisionTree),
    RandomForest(RandomForest),
    LogisticRegression(LogisticRegression),
}

impl ModelArtifact {
    pub fn validate(&self) -> Result<(), ModelError> {
        match self {
            ModelArtifact::DecisionTree(tree) => tree.validate(),
            ModelArtifact::RandomForest(forest) => forest.validate(),
            ModelArtifact::LogisticRegression(linear) => linear.validate(),
        }
    }
}

impl Classifier for ModelArtifact {
    fn predict(&self, features: &[f64; N_FEATURES]) -> Result<usize, ModelError> {
        if let Some(index) = features.iter().position(|v| !v.is_finite()) {
            return Err(ModelError::NonFiniteInput { index });
        }

        Ok(match self {
            ModelArtifact::DecisionTree(tree) => argmax(tree.leaf_value(features)),
            ModelArtifact::RandomForest(forest) => argmax(&forest.predict_proba(features)),
            ModelArtifact::LogisticRegression(linear) => linear.predict_class(features),
        })
    }

    fn n_classes(&self) -> usize {
        match self {
            ModelArtifact::DecisionTree(tree) => tree.n_classes,
            ModelArtifact::RandomForest(forest) => forest.n_classes,
            ModelArtifact::LogisticRegression(linear) => linear.n_classes(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ModelArtifact::DecisionTree(_) => "decision_tree",
            ModelArtifact::RandomForest(_) => "random_forest",
            ModelArtifact::LogisticRegression(_) => "logistic_regression",
        }
    }
}

/// CART tree in flat-array form: node `i` is a leaf when
/// `children_left[i] == -1`, otherwise it routes left on
/// `x[feature[i]] <= threshold[i]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub n_features: usize,
    pub n_classes: usize,
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class weights; only leaf rows are read.
    pub value: Vec<Vec<f64>>,
}

const LEAF: i64 = -1;

impl DecisionTree {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.n_features != N_FEATURES {
            return Err(ModelError::Invalid(format!(
                "tree expects {} features, service provides {}",
                self.n_features, N_FEATURES
            )));
        }
        if self.n_classes == 0 {
            return Err(ModelError::Invalid("tree has no classes".to_string()));
        }

        let n = self.children_left.len();
        if n == 0 {
            return Err(ModelError::Invalid("tree has no nodes".to_string()));
        }
        if self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
            || self.value.len() != n
        {
            return Err(ModelError::Invalid(format!(
                "tree node arrays disagree on length (expected {})",
                n
            )));
        }

        for i in 0..n {
            let (left, right) = (self.children_left[i], self.children_right[i]);
            if left == LEAF || right == LEAF {
                if left != right {
                    return Err(ModelError::Invalid(format!(
                        "node {} has exactly one child",
                        i
                    )));
                }
                let row = &self.value[i];
                if row.len() != self.n_classes {
                    return Err(ModelError::Invalid(format!(
                        "leaf {} has {} class weights, expected {}",
                        i,
                        row.len(),
                        self.n_classes
                    )));
                }
                if row.iter().any(|w| !w.is_finite() || *w < 0.0) {
                    return Err(ModelError::Invalid(format!(
                        "leaf {} has a negative or non-finite weight",
                        i
                    )));
                }
                continue;
            }

            // Children strictly after their parent: every walk terminates.
            for child in [left, right] {
                if child <= i as i64 || child >= n as i64 {
                    return Err(ModelError::Invalid(format!(
                        "node {} has out-of-order child {}",
                        i, child
                    )));
                }
            }
            if self.feature[i] < 0 || self.feature[i] >= self.n_features as i64 {
                return Err(ModelError::Invalid(format!(
                    "node {} splits on unknown feature {}",
                    i, self.feature[i]
                )));
            }
            if !self.threshold[i].is_finite() {
                return Err(ModelError::Invalid(format!(
                    "node {} has a non-finite threshold",
                    i
                )));
            }
        }

        Ok(())
    }

    fn leaf_value(&self, x: &[f64; N_FEATURES]) -> &[f64] {
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            let feature = self.feature[node] as usize;
            node = if x[feature] <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        &self.value[node]
    }
}

/// Bagged trees; class probabilities are averaged across trees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    pub n_features: usize,
    pub n_classes: usize,
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::Invalid("forest has no trees".to_string()));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            if tree.n_features != self.n_features || tree.n_classes != self.n_classes {
                return Err(ModelError::Invalid(format!(
                    "tree {} shape differs from the forest",
                    i
                )));
            }
            tree.validate()
                .map_err(|e| ModelError::Invalid(format!("tree {}: {}", i, e)))?;
        }
        Ok(())
    }

    fn predict_proba(&self, x: &[f64; N_FEATURES]) -> Vec<f64> {
        let mut proba = vec![0.0; self.n_classes];
        for tree in &self.trees {
            let leaf = tree.leaf_value(x);
            let total: f64 = leaf.iter().sum();
            if total <= 0.0 {
                continue;
            }
            for (p, w) in proba.iter_mut().zip(leaf) {
                *p += w / total;
            }
        }
        let n = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n);
        proba
    }
}

/// Linear model; a single coefficient row means binary classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
}

impl LogisticRegression {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.coef.is_empty() {
            return Err(ModelError::Invalid(
                "logistic regression has no coefficients".to_string(),
            ));
        }
        if self.intercept.len() != self.coef.len() {
            return Err(ModelError::Invalid(format!(
                "{} intercepts for {} coefficient rows",
                self.intercept.len(),
                self.coef.len()
            )));
        }
        for (i, row) in self.coef.iter().enumerate() {
            if row.len() != N_FEATURES {
                return Err(ModelError::Invalid(format!(
                    "coefficient row {} has {} entries, expected {}",
                    i,
                    row.len(),
                    N_FEATURES
                )));
            }
        }
        let all_finite = self
            .coef
            .iter()
            .flatten()
            .chain(&self.intercept)
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(ModelError::Invalid(
                "logistic regression has non-finite parameters".to_string(),
            ));
        }
        Ok(())
    }

    fn n_classes(&self) -> usize {
        if self.coef.len() == 1 {
            2
        } else {
            self.coef.len()
        }
    }

    fn predict_class(&self, x: &[f64; N_FEATURES]) -> usize {
        let scores: Vec<f64> = self
            .coef
            .iter()
            .zip(&self.intercept)
            .map(|(row, b)| row.iter().zip(x).map(|(w, v)| w * v).sum::<f64>() + b)
            .collect();

        if scores.len() == 1 {
            usize::from(scores[0] > 0.0)
        } else {
            argmax(&scores)
        }
    }
}

/// Index of the largest value; ties go to the lowest index.
fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v > values[best] {
            best = i;
        }
    }
    best
}
