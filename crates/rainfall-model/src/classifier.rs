use serde::{Deserialize, Serialize};

use crate::error::PredictFailure;
use crate::tree::{DecisionTree, RandomForest};

/// A trained model mapping one scaled feature row to a class label.
pub trait Classifier: Send + Sync {
    fn predict(&self, features: &[f64]) -> Result<i64, PredictFailure>;
}

/// Serialized classifier, discriminated by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierArtifact {
    LogisticRegression(LogisticRegression),
    DecisionTree(DecisionTree),
    RandomForest(RandomForest),
}

impl Classifier for ClassifierArtifact {
    fn predict(&self, features: &[f64]) -> Result<i64, PredictFailure> {
        match self {
            Self::LogisticRegression(model) => model.predict(features),
            Self::DecisionTree(model) => model.predict(features),
            Self::RandomForest(model) => model.predict(features),
        }
    }
}

/// Binary logistic regression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coef: Vec<f64>,
    pub intercept: f64,
    /// `[negative, positive]`
    #[serde(default = "default_binary_classes")]
    pub classes: [i64; 2],
}

fn default_binary_classes() -> [i64; 2] {
    [0, 1]
}

impl LogisticRegression {
    pub fn decision_function(&self, features: &[f64]) -> Result<f64, PredictFailure> {
        if features.len() != self.coef.len() {
            return Err(PredictFailure::FeatureCount {
                model: "LogisticRegression",
                got: features.len(),
                expected: self.coef.len(),
            });
        }

        let dot: f64 = features.iter().zip(&self.coef).map(|(x, w)| x * w).sum();
        Ok(dot + self.intercept)
    }
}

impl Classifier for LogisticRegression {
    fn predict(&self, features: &[f64]) -> Result<i64, PredictFailure> {
        let score = self.decision_function(features)?;
        Ok(if score > 0.0 {
            self.classes[1]
        } else {
            self.classes[0]
        })
    }
}
