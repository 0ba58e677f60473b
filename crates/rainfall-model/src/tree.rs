//! Tree classifiers stored as flat node arrays.
//!
//! Node `i` is a leaf when `children_left[i] < 0`. Otherwise the walk goes
//! left when `x[feature[i]] <= threshold[i]`. `value[i]` holds per-class
//! weights for the node, in `classes` order.

use serde::{Deserialize, Serialize};

use crate::classifier::Classifier;
use crate::error::PredictFailure;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub n_features: usize,
    pub classes: Vec<i64>,
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<Vec<f64>>,
}

impl DecisionTree {
    /// Class probabilities at the leaf reached by `features`.
    pub fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, PredictFailure> {
        check_width("DecisionTreeClassifier", features, self.n_features)?;
        self.validate()?;

        let leaf = self.leaf(features)?;
        let weights = &self.value[leaf];
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Err(PredictFailure::Malformed(format!("leaf {} has no weight", leaf)));
        }

        Ok(weights.iter().map(|w| w / total).collect())
    }

    fn validate(&self) -> Result<(), PredictFailure> {
        let nodes = self.children_left.len();
        if nodes == 0 {
            return Err(PredictFailure::Malformed("tree has no nodes".into()));
        }
        if self.children_right.len() != nodes
            || self.feature.len() != nodes
            || self.threshold.len() != nodes
            || self.value.len() != nodes
        {
            return Err(PredictFailure::Malformed("node arrays differ in length".into()));
        }
        if self.value.iter().any(|row| row.len() != self.classes.len()) {
            return Err(PredictFailure::Malformed(
                "node values do not match the class count".into(),
            ));
        }
        Ok(())
    }

    fn leaf(&self, features: &[f64]) -> Result<usize, PredictFailure> {
        let nodes = self.children_left.len();
        let mut node = 0usize;

        // a well-formed tree reaches a leaf in fewer steps than it has nodes
        for _ in 0..nodes {
            let left = self.children_left[node];
            if left < 0 {
                return Ok(node);
            }

            let column = usize::try_from(self.feature[node])
                .ok()
                .filter(|&c| c < features.len())
                .ok_or_else(|| {
                    PredictFailure::Malformed(format!("node {} splits on an invalid feature", node))
                })?;

            let next = if features[column] <= self.threshold[node] {
                left
            } else {
                self.children_right[node]
            };

            node = usize::try_from(next)
                .ok()
                .filter(|&n| n < nodes)
                .ok_or_else(|| {
                    PredictFailure::Malformed(format!("node {} has an invalid child", node))
                })?;
        }

        Err(PredictFailure::Malformed("tree contains a cycle".into()))
    }
}

impl Classifier for DecisionTree {
    fn predict(&self, features: &[f64]) -> Result<i64, PredictFailure> {
        let proba = self.predict_proba(features)?;
        pick_class(&self.classes, &proba)
    }
}

/// Averages the class probabilities of its trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub n_features: usize,
    pub classes: Vec<i64>,
    pub trees: Vec<DecisionTree>,
}

impl Classifier for RandomForest {
    fn predict(&self, features: &[f64]) -> Result<i64, PredictFailure> {
        check_width("RandomForestClassifier", features, self.n_features)?;
        if self.trees.is_empty() {
            return Err(PredictFailure::Malformed("forest has no trees".into()));
        }

        let mut summed = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            let proba = tree.predict_proba(features)?;
            if proba.len() != summed.len() {
                return Err(PredictFailure::Malformed(
                    "tree class count differs from the forest".into(),
                ));
            }
            for (total, p) in summed.iter_mut().zip(proba) {
                *total += p;
            }
        }

        pick_class(&self.classes, &summed)
    }
}

fn check_width(
    model: &'static str,
    features: &[f64],
    expected: usize,
) -> Result<(), PredictFailure> {
    if features.len() != expected {
        return Err(PredictFailure::FeatureCount {
            model,
            got: features.len(),
            expected,
        });
    }
    Ok(())
}

/// Highest-scoring class; ties go to the earliest class.
fn pick_class(classes: &[i64], scores: &[f64]) -> Result<i64, PredictFailure> {
    let mut best: Option<(usize, f64)> = None;
    for (index, &score) in scores.iter().enumerate() {
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((index, score));
        }
    }

    best.and_then(|(index, _)| classes.get(index).copied())
        .ok_or_else(|| PredictFailure::Malformed("model has no classes".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Splits on feature 0 at 0.5; left leaf votes no rain, right leaf rain.
    fn stump(left: [f64; 2], right: [f64; 2]) -> DecisionTree {
        DecisionTree {
            n_features: 2,
            classes: vec![0, 1],
            children_left: vec![1, -1, -1],
            children_right: vec![2, -1, -1],
            feature: vec![0, -2, -2],
            threshold: vec![0.5, -2.0, -2.0],
            value: vec![vec![5.0, 5.0], left.to_vec(), right.to_vec()],
        }
    }

    #[test]
    fn test_tree_walks_left_on_equal_threshold() {
        let tree = stump([9.0, 1.0], [2.0, 8.0]);
        assert_eq!(tree.predict(&[0.5, 100.0]).unwrap(), 0);
        assert_eq!(tree.predict(&[0.6, 100.0]).unwrap(), 1);
    }

    #[test]
    fn test_tree_proba_is_normalized() {
        let tree = stump([3.0, 1.0], [0.0, 4.0]);
        assert_eq!(tree.predict_proba(&[0.0, 0.0]).unwrap(), vec![0.75, 0.25]);
    }

    #[test]
    fn test_tree_width_mismatch() {
        let err = stump([1.0, 0.0], [0.0, 1.0]).predict(&[1.0]).unwrap_err();
        assert!(matches!(err, PredictFailure::FeatureCount { expected: 2, got: 1, .. }));
    }

    #[test]
    fn test_tree_cycle_is_malformed() {
        let mut tree = stump([1.0, 0.0], [0.0, 1.0]);
        tree.children_right[0] = 0;
        let err = tree.predict(&[1.0, 0.0]).unwrap_err();
        assert!(matches!(err, PredictFailure::Malformed(_)));
    }

    #[test]
    fn test_tree_invalid_feature_is_malformed() {
        let mut tree = stump([1.0, 0.0], [0.0, 1.0]);
        tree.feature[0] = 7;
        assert!(tree.predict(&[1.0, 0.0]).is_err());
    }

    #[test]
    fn test_forest_averages_trees() {
        let forest = RandomForest {
            n_features: 2,
            classes: vec![0, 1],
            trees: vec![
                stump([6.0, 4.0], [0.0, 1.0]),
                stump([0.0, 10.0], [0.0, 1.0]),
                stump([10.0, 0.0], [0.0, 1.0]),
            ],
        };
        // left leaves: 0.6+0.0+1.0 = 1.6 vs 0.4+1.0+0.0 = 1.4
        assert_eq!(forest.predict(&[0.0, 0.0]).unwrap(), 0);
        assert_eq!(forest.predict(&[1.0, 0.0]).unwrap(), 1);
    }

    #[test]
    fn test_forest_tie_goes_to_first_class() {
        let forest = RandomForest {
            n_features: 2,
            classes: vec![0, 1],
            trees: vec![stump([1.0, 1.0], [0.0, 1.0])],
        };
        assert_eq!(forest.predict(&[0.0, 0.0]).unwrap(), 0);
    }

    #[test]
    fn test_empty_forest_is_malformed() {
        let forest = RandomForest {
            n_features: 1,
            classes: vec![0, 1],
            trees: Vec::new(),
        };
        assert!(matches!(forest.predict(&[0.0]), Err(PredictFailure::Malformed(_))));
    }
}
