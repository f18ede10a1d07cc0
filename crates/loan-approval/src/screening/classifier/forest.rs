use serde::Deserialize;

use super::{check_feature_names, numeric_row, Classifier, ModelError, PredictError};
use crate::screening::assembler::FeatureRecord;

/// Node of a fitted tree. Nodes are addressed by index with the root at 0;
/// `row[feature] <= threshold` descends left.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        probability: f64,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct TreeSpec {
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DecisionTreeSpec {
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    pub n_features: usize,
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RandomForestSpec {
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    pub n_features: usize,
    pub trees: Vec<TreeSpec>,
}

/// One or more trees voting by mean leaf probability of the approval class.
#[derive(Debug, Clone)]
pub struct TreeEnsemble {
    kind: &'static str,
    feature_names: Option<Vec<String>>,
    n_features: usize,
    trees: Vec<Vec<TreeNode>>,
}

impl TreeEnsemble {
    fn build(
        kind: &'static str,
        feature_names: Option<Vec<String>>,
        n_features: usize,
        trees: Vec<Vec<TreeNode>>,
    ) -> Result<Self, ModelError> {
        if trees.is_empty() || n_features == 0 {
            return Err(ModelError::Empty(kind));
        }
        check_feature_names(feature_names.as_ref(), n_features)?;
        for (index, nodes) in trees.iter().enumerate() {
            validate_tree(nodes, n_features).map_err(|detail| ModelError::Tree {
                tree: index,
                detail,
            })?;
        }

        Ok(Self {
            kind,
            feature_names,
            n_features,
            trees,
        })
    }

    pub fn probability(&self, row: &[f64]) -> f64 {
        let total: f64 = self.trees.iter().map(|nodes| leaf_probability(nodes, row)).sum();
        total / self.trees.len() as f64
    }
}

impl TryFrom<DecisionTreeSpec> for TreeEnsemble {
    type Error = ModelError;

    fn try_from(spec: DecisionTreeSpec) -> Result<Self, Self::Error> {
        Self::build(
            "decision_tree",
            spec.feature_names,
            spec.n_features,
            vec![spec.nodes],
        )
    }
}

impl TryFrom<RandomForestSpec> for TreeEnsemble {
    type Error = ModelError;

    fn try_from(spec: RandomForestSpec) -> Result<Self, Self::Error> {
        Self::build(
            "random_forest",
            spec.feature_names,
            spec.n_features,
            spec.trees.into_iter().map(|tree| tree.nodes).collect(),
        )
    }
}

impl Classifier for TreeEnsemble {
    fn kind(&self) -> &'static str {
        self.kind
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn predict(&self, records: &[FeatureRecord]) -> Result<Vec<i64>, PredictError> {
        records
            .iter()
            .map(|record| {
                let row = numeric_row(record, self.n_features, self.feature_names())?;
                Ok(i64::from(self.probability(&row) > 0.5))
            })
            .collect()
    }
}

// Children must sit after their parent, so traversal always terminates.
fn validate_tree(nodes: &[TreeNode], n_features: usize) -> Result<(), String> {
    if nodes.is_empty() {
        return Err("tree has no nodes".to_string());
    }

    for (index, node) in nodes.iter().enumerate() {
        match node {
            TreeNode::Split {
                feature,
                left,
                right,
                ..
            } => {
                if *feature >= n_features {
                    return Err(format!(
                        "node {index} splits on feature {feature} of {n_features}"
                    ));
                }
                for child in [*left, *right] {
                    if child <= index || child >= nodes.len() {
                        return Err(format!("node {index} has invalid child {child}"));
                    }
                }
            }
            TreeNode::Leaf { probability } => {
                if !(0.0..=1.0).contains(probability) {
                    return Err(format!(
                        "node {index} leaf probability {probability} is outside [0, 1]"
                    ));
                }
            }
        }
    }

    Ok(())
}

fn leaf_probability(nodes: &[TreeNode], row: &[f64]) -> f64 {
    let mut index = 0;
    loop {
        match &nodes[index] {
            TreeNode::Leaf { probability } => return *probability,
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                index = if row[*feature] <= *threshold {
                    *left
                } else {
                    *right
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screening::domain::FeatureValue;

    fn stump(feature: usize, threshold: f64, left: f64, right: f64) -> Vec<TreeNode> {
        vec![
            TreeNode::Split {
                feature,
                threshold,
                left: 1,
                right: 2,
            },
            TreeNode::Leaf { probability: left },
            TreeNode::Leaf { probability: right },
        ]
    }

    fn record(defaults: f64, score: f64) -> FeatureRecord {
        FeatureRecord::new(vec![
            (
                "previous_loan_defaults_on_file".to_string(),
                FeatureValue::Number(defaults),
            ),
            ("credit_score".to_string(), FeatureValue::Number(score)),
        ])
    }

    #[test]
    fn forest_averages_tree_probabilities() {
        let forest = TreeEnsemble::try_from(RandomForestSpec {
            feature_names: None,
            n_features: 2,
            trees: vec![
                TreeSpec {
                    nodes: stump(0, 0.5, 0.9, 0.0),
                },
                TreeSpec {
                    nodes: stump(1, 650.0, 0.2, 0.8),
                },
            ],
        })
        .expect("forest builds");

        assert_eq!(forest.kind(), "random_forest");
        let classes = forest
            .predict(&[record(0.0, 700.0), record(1.0, 700.0), record(0.0, 600.0)])
            .expect("prediction succeeds");
        // (0.9 + 0.8) / 2, (0.0 + 0.8) / 2, (0.9 + 0.2) / 2
        assert_eq!(classes, vec![1, 0, 1]);
    }

    #[test]
    fn single_tree_uses_left_branch_on_equal_threshold() {
        let tree = TreeEnsemble::try_from(DecisionTreeSpec {
            feature_names: None,
            n_features: 2,
            nodes: stump(1, 700.0, 1.0, 0.0),
        })
        .expect("tree builds");
        assert_eq!(tree.kind(), "decision_tree");
        assert_eq!(tree.predict(&[record(0.0, 700.0)]), Ok(vec![1]));
        assert_eq!(tree.predict(&[record(0.0, 700.5)]), Ok(vec![0]));
    }

    #[test]
    fn malformed_trees_are_rejected_at_build_time() {
        let cyclic = vec![
            TreeNode::Split {
                feature: 0,
                threshold: 0.5,
                left: 0,
                right: 1,
            },
            TreeNode::Leaf { probability: 1.0 },
        ];
        let err = TreeEnsemble::try_from(DecisionTreeSpec {
            feature_names: None,
            n_features: 1,
            nodes: cyclic,
        })
        .expect_err("cycle rejected");
        assert!(matches!(err, ModelError::Tree { tree: 0, .. }));

        let err = TreeEnsemble::try_from(DecisionTreeSpec {
            feature_names: None,
            n_features: 1,
            nodes: stump(3, 0.5, 1.0, 0.0),
        })
        .expect_err("feature index out of range");
        assert!(err.to_string().contains("feature 3"));

        let err = TreeEnsemble::try_from(RandomForestSpec {
            feature_names: None,
            n_features: 1,
            trees: Vec::new(),
        })
        .expect_err("empty forest");
        assert_eq!(err, ModelError::Empty("random_forest"));
    }

    #[test]
    fn nodes_deserialize_from_tagged_json() {
        let spec: DecisionTreeSpec = serde_json::from_str(
            r#"{
                "n_features": 1,
                "nodes": [
                    {"type": "split", "feature": 0, "threshold": 0.5, "left": 1, "right": 2},
                    {"type": "leaf", "probability": 0.75},
                    {"type": "leaf", "probability": 0.1}
                ]
            }"#,
        )
        .expect("tree parses");
        assert_eq!(spec.nodes[1], TreeNode::Leaf { probability: 0.75 });
    }
}
