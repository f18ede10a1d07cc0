//! Binary classifiers the screening pipeline can load from an artifact.

mod forest;
mod linear;

use std::fmt;

use serde::Deserialize;

use super::assembler::FeatureRecord;

pub use forest::{DecisionTreeSpec, RandomForestSpec, TreeEnsemble, TreeNode, TreeSpec};
pub use linear::{LogisticRegression, LogisticRegressionSpec};

/// Prediction seam between the pipeline and whatever model the artifact carries.
pub trait Classifier: Send + Sync + fmt::Debug {
    /// Short identifier reported by introspection endpoints.
    fn kind(&self) -> &'static str;

    /// Ordered training columns, when the model recorded them.
    fn feature_names(&self) -> Option<&[String]>;

    /// One class per record; `1` is the approval class.
    fn predict(&self, records: &[FeatureRecord]) -> Result<Vec<i64>, PredictError>;
}

/// Failures raised while scoring a record.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictError {
    #[error("record has {actual} features but the model was fitted with {expected}")]
    ShapeMismatch { expected: usize, actual: usize },
    #[error("feature {feature} must be numeric, got '{value}'")]
    NonNumeric { feature: String, value: String },
    #[error("feature names do not match those seen during fit (expected {expected:?})")]
    FeatureNames { expected: Vec<String> },
}

/// Structural problems found while building a classifier from its serialized form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("{0} model has no parameters")]
    Empty(&'static str),
    #[error("model declares {names} feature names for {width} inputs")]
    FeatureNameCount { names: usize, width: usize },
    #[error("decision threshold must lie strictly between 0 and 1")]
    Threshold,
    #[error("tree {tree}: {detail}")]
    Tree { tree: usize, detail: String },
}

/// Serialized classifier, tagged by `kind`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierSpec {
    LogisticRegression(LogisticRegressionSpec),
    DecisionTree(DecisionTreeSpec),
    RandomForest(RandomForestSpec),
}

impl ClassifierSpec {
    pub fn build(self) -> Result<Box<dyn Classifier>, ModelError> {
        match self {
            ClassifierSpec::LogisticRegression(spec) => {
                Ok(Box::new(LogisticRegression::try_from(spec)?))
            }
            ClassifierSpec::DecisionTree(spec) => Ok(Box::new(TreeEnsemble::try_from(spec)?)),
            ClassifierSpec::RandomForest(spec) => Ok(Box::new(TreeEnsemble::try_from(spec)?)),
        }
    }
}

/// Convert a record into the numeric row a fitted model consumes.
pub(crate) fn numeric_row(
    record: &FeatureRecord,
    width: usize,
    feature_names: Option<&[String]>,
) -> Result<Vec<f64>, PredictError> {
    if record.len() != width {
        return Err(PredictError::ShapeMismatch {
            expected: width,
            actual: record.len(),
        });
    }

    if let Some(expected) = feature_names {
        let matches = record
            .iter()
            .zip(expected)
            .all(|((name, _), fitted)| name == fitted);
        if !matches {
            return Err(PredictError::FeatureNames {
                expected: expected.to_vec(),
            });
        }
    }

    record
        .iter()
        .map(|(name, value)| {
            value.as_number().ok_or_else(|| PredictError::NonNumeric {
                feature: name.to_string(),
                value: value.to_text(),
            })
        })
        .collect()
}

pub(crate) fn check_feature_names(
    names: Option<&Vec<String>>,
    width: usize,
) -> Result<(), ModelError> {
    match names {
        Some(names) if names.len() != width => Err(ModelError::FeatureNameCount {
            names: names.len(),
            width,
        }),
        _ => Ok(()),
    }
}
