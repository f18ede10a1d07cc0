use serde::Deserialize;

use super::{check_feature_names, numeric_row, Classifier, ModelError, PredictError};
use crate::screening::assembler::FeatureRecord;

fn default_threshold() -> f64 {
    0.5
}

/// Serialized logistic regression weights.
#[derive(Debug, Clone, Deserialize)]
pub struct LogisticRegressionSpec {
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

/// Linear model; predicts approval when `sigmoid(w·x + b)` exceeds the threshold.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    feature_names: Option<Vec<String>>,
    coefficients: Vec<f64>,
    intercept: f64,
    threshold: f64,
}

impl LogisticRegression {
    pub fn probability(&self, row: &[f64]) -> f64 {
        let margin = self
            .coefficients
            .iter()
            .zip(row)
            .map(|(weight, value)| weight * value)
            .sum::<f64>()
            + self.intercept;
        1.0 / (1.0 + (-margin).exp())
    }
}

impl TryFrom<LogisticRegressionSpec> for LogisticRegression {
    type Error = ModelError;

    fn try_from(spec: LogisticRegressionSpec) -> Result<Self, Self::Error> {
        if spec.coefficients.is_empty() {
            return Err(ModelError::Empty("logistic_regression"));
        }
        check_feature_names(spec.feature_names.as_ref(), spec.coefficients.len())?;
        if !(spec.threshold > 0.0 && spec.threshold < 1.0) {
            return Err(ModelError::Threshold);
        }

        Ok(Self {
            feature_names: spec.feature_names,
            coefficients: spec.coefficients,
            intercept: spec.intercept,
            threshold: spec.threshold,
        })
    }
}

impl Classifier for LogisticRegression {
    fn kind(&self) -> &'static str {
        "logistic_regression"
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn predict(&self, records: &[FeatureRecord]) -> Result<Vec<i64>, PredictError> {
        records
            .iter()
            .map(|record| {
                let row = numeric_row(record, self.coefficients.len(), self.feature_names())?;
                Ok(i64::from(self.probability(&row) > self.threshold))
            })
            .collect()
    }
}
