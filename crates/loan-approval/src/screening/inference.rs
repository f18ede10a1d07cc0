use super::assembler::FeatureRecord;
use super::classifier::{Classifier, PredictError};
use super::domain::Verdict;

/// Prediction failure with the feature lists needed to diagnose it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("error during prediction: {reason} (features in data: {attempted:?}; features expected by model: {})", expected_label(.expected))]
pub struct InferenceError {
    pub reason: String,
    pub attempted: Vec<String>,
    pub expected: Option<Vec<String>>,
}

fn expected_label(expected: &Option<Vec<String>>) -> String {
    match expected {
        Some(names) => format!("{names:?}"),
        None => "unavailable".to_string(),
    }
}

/// Score exactly one record and map the first output to a verdict.
pub fn infer(classifier: &dyn Classifier, record: &FeatureRecord) -> Result<Verdict, InferenceError> {
    let failure = |reason: String| InferenceError {
        reason,
        attempted: record.names(),
        expected: classifier.feature_names().map(<[String]>::to_vec),
    };

    let outputs = classifier
        .predict(std::slice::from_ref(record))
        .map_err(|err: PredictError| failure(err.to_string()))?;

    match outputs.first() {
        Some(class) => Ok(Verdict::from_class(*class)),
        None => Err(failure("classifier returned no prediction".to_string())),
    }
}
