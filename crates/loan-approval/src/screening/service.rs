use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::artifact::{ModelBundle, ModelState};
use super::assembler::{assemble, FeatureRecord};
use super::domain::{is_categorical, FeatureValue, FormError, LoanApplicationForm, Verdict};
use super::encoder::UnknownLabel;
use super::inference::{infer, InferenceError};
use super::matcher::{match_known_label, UnrecognizedValue};
use super::normalizer::ValueNormalizer;

/// Result of one successful screening run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreeningOutcome {
    pub verdict: Verdict,
    pub features: FeatureRecord,
    pub defaulted_features: Vec<String>,
    pub evaluated_at: DateTime<Utc>,
}

/// Why a submission could not be screened.
#[derive(Debug, thiserror::Error)]
pub enum ScreeningError {
    #[error("model not loaded properly; check the model file ({reason})")]
    ModelNotLoaded { reason: String },
    #[error(transparent)]
    InvalidInput(#[from] FormError),
    #[error("error processing categorical input: {0}")]
    UnrecognizedValue(#[from] UnrecognizedValue),
    #[error("internal encoder inconsistency: {0}")]
    Encoding(#[from] UnknownLabel),
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

/// Runs the normalize → match → encode → assemble → infer pipeline against the
/// model state loaded at start-up. Holds no per-request state.
pub struct LoanScreeningService {
    model: ModelState,
    normalizer: ValueNormalizer,
}

impl LoanScreeningService {
    pub fn new(model: ModelState) -> Self {
        Self::with_normalizer(model, ValueNormalizer::standard())
    }

    pub fn with_normalizer(model: ModelState, normalizer: ValueNormalizer) -> Self {
        Self {
            model,
            normalizer,
        }
    }

    pub fn model(&self) -> &ModelState {
        &self.model
    }

    /// Screen one applicant form.
    pub fn screen(&self, form: &LoanApplicationForm) -> Result<ScreeningOutcome, ScreeningError> {
        let bundle = match &self.model {
            ModelState::Ready(bundle) => bundle,
            ModelState::Unavailable { reason } => {
                return Err(ScreeningError::ModelNotLoaded {
                    reason: reason.clone(),
                })
            }
        };

        form.validate()?;
        let values = self.reconcile(bundle, form.raw_values())?;

        let assembled = assemble(values, bundle.classifier().feature_names());
        let verdict = infer(bundle.classifier(), &assembled.record)?;

        info!(
            verdict = verdict.label(),
            defaulted = assembled.defaulted.len(),
            "loan application screened"
        );

        Ok(ScreeningOutcome {
            verdict,
            features: assembled.record,
            defaulted_features: assembled.defaulted,
            evaluated_at: Utc::now(),
        })
    }

    /// Normalize, match and encode every categorical value that has a known label set.
    ///
    /// Categorical fields without an encoder keep their trimmed text.
    pub fn reconcile(
        &self,
        bundle: &ModelBundle,
        values: Vec<(String, FeatureValue)>,
    ) -> Result<Vec<(String, FeatureValue)>, ScreeningError> {
        values
            .into_iter()
            .map(|(field, raw)| {
                if !is_categorical(&field) {
                    return Ok((field, raw));
                }

                let trimmed = match raw {
                    FeatureValue::Text(text) => FeatureValue::Text(text.trim().to_string()),
                    number => number,
                };
                let normalized = self.normalizer.normalize(&field, &trimmed);

                let Some(encoder) = bundle.encoder(&field) else {
                    return Ok((field, normalized));
                };

                let label = match_known_label(&field, &normalized, encoder.classes())
                    .inspect_err(|err| warn!(%err, "categorical value rejected"))?;
                let code = encoder.encode(&field, label)?;
                Ok((field, FeatureValue::Number(code as f64)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unloaded_model_short_circuits() {
        let service = LoanScreeningService::new(ModelState::Unavailable {
            reason: "failed to read model artifact".to_string(),
        });
        let err = service
            .screen(&LoanApplicationForm::default())
            .expect_err("model missing");
        assert!(matches!(err, ScreeningError::ModelNotLoaded { .. }));
        assert!(err.to_string().starts_with("model not loaded"));
    }
}
