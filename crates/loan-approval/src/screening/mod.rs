//! Loan screening pipeline: reconcile free-form categorical inputs with the labels the
//! classifier was trained on, assemble the feature record, and map the prediction to a
//! verdict.

pub mod artifact;
pub mod assembler;
pub mod classifier;
pub mod domain;
pub mod encoder;
pub mod inference;
pub mod matcher;
pub mod normalizer;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use artifact::{ArtifactError, ModelBundle, ModelState, ModelSummary};
pub use assembler::{assemble, AssembledRecord, FeatureRecord, MISSING_FEATURE_DEFAULT};
pub use classifier::{Classifier, ClassifierSpec, ModelError, PredictError};
pub use domain::{
    form_fields, FeatureValue, FieldKind, FieldSpec, FormError, LoanApplicationForm, Verdict,
    CATEGORICAL_FIELDS,
};
pub use encoder::{LabelEncoder, LabelEncoders, UnknownLabel};
pub use inference::{infer, InferenceError};
pub use matcher::{match_known_label, UnrecognizedValue, SIMILARITY_THRESHOLD};
pub use normalizer::ValueNormalizer;
pub use router::screening_router;
pub use service::{LoanScreeningService, ScreeningError, ScreeningOutcome};
