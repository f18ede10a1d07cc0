use std::io::Read;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use super::classifier::{Classifier, ClassifierSpec, ModelError};
use super::domain::is_categorical;
use super::encoder::{LabelEncoder, LabelEncoders};

/// Failures while reading or decoding the model artifact.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("model artifact is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("model artifact has no model entry")]
    MissingModel,
    #[error("invalid label encoder for {field}: {source}")]
    Encoder {
        field: String,
        source: serde_json::Error,
    },
    #[error("invalid model: {0}")]
    Model(#[from] ModelError),
}

/// Classifier and encoders resolved from the artifact, whichever shape it had.
#[derive(Debug)]
pub struct ModelBundle {
    classifier: Box<dyn Classifier>,
    encoders: LabelEncoders,
}

impl ModelBundle {
    pub fn new(classifier: Box<dyn Classifier>, encoders: LabelEncoders) -> Self {
        Self {
            classifier,
            encoders,
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ArtifactError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ArtifactError> {
        let document: Value = serde_json::from_reader(reader)?;
        Self::from_document(document)
    }

    /// Accepts either a bare classifier object or a `{model, label_encoders}` mapping.
    pub fn from_document(document: Value) -> Result<Self, ArtifactError> {
        let (model, encoders) = match document {
            Value::Object(mut map) if map.contains_key("model") || !map.contains_key("kind") => {
                let model = match map.remove("model") {
                    Some(Value::Null) | None => return Err(ArtifactError::MissingModel),
                    Some(model) => model,
                };
                let encoders = match map.remove("label_encoders") {
                    Some(Value::Null) | None => LabelEncoders::new(),
                    Some(raw) => parse_encoders(raw)?,
                };
                (model, encoders)
            }
            bare => (bare, LabelEncoders::new()),
        };

        let spec: ClassifierSpec = serde_json::from_value(model)?;
        Ok(Self::new(spec.build()?, encoders))
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn encoder(&self, field: &str) -> Option<&LabelEncoder> {
        self.encoders.get(field)
    }

    pub fn encoders(&self) -> &LabelEncoders {
        &self.encoders
    }

    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            kind: self.classifier.kind(),
            feature_names: self.classifier.feature_names().map(<[String]>::to_vec),
            known_labels: self
                .encoders
                .iter()
                .map(|(field, encoder)| (field.clone(), encoder.classes().to_vec()))
                .collect(),
        }
    }
}

fn parse_encoders(raw: Value) -> Result<LabelEncoders, ArtifactError> {
    let Value::Object(entries) = raw else {
        return Err(ArtifactError::Encoder {
            field: "label_encoders".to_string(),
            source: serde::de::Error::custom("expected a mapping of field name to encoder"),
        });
    };

    let mut encoders = LabelEncoders::new();
    for (field, value) in entries {
        if !is_categorical(&field) {
            warn!(%field, "ignoring label encoder for a field outside the loan form");
            continue;
        }
        let encoder: LabelEncoder = serde_json::from_value(value).map_err(|source| {
            ArtifactError::Encoder {
                field: field.clone(),
                source,
            }
        })?;
        encoders.insert(field, encoder);
    }
    Ok(encoders)
}

/// Introspection view of a loaded model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub kind: &'static str,
    pub feature_names: Option<Vec<String>>,
    pub known_labels: std::collections::BTreeMap<String, Vec<String>>,
}

/// Outcome of the one-time artifact load at start-up.
#[derive(Debug)]
pub enum ModelState {
    Ready(ModelBundle),
    Unavailable { reason: String },
}

impl ModelState {
    /// Load the artifact, recording a failure instead of aborting the process.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match ModelBundle::from_path(path) {
            Ok(bundle) => {
                let features = bundle
                    .classifier()
                    .feature_names()
                    .map_or(0, <[String]>::len);
                info!(
                    path = %path.display(),
                    kind = bundle.classifier().kind(),
                    features,
                    encoders = bundle.encoders().len(),
                    "loan model loaded"
                );
                if features == 0 {
                    warn!("model does not record its feature names; records pass through unordered");
                }
                ModelState::Ready(bundle)
            }
            Err(err) => {
                error!(path = %path.display(), error = %err, "error loading loan model");
                ModelState::Unavailable {
                    reason: err.to_string(),
                }
            }
        }
    }

    pub fn bundle(&self) -> Option<&ModelBundle> {
        match self {
            ModelState::Ready(bundle) => Some(bundle),
            ModelState::Unavailable { .. } => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.bundle().is_some()
    }
}

impl From<ModelBundle> for ModelState {
    fn from(bundle: ModelBundle) -> Self {
        ModelState::Ready(bundle)
    }
}
