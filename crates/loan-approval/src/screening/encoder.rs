use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Per-field label table; a label's integer code is its position in `classes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            classes: classes.into_iter().map(Into::into).collect(),
        }
    }

    /// Known canonical labels in the order the encoder declares them.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn encode(&self, field: &str, label: &str) -> Result<i64, UnknownLabel> {
        self.classes
            .iter()
            .position(|class| class == label)
            .map(|code| code as i64)
            .ok_or_else(|| UnknownLabel {
                field: field.to_string(),
                label: label.to_string(),
            })
    }
}

/// Encoders keyed by field name, as shipped alongside the classifier.
pub type LabelEncoders = BTreeMap<String, LabelEncoder>;

/// A matched label is missing from its own encoder: the artifact is inconsistent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("label '{label}' is not encodable for {field}")]
pub struct UnknownLabel {
    pub field: String,
    pub label: String,
}
