use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use tracing::warn;

use super::domain::FeatureValue;

/// Value used for features the classifier expects but the form never supplies.
pub const MISSING_FEATURE_DEFAULT: f64 = 0.0;

/// Ordered feature record handed to the classifier for one prediction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureRecord {
    entries: Vec<(String, FeatureValue)>,
}

impl FeatureRecord {
    pub fn new(entries: Vec<(String, FeatureValue)>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.entries
            .iter()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }
}

// Serialized as a list of `{name, value}` pairs so the order survives JSON maps.
impl Serialize for FeatureRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Entry<'a> {
            name: &'a str,
            value: &'a FeatureValue,
        }

        let mut seq = serializer.serialize_seq(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            seq.serialize_element(&Entry { name, value })?;
        }
        seq.end()
    }
}

/// Assembled record plus the expected features that had to be defaulted.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledRecord {
    pub record: FeatureRecord,
    pub defaulted: Vec<String>,
}

/// Arrange reconciled values into the classifier's expected order.
///
/// Without expected-feature metadata the values pass through in supplied order.
/// Supplied values the classifier does not expect are dropped; expected features
/// with no supplied value are filled with [`MISSING_FEATURE_DEFAULT`]. A zero is not
/// neutral for every feature, so each defaulted name is logged and reported.
pub fn assemble(
    values: Vec<(String, FeatureValue)>,
    expected: Option<&[String]>,
) -> AssembledRecord {
    let Some(expected) = expected else {
        return AssembledRecord {
            record: FeatureRecord::new(values),
            defaulted: Vec::new(),
        };
    };

    let mut supplied = values;
    let mut entries = Vec::with_capacity(expected.len());
    let mut defaulted = Vec::new();

    for name in expected {
        match supplied.iter().position(|(candidate, _)| candidate == name) {
            Some(index) => {
                let (_, value) = supplied.swap_remove(index);
                entries.push((name.clone(), value));
            }
            None => {
                warn!(feature = %name, "expected feature missing from form; defaulting to 0");
                defaulted.push(name.clone());
                entries.push((
                    name.clone(),
                    FeatureValue::Number(MISSING_FEATURE_DEFAULT),
                ));
            }
        }
    }

    AssembledRecord {
        record: FeatureRecord::new(entries),
        defaulted,
    }
}
