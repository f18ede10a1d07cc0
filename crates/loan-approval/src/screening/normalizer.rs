use std::collections::HashMap;

use super::domain::{FeatureValue, PREVIOUS_LOAN_DEFAULTS_ON_FILE};

/// Fixed raw→canonical rewrites applied ahead of label matching.
#[derive(Debug, Clone, Default)]
pub struct ValueNormalizer {
    tables: HashMap<String, HashMap<String, String>>,
}

impl ValueNormalizer {
    /// Rewrites used by the loan form: numeric default flags become "No"/"Yes".
    pub fn standard() -> Self {
        Self::default().with_rewrites(
            PREVIOUS_LOAN_DEFAULTS_ON_FILE,
            [("0", "No"), ("1", "Yes")],
        )
    }

    pub fn with_rewrites<'a, I>(mut self, field: &str, rewrites: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let table = self.tables.entry(field.to_string()).or_default();
        for (raw, canonical) in rewrites {
            table.insert(lookup_key(raw), canonical.to_string());
        }
        self
    }

    /// Return the canonical rewrite for `raw`, or the value untouched when no rule applies.
    pub fn normalize(&self, field: &str, raw: &FeatureValue) -> FeatureValue {
        let Some(table) = self.tables.get(field) else {
            return raw.clone();
        };

        match table.get(&lookup_key(&raw.to_text())) {
            Some(canonical) => FeatureValue::Text(canonical.clone()),
            None => raw.clone(),
        }
    }
}

fn lookup_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_flags_accept_text_and_numbers() {
        let normalizer = ValueNormalizer::standard();
        let field = PREVIOUS_LOAN_DEFAULTS_ON_FILE;

        assert_eq!(
            normalizer.normalize(field, &FeatureValue::from("0")),
            FeatureValue::from("No")
        );
        assert_eq!(
            normalizer.normalize(field, &FeatureValue::Number(0.0)),
            FeatureValue::from("No")
        );
        assert_eq!(
            normalizer.normalize(field, &FeatureValue::from(" 1 ")),
            FeatureValue::from("Yes")
        );
        assert_eq!(
            normalizer.normalize(field, &FeatureValue::Number(1.0)),
            FeatureValue::from("Yes")
        );
    }

    #[test]
    fn unmatched_values_pass_through_unchanged() {
        let normalizer = ValueNormalizer::standard();
        let raw = FeatureValue::from("  yes ");
        assert_eq!(
            normalizer.normalize(PREVIOUS_LOAN_DEFAULTS_ON_FILE, &raw),
            raw
        );

        let fractional = FeatureValue::Number(0.5);
        assert_eq!(
            normalizer.normalize(PREVIOUS_LOAN_DEFAULTS_ON_FILE, &fractional),
            fractional
        );
    }

    #[test]
    fn fields_without_tables_are_untouched() {
        let normalizer = ValueNormalizer::standard();
        let raw = FeatureValue::from("0");
        assert_eq!(normalizer.normalize("person_gender", &raw), raw);
    }

    #[test]
    fn lookup_keys_ignore_case() {
        let normalizer =
            ValueNormalizer::default().with_rewrites("person_gender", [("M", "male")]);
        assert_eq!(
            normalizer.normalize("person_gender", &FeatureValue::from("m")),
            FeatureValue::from("male")
        );
    }
}
