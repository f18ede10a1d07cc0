//! Approximate matching of free-form categorical input against training labels.
//!
//! Closeness is the gestalt (Ratcliff/Obershelp) ratio `2·M / (|a| + |b|)`, where
//! `M` counts the characters covered by the longest common block of both strings
//! plus, recursively, the blocks found to its left and right.

use super::domain::FeatureValue;

/// Minimum ratio a candidate label needs before it is accepted.
pub const SIMILARITY_THRESHOLD: f64 = 0.8;

/// No known label came close enough to the supplied value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized value '{value}' for {field}")]
pub struct UnrecognizedValue {
    pub field: String,
    pub value: String,
}

/// Resolve `raw` to the closest entry of `known_labels`, keeping the label's casing.
///
/// Comparison is case-insensitive on trimmed text, with the label as the first
/// sequence of the ratio; the block search is not symmetric. The first label with the highest
/// ratio wins, so equally close labels resolve in declared order.
pub fn match_known_label<'a>(
    field: &str,
    raw: &FeatureValue,
    known_labels: &'a [String],
) -> Result<&'a str, UnrecognizedValue> {
    let needle: Vec<char> = raw.to_text().trim().to_lowercase().chars().collect();

    let mut best: Option<(&'a str, f64)> = None;
    for label in known_labels {
        let candidate: Vec<char> = label.trim().to_lowercase().chars().collect();
        let score = similarity_ratio(&candidate, &needle);
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((label.as_str(), score));
        }
    }

    match best {
        Some((label, score)) if score >= SIMILARITY_THRESHOLD => Ok(label),
        _ => Err(UnrecognizedValue {
            field: field.to_string(),
            value: raw.to_text(),
        }),
    }
}

/// Similarity of two strings on a 0–1 scale; two empty strings are identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    similarity_ratio(&a, &b)
}

fn similarity_ratio(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_characters(a, b) as f64 / total as f64
}

fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((a_lo, a_hi, b_lo, b_hi)) = pending.pop() {
        let (i, j, size) = longest_common_block(a, b, a_lo, a_hi, b_lo, b_hi);
        if size == 0 {
            continue;
        }
        matched += size;
        if a_lo < i && b_lo < j {
            pending.push((a_lo, i, b_lo, j));
        }
        if i + size < a_hi && j + size < b_hi {
            pending.push((i + size, a_hi, j + size, b_hi));
        }
    }

    matched
}

/// Longest run shared by `a[a_lo..a_hi]` and `b[b_lo..b_hi]`.
///
/// Among runs of equal length the one starting earliest in `a`, then in `b`, is returned.
fn longest_common_block(
    a: &[char],
    b: &[char],
    a_lo: usize,
    a_hi: usize,
    b_lo: usize,
    b_hi: usize,
) -> (usize, usize, usize) {
    let width = b_hi - b_lo;
    let mut best = (a_lo, b_lo, 0);
    let mut previous = vec![0usize; width + 1];
    let mut current = vec![0usize; width + 1];

    for i in a_lo..a_hi {
        for offset in 0..width {
            let j = b_lo + offset;
            current[offset + 1] = if a[i] == b[j] { previous[offset] + 1 } else { 0 };
            let run = current[offset + 1];
            if run > best.2 {
                best = (i + 1 - run, j + 1 - run, run);
            }
        }
        std::mem::swap(&mut previous, &mut current);
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn exact_labels_match_regardless_of_case_and_padding() {
        let known = labels(&["MORTGAGE", "OTHER", "OWN", "RENT"]);
        for raw in ["rent", "RENT", "  Rent  ", "rEnT"] {
            let matched = match_known_label("person_home_ownership", &raw.into(), &known)
                .expect("exact label matches");
            assert_eq!(matched, "RENT");
        }
    }

    #[test]
    fn close_misspellings_are_accepted() {
        let known = labels(&["Associate", "Bachelor", "Doctorate", "High School", "Master"]);
        assert_eq!(
            match_known_label("person_education", &"Bachelors".into(), &known),
            Ok("Bachelor")
        );
        assert_eq!(
            match_known_label("person_education", &"highschool".into(), &known),
            Ok("High School")
        );
        assert_eq!(
            match_known_label("person_education", &"Mastr".into(), &known),
            Ok("Master")
        );
    }

    #[test]
    fn distant_values_fail_with_field_and_raw_value() {
        let known = labels(&[
            "DEBTCONSOLIDATION",
            "EDUCATION",
            "HOMEIMPROVEMENT",
            "MEDICAL",
            "PERSONAL",
            "VENTURE",
        ]);
        let err = match_known_label("loan_intent", &"xyz".into(), &known)
            .expect_err("no label is close");
        assert_eq!(err.field, "loan_intent");
        assert_eq!(err.value, "xyz");
        assert!(err.to_string().contains("loan_intent"));

        let known = labels(&["Doctorate"]);
        assert!(match_known_label("person_education", &"Doc".into(), &known).is_err());
    }

    #[test]
    fn empty_label_set_never_matches() {
        assert!(match_known_label("person_gender", &"male".into(), &[]).is_err());
    }

    #[test]
    fn ties_resolve_in_declared_order() {
        let forward = labels(&["abcdefghix", "abcdefghiy"]);
        let backward = labels(&["abcdefghiy", "abcdefghix"]);
        assert_eq!(
            match_known_label("field", &"abcdefghiz".into(), &forward),
            Ok("abcdefghix")
        );
        assert_eq!(
            match_known_label("field", &"abcdefghiz".into(), &backward),
            Ok("abcdefghiy")
        );
    }

    #[test]
    fn gender_labels_prefer_the_longer_match() {
        let known = labels(&["female", "male"]);
        assert_eq!(
            match_known_label("person_gender", &"Male".into(), &known),
            Ok("male")
        );
        assert_eq!(
            match_known_label("person_gender", &"femal".into(), &known),
            Ok("female")
        );
    }

    #[test]
    fn ratio_counts_recursive_blocks() {
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("abc", ""), 0.0);
        assert_eq!(similarity("rent", "rent"), 1.0);
        assert!((similarity("abcd", "bcde") - 0.75).abs() < 1e-9);
        // "mast" then "r" on the right-hand remainder
        assert!((similarity("mastr", "master") - 10.0 / 11.0).abs() < 1e-9);
    }

    #[test]
    fn label_is_the_first_sequence_of_the_ratio() {
        let known = labels(&["MORTGAGE", "OTHER", "OWN", "RENT"]);
        assert_eq!(
            match_known_label("person_home_ownership", &"mortgeae".into(), &known),
            Ok("MORTGAGE")
        );
        assert!(match_known_label("person_home_ownership", &"morgatge".into(), &known).is_err());

        assert!((similarity("mortgage", "mortgeae") - 0.875).abs() < 1e-9);
        assert!((similarity("mortgage", "morgatge") - 0.75).abs() < 1e-9);
    }

    #[test]
    fn ratio_exactly_at_threshold_is_accepted() {
        let known = labels(&["Master"]);
        assert_eq!(similarity("master", "mast"), SIMILARITY_THRESHOLD);
        assert_eq!(
            match_known_label("person_education", &"mast".into(), &known),
            Ok("Master")
        );

        // 8/11
        assert!(similarity("master", "mastx") < SIMILARITY_THRESHOLD);
        assert!(match_known_label("person_education", &"mastx".into(), &known).is_err());
    }

    #[test]
    fn numeric_inputs_are_matched_as_text() {
        let known = labels(&["No", "Yes"]);
        let raw = FeatureValue::Number(0.0);
        assert!(match_known_label("previous_loan_defaults_on_file", &raw, &known).is_err());
    }
}
