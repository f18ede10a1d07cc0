use std::fmt;

use serde::{Deserialize, Serialize};

pub const PERSON_AGE: &str = "person_age";
pub const PERSON_INCOME: &str = "person_income";
pub const PERSON_EMP_EXP: &str = "person_emp_exp";
pub const PERSON_HOME_OWNERSHIP: &str = "person_home_ownership";
pub const PERSON_EDUCATION: &str = "person_education";
pub const PERSON_GENDER: &str = "person_gender";
pub const LOAN_AMNT: &str = "loan_amnt";
pub const LOAN_INTENT: &str = "loan_intent";
pub const LOAN_INT_RATE: &str = "loan_int_rate";
pub const LOAN_PERCENT_INCOME: &str = "loan_percent_income";
pub const CB_PERSON_CRED_HIST_LENGTH: &str = "cb_person_cred_hist_length";
pub const CREDIT_SCORE: &str = "credit_score";
pub const PREVIOUS_LOAN_DEFAULTS_ON_FILE: &str = "previous_loan_defaults_on_file";

/// Fields reconciled against the classifier's known training labels.
pub const CATEGORICAL_FIELDS: [&str; 5] = [
    PERSON_GENDER,
    PERSON_EDUCATION,
    PERSON_HOME_OWNERSHIP,
    LOAN_INTENT,
    PREVIOUS_LOAN_DEFAULTS_ON_FILE,
];

pub fn is_categorical(field: &str) -> bool {
    CATEGORICAL_FIELDS.contains(&field)
}

/// Single cell of a feature record: either a number or categorical text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Text(String),
}

impl FeatureValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FeatureValue::Number(value) => Some(*value),
            FeatureValue::Text(_) => None,
        }
    }

    /// Text rendering used before lookups; integral numbers render without a fraction.
    pub fn to_text(&self) -> String {
        match self {
            FeatureValue::Text(text) => text.clone(),
            FeatureValue::Number(value) => value.to_string(),
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<&str> for FeatureValue {
    fn from(value: &str) -> Self {
        FeatureValue::Text(value.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(value: String) -> Self {
        FeatureValue::Text(value)
    }
}

impl From<f64> for FeatureValue {
    fn from(value: f64) -> Self {
        FeatureValue::Number(value)
    }
}

impl From<i64> for FeatureValue {
    fn from(value: i64) -> Self {
        FeatureValue::Number(value as f64)
    }
}

/// Binary outcome shown to the applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Approved,
    NotApproved,
}

impl Verdict {
    pub fn from_class(class: i64) -> Self {
        if class == 1 {
            Verdict::Approved
        } else {
            Verdict::NotApproved
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Verdict::Approved => "Approved",
            Verdict::NotApproved => "Not Approved",
        }
    }

    pub fn is_approved(self) -> bool {
        matches!(self, Verdict::Approved)
    }
}

/// Applicant inputs collected by the loan form. Omitted fields take the form defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoanApplicationForm {
    pub age: i64,
    pub income: i64,
    pub experience: i64,
    pub home_ownership: FeatureValue,
    pub education: FeatureValue,
    pub gender: FeatureValue,
    pub loan_amount: i64,
    pub loan_purpose: FeatureValue,
    pub interest_rate: f64,
    pub loan_percent_income: f64,
    pub credit_history_length: i64,
    pub credit_score: i64,
    pub previous_defaults: FeatureValue,
}

impl Default for LoanApplicationForm {
    fn default() -> Self {
        Self {
            age: 30,
            income: 50_000,
            experience: 5,
            home_ownership: "RENT".into(),
            education: "High School".into(),
            gender: "Male".into(),
            loan_amount: 10_000,
            loan_purpose: "PERSONAL".into(),
            interest_rate: 10.5,
            loan_percent_income: 0.2,
            credit_history_length: 5,
            credit_score: 700,
            previous_defaults: "No".into(),
        }
    }
}

impl LoanApplicationForm {
    /// Check every numeric input against the bounds advertised by the form.
    pub fn validate(&self) -> Result<(), FormError> {
        for (field, value, (min, max)) in self.numeric_inputs() {
            check_range(field, value, min, max)?;
        }
        Ok(())
    }

    /// Raw record in form order, keyed by the classifier's training column names.
    pub fn raw_values(&self) -> Vec<(String, FeatureValue)> {
        vec![
            (PERSON_AGE.to_string(), self.age.into()),
            (PERSON_INCOME.to_string(), self.income.into()),
            (PERSON_EMP_EXP.to_string(), self.experience.into()),
            (
                PERSON_HOME_OWNERSHIP.to_string(),
                self.home_ownership.clone(),
            ),
            (PERSON_EDUCATION.to_string(), self.education.clone()),
            (PERSON_GENDER.to_string(), self.gender.clone()),
            (LOAN_AMNT.to_string(), self.loan_amount.into()),
            (LOAN_INTENT.to_string(), self.loan_purpose.clone()),
            (LOAN_INT_RATE.to_string(), self.interest_rate.into()),
            (
                LOAN_PERCENT_INCOME.to_string(),
                self.loan_percent_income.into(),
            ),
            (
                CB_PERSON_CRED_HIST_LENGTH.to_string(),
                self.credit_history_length.into(),
            ),
            (CREDIT_SCORE.to_string(), self.credit_score.into()),
            (
                PREVIOUS_LOAN_DEFAULTS_ON_FILE.to_string(),
                self.previous_defaults.clone(),
            ),
        ]
    }

    fn numeric_inputs(&self) -> [(&'static str, f64, (f64, f64)); 8] {
        let whole = |(min, max): (i64, i64)| (min as f64, max as f64);
        [
            (PERSON_AGE, self.age as f64, whole(AGE_BOUNDS)),
            (PERSON_INCOME, self.income as f64, whole(INCOME_BOUNDS)),
            (PERSON_EMP_EXP, self.experience as f64, whole(EXPERIENCE_BOUNDS)),
            (LOAN_AMNT, self.loan_amount as f64, whole(LOAN_AMOUNT_BOUNDS)),
            (LOAN_INT_RATE, self.interest_rate, INTEREST_RATE_BOUNDS),
            (LOAN_PERCENT_INCOME, self.loan_percent_income, PERCENT_INCOME_BOUNDS),
            (
                CB_PERSON_CRED_HIST_LENGTH,
                self.credit_history_length as f64,
                whole(CREDIT_HISTORY_BOUNDS),
            ),
            (CREDIT_SCORE, self.credit_score as f64, whole(CREDIT_SCORE_BOUNDS)),
        ]
    }
}

const AGE_BOUNDS: (i64, i64) = (18, 100);
const INCOME_BOUNDS: (i64, i64) = (1_000, 1_000_000);
const EXPERIENCE_BOUNDS: (i64, i64) = (0, 50);
const LOAN_AMOUNT_BOUNDS: (i64, i64) = (500, 500_000);
const INTEREST_RATE_BOUNDS: (f64, f64) = (0.0, 100.0);
const PERCENT_INCOME_BOUNDS: (f64, f64) = (0.0, 1.0);
const CREDIT_HISTORY_BOUNDS: (i64, i64) = (1, 50);
const CREDIT_SCORE_BOUNDS: (i64, i64) = (300, 850);

fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<(), FormError> {
    if value.is_nan() || value < min || value > max {
        return Err(FormError::OutOfRange {
            field: field.to_string(),
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Rejections raised before any reconciliation happens.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormError {
    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Widget shape for a single form input.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Integer { min: i64, max: i64, default: i64 },
    Decimal { min: f64, max: f64, default: f64 },
    Choice { options: &'static [&'static str] },
}

impl FieldKind {
    fn integer((min, max): (i64, i64), default: i64) -> Self {
        FieldKind::Integer { min, max, default }
    }

    fn decimal((min, max): (f64, f64), default: f64) -> Self {
        FieldKind::Decimal { min, max, default }
    }
}

/// Descriptor a front end can use to render one form input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    #[serde(flatten)]
    pub kind: FieldKind,
}

pub const HOME_OWNERSHIP_OPTIONS: &[&str] = &["RENT", "OWN", "MORTGAGE", "OTHER"];
pub const EDUCATION_OPTIONS: &[&str] =
    &["High School", "Bachelor", "Master", "Doctorate", "Associate"];
pub const GENDER_OPTIONS: &[&str] = &["Male", "Female"];
pub const LOAN_INTENT_OPTIONS: &[&str] = &[
    "PERSONAL",
    "EDUCATION",
    "MEDICAL",
    "VENTURE",
    "HOMEIMPROVEMENT",
    "DEBTCONSOLIDATION",
];
pub const PREVIOUS_DEFAULTS_OPTIONS: &[&str] = &["No", "Yes"];

/// The thirteen inputs of the loan form, in display order.
pub fn form_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec {
            name: PERSON_AGE,
            label: "Age",
            kind: FieldKind::integer(AGE_BOUNDS, 30),
        },
        FieldSpec {
            name: PERSON_INCOME,
            label: "Annual Income ($)",
            kind: FieldKind::integer(INCOME_BOUNDS, 50_000),
        },
        FieldSpec {
            name: PERSON_EMP_EXP,
            label: "Employment Experience (years)",
            kind: FieldKind::integer(EXPERIENCE_BOUNDS, 5),
        },
        FieldSpec {
            name: PERSON_HOME_OWNERSHIP,
            label: "Home Ownership",
            kind: FieldKind::Choice { options: HOME_OWNERSHIP_OPTIONS },
        },
        FieldSpec {
            name: PERSON_EDUCATION,
            label: "Education Level",
            kind: FieldKind::Choice { options: EDUCATION_OPTIONS },
        },
        FieldSpec {
            name: PERSON_GENDER,
            label: "Gender",
            kind: FieldKind::Choice { options: GENDER_OPTIONS },
        },
        FieldSpec {
            name: LOAN_AMNT,
            label: "Loan Amount ($)",
            kind: FieldKind::integer(LOAN_AMOUNT_BOUNDS, 10_000),
        },
        FieldSpec {
            name: LOAN_INTENT,
            label: "Loan Purpose",
            kind: FieldKind::Choice { options: LOAN_INTENT_OPTIONS },
        },
        FieldSpec {
            name: LOAN_INT_RATE,
            label: "Interest Rate (%)",
            kind: FieldKind::decimal(INTEREST_RATE_BOUNDS, 10.5),
        },
        FieldSpec {
            name: LOAN_PERCENT_INCOME,
            label: "Loan % of Income",
            kind: FieldKind::decimal(PERCENT_INCOME_BOUNDS, 0.2),
        },
        FieldSpec {
            name: CB_PERSON_CRED_HIST_LENGTH,
            label: "Credit History Length (years)",
            kind: FieldKind::integer(CREDIT_HISTORY_BOUNDS, 5),
        },
        FieldSpec {
            name: CREDIT_SCORE,
            label: "Credit Score",
            kind: FieldKind::integer(CREDIT_SCORE_BOUNDS, 700),
        },
        FieldSpec {
            name: PREVIOUS_LOAN_DEFAULTS_ON_FILE,
            label: "Previous Loan Defaults on File",
            kind: FieldKind::Choice { options: PREVIOUS_DEFAULTS_OPTIONS },
        },
    ]
}
