use std::sync::Arc;

use axum::response::Response;
use serde_json::{json, Value};

use crate::screening::artifact::{ModelBundle, ModelState};
use crate::screening::domain::{FeatureValue, LoanApplicationForm};
use crate::screening::router::screening_router;
use crate::screening::service::LoanScreeningService;

pub(super) const FEATURE_ORDER: [&str; 13] = [
    "person_age",
    "person_gender",
    "person_education",
    "person_income",
    "person_emp_exp",
    "person_home_ownership",
    "loan_amnt",
    "loan_intent",
    "loan_int_rate",
    "loan_percent_income",
    "cb_person_cred_hist_length",
    "credit_score",
    "previous_loan_defaults_on_file",
];

pub(super) fn coefficients() -> Vec<f64> {
    vec![
        0.0, 0.0, 0.0, 0.00001, 0.0, 0.0, 0.0, 0.0, -0.1, -6.0, 0.0, 0.004, -8.0,
    ]
}

pub(super) fn label_encoders() -> Value {
    json!({
        "person_gender": {"classes": ["female", "male"]},
        "person_education": {"classes": ["Associate", "Bachelor", "Doctorate", "High School", "Master"]},
        "person_home_ownership": {"classes": ["MORTGAGE", "OTHER", "OWN", "RENT"]},
        "loan_intent": {"classes": [
            "DEBTCONSOLIDATION", "EDUCATION", "HOMEIMPROVEMENT", "MEDICAL", "PERSONAL", "VENTURE"
        ]},
        "previous_loan_defaults_on_file": {"classes": ["No", "Yes"]}
    })
}

pub(super) fn loan_model_document() -> Value {
    json!({
        "model": {
            "kind": "logistic_regression",
            "feature_names": FEATURE_ORDER,
            "coefficients": coefficients(),
            "intercept": -0.5
        },
        "label_encoders": label_encoders()
    })
}

pub(super) fn loan_bundle() -> ModelBundle {
    ModelBundle::from_document(loan_model_document()).expect("fixture model loads")
}

pub(super) fn service() -> LoanScreeningService {
    LoanScreeningService::new(ModelState::Ready(loan_bundle()))
}

pub(super) fn service_from(document: Value) -> LoanScreeningService {
    let bundle = ModelBundle::from_document(document).expect("model loads");
    LoanScreeningService::new(ModelState::Ready(bundle))
}

pub(super) fn unavailable_service() -> LoanScreeningService {
    LoanScreeningService::new(ModelState::load(
        "/nonexistent/loan_approval_model.json",
    ))
}

pub(super) fn form_with(
    configure: impl FnOnce(&mut LoanApplicationForm),
) -> LoanApplicationForm {
    let mut form = LoanApplicationForm::default();
    configure(&mut form);
    form
}

pub(super) fn text(value: &str) -> FeatureValue {
    FeatureValue::Text(value.to_string())
}

pub(super) fn router_for(service: LoanScreeningService) -> axum::Router {
    screening_router(Arc::new(service))
}

pub(super) async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("body is json")
}
