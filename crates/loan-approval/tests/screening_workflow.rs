use loan_approval::screening::{
    FeatureValue, LoanApplicationForm, LoanScreeningService, ModelBundle, ModelState,
    ScreeningError, Verdict,
};

fn fixture_path() -> String {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/loan_model.json").to_string()
}

fn service() -> LoanScreeningService {
    let state = ModelState::load(fixture_path());
    assert!(state.is_ready(), "fixture artifact loads");
    LoanScreeningService::new(state)
}

fn text(value: &str) -> FeatureValue {
    FeatureValue::Text(value.to_string())
}

#[test]
fn forest_artifact_screens_default_applicant() {
    let outcome = service()
        .screen(&LoanApplicationForm::default())
        .expect("default form screens");
    assert_eq!(outcome.verdict, Verdict::Approved);
    assert_eq!(outcome.features.len(), 13);
}

#[test]
fn prior_defaults_flip_the_verdict() {
    let service = service();
    for flag in [text("Yes"), text("yes "), text("1"), FeatureValue::Number(1.0)] {
        let form = LoanApplicationForm {
            previous_defaults: flag,
            ..LoanApplicationForm::default()
        };
        let outcome = service.screen(&form).expect("screens");
        assert_eq!(outcome.verdict, Verdict::NotApproved);
    }
}

#[test]
fn credit_score_and_income_share_drive_the_forest() {
    let service = service();

    let weak_score = LoanApplicationForm {
        credit_score: 550,
        ..LoanApplicationForm::default()
    };
    assert_eq!(
        service.screen(&weak_score).expect("screens").verdict,
        Verdict::Approved
    );

    let stretched = LoanApplicationForm {
        credit_score: 550,
        loan_percent_income: 0.5,
        ..LoanApplicationForm::default()
    };
    assert_eq!(
        service.screen(&stretched).expect("screens").verdict,
        Verdict::NotApproved
    );
}

#[test]
fn free_form_categories_are_reconciled() {
    let form = LoanApplicationForm {
        home_ownership: text("own"),
        education: text("bachelors"),
        gender: text("Female"),
        loan_purpose: text("Home Improvement"),
        ..LoanApplicationForm::default()
    };
    let outcome = service().screen(&form).expect("screens");
    let code = |field: &str| outcome.features.get(field).and_then(FeatureValue::as_number);
    assert_eq!(code("person_home_ownership"), Some(2.0));
    assert_eq!(code("person_education"), Some(1.0));
    assert_eq!(code("person_gender"), Some(0.0));
    assert_eq!(code("loan_intent"), Some(2.0));
}

#[test]
fn unmatched_category_aborts_only_that_submission() {
    let service = service();
    let rejected = LoanApplicationForm {
        loan_purpose: text("xyz"),
        ..LoanApplicationForm::default()
    };
    let err = service.screen(&rejected).expect_err("xyz rejected");
    assert!(err.to_string().contains("loan_intent"));

    service
        .screen(&LoanApplicationForm::default())
        .expect("next submission still screens");
}

#[test]
fn missing_artifact_disables_prediction() {
    let state = ModelState::load(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/fixtures/missing_model.json"
    ));
    let service = LoanScreeningService::new(state);
    for _ in 0..3 {
        let err = service
            .screen(&LoanApplicationForm::default())
            .expect_err("no model");
        assert!(matches!(err, ScreeningError::ModelNotLoaded { .. }));
    }
}

#[test]
fn bundle_reports_its_known_labels() {
    let bundle = ModelBundle::from_path(fixture_path()).expect("fixture loads");
    let summary = bundle.summary();
    assert_eq!(summary.kind, "random_forest");
    assert_eq!(summary.known_labels.len(), 5);
    assert_eq!(
        summary.known_labels["loan_intent"],
        vec![
            "DEBTCONSOLIDATION",
            "EDUCATION",
            "HOMEIMPROVEMENT",
            "MEDICAL",
            "PERSONAL",
            "VENTURE"
        ]
    );
}
