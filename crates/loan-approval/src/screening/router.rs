use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tracing::error;

use super::artifact::ModelState;
use super::domain::{form_fields, LoanApplicationForm};
use super::service::{LoanScreeningService, ScreeningError};

/// Router builder exposing the loan form, screening, and model introspection endpoints.
pub fn screening_router(service: Arc<LoanScreeningService>) -> Router {
    Router::new()
        .route("/api/v1/loan/screen", post(screen_handler))
        .route("/api/v1/loan/form", get(form_handler))
        .route("/api/v1/model", get(model_handler))
        .with_state(service)
}

pub(crate) async fn screen_handler(
    State(service): State<Arc<LoanScreeningService>>,
    axum::Json(form): axum::Json<LoanApplicationForm>,
) -> Response {
    match service.screen(&form) {
        Ok(outcome) => {
            let payload = json!({
                "verdict": outcome.verdict.label(),
                "approved": outcome.verdict.is_approved(),
                "features": outcome.features,
                "defaulted_features": outcome.defaulted_features,
                "evaluated_at": outcome.evaluated_at,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn form_handler() -> Response {
    let payload = json!({ "fields": form_fields() });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn model_handler(State(service): State<Arc<LoanScreeningService>>) -> Response {
    let payload = match service.model() {
        ModelState::Ready(bundle) => json!({
            "loaded": true,
            "model": bundle.summary(),
        }),
        ModelState::Unavailable { reason } => json!({
            "loaded": false,
            "reason": reason,
        }),
    };
    (StatusCode::OK, axum::Json(payload)).into_response()
}

fn error_response(err: ScreeningError) -> Response {
    let message = err.to_string();
    match err {
        ScreeningError::ModelNotLoaded { .. } => {
            let payload = json!({ "error": message });
            (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
        }
        ScreeningError::InvalidInput(_) => {
            let payload = json!({ "error": message });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        ScreeningError::UnrecognizedValue(rejected) => {
            let payload = json!({
                "error": message,
                "field": rejected.field,
                "value": rejected.value,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        ScreeningError::Encoding(_) => {
            error!(error = %message, "label encoder rejected a matched label");
            let payload = json!({ "error": message });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
        ScreeningError::Inference(failure) => {
            error!(error = %message, "loan model prediction failed");
            let payload = json!({
                "error": message,
                "features_in_data": failure.attempted,
                "features_expected_by_model": failure.expected,
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
