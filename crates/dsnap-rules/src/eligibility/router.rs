use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Local;
use serde_json::{json, Value};

use super::domain::DisasterId;
use super::repository::DisasterRepository;
use super::service::{EligibilityService, EligibilityServiceError};
use super::validate::InputError;

/// Router builder exposing the eligibility and disaster endpoints.
pub fn eligibility_router<R>(service: Arc<EligibilityService<R>>) -> Router
where
    R: DisasterRepository + 'static,
{
    Router::new()
        .route("/api/v1/eligibility", post(eligibility_handler::<R>))
        .route("/api/v1/disasters", get(active_disasters_handler::<R>))
        .route(
            "/api/v1/disasters/:disaster_id",
            get(disaster_handler::<R>),
        )
        .with_state(service)
}

pub(crate) async fn eligibility_handler<R>(
    State(service): State<Arc<EligibilityService<R>>>,
    payload: Result<axum::Json<Value>, JsonRejection>,
) -> Response
where
    R: DisasterRepository + 'static,
{
    // Unreadable bodies share the validation error shape.
    let axum::Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            return error_response(EligibilityServiceError::Input(InputError {
                messages: vec![rejection.body_text()],
            }))
        }
    };
    match service.evaluate_payload(payload) {
        Ok(verdict) => (StatusCode::OK, axum::Json(verdict)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn active_disasters_handler<R>(
    State(service): State<Arc<EligibilityService<R>>>,
) -> Response
where
    R: DisasterRepository + 'static,
{
    let today = Local::now().date_naive();
    match service.active_disasters(today) {
        Ok(disasters) => (StatusCode::OK, axum::Json(disasters)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn disaster_handler<R>(
    State(service): State<Arc<EligibilityService<R>>>,
    Path(disaster_id): Path<u32>,
) -> Response
where
    R: DisasterRepository + 'static,
{
    match service.disaster(DisasterId(disaster_id)) {
        Ok(disaster) => (StatusCode::OK, axum::Json(disaster)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: EligibilityServiceError) -> Response {
    match error {
        EligibilityServiceError::Input(error) => {
            let payload = json!({ "message": error.messages });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        EligibilityServiceError::DisasterNotFound(id) => {
            let payload = json!({ "message": format!("Disaster {id} not found") });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        other => {
            let payload = json!({ "message": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
