use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use meethub_services::lifecycle::LifecycleError;
use meethub_services::media::{MediaError, webhook::WebhookError};
use meethub_services::names::NameError;
use meethub_services::rooms::RoomError;
use meethub_services::store::StoreError;
use serde::Serialize;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    Conflict(String),
    Internal(String),
    Validation(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg),
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "validation", msg),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<LifecycleError> for ApiError {
    fn from(err: LifecycleError) -> Self {
        match err {
            // Policy rejections are recoverable with a different policy.
            LifecycleError::Rejected(code) => ApiError::Conflict(code.as_str().to_string()),
            LifecycleError::InvalidRoomId(raw) => {
                ApiError::Validation(format!("Invalid room id: {raw:?}"))
            }
            LifecycleError::EmptyBulkRequest => {
                ApiError::Validation("No valid room ids in request".to_string())
            }
            LifecycleError::Store(e) => ApiError::Internal(e.to_string()),
            LifecycleError::Media(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<RoomError> for ApiError {
    fn from(err: RoomError) -> Self {
        match err {
            RoomError::EmptyName => ApiError::Validation("Room name is empty".to_string()),
            RoomError::InvalidRoomId(raw) => {
                ApiError::Validation(format!("Invalid room id: {raw:?}"))
            }
            RoomError::UnschedulablePolicy => ApiError::Validation(
                "Auto-deletion scheduling is incompatible with a fail policy".to_string(),
            ),
            RoomError::Store(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<MediaError> for ApiError {
    fn from(err: MediaError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<NameError> for ApiError {
    fn from(err: NameError) -> Self {
        match err {
            NameError::EmptyName => {
                ApiError::Validation("Participant name is empty".to_string())
            }
            NameError::Ledger(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<WebhookError> for ApiError {
    fn from(err: WebhookError) -> Self {
        ApiError::Unauthorized(err.to_string())
    }
}
