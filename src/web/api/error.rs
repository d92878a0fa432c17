use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::backend::BackendError;
use crate::config::ConfigError;
use crate::swath::SwathError;
use crate::tracker::TrackerError;

pub enum ApiError {
    Validation(String),
    NotFound(&'static str),
    Conflict(&'static str),
    Backend(String),
}

impl From<SwathError> for ApiError {
    fn from(e: SwathError) -> Self {
        match e {
            SwathError::GroupNotFound(_) => ApiError::NotFound("group_not_found"),
            SwathError::SwathNotFound(_) => ApiError::NotFound("swath_not_found"),
            SwathError::GroupClosed(_) => ApiError::Conflict("group_closed"),
            SwathError::GroupInUse(_) => ApiError::Conflict("group_in_use"),
            SwathError::InvalidRange { .. } | SwathError::NonFinite => {
                ApiError::Validation(e.to_string())
            }
        }
    }
}

impl From<TrackerError> for ApiError {
    fn from(e: TrackerError) -> Self {
        match e {
            TrackerError::Swath(inner) => inner.into(),
            TrackerError::BackendRequired => ApiError::Conflict("backend_not_configured"),
            TrackerError::InvalidInterval
            | TrackerError::InvalidBatch(_)
            | TrackerError::Range(_) => {
                ApiError::Validation(e.to_string())
            }
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(e: ConfigError) -> Self {
        ApiError::Validation(e.to_string())
    }
}

impl From<BackendError> for ApiError {
    fn from(e: BackendError) -> Self {
        ApiError::Backend(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::with_message("validation_failed", &msg)),
            )
                .into_response(),
            ApiError::NotFound(what) => {
                (StatusCode::NOT_FOUND, Json(ErrorResponse::new(what))).into_response()
            }
            ApiError::Conflict(reason) => {
                (StatusCode::CONFLICT, Json(ErrorResponse::new(reason))).into_response()
            }
            ApiError::Backend(msg) => (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse::with_message("backend_error", &msg)),
            )
                .into_response(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: &str) -> Self {
        ErrorResponse {
            error: error.to_string(),
            message: None,
        }
    }

    pub fn with_message(error: &str, message: &str) -> Self {
        ErrorResponse {
            error: error.to_string(),
            message: Some(message.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swath::GroupId;

    #[test]
    fn status_codes() {
        let missing: ApiError = SwathError::GroupNotFound(GroupId::from("group-1-0".to_string())).into();
        assert_eq!(missing.into_response().status(), StatusCode::NOT_FOUND);

        let in_use: ApiError = SwathError::GroupInUse(GroupId::from("group-2-0".to_string())).into();
        assert_eq!(in_use.into_response().status(), StatusCode::CONFLICT);

        let conflict: ApiError = TrackerError::BackendRequired.into();
        assert_eq!(conflict.into_response().status(), StatusCode::CONFLICT);

        let invalid: ApiError = TrackerError::InvalidInterval.into();
        assert_eq!(invalid.into_response().status(), StatusCode::BAD_REQUEST);

        let backend = ApiError::from(BackendError::Rejected("down".into()));
        assert_eq!(backend.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
