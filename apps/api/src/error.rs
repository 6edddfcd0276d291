use attenthive_core::{AppError, FieldViolation};
use axum::Json;
use axum::extract::FromRequest;
use axum::extract::FromRequestParts;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;
use ts_rs::TS;

/// Generic body for unexpected failures; details only go to the log.
const INTERNAL_ERROR_MESSAGE: &str = "an unexpected error occurred";

/// One rejected request field.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/validation-error-response.ts"
)]
pub struct ValidationErrorResponse {
    pub field: String,
    pub message: String,
}

/// API error payload.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub validation_errors: Option<Vec<ValidationErrorResponse>>,
}

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(AppError::Validation(format!(
            "malformed request body: {}",
            rejection.body_text()
        )))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(AppError::Validation(format!(
            "malformed query string: {}",
            rejection.body_text()
        )))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(AppError::Validation(format!(
            "malformed path: {}",
            rejection.body_text()
        )))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, payload) = match self.0 {
            AppError::Validation(message) => (StatusCode::BAD_REQUEST, plain(message)),
            AppError::InvalidInput(violations) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: "request validation failed".to_owned(),
                    validation_errors: Some(
                        violations
                            .into_iter()
                            .map(|FieldViolation { field, message }| ValidationErrorResponse {
                                field,
                                message,
                            })
                            .collect(),
                    ),
                },
            ),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, plain(message)),
            AppError::Conflict(message) => (StatusCode::CONFLICT, plain(message)),
            AppError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, plain(message)),
            AppError::Forbidden(message) => (StatusCode::FORBIDDEN, plain(message)),
            AppError::RateLimited(message) => (StatusCode::TOO_MANY_REQUESTS, plain(message)),
            AppError::Internal(message) => {
                error!(error = %message, "request failed with internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    plain(INTERNAL_ERROR_MESSAGE.to_owned()),
                )
            }
        };

        (status, Json(payload)).into_response()
    }
}

fn plain(error: String) -> ErrorResponse {
    ErrorResponse {
        error,
        validation_errors: None,
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;

/// JSON body extractor whose rejections use the API error shape.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor whose rejections use the API error shape.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Path extractor whose rejections use the API error shape.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);
