use attenthive_application::{AuthOutcome, RegisterParams};
use attenthive_core::AppError;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tower_sessions::Session;
use tracing::info;

use crate::dto::{LoginRequest, RegisterRequest, UserResponse};
use crate::error::{ApiJson, ApiResult};
use crate::state::AppState;

use super::establish_session;

pub async fn register_handler(
    State(state): State<AppState>,
    session: Session,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let user = state
        .user_service
        .register(RegisterParams {
            email: payload.email,
            password: payload.password,
            display_name: payload.display_name,
        })
        .await?;

    establish_session(&session, &user).await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<Json<UserResponse>> {
    let outcome = state
        .user_service
        .login(payload.email.as_str(), payload.password.as_str())
        .await?;

    let user = match outcome {
        AuthOutcome::Authenticated(user) => user,
        AuthOutcome::Failed => {
            return Err(AppError::Unauthorized("invalid email or password".to_owned()).into());
        }
    };

    establish_session(&session, &user).await?;
    info!(user_id = %user.id, "password login succeeded");

    Ok(Json(UserResponse::from(user)))
}
