use attenthive_core::{AppError, UserIdentity};
use axum::Json;
use axum::extract::State;
use tower_sessions::Session;
use tracing::info;

use crate::dto::{BootstrapRequest, UserResponse};
use crate::error::{ApiJson, ApiResult};
use crate::state::AppState;

use super::establish_session;

/// Accepts an identity asserted by the trusted identity provider and starts a
/// session for it, creating the account on first sight.
pub async fn bootstrap_handler(
    State(state): State<AppState>,
    session: Session,
    ApiJson(payload): ApiJson<BootstrapRequest>,
) -> ApiResult<Json<UserResponse>> {
    if payload.token != state.bootstrap_token {
        return Err(AppError::Unauthorized("invalid bootstrap token".to_owned()).into());
    }

    let identity = UserIdentity::new(
        payload.email,
        payload.display_name.unwrap_or_default(),
        None,
    );
    let actor = state.actor_resolver.resolve(&identity).await?;

    let user = state
        .user_service
        .find_by_id(actor.id())
        .await?
        .ok_or_else(|| {
            AppError::Internal(format!("resolved user '{}' disappeared", actor.id()))
        })?;

    establish_session(&session, &user).await?;
    info!(user_id = %user.id, "bootstrapped session from identity provider");

    Ok(Json(UserResponse::from(user)))
}
