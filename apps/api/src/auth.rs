//! Session authentication: password accounts plus the token-guarded handoff
//! used by the external identity provider.

mod bootstrap;
mod password;
mod session;

pub use bootstrap::bootstrap_handler;
pub use password::{login_handler, register_handler};
pub use session::{logout_handler, me_handler};

use attenthive_core::{AppError, UserIdentity};
use attenthive_domain::User;
use tower_sessions::Session;

use crate::error::ApiResult;

pub const SESSION_USER_KEY: &str = "user_identity";

/// Starts a fresh session for the given user.
async fn establish_session(session: &Session, user: &User) -> ApiResult<()> {
    let identity = UserIdentity::new(
        user.email.as_str(),
        user.display_name.as_str(),
        Some(user.id.to_string()),
    );

    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;

    session
        .insert(SESSION_USER_KEY, &identity)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session identity: {error}"))
        })?;

    Ok(())
}
