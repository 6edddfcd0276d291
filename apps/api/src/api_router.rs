use attenthive_application::RateLimitRule;
use attenthive_core::AppError;
use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::state::AppState;
use crate::{auth, handlers, middleware};

#[cfg(test)]
mod tests;

pub fn build_router<S>(
    app_state: AppState,
    frontend_url: &str,
    session_layer: SessionManagerLayer<S>,
) -> Result<Router, AppError>
where
    S: SessionStore + Clone,
{
    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me_handler))
        .route("/api/invite", post(handlers::invite_handler))
        .route(
            "/api/members",
            get(handlers::list_members_handler).delete(handlers::remove_member_handler),
        )
        .route(
            "/api/members/caregivers",
            delete(handlers::remove_caregiver_handler),
        )
        .route("/api/shared-pets", get(handlers::shared_pets_handler))
        .route(
            "/api/recipients",
            get(handlers::list_recipients_handler).post(handlers::create_recipient_handler),
        )
        .route(
            "/api/recipients/{recipient_id}",
            get(handlers::get_recipient_handler)
                .patch(handlers::update_recipient_handler)
                .delete(handlers::delete_recipient_handler),
        )
        .route(
            "/api/recipients/{recipient_id}/access",
            get(handlers::access_summary_handler),
        )
        .route(
            "/api/recipients/{recipient_id}/care-logs",
            get(handlers::list_care_logs_handler).post(handlers::record_care_log_handler),
        )
        .route(
            "/api/recipients/{recipient_id}/care-logs/{care_log_id}",
            delete(handlers::delete_care_log_handler),
        )
        .route_layer(from_fn_with_state(app_state.clone(), middleware::require_auth));

    let login_routes = Router::new()
        .route("/auth/login", post(auth::login_handler))
        .route_layer(from_fn_with_state(app_state.clone(), middleware::rate_limit))
        .layer(axum::Extension(RateLimitRule::LOGIN));

    let register_routes = Router::new()
        .route("/auth/register", post(auth::register_handler))
        .route_layer(from_fn_with_state(app_state.clone(), middleware::rate_limit))
        .layer(axum::Extension(RateLimitRule::REGISTER));

    Ok(Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/auth/bootstrap", post(auth::bootstrap_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .merge(login_routes)
        .merge(register_routes)
        .merge(protected_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(frontend_cors(frontend_url)?)
        .layer(session_layer)
        .with_state(app_state))
}

/// Credentialed CORS for the single frontend origin.
fn frontend_cors(frontend_url: &str) -> Result<CorsLayer, AppError> {
    let origin = HeaderValue::from_str(frontend_url)
        .map_err(|error| AppError::Validation(format!("invalid FRONTEND_URL: {error}")))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([CONTENT_TYPE]))
}
