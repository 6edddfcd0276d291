use std::net::{IpAddr, SocketAddr};

use attenthive_application::RateLimitRule;
use attenthive_core::{AppError, UserIdentity};
use axum::Extension;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, Method, header};
use axum::middleware::Next;
use axum::response::Response;
use ipnet::IpNet;
use tower_sessions::Session;
use tracing::debug;

use crate::auth::SESSION_USER_KEY;
use crate::error::ApiResult;
use crate::state::AppState;

/// Resolves the session identity to an [`attenthive_application::Actor`]
/// and stores it in the request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let identity = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    let actor = state.actor_resolver.resolve(&identity).await?;

    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

/// Rejects state-changing requests that did not come from the frontend.
pub async fn require_same_origin_for_mutations(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    if is_state_changing_method(request.method()) {
        check_request_origin(request.headers(), state.frontend_url.as_str())?;
    }

    Ok(next.run(request).await)
}

fn check_request_origin(headers: &HeaderMap, frontend_url: &str) -> Result<(), AppError> {
    if header_str(headers, "sec-fetch-site") == Some("cross-site") {
        return Err(AppError::Forbidden("cross-site request blocked".to_owned()));
    }

    let origin_matches = header_str(headers, header::ORIGIN.as_str()) == Some(frontend_url);
    let referer_matches = header_str(headers, header::REFERER.as_str())
        .and_then(|referer| referer.strip_prefix(frontend_url))
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'));

    if origin_matches || referer_matches {
        return Ok(());
    }

    debug!(
        origin = header_str(headers, header::ORIGIN.as_str()).unwrap_or("<none>"),
        "rejected mutation from foreign origin"
    );
    Err(AppError::Forbidden("origin validation failed".to_owned()))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Counts the request against the route's [`RateLimitRule`], keyed by client
/// address.
pub async fn rate_limit(
    State(state): State<AppState>,
    Extension(rule): Extension<RateLimitRule>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(address)| address.ip());
    let client = client_address(request.headers(), peer, state.trusted_proxies.as_slice());
    state
        .rate_limit_service
        .check_rate_limit(&rule, client.as_str())
        .await?;

    Ok(next.run(request).await)
}

/// Resolves the address a request is attributed to. `x-forwarded-for` is only
/// honoured when the peer is a trusted proxy, and then the right-most hop that
/// is not itself a trusted proxy wins.
pub fn client_address(headers: &HeaderMap, peer: Option<IpAddr>, trusted: &[IpNet]) -> String {
    let Some(peer) = peer else {
        return "unknown".to_owned();
    };
    let is_trusted = |address: &IpAddr| trusted.iter().any(|network| network.contains(address));
    if !is_trusted(&peer) {
        return peer.to_string();
    }

    header_str(headers, "x-forwarded-for")
        .into_iter()
        .flat_map(|value| value.rsplit(','))
        .filter_map(|hop| hop.trim().parse::<IpAddr>().ok())
        .find(|hop| !is_trusted(hop))
        .unwrap_or(peer)
        .to_string()
}

fn is_state_changing_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}
