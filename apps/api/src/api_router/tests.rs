use std::net::SocketAddr;
use std::sync::Arc;

use attenthive_infrastructure::{Argon2PasswordHasher, ConsoleEmailService, InMemoryCareStore};
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::extract::ConnectInfo;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use crate::api_services::{Repositories, assemble_state, session_layer};

use super::build_router;

const FRONTEND_URL: &str = "http://localhost:3000";
const BOOTSTRAP_TOKEN: &str = "test-bootstrap-token";
const PASSWORD: &str = "Sturdy-Password-42";
const CLIENT_ADDRESS: &str = "198.51.100.7:52100";

struct TestResponse {
    status: StatusCode,
    cookie: Option<String>,
    body: Value,
}

fn test_router() -> Router {
    let store = Arc::new(InMemoryCareStore::new());
    let repositories = Repositories {
        users: store.clone(),
        recipients: store.clone(),
        memberships: store.clone(),
        care_logs: store.clone(),
        rate_limits: store,
    };
    let state = assemble_state(
        repositories,
        Arc::new(ConsoleEmailService::new()),
        Arc::new(Argon2PasswordHasher::new()),
        FRONTEND_URL,
        BOOTSTRAP_TOKEN,
    );
    let session_layer = session_layer(MemoryStore::default(), false);

    let Ok(router) = build_router(state, FRONTEND_URL, session_layer) else {
        panic!("router should build");
    };
    router
}

async fn call(
    router: &Router,
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> TestResponse {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::ORIGIN, FRONTEND_URL);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    };
    let Ok(mut request) = request else {
        panic!("request should build");
    };
    if let Ok(peer) = CLIENT_ADDRESS.parse::<SocketAddr>() {
        request.extensions_mut().insert(ConnectInfo(peer));
    }

    let response = router
        .clone()
        .oneshot(request)
        .await
        .unwrap_or_else(|never| match never {});

    let status = response.status();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(str::to_owned);
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_default();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    TestResponse {
        status,
        cookie,
        body,
    }
}

async fn register(router: &Router, email: &str, name: &str) -> (String, String) {
    let response = call(
        router,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "email": email, "password": PASSWORD, "displayName": name })),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);

    let Some(cookie) = response.cookie else {
        panic!("registration should start a session");
    };
    let id = response.body["id"].as_str().unwrap_or_default().to_owned();
    (cookie, id)
}

async fn create_pet(router: &Router, cookie: &str, name: &str) -> String {
    let response = call(
        router,
        Method::POST,
        "/api/recipients",
        Some(cookie),
        Some(json!({ "name": name, "category": "PET", "subtype": "dog" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    response.body["id"].as_str().unwrap_or_default().to_owned()
}

async fn invite(
    router: &Router,
    cookie: &str,
    recipient_id: &str,
    email: &str,
    role: Option<&str>,
) -> TestResponse {
    let mut body = json!({ "recipientId": recipient_id, "email": email });
    if let Some(role) = role {
        body["role"] = json!(role);
    }
    call(
        router,
        Method::POST,
        "/api/invite",
        Some(cookie),
        Some(body),
    )
    .await
}

#[tokio::test]
async fn health_is_public() {
    let router = test_router();
    let response = call(&router, Method::GET, "/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn protected_routes_require_a_session() {
    let router = test_router();
    let response = call(&router, Method::GET, "/api/shared-pets", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(response.body["error"].is_string());
    assert!(response.body.get("validationErrors").is_none());
}

#[tokio::test]
async fn mutations_from_foreign_origins_are_blocked() {
    let router = test_router();
    let (cookie, _) = register(&router, "alice@example.com", "Alice").await;

    let Ok(request) = Request::builder()
        .method(Method::POST)
        .uri("/api/recipients")
        .header(header::ORIGIN, "https://evil.example")
        .header(header::COOKIE, cookie.as_str())
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "name": "Rex", "category": "PET" }).to_string()))
    else {
        panic!("request should build");
    };
    let response = router
        .clone()
        .oneshot(request)
        .await
        .unwrap_or_else(|never| match never {});
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn invite_list_and_remove_flow() {
    let router = test_router();
    let (alice, _) = register(&router, "alice@example.com", "Alice").await;
    let (bob, bob_id) = register(&router, "bob@example.com", "Bob").await;
    let pet_id = create_pet(&router, &alice, "Rex").await;

    let invited = invite(&router, &alice, &pet_id, "bob@example.com", None).await;
    assert_eq!(invited.status, StatusCode::CREATED, "{}", invited.body);
    assert_eq!(invited.body["membership"]["role"], "CAREGIVER");
    assert_eq!(invited.body["membership"]["userId"], bob_id.as_str());
    let membership_id = invited.body["membership"]["id"]
        .as_str()
        .unwrap_or_default()
        .to_owned();

    let listed = call(
        &router,
        Method::GET,
        format!("/api/members?recipientId={pet_id}").as_str(),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.body["count"], 1);
    assert_eq!(listed.body["owner"]["label"], "Owner");
    assert_eq!(listed.body["members"][0]["label"], "Caregiver");
    assert_eq!(listed.body["members"][0]["displayName"], "Bob");
    assert_eq!(listed.body["members"][0]["removable"], true);

    let shared = call(&router, Method::GET, "/api/shared-pets", Some(&bob), None).await;
    assert_eq!(shared.body["count"], 1);
    assert_eq!(shared.body["sharedPets"][0]["role"], "CAREGIVER");
    assert_eq!(shared.body["sharedPets"][0]["recipient"]["name"], "Rex");

    let removed = call(
        &router,
        Method::DELETE,
        "/api/members",
        Some(&alice),
        Some(json!({ "membershipId": membership_id, "recipientId": pet_id })),
    )
    .await;
    assert_eq!(removed.status, StatusCode::OK);
    assert!(removed.body["message"].is_string());

    let shared = call(&router, Method::GET, "/api/shared-pets", Some(&bob), None).await;
    assert_eq!(shared.body["count"], 0);
}

#[tokio::test]
async fn malformed_invite_reports_field_errors() {
    let router = test_router();
    let (alice, _) = register(&router, "alice@example.com", "Alice").await;

    let response = invite(
        &router,
        &alice,
        "not-a-uuid",
        "bob@example.com",
        Some("ADMIN"),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["validationErrors"][0]["field"], "recipientId");
    assert_eq!(response.body["validationErrors"][1]["field"], "role");
}

#[tokio::test]
async fn invite_email_and_missing_recipient_are_field_errors() {
    let router = test_router();
    let (alice, _) = register(&router, "alice@example.com", "Alice").await;
    let pet_id = create_pet(&router, &alice, "Rex").await;

    let bad_email = invite(&router, &alice, &pet_id, "not-an-email", None).await;
    assert_eq!(bad_email.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_email.body["validationErrors"][0]["field"], "email");

    let missing_recipient = call(
        &router,
        Method::POST,
        "/api/invite",
        Some(&alice),
        Some(json!({ "email": "bob@example.com" })),
    )
    .await;
    assert_eq!(missing_recipient.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        missing_recipient.body["validationErrors"][0]["field"],
        "recipientId"
    );
}

#[tokio::test]
async fn rotating_forwarded_for_does_not_reset_login_limit() {
    let router = test_router();
    let Ok(peer) = CLIENT_ADDRESS.parse::<SocketAddr>() else {
        panic!("client address should parse");
    };

    let mut statuses = Vec::new();
    for attempt in 0..11 {
        let Ok(mut request) = Request::builder()
            .method(Method::POST)
            .uri("/auth/login")
            .header(header::ORIGIN, FRONTEND_URL)
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", format!("203.0.113.{attempt}"))
            .body(Body::from(
                json!({ "email": "ghost@example.com", "password": PASSWORD }).to_string(),
            ))
        else {
            panic!("request should build");
        };
        request.extensions_mut().insert(ConnectInfo(peer));
        let response = router
            .clone()
            .oneshot(request)
            .await
            .unwrap_or_else(|never| match never {});
        statuses.push(response.status());
    }

    assert!(
        statuses[..10]
            .iter()
            .all(|status| *status == StatusCode::UNAUTHORIZED)
    );
    assert_eq!(statuses[10], StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn self_invite_is_a_bad_request() {
    let router = test_router();
    let (alice, _) = register(&router, "alice@example.com", "Alice").await;
    let pet_id = create_pet(&router, &alice, "Rex").await;

    let response = invite(&router, &alice, &pet_id, "ALICE@example.com", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_targets_are_not_found() {
    let router = test_router();
    let (alice, _) = register(&router, "alice@example.com", "Alice").await;
    let pet_id = create_pet(&router, &alice, "Rex").await;

    let unknown_user = invite(&router, &alice, &pet_id, "ghost@example.com", None).await;
    assert_eq!(unknown_user.status, StatusCode::NOT_FOUND);

    let unknown_pet = call(
        &router,
        Method::GET,
        "/api/members?recipientId=5b0c1c1e-2a8f-4d47-9f7e-0d6f0c9a1b22",
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(unknown_pet.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn inviting_the_primary_owner_conflicts() {
    let router = test_router();
    let (alice, _) = register(&router, "alice@example.com", "Alice").await;
    let (carol, _) = register(&router, "carol@example.com", "Carol").await;
    let pet_id = create_pet(&router, &alice, "Rex").await;

    let promoted = invite(&router, &alice, &pet_id, "carol@example.com", Some("OWNER")).await;
    assert_eq!(promoted.status, StatusCode::CREATED);

    let response = invite(&router, &carol, &pet_id, "alice@example.com", None).await;
    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn viewers_can_read_but_not_write() {
    let router = test_router();
    let (alice, _) = register(&router, "alice@example.com", "Alice").await;
    let (vera, _) = register(&router, "vera@example.com", "Vera").await;
    let pet_id = create_pet(&router, &alice, "Rex").await;

    let invited = invite(&router, &alice, &pet_id, "vera@example.com", Some("VIEWER")).await;
    assert_eq!(invited.status, StatusCode::CREATED);

    let logs_uri = format!("/api/recipients/{pet_id}/care-logs");
    let write = call(
        &router,
        Method::POST,
        logs_uri.as_str(),
        Some(&vera),
        Some(json!({ "activity": "FEEDING" })),
    )
    .await;
    assert_eq!(write.status, StatusCode::FORBIDDEN);

    let read = call(&router, Method::GET, logs_uri.as_str(), Some(&vera), None).await;
    assert_eq!(read.status, StatusCode::OK);

    let members = call(
        &router,
        Method::GET,
        format!("/api/members?recipientId={pet_id}").as_str(),
        Some(&vera),
        None,
    )
    .await;
    assert_eq!(members.status, StatusCode::OK);
    assert_eq!(members.body["members"][0]["label"], "Caregiver");
    assert_eq!(members.body["members"][0]["access"], "viewer");

    let access = call(
        &router,
        Method::GET,
        format!("/api/recipients/{pet_id}/access").as_str(),
        Some(&vera),
        None,
    )
    .await;
    assert_eq!(access.body["canAccess"], true);
    assert_eq!(access.body["role"], "VIEWER");
    assert_eq!(access.body["canWrite"], false);

    let invite_attempt = invite(&router, &vera, &pet_id, "alice@example.com", None).await;
    assert_eq!(invite_attempt.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn caregivers_log_care_and_owner_cleans_up() {
    let router = test_router();
    let (alice, _) = register(&router, "alice@example.com", "Alice").await;
    let (bob, _) = register(&router, "bob@example.com", "Bob").await;
    let pet_id = create_pet(&router, &alice, "Rex").await;
    invite(&router, &alice, &pet_id, "bob@example.com", None).await;

    let logs_uri = format!("/api/recipients/{pet_id}/care-logs");
    let logged = call(
        &router,
        Method::POST,
        logs_uri.as_str(),
        Some(&bob),
        Some(json!({ "activity": "walking", "notes": "30 minutes in the park" })),
    )
    .await;
    assert_eq!(logged.status, StatusCode::CREATED, "{}", logged.body);
    assert_eq!(logged.body["activity"], "WALKING");
    let entry_id = logged.body["id"].as_str().unwrap_or_default().to_owned();

    let listed = call(&router, Method::GET, logs_uri.as_str(), Some(&alice), None).await;
    assert_eq!(listed.body.as_array().map(Vec::len), Some(1));

    let deleted = call(
        &router,
        Method::DELETE,
        format!("{logs_uri}/{entry_id}").as_str(),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn legacy_caregiver_removal_reports_count() {
    let router = test_router();
    let (alice, _) = register(&router, "alice@example.com", "Alice").await;
    let (bob, bob_id) = register(&router, "bob@example.com", "Bob").await;
    let pet_id = create_pet(&router, &alice, "Rex").await;
    invite(&router, &alice, &pet_id, "bob@example.com", None).await;

    let by_caregiver = call(
        &router,
        Method::DELETE,
        "/api/members/caregivers",
        Some(&bob),
        Some(json!({ "recipientId": pet_id, "userId": bob_id })),
    )
    .await;
    assert_eq!(by_caregiver.status, StatusCode::FORBIDDEN);

    let by_owner = call(
        &router,
        Method::DELETE,
        "/api/members/caregivers",
        Some(&alice),
        Some(json!({ "recipientId": pet_id, "userId": bob_id })),
    )
    .await;
    assert_eq!(by_owner.status, StatusCode::OK);
    assert_eq!(by_owner.body["removed"], 1);
}

#[tokio::test]
async fn password_login_round() {
    let router = test_router();
    register(&router, "alice@example.com", "Alice").await;

    let failed = call(
        &router,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "wrong-password-1" })),
    )
    .await;
    assert_eq!(failed.status, StatusCode::UNAUTHORIZED);

    let succeeded = call(
        &router,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "Alice@Example.com", "password": PASSWORD })),
    )
    .await;
    assert_eq!(succeeded.status, StatusCode::OK);
    let Some(cookie) = succeeded.cookie else {
        panic!("login should start a session");
    };

    let me = call(&router, Method::GET, "/auth/me", Some(&cookie), None).await;
    assert_eq!(me.body["email"], "alice@example.com");
    assert_eq!(me.body["displayName"], "Alice");
}

#[tokio::test]
async fn bootstrap_requires_the_shared_token() {
    let router = test_router();

    let rejected = call(
        &router,
        Method::POST,
        "/auth/bootstrap",
        None,
        Some(json!({ "email": "sso@example.com", "token": "guess" })),
    )
    .await;
    assert_eq!(rejected.status, StatusCode::UNAUTHORIZED);

    let accepted = call(
        &router,
        Method::POST,
        "/auth/bootstrap",
        None,
        Some(json!({ "email": "sso@example.com", "token": BOOTSTRAP_TOKEN })),
    )
    .await;
    assert_eq!(accepted.status, StatusCode::OK);
    assert_eq!(accepted.body["displayName"], "sso");

    let Some(cookie) = accepted.cookie else {
        panic!("bootstrap should start a session");
    };
    let shared = call(
        &router,
        Method::GET,
        "/api/shared-pets",
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(shared.status, StatusCode::OK);

    let password_login = call(
        &router,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "sso@example.com", "password": "!external-identity" })),
    )
    .await;
    assert_eq!(password_login.status, StatusCode::UNAUTHORIZED);
}
