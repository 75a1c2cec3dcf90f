// Request-level scenarios against the real router and in-memory store

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use backend_application::{AppState, Metrics};
use backend_domain::RuntimeConfig;
use backend_infrastructure::{
    DefaultHealthService, DefaultNotificationService, MemoryMailer, MemoryStore,
};
use backend_interfaces_http::build_router;

struct TestApp {
    router: Router,
    mailer: Arc<MemoryMailer>,
}

fn test_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let mailer = Arc::new(MemoryMailer::new());
    let metrics = Arc::new(Metrics::default());
    let notifications = Arc::new(DefaultNotificationService::new(
        mailer.clone(),
        metrics.clone(),
    ));
    let state = AppState {
        config: RuntimeConfig {
            bind_addr: "127.0.0.1:0".to_string(),
            public_base_url: "https://turnout.test".to_string(),
            session_secret: "http-scenario-secret-http-scenario".to_string(),
            session_ttl_minutes: 60,
            session_cookie_name: "turnout_session".to_string(),
            session_cookie_secure: false,
            ops_token: None,
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 5,
        },
        user_repo: store.clone(),
        team_repo: store.clone(),
        event_repo: store.clone(),
        resource_repo: store.clone(),
        registration_repo: store.clone(),
        attendee_repo: store.clone(),
        notification_service: notifications.clone(),
        health_service: Arc::new(DefaultHealthService::new(store, notifications)),
        metrics,
    };
    TestApp {
        router: build_router(state),
        mailer,
    }
}

async fn send(
    app: &TestApp,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");
    let response = app.router.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Signs up, creates a team and a published event. Returns (token, event id).
async fn published_event(app: &TestApp) -> (String, String) {
    let (status, grant) = send(
        app,
        Method::POST,
        "/v1/auth/register",
        None,
        Some(json!({ "email": "host@turnout.test", "name": "Host", "password": "dance-all-night" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let token = grant["token"].as_str().expect("token").to_string();

    let (_, team) = send(
        app,
        Method::POST,
        "/v1/teams",
        Some(&token),
        Some(json!({ "name": "Lindy Crew" })),
    )
    .await;
    let team_id = team["id"].as_str().expect("team id");
    let (status, event) = send(
        app,
        Method::POST,
        &format!("/v1/teams/{team_id}/events"),
        Some(&token),
        Some(json!({ "title": "Saturday Stomp" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let event_id = event["id"].as_str().expect("event id").to_string();
    let (status, _) = send(
        app,
        Method::PATCH,
        &format!("/v1/events/{event_id}"),
        Some(&token),
        Some(json!({ "status": "published" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    (token, event_id)
}

async fn register_ada(app: &TestApp, event_id: &str) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/v1/public/registrations",
        None,
        Some(json!({
            "eventId": event_id,
            "contactName": "Ada",
            "contactEmail": "ada@example.com",
            "contactPhone": "0912345678",
            "totalAmount": 500,
            "attendees": [{ "name": "Ada", "role": "Leader" }],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

#[tokio::test]
async fn public_registration_starts_pending() {
    let app = test_app();
    let (_, event_id) = published_event(&app).await;
    let body = register_ada(&app, &event_id).await;

    assert_eq!(body["paymentStatus"], "pending");
    let key = body["registrationKey"].as_str().expect("key");
    assert!(key.len() >= 16);
    assert_eq!(body["attendees"][0]["role"], "Leader");
    assert_eq!(body["attendees"][0]["checkedIn"], false);

    let (status, details) = send(
        &app,
        Method::GET,
        &format!("/v1/public/registrations/{key}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(details["event"]["title"], "Saturday Stomp");
}

#[tokio::test]
async fn team_confirmation_sends_one_email() {
    let app = test_app();
    let (token, event_id) = published_event(&app).await;
    let body = register_ada(&app, &event_id).await;
    let registration_id = body["id"].as_str().expect("id");

    let (status, updated) = send(
        &app,
        Method::PATCH,
        &format!("/v1/registrations/{registration_id}/payment-status"),
        Some(&token),
        Some(json!({ "paymentStatus": "confirmed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["paymentStatus"], "confirmed");

    let mut deliveries = Value::Null;
    for _ in 0..100 {
        let (_, body) = send(&app, Method::GET, "/v1/ops/notifications", None, None).await;
        if body.as_array().map_or(false, |rows| !rows.is_empty()) {
            deliveries = body;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(deliveries[0]["recipient"], "ada@example.com");
    assert_eq!(deliveries[0]["success"], true);
    let sent = app.mailer.sent().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].subject.contains("Saturday Stomp"));
}

#[tokio::test]
async fn errors_carry_a_category() {
    let app = test_app();
    let (token, event_id) = published_event(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/public/registrations",
        None,
        Some(json!({ "eventId": event_id, "contactName": "Ada", "attendees": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation");

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/v1/events/{event_id}/registrations"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthenticated");

    let (status, body) = send(
        &app,
        Method::GET,
        "/v1/public/registrations/AAAAAAAAAAAAAAAAAAAAAA",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let registration = register_ada(&app, &event_id).await;
    let registration_id = registration["id"].as_str().expect("id");
    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/v1/registrations/{registration_id}/confirm"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn scanning_twice_reports_the_existing_check_in() {
    let app = test_app();
    let (token, event_id) = published_event(&app).await;
    let registration = register_ada(&app, &event_id).await;
    let attendee_id = registration["attendees"][0]["id"].as_str().expect("attendee");
    let uri = format!("/v1/attendees/{attendee_id}/check-in");

    let (status, first) = send(&app, Method::POST, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["alreadyCheckedIn"], false);
    let (_, second) = send(&app, Method::POST, &uri, Some(&token), None).await;
    assert_eq!(second["alreadyCheckedIn"], true);
    assert_eq!(
        first["attendee"]["checkedInAt"],
        second["attendee"]["checkedInAt"]
    );
}

#[tokio::test]
async fn liveness_and_readiness_answer() {
    let app = test_app();
    let (status, _) = send(&app, Method::GET, "/v1/ops/health/live", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::GET, "/v1/ops/health/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn undecodable_bodies_are_validation_errors() {
    let app = test_app();
    let (token, event_id) = published_event(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/public/registrations",
        None,
        Some(json!({ "eventId": event_id, "contactName": "Ada", "attendees": null })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation");
    assert!(body["message"].as_str().is_some_and(|text| !text.is_empty()));

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/public/registrations",
        None,
        Some(json!({ "eventId": event_id, "attendees": [{ "name": 7, "role": "Leader" }] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation");

    let registration = register_ada(&app, &event_id).await;
    let registration_id = registration["id"].as_str().expect("id");
    let key = registration["registrationKey"].as_str().expect("key");

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/v1/registrations/{registration_id}/payment-status"),
        Some(&token),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation");

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/v1/public/registrations/{key}/payment-evidence"),
        None,
        Some(json!({ "screenshotUrl": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation");

    let (status, body) = send(&app, Method::POST, "/v1/teams", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation");
}
