// The same flows against a live Postgres. Run with
// TURNOUT_TEST_DATABASE_URL=postgres://... cargo test -- --ignored

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use futures_util::future::join_all;
use serde_json::json;

use backend_application::commands::{check_in_commands, payment_commands, registration_commands};
use backend_application::queries::registration_queries;
use backend_application::AppError;
use backend_domain::ports::EventRepository;
use backend_domain::{DbConfig, PaymentStatus};
use backend_infrastructure::PostgresStore;

use common::{evidence, fixture_with, register, registration_request, Fixture};

const DATABASE_URL_VAR: &str = "TURNOUT_TEST_DATABASE_URL";

async fn fixture() -> Option<Fixture<PostgresStore>> {
    let Ok(url) = std::env::var(DATABASE_URL_VAR) else {
        eprintln!("{DATABASE_URL_VAR} is not set, skipping");
        return None;
    };
    let store = PostgresStore::connect(&DbConfig {
        database_url: Some(url),
        max_connections: 16,
    })
    .await
    .expect("connect");
    store.ensure_schema().await.expect("schema");
    Some(fixture_with(Arc::new(store)).await)
}

#[tokio::test]
#[ignore = "needs TURNOUT_TEST_DATABASE_URL"]
async fn invalid_attendee_leaves_no_rows() {
    let Some(fixture) = fixture().await else {
        return;
    };
    let result = registration_commands::create_registration(
        &fixture.state,
        registration_request(
            &fixture.event,
            json!([{ "name": "Ada", "role": "Leader" }, { "name": "Bob", "role": "Lead" }]),
        ),
    )
    .await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    let listed = registration_queries::list_event_registrations(
        &fixture.state,
        &fixture.organizer,
        fixture.event.id,
    )
    .await
    .expect("list");
    assert!(listed.is_empty());
}

#[tokio::test]
#[ignore = "needs TURNOUT_TEST_DATABASE_URL"]
async fn evidence_reports_then_confirm_wins_once() {
    let Some(fixture) = fixture().await else {
        return;
    };
    let view = register(&fixture).await;
    assert_eq!(view.registration.payment_status, PaymentStatus::Pending);
    let key = view.registration.registration_key.as_str().to_string();

    let reported = payment_commands::submit_payment_evidence(
        &fixture.state,
        &key,
        evidence(json!({ "note": "transfer ref 7781" })),
    )
    .await
    .expect("evidence");
    assert_eq!(reported.payment_status, PaymentStatus::Reported);

    let tasks = (0..8).map(|_| {
        let state = fixture.state.clone();
        let organizer = fixture.organizer;
        let id = view.registration.id;
        tokio::spawn(async move { payment_commands::confirm_payment(&state, &organizer, id).await })
    });
    let results = join_all(tasks).await;
    let confirmed = results
        .iter()
        .filter(|result| matches!(result, Ok(Ok(_))))
        .count();
    let conflicts = results
        .iter()
        .filter(|result| matches!(result, Ok(Err(AppError::Conflict(_)))))
        .count();

    assert_eq!(confirmed, 1);
    assert_eq!(conflicts, 7);
    assert_eq!(fixture.notifications.sent(), 1);
}

#[tokio::test]
#[ignore = "needs TURNOUT_TEST_DATABASE_URL"]
async fn concurrent_scans_check_in_exactly_once() {
    let Some(fixture) = fixture().await else {
        return;
    };
    let view = register(&fixture).await;
    let attendee_id = view.attendees[0].id;

    let tasks = (0..10).map(|_| {
        let state = fixture.state.clone();
        let organizer = fixture.organizer;
        tokio::spawn(async move {
            check_in_commands::check_in_attendee(&state, &organizer, attendee_id).await
        })
    });
    let outcomes = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.expect("task").expect("check in"))
        .collect::<Vec<_>>();

    let first = outcomes
        .iter()
        .filter(|status| !status.already_checked_in)
        .count();
    assert_eq!(first, 1);
    let stamps = outcomes
        .iter()
        .map(|status| status.attendee.checked_in_at)
        .collect::<HashSet<_>>();
    assert_eq!(stamps.len(), 1);
    assert!(stamps.iter().all(Option::is_some));
}
