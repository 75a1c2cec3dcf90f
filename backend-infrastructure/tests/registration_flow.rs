// End-to-end flows over the in-memory store

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use futures_util::future::join_all;
use serde_json::json;

use backend_application::commands::{
    check_in_commands, event_commands, payment_commands, registration_commands,
};
use backend_application::queries::{check_in_queries, registration_queries};
use backend_application::AppError;
use backend_domain::{
    CreatePurchaseItemRequest, PaymentStatus, PaymentStatusRequest, PurchaseItemId,
};
use backend_infrastructure::MemoryStore;

use common::{evidence, fixture_with, register, registration_request, sign_up, Fixture};

async fn fixture() -> Fixture<MemoryStore> {
    fixture_with(Arc::new(MemoryStore::new())).await
}

#[tokio::test]
async fn new_registrations_start_pending_with_their_attendees() {
    let fixture = fixture().await;
    let view = register(&fixture).await;

    assert_eq!(view.registration.payment_status, PaymentStatus::Pending);
    assert_eq!(view.attendees.len(), 2);
    assert!(view.attendees.iter().all(|attendee| !attendee.checked_in));
    assert_eq!(
        view.check_in_url,
        format!(
            "https://turnout.test/check-in/{}",
            view.registration.registration_key
        )
    );
}

#[tokio::test]
async fn invalid_attendee_rejects_the_whole_registration() {
    let fixture = fixture().await;
    let result = registration_commands::create_registration(
        &fixture.state,
        registration_request(
            &fixture.event,
            json!([{ "name": "Ada", "role": "Leader" }, { "name": "Bob", "role": "Lead" }]),
        ),
    )
    .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(fixture.store.registration_count().await, 0);
    assert_eq!(fixture.store.attendee_count().await, 0);
}

#[tokio::test]
async fn evidence_moves_pending_to_reported_only_when_something_is_set() {
    let fixture = fixture().await;
    let view = register(&fixture).await;
    let key = view.registration.registration_key.as_str().to_string();

    let cleared = payment_commands::submit_payment_evidence(
        &fixture.state,
        &key,
        evidence(json!({ "screenshotUrl": null, "note": "   " })),
    )
    .await
    .expect("empty evidence");
    assert_eq!(cleared.payment_status, PaymentStatus::Pending);

    let reported = payment_commands::submit_payment_evidence(
        &fixture.state,
        &key,
        evidence(json!({ "note": "paid via transfer, ref 4411" })),
    )
    .await
    .expect("evidence");
    assert_eq!(reported.payment_status, PaymentStatus::Reported);
    assert_eq!(reported.payment_note.as_deref(), Some("paid via transfer, ref 4411"));

    let unknown = payment_commands::submit_payment_evidence(
        &fixture.state,
        "AAAAAAAAAAAAAAAAAAAA",
        evidence(json!({ "note": "x" })),
    )
    .await;
    assert!(matches!(unknown, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn evidence_after_confirmation_keeps_the_status() {
    let fixture = fixture().await;
    let view = register(&fixture).await;
    let key = view.registration.registration_key.as_str().to_string();
    payment_commands::set_payment_status(
        &fixture.state,
        &fixture.organizer,
        view.registration.id,
        PaymentStatusRequest {
            payment_status: "confirmed".to_string(),
        },
    )
    .await
    .expect("override");

    let updated = payment_commands::submit_payment_evidence(
        &fixture.state,
        &key,
        evidence(json!({ "screenshotUrl": "https://img.test/receipt.png" })),
    )
    .await
    .expect("evidence");
    assert_eq!(updated.payment_status, PaymentStatus::Confirmed);
    assert_eq!(
        updated.payment_screenshot_url.as_deref(),
        Some("https://img.test/receipt.png")
    );
}

#[tokio::test]
async fn confirmation_email_fires_once_per_transition_into_confirmed() {
    let fixture = fixture().await;
    let view = register(&fixture).await;
    let id = view.registration.id;
    let set = |status: &str| PaymentStatusRequest {
        payment_status: status.to_string(),
    };

    payment_commands::set_payment_status(&fixture.state, &fixture.organizer, id, set("reported"))
        .await
        .expect("reported");
    payment_commands::set_payment_status(&fixture.state, &fixture.organizer, id, set("confirmed"))
        .await
        .expect("confirmed");
    payment_commands::set_payment_status(&fixture.state, &fixture.organizer, id, set("confirmed"))
        .await
        .expect("confirmed again");
    assert_eq!(fixture.notifications.sent(), 1);

    payment_commands::set_payment_status(&fixture.state, &fixture.organizer, id, set("rejected"))
        .await
        .expect("rejected");
    payment_commands::set_payment_status(&fixture.state, &fixture.organizer, id, set("confirmed"))
        .await
        .expect("confirmed after rejection");
    assert_eq!(fixture.notifications.sent(), 2);

    let invalid =
        payment_commands::set_payment_status(&fixture.state, &fixture.organizer, id, set("paid"))
            .await;
    assert!(matches!(invalid, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn concurrent_confirms_succeed_once() {
    let fixture = fixture().await;
    let view = register(&fixture).await;
    let key = view.registration.registration_key.as_str().to_string();
    payment_commands::submit_payment_evidence(
        &fixture.state,
        &key,
        evidence(json!({ "note": "sent" })),
    )
    .await
    .expect("evidence");

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
async fn confirm_requires_reported_evidence() {
    let fixture = fixture().await;
    let view = register(&fixture).await;
    let result =
        payment_commands::confirm_payment(&fixture.state, &fixture.organizer, view.registration.id)
            .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
    assert_eq!(fixture.notifications.sent(), 0);
}

#[tokio::test]
async fn check_in_is_one_way_and_idempotent() {
    let fixture = fixture().await;
    let view = register(&fixture).await;
    let attendee_id = view.attendees[0].id;

    let first =
        check_in_commands::check_in_attendee(&fixture.state, &fixture.organizer, attendee_id)
            .await
            .expect("first scan");
    assert!(!first.already_checked_in);
    assert!(first.attendee.checked_in);
    let stamped_at = first.attendee.checked_in_at;
    assert!(stamped_at.is_some());

    let second =
        check_in_commands::check_in_attendee(&fixture.state, &fixture.organizer, attendee_id)
            .await
            .expect("second scan");
    assert!(second.already_checked_in);
    assert_eq!(second.attendee.checked_in_at, stamped_at);

    let status =
        check_in_queries::get_check_in_status(&fixture.state, &fixture.organizer, attendee_id)
            .await
            .expect("status");
    assert!(status.already_checked_in);
}

#[tokio::test]
async fn concurrent_scans_check_in_exactly_once() {
    let fixture = fixture().await;
    let view = register(&fixture).await;
    let attendee_id = view.attendees[1].id;

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
    assert_eq!(fixture.state.metrics.check_ins(), (1, 9));
}

#[tokio::test]
async fn outsiders_cannot_manage_another_teams_registrations() {
    let fixture = fixture().await;
    let view = register(&fixture).await;
    let outsider = sign_up(&fixture.state, "outsider").await;

    let confirm = payment_commands::set_payment_status(
        &fixture.state,
        &outsider,
        view.registration.id,
        PaymentStatusRequest {
            payment_status: "confirmed".to_string(),
        },
    )
    .await;
    assert!(matches!(confirm, Err(AppError::Forbidden)));

    let bad_status = payment_commands::set_payment_status(
        &fixture.state,
        &outsider,
        view.registration.id,
        PaymentStatusRequest {
            payment_status: "paid".to_string(),
        },
    )
    .await;
    assert!(matches!(bad_status, Err(AppError::Forbidden)));

    let check_in =
        check_in_commands::check_in_attendee(&fixture.state, &outsider, view.attendees[0].id)
            .await;
    assert!(matches!(check_in, Err(AppError::Forbidden)));

    let listing =
        registration_queries::list_event_registrations(&fixture.state, &outsider, fixture.event.id)
            .await;
    assert!(matches!(listing, Err(AppError::Forbidden)));
    assert_eq!(fixture.notifications.sent(), 0);
}

#[tokio::test]
async fn scanned_payload_resolves_to_the_registration() {
    let fixture = fixture().await;
    let view = register(&fixture).await;

    let resolved = check_in_queries::resolve_check_in_payload(
        &fixture.state,
        &fixture.organizer,
        &view.check_in_url,
    )
    .await
    .expect("resolve");
    assert_eq!(resolved.registration.id, view.registration.id);
    assert_eq!(resolved.attendees.len(), 2);

    let summaries = registration_queries::list_event_registrations(
        &fixture.state,
        &fixture.organizer,
        fixture.event.id,
    )
    .await
    .expect("list");
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].attendee_count, 2);
    assert_eq!(summaries[0].checked_in_count, 0);
}

#[tokio::test]
async fn purchase_items_must_belong_to_the_event() {
    let fixture = fixture().await;
    let item = event_commands::add_purchase_item(
        &fixture.state,
        &fixture.organizer,
        fixture.event.id,
        CreatePurchaseItemRequest {
            name: "Full pass".to_string(),
            description: None,
            price: 1200,
        },
    )
    .await
    .expect("item");

    let mut request = registration_request(&fixture.event, json!([{ "name": "Ada", "role": "Not sure" }]));
    request.purchase_item_id = Some(item.id.to_string());
    registration_commands::create_registration(&fixture.state, request)
        .await
        .expect("registration with item");

    let mut foreign = registration_request(&fixture.event, json!([{ "name": "Ada", "role": "Leader" }]));
    foreign.purchase_item_id = Some(PurchaseItemId::new().to_string());
    let result = registration_commands::create_registration(&fixture.state, foreign).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(fixture.store.registration_count().await, 1);
}
