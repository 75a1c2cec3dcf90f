// Shared setup for the store-backed flow tests
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use backend_application::commands::{auth_commands, event_commands, registration_commands, team_commands};
use backend_application::{AppState, Metrics};
use backend_domain::ports::{
    AttendeeRepository, EventRepository, NotificationService, RegistrationRepository,
    TeamRepository, TeamResourceRepository, UserRepository,
};
use backend_domain::{
    CreateEventRequest, CreateRegistrationRequest, CreateTeamRequest, Event,
    NotificationDeliveryRecord, PaymentConfirmationNotice, PaymentEvidenceRequest, Principal,
    RegistrationView, RuntimeConfig, SignUpRequest, UpdateEventRequest,
};
use backend_infrastructure::DefaultHealthService;

/// Counts confirmation hand-offs instead of sending mail.
#[derive(Default)]
pub struct RecordingNotifications {
    sent: AtomicUsize,
}

impl RecordingNotifications {
    pub fn sent(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationService for RecordingNotifications {
    fn spawn_payment_confirmation(&self, _notice: PaymentConfirmationNotice) {
        self.sent.fetch_add(1, Ordering::SeqCst);
    }

    async fn list_deliveries(&self, _limit: usize) -> Vec<NotificationDeliveryRecord> {
        Vec::new()
    }

    async fn check_transport(&self) -> anyhow::Result<()> {
        Ok(())
    }

    fn transport_name(&self) -> &'static str {
        "recording"
    }
}

pub struct Fixture<S> {
    pub state: AppState,
    pub store: Arc<S>,
    pub notifications: Arc<RecordingNotifications>,
    pub organizer: Principal,
    pub event: Event,
}

pub fn runtime_config() -> RuntimeConfig {
    RuntimeConfig {
        bind_addr: "127.0.0.1:0".to_string(),
        public_base_url: "https://turnout.test".to_string(),
        session_secret: "integration-secret-integration-secret".to_string(),
        session_ttl_minutes: 60,
        session_cookie_name: "turnout_session".to_string(),
        session_cookie_secure: false,
        ops_token: None,
        max_body_bytes: 1024 * 1024,
        request_timeout_seconds: 15,
    }
}

/// Emails get a random suffix so runs against a shared database never collide.
pub async fn sign_up(state: &AppState, label: &str) -> Principal {
    let grant = auth_commands::sign_up(
        state,
        SignUpRequest {
            email: format!("{label}-{}@turnout.test", Uuid::new_v4().simple()),
            name: label.to_string(),
            password: "correct horse battery".to_string(),
        },
    )
    .await
    .expect("sign up");
    Principal {
        user_id: grant.user.id,
    }
}

/// Organizer, team and one published event on top of `store`.
pub async fn fixture_with<S>(store: Arc<S>) -> Fixture<S>
where
    S: UserRepository
        + TeamRepository
        + EventRepository
        + TeamResourceRepository
        + RegistrationRepository
        + AttendeeRepository
        + 'static,
{
    let notifications = Arc::new(RecordingNotifications::default());
    let state = AppState {
        config: runtime_config(),
        user_repo: store.clone(),
        team_repo: store.clone(),
        event_repo: store.clone(),
        resource_repo: store.clone(),
        registration_repo: store.clone(),
        attendee_repo: store.clone(),
        notification_service: notifications.clone(),
        health_service: Arc::new(DefaultHealthService::new(store.clone(), notifications.clone())),
        metrics: Arc::new(Metrics::default()),
    };

    let organizer = sign_up(&state, "organizer").await;
    let team = team_commands::create_team(
        &state,
        &organizer,
        CreateTeamRequest {
            name: "Swing Night".to_string(),
        },
    )
    .await
    .expect("team");
    let event = event_commands::create_event(
        &state,
        &organizer,
        team.id,
        CreateEventRequest {
            title: "Friday Social".to_string(),
            description: None,
            starts_at: None,
            ends_at: None,
            location_id: None,
            organizer_id: None,
            bank_account_id: None,
        },
    )
    .await
    .expect("event");
    let event = event_commands::update_event(
        &state,
        &organizer,
        event.id,
        UpdateEventRequest {
            status: Some("published".to_string()),
            ..UpdateEventRequest::default()
        },
    )
    .await
    .expect("publish");

    Fixture {
        state,
        store,
        notifications,
        organizer,
        event,
    }
}

pub fn registration_request(
    event: &Event,
    attendees: serde_json::Value,
) -> CreateRegistrationRequest {
    serde_json::from_value(json!({
        "eventId": event.id.to_string(),
        "contactName": "Ada Lovelace",
        "contactPhone": "0912345678",
        "contactEmail": "ada@example.com",
        "totalAmount": 1200,
        "paymentMethod": "bank_transfer",
        "attendees": attendees,
    }))
    .expect("request")
}

pub async fn register<S>(fixture: &Fixture<S>) -> RegistrationView {
    registration_commands::create_registration(
        &fixture.state,
        registration_request(
            &fixture.event,
            json!([{ "name": "Ada", "role": "Leader" }, { "name": "Charles", "role": "Follower" }]),
        ),
    )
    .await
    .expect("registration")
}

pub fn evidence(body: serde_json::Value) -> PaymentEvidenceRequest {
    serde_json::from_value(body).expect("evidence")
}
