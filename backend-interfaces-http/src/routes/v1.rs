use axum::routing::{get, patch, post};
use axum::Router;

use backend_application::AppState;

use crate::handlers::{
    auth_handlers, check_in_handlers, event_handlers, ops_handlers, registration_handlers,
    team_handlers,
};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/auth/register", post(auth_handlers::register))
        .route("/v1/auth/login", post(auth_handlers::login))
        .route("/v1/auth/logout", post(auth_handlers::logout))
        .route("/v1/auth/me", get(auth_handlers::me))
        .route(
            "/v1/teams",
            get(team_handlers::list_teams).post(team_handlers::create_team),
        )
        .route(
            "/v1/teams/:team_id/members",
            get(team_handlers::list_members).post(team_handlers::add_member),
        )
        .route(
            "/v1/teams/:team_id/events",
            get(event_handlers::list_events).post(event_handlers::create_event),
        )
        .route(
            "/v1/teams/:team_id/locations",
            get(event_handlers::list_locations).post(event_handlers::create_location),
        )
        .route(
            "/v1/teams/:team_id/organizers",
            get(event_handlers::list_organizers).post(event_handlers::create_organizer),
        )
        .route(
            "/v1/teams/:team_id/bank-accounts",
            get(event_handlers::list_bank_accounts).post(event_handlers::create_bank_account),
        )
        .route(
            "/v1/events/:event_id",
            get(event_handlers::get_event).patch(event_handlers::update_event),
        )
        .route(
            "/v1/events/:event_id/purchase-items",
            post(event_handlers::add_purchase_item),
        )
        .route(
            "/v1/events/:event_id/registrations",
            get(registration_handlers::list_event_registrations),
        )
        .route(
            "/v1/public/events/:public_key",
            get(event_handlers::get_public_event),
        )
        .route(
            "/v1/public/registrations",
            post(registration_handlers::create_registration),
        )
        .route(
            "/v1/public/registrations/:registration_key",
            get(registration_handlers::get_registration_by_key),
        )
        .route(
            "/v1/public/registrations/:registration_key/payment-evidence",
            post(registration_handlers::submit_payment_evidence),
        )
        .route(
            "/v1/registrations/:registration_id",
            get(registration_handlers::get_registration),
        )
        .route(
            "/v1/registrations/:registration_id/payment-status",
            patch(registration_handlers::set_payment_status),
        )
        .route(
            "/v1/registrations/:registration_id/confirm",
            post(registration_handlers::confirm_payment),
        )
        .route(
            "/v1/attendees/:attendee_id/check-in",
            get(check_in_handlers::get_check_in_status).post(check_in_handlers::check_in),
        )
        .route(
            "/v1/check-in/resolve",
            get(check_in_handlers::resolve_check_in_payload),
        )
        .route("/v1/ops/health/live", get(ops_handlers::health_live))
        .route("/v1/ops/health/ready", get(ops_handlers::health_ready))
        .route(
            "/v1/ops/metrics/prometheus",
            get(ops_handlers::metrics_prometheus),
        )
        .route(
            "/v1/ops/notifications",
            get(ops_handlers::list_notification_deliveries),
        )
        .route(
            "/v1/ops/mail/check",
            get(ops_handlers::mail_transport_check),
        )
        .with_state(state)
}
