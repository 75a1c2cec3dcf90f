use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use backend_application::commands::{payment_commands, registration_commands};
use backend_application::queries::registration_queries;
use backend_application::AppState;
use backend_domain::{
    CreateRegistrationRequest, EventId, PaymentEvidenceRequest, PaymentStatusRequest,
    Registration, RegistrationDetails, RegistrationId, RegistrationSummary, RegistrationView,
};

use crate::error::HttpError;
use crate::handlers::parse_id;
use crate::middleware::{authenticate, ApiJson};

pub async fn create_registration(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateRegistrationRequest>,
) -> Result<(StatusCode, Json<RegistrationView>), HttpError> {
    let view = registration_commands::create_registration(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// The key itself is the credential.
pub async fn get_registration_by_key(
    State(state): State<AppState>,
    Path(registration_key): Path<String>,
) -> Result<Json<RegistrationDetails>, HttpError> {
    let details = registration_queries::get_registration_by_key(&state, &registration_key).await?;
    Ok(Json(details))
}

pub async fn submit_payment_evidence(
    State(state): State<AppState>,
    Path(registration_key): Path<String>,
    ApiJson(payload): ApiJson<PaymentEvidenceRequest>,
) -> Result<Json<Registration>, HttpError> {
    let registration =
        payment_commands::submit_payment_evidence(&state, &registration_key, payload).await?;
    Ok(Json(registration))
}

pub async fn get_registration(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(registration_id): Path<String>,
) -> Result<Json<RegistrationView>, HttpError> {
    let principal = authenticate(&state, &headers)?;
    let registration_id: RegistrationId = parse_id(&registration_id, "registration")?;
    let view = registration_queries::get_registration(&state, &principal, registration_id).await?;
    Ok(Json(view))
}

pub async fn list_event_registrations(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(event_id): Path<String>,
) -> Result<Json<Vec<RegistrationSummary>>, HttpError> {
    let principal = authenticate(&state, &headers)?;
    let event_id: EventId = parse_id(&event_id, "event")?;
    let rows =
        registration_queries::list_event_registrations(&state, &principal, event_id).await?;
    Ok(Json(rows))
}

pub async fn set_payment_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(registration_id): Path<String>,
    ApiJson(payload): ApiJson<PaymentStatusRequest>,
) -> Result<Json<Registration>, HttpError> {
    let principal = authenticate(&state, &headers)?;
    let registration_id: RegistrationId = parse_id(&registration_id, "registration")?;
    let registration =
        payment_commands::set_payment_status(&state, &principal, registration_id, payload).await?;
    Ok(Json(registration))
}

pub async fn confirm_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(registration_id): Path<String>,
) -> Result<Json<Registration>, HttpError> {
    let principal = authenticate(&state, &headers)?;
    let registration_id: RegistrationId = parse_id(&registration_id, "registration")?;
    let registration =
        payment_commands::confirm_payment(&state, &principal, registration_id).await?;
    Ok(Json(registration))
}
