use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use backend_application::commands::check_in_commands;
use backend_application::queries::check_in_queries;
use backend_application::AppState;
use backend_domain::{AttendeeId, CheckInStatus, RegistrationView};

use crate::error::HttpError;
use crate::handlers::parse_id;
use crate::middleware::authenticate;

#[derive(Deserialize)]
pub struct ResolveQuery {
    pub payload: Option<String>,
}

pub async fn check_in(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(attendee_id): Path<String>,
) -> Result<Json<CheckInStatus>, HttpError> {
    let principal = authenticate(&state, &headers)?;
    let attendee_id: AttendeeId = parse_id(&attendee_id, "attendee")?;
    let status = check_in_commands::check_in_attendee(&state, &principal, attendee_id).await?;
    Ok(Json(status))
}

pub async fn get_check_in_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(attendee_id): Path<String>,
) -> Result<Json<CheckInStatus>, HttpError> {
    let principal = authenticate(&state, &headers)?;
    let attendee_id: AttendeeId = parse_id(&attendee_id, "attendee")?;
    let status = check_in_queries::get_check_in_status(&state, &principal, attendee_id).await?;
    Ok(Json(status))
}

pub async fn resolve_check_in_payload(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ResolveQuery>,
) -> Result<Json<RegistrationView>, HttpError> {
    let principal = authenticate(&state, &headers)?;
    let payload = query
        .payload
        .ok_or_else(|| HttpError::Validation("payload is required".to_string()))?;
    let view = check_in_queries::resolve_check_in_payload(&state, &principal, &payload).await?;
    Ok(Json(view))
}
