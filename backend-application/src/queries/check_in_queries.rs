use backend_domain::{AttendeeId, CheckInStatus, Principal, RegistrationRef, RegistrationView};

use crate::auth::{load_member_event, require_team_member};
use crate::check_in_payload::parse_check_in_payload;
use crate::queries::registration_queries::{find, to_view};
use crate::{AppError, AppState};

pub async fn get_check_in_status(
    state: &AppState,
    principal: &Principal,
    attendee_id: AttendeeId,
) -> Result<CheckInStatus, AppError> {
    let scope = state
        .attendee_repo
        .find_attendee_scope(attendee_id)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::not_found("attendee"))?;
    require_team_member(state, principal, scope.team_id).await?;

    let attendee = scope.attendee;
    let message = if attendee.checked_in {
        format!("{} is checked in", attendee.name)
    } else {
        format!("{} is not checked in yet", attendee.name)
    };
    Ok(CheckInStatus {
        already_checked_in: attendee.checked_in,
        attendee,
        message,
    })
}

/// Turns a scanned QR payload into the registration and its attendees.
pub async fn resolve_check_in_payload(
    state: &AppState,
    principal: &Principal,
    payload: &str,
) -> Result<RegistrationView, AppError> {
    let key = parse_check_in_payload(payload)
        .ok_or_else(|| AppError::Validation("payload is not a check-in code".to_string()))?;
    let registration = find(state, &RegistrationRef::Key(key)).await?;
    load_member_event(state, principal, registration.event_id).await?;
    to_view(state, registration).await
}
