use chrono::Utc;
use tracing::info;

use backend_domain::{AttendeeId, CheckInStatus, Principal};

use crate::auth::require_team_member;
use crate::{AppError, AppState};

/// Idempotent: a repeat scan reports the existing check-in and changes nothing.
pub async fn check_in_attendee(
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

    let outcome = state
        .attendee_repo
        .mark_checked_in(attendee_id, Utc::now())
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::not_found("attendee"))?;
    state.metrics.record_check_in(outcome.is_first());
    info!(
        attendee_id = %attendee_id,
        event_id = %scope.event_id,
        first = outcome.is_first(),
        "attendee check-in"
    );
    Ok(outcome.into_status())
}
