use tracing::error;

use backend_domain::{Event, EventId, Principal, Team, TeamId};

use crate::{AppError, AppState};

/// True when the principal belongs to the team.
pub async fn is_team_member(
    state: &AppState,
    principal: &Principal,
    team_id: TeamId,
) -> Result<bool, AppError> {
    state
        .team_repo
        .is_member(team_id, principal.user_id)
        .await
        .map_err(|err| {
            error!("failed to check team membership: {}", err);
            AppError::Internal(err)
        })
}

pub async fn require_team_member(
    state: &AppState,
    principal: &Principal,
    team_id: TeamId,
) -> Result<(), AppError> {
    if is_team_member(state, principal, team_id).await? {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// Loads a team the principal belongs to. Existence is checked first.
pub async fn load_member_team(
    state: &AppState,
    principal: &Principal,
    team_id: TeamId,
) -> Result<Team, AppError> {
    let team = state
        .team_repo
        .find_team(team_id)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::not_found("team"))?;
    require_team_member(state, principal, team.id).await?;
    Ok(team)
}

/// Loads an event whose team the principal belongs to.
pub async fn load_member_event(
    state: &AppState,
    principal: &Principal,
    event_id: EventId,
) -> Result<Event, AppError> {
    let event = state
        .event_repo
        .find_event(event_id)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::not_found("event"))?;
    require_team_member(state, principal, event.team_id).await?;
    Ok(event)
}
