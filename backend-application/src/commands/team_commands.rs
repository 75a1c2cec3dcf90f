use chrono::Utc;
use tracing::info;

use backend_domain::{
    normalize_email, normalize_optional_text, AddTeamMemberRequest, CreateTeamRequest, Principal,
    Team, TeamId, User,
};

use crate::auth::load_member_team;
use crate::{AppError, AppState};

pub async fn create_team(
    state: &AppState,
    principal: &Principal,
    request: CreateTeamRequest,
) -> Result<Team, AppError> {
    let name = normalize_optional_text(Some(&request.name))
        .ok_or_else(|| AppError::Validation("name is required".to_string()))?;
    let team = Team {
        id: TeamId::new(),
        name,
        created_at: Utc::now(),
    };
    state
        .team_repo
        .create_team(&team, principal.user_id)
        .await
        .map_err(AppError::Internal)?;
    info!(team_id = %team.id, user_id = %principal.user_id, "team created");
    Ok(team)
}

/// Adding someone who is already a member is a no-op.
pub async fn add_team_member(
    state: &AppState,
    principal: &Principal,
    team_id: TeamId,
    request: AddTeamMemberRequest,
) -> Result<User, AppError> {
    let team = load_member_team(state, principal, team_id).await?;
    let email = normalize_email(&request.email);
    let user = state
        .user_repo
        .find_user_by_email(&email)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::not_found("user"))?;
    let added = state
        .team_repo
        .add_member(team.id, user.id)
        .await
        .map_err(AppError::Internal)?;
    if added {
        info!(team_id = %team.id, user_id = %user.id, "team member added");
    }
    Ok(user)
}
