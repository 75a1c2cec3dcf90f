use backend_domain::{Principal, Team, TeamId, User};

use crate::auth::load_member_team;
use crate::{AppError, AppState};

pub async fn list_my_teams(state: &AppState, principal: &Principal) -> Result<Vec<Team>, AppError> {
    state
        .team_repo
        .list_teams_for_user(principal.user_id)
        .await
        .map_err(AppError::Internal)
}

pub async fn list_team_members(
    state: &AppState,
    principal: &Principal,
    team_id: TeamId,
) -> Result<Vec<User>, AppError> {
    let team = load_member_team(state, principal, team_id).await?;
    state
        .team_repo
        .list_members(team.id)
        .await
        .map_err(AppError::Internal)
}
